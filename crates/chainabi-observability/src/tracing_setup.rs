//! Tracing / logging initialisation helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("invalid log filter '{directives}': {source}")]
    Filter {
        directives: String,
        #[source]
        source: ParseError,
    },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level, e.g. `chainabi-batch: debug`
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    pub fn component(mut self, name: impl Into<String>, level: impl Into<String>) -> Self {
        self.components.insert(name.into(), level.into());
        self
    }

    /// The `EnvFilter` directive string: `"info,chainabi_batch=debug"`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }

    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        let directives = self.directives();
        EnvFilter::try_new(&directives).map_err(|source| TracingError::Filter { directives, source })
    }
}

/// Install the global subscriber described by `config`.
/// Call once at application startup; later calls fail with `AlreadyInstalled`.
pub fn init_tracing(config: &LogConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
