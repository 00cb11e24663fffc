//! In-memory decoder registry.
//!
//! Holds event and function schemas loaded from manifests or ABI JSON and
//! indexes them by name, by topic0 and by selector. Thread-safe via
//! `Arc<RwLock<Inner>>`; schemas are handed out as `Arc`s so callers can
//! decode without holding the lock.

use alloy_primitives::B256;
use chainabi_core::{error::RegistryError, EventSchema, FunctionSchema};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

use crate::abi::AbiTransformer;
use crate::manifest::{DecodeTarget, ManifestParser};

#[derive(Default)]
struct Inner {
    events: HashMap<String, Arc<EventSchema>>,
    functions: HashMap<String, Arc<FunctionSchema>>,
    by_topic0: HashMap<B256, Arc<EventSchema>>,
    by_selector: HashMap<[u8; 4], Arc<FunctionSchema>>,
}

impl Inner {
    fn insert_event(&mut self, event: EventSchema) -> Result<(), RegistryError> {
        if self.events.contains_key(event.name()) {
            return Err(RegistryError::AlreadyExists {
                name: event.name().to_string(),
            });
        }
        let event = Arc::new(event);
        if !event.is_anonymous() {
            self.by_topic0.insert(event.topic0(), Arc::clone(&event));
        }
        self.events.insert(event.name().to_string(), event);
        Ok(())
    }

    fn insert_function(&mut self, func: FunctionSchema) -> Result<(), RegistryError> {
        if self.functions.contains_key(func.name()) {
            return Err(RegistryError::AlreadyExists {
                name: func.name().to_string(),
            });
        }
        let func = Arc::new(func);
        self.by_selector.insert(func.selector(), Arc::clone(&func));
        self.functions.insert(func.name().to_string(), func);
        Ok(())
    }

    fn insert(&mut self, target: DecodeTarget) -> Result<(), RegistryError> {
        match target {
            DecodeTarget::Event(e) => self.insert_event(e),
            DecodeTarget::Function(f) => self.insert_function(f),
        }
    }

    fn contains(&self, target: &DecodeTarget) -> bool {
        match target {
            DecodeTarget::Event(e) => self.events.contains_key(e.name()),
            DecodeTarget::Function(f) => self.functions.contains_key(f.name()),
        }
    }
}

/// Thread-safe in-memory registry of named decoders.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the maps half-updated,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an event. Names are unique per kind.
    pub fn add_event(&self, event: EventSchema) -> Result<(), RegistryError> {
        self.write().insert_event(event)
    }

    /// Add a function. Names are unique per kind.
    pub fn add_function(&self, func: FunctionSchema) -> Result<(), RegistryError> {
        self.write().insert_function(func)
    }

    pub fn add(&self, target: DecodeTarget) -> Result<(), RegistryError> {
        self.write().insert(target)
    }

    /// Load every target of a manifest string. Returns the count loaded.
    ///
    /// All or nothing: if any name is already registered, or repeats within
    /// the manifest, nothing is added.
    pub fn load_manifest(&self, yaml: &str) -> Result<usize, RegistryError> {
        let targets = ManifestParser::parse_all(yaml)?;
        let mut inner = self.write();

        let mut seen = HashSet::new();
        for target in &targets {
            if inner.contains(target) || !seen.insert((target.kind(), target.name())) {
                return Err(RegistryError::AlreadyExists {
                    name: target.name().to_string(),
                });
            }
        }

        let count = targets.len();
        for target in targets {
            inner.insert(target)?;
        }
        Ok(count)
    }

    /// Load a manifest file.
    pub fn load_manifest_file(&self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let count = self.load_manifest(&content)?;
        debug!(path = %path.display(), count, "loaded manifest file");
        Ok(count)
    }

    /// Load every event and function of an ABI JSON string.
    ///
    /// Overloads share a name, so only the first overload is registered by
    /// name; every overload stays reachable by topic0 or selector.
    pub fn load_abi(&self, abi_json: &str) -> Result<usize, RegistryError> {
        let schemas = AbiTransformer::from_json(abi_json)?.transform_all()?;
        let mut inner = self.write();
        let mut count = 0;
        for event in schemas.events {
            if inner.events.contains_key(event.name()) {
                debug!(event = event.signature(), "overloaded event indexed by topic0 only");
                if !event.is_anonymous() {
                    let event = Arc::new(event);
                    inner.by_topic0.insert(event.topic0(), event);
                }
                continue;
            }
            inner.insert_event(event)?;
            count += 1;
        }
        for func in schemas.functions {
            if inner.functions.contains_key(func.name()) {
                let func = Arc::new(func);
                inner.by_selector.insert(func.selector(), func);
                continue;
            }
            inner.insert_function(func)?;
            count += 1;
        }
        debug!(count, "loaded ABI");
        Ok(count)
    }

    pub fn event(&self, name: &str) -> Option<Arc<EventSchema>> {
        self.read().events.get(name).cloned()
    }

    pub fn function(&self, name: &str) -> Option<Arc<FunctionSchema>> {
        self.read().functions.get(name).cloned()
    }

    /// The non-anonymous event whose topic0 is `topic0`.
    pub fn event_by_topic0(&self, topic0: &B256) -> Option<Arc<EventSchema>> {
        self.read().by_topic0.get(topic0).cloned()
    }

    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<Arc<FunctionSchema>> {
        self.read().by_selector.get(&selector).cloned()
    }

    /// Event lookup for a log: by its first topic.
    pub fn event_for_log(&self, topics: &[B256]) -> Option<Arc<EventSchema>> {
        topics.first().and_then(|t| self.event_by_topic0(t))
    }

    /// Function lookup for calldata: by its 4-byte prefix.
    pub fn function_for_calldata(&self, calldata: &[u8]) -> Option<Arc<FunctionSchema>> {
        let selector: [u8; 4] = calldata.get(..4)?.try_into().ok()?;
        self.function_by_selector(selector)
    }

    /// Total number of named targets.
    pub fn len(&self) -> usize {
        let inner = self.read();
        inner.events.len() + inner.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(kind, name)` of every named target, sorted.
    pub fn all_names(&self) -> Vec<(&'static str, String)> {
        let inner = self.read();
        let mut names: Vec<_> = inner
            .events
            .keys()
            .map(|n| ("event", n.clone()))
            .chain(inner.functions.keys().map(|n| ("function", n.clone())))
            .collect();
        names.sort();
        names
    }
}
