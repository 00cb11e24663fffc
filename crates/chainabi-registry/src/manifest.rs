//! Decode manifest parser.
//!
//! A manifest is YAML declaring named decode targets. Each top-level key is
//! either `event <Name>` or `function <Name>`:
//!
//! ```yaml
//! event OrderApprovedPartOne:
//!   anonymous: false
//!   fields:
//!     hash:     { type: bytes32, indexed: true }
//!     exchange: { type: address }
//! ---
//! function AllTypeFunction:
//!   inputs:
//!     addr: address
//!     tuple: "(uint256 value,string key)"
//!   outputs:
//!     ok: bool
//! ```
//!
//! A file may hold several documents separated by `---`; empty documents
//! are skipped. Field order in each mapping is the wire order.

use chainabi_core::{
    error::RegistryError, parse, EventField, EventSchema, Field, FunctionSchema, Schema,
};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

// ─── Raw manifest serde types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventRaw {
    #[serde(default)]
    anonymous: bool,
    // IndexMap preserves YAML insertion order, which is the decode order.
    fields: IndexMap<String, EventFieldRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventFieldRaw {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionRaw {
    #[serde(default)]
    inputs: IndexMap<String, String>,
    #[serde(default)]
    outputs: IndexMap<String, String>,
}

// ─── Targets ──────────────────────────────────────────────────────────────────

/// One named decode target declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeTarget {
    Event(EventSchema),
    Function(FunctionSchema),
}

impl DecodeTarget {
    pub fn name(&self) -> &str {
        match self {
            DecodeTarget::Event(e) => e.name(),
            DecodeTarget::Function(f) => f.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DecodeTarget::Event(_) => "event",
            DecodeTarget::Function(_) => "function",
        }
    }

    /// Canonical signature of the underlying event or function.
    pub fn signature(&self) -> &str {
        match self {
            DecodeTarget::Event(e) => e.signature(),
            DecodeTarget::Function(f) => f.signature(),
        }
    }
}

// ─── Parser ───────────────────────────────────────────────────────────────────

pub struct ManifestParser;

impl ManifestParser {
    /// Parse every target from every document, in file order.
    pub fn parse_all(yaml: &str) -> Result<Vec<DecodeTarget>, RegistryError> {
        use serde::de::Deserialize as _;

        let mut targets = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(doc)
                .map_err(|e| RegistryError::Parse(e.to_string()))?;
            if value.is_null() {
                continue;
            }
            targets.extend(Self::parse_document(value)?);
        }
        debug!(targets = targets.len(), "parsed decode manifest");
        Ok(targets)
    }

    /// Parse the single target in a manifest holding exactly one.
    pub fn parse(yaml: &str) -> Result<DecodeTarget, RegistryError> {
        let mut targets = Self::parse_all(yaml)?;
        match targets.len() {
            1 => Ok(targets.remove(0)),
            0 => Err(RegistryError::Parse("manifest declares no targets".into())),
            n => Err(RegistryError::Parse(format!(
                "expected one target, manifest declares {n}"
            ))),
        }
    }

    fn parse_document(value: serde_yaml::Value) -> Result<Vec<DecodeTarget>, RegistryError> {
        let serde_yaml::Value::Mapping(mapping) = value else {
            return Err(RegistryError::Parse(
                "manifest document must be a YAML mapping".into(),
            ));
        };

        let mut targets = Vec::with_capacity(mapping.len());
        for (key, body) in mapping {
            let key = key
                .as_str()
                .ok_or_else(|| RegistryError::Parse("target keys must be strings".into()))?;
            let (kind, name) = key
                .split_once(char::is_whitespace)
                .map(|(k, n)| (k, n.trim()))
                .filter(|(_, n)| !n.is_empty())
                .ok_or_else(|| {
                    RegistryError::Parse(format!(
                        "'{key}': expected 'event <Name>' or 'function <Name>'"
                    ))
                })?;

            let target = match kind {
                "event" => DecodeTarget::Event(Self::event(name, body)?),
                "function" => DecodeTarget::Function(Self::function(name, body)?),
                other => {
                    return Err(RegistryError::Parse(format!(
                        "'{key}': unknown target kind '{other}'"
                    )))
                }
            };
            targets.push(target);
        }
        Ok(targets)
    }

    fn event(name: &str, body: serde_yaml::Value) -> Result<EventSchema, RegistryError> {
        let raw: EventRaw = serde_yaml::from_value(body)
            .map_err(|e| RegistryError::Parse(format!("event {name}: {e}")))?;

        let mut fields = Vec::with_capacity(raw.fields.len());
        for (field, def) in raw.fields {
            let ty = parse(&def.ty).map_err(|e| {
                RegistryError::Parse(format!("event {name}, field '{field}': {e}"))
            })?;
            fields.push(EventField::new(field, ty, def.indexed));
        }
        Ok(EventSchema::new(name, fields, raw.anonymous)?)
    }

    fn function(name: &str, body: serde_yaml::Value) -> Result<FunctionSchema, RegistryError> {
        let raw: FunctionRaw = serde_yaml::from_value(body)
            .map_err(|e| RegistryError::Parse(format!("function {name}: {e}")))?;
        let inputs = Self::schema(name, raw.inputs)?;
        let outputs = Self::schema(name, raw.outputs)?;
        Ok(FunctionSchema::new(name, inputs, outputs))
    }

    fn schema(owner: &str, params: IndexMap<String, String>) -> Result<Schema, RegistryError> {
        let fields = params
            .into_iter()
            .map(|(field, descriptor)| {
                let ty = parse(&descriptor).map_err(|e| {
                    RegistryError::Parse(format!("function {owner}, field '{field}': {e}"))
                })?;
                Ok(Field::new(field, ty))
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(Schema::new(fields)?)
    }
}
