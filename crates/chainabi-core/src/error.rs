//! Error types for the ChainABI decode pipeline.

use thiserror::Error;

/// Errors raised while building a schema or decoding a single record.
///
/// `Type` and `UnsupportedType` only ever surface when a schema is built.
/// `Truncated` and `SchemaMismatch` are the per-record decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("invalid type descriptor '{descriptor}': {reason}")]
    Type { descriptor: String, reason: String },

    #[error("truncated input: need {needed} bytes at offset {offset}, buffer holds {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    #[error("unsupported type for field '{field}': {ty}")]
    UnsupportedType { field: String, ty: String },
}

impl AbiError {
    pub(crate) fn ty(descriptor: impl Into<String>, reason: impl Into<String>) -> Self {
        AbiError::Type {
            descriptor: descriptor.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(reason: impl Into<String>) -> Self {
        AbiError::SchemaMismatch {
            reason: reason.into(),
        }
    }

    /// Short, stable category name, suitable as a metric or log tag.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiError::Type { .. } => "type",
            AbiError::Truncated { .. } => "truncated",
            AbiError::SchemaMismatch { .. } => "schema_mismatch",
            AbiError::UnsupportedType { .. } => "unsupported_type",
        }
    }
}

/// Errors that can occur during batch decoding.
#[derive(Debug, Error)]
pub enum BatchDecodeError {
    #[error("Decode error at index {index}: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: AbiError,
    },

    #[error("{0}")]
    Other(String),
}

/// Errors from loading ABI JSON or decode manifests into a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' is ambiguous: {count} candidates")]
    Ambiguous {
        kind: &'static str,
        name: String,
        count: usize,
    },

    #[error("'{name}' already registered")]
    AlreadyExists { name: String },

    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error in manifest: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] AbiError),
}
