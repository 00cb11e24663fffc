//! # chainabi-registry
//!
//! Where decoders come from.
//!
//! 1. **ABI JSON**: `AbiTransformer` builds event and function schemas from a
//!    standard contract ABI.
//! 2. **Decode manifests**: `ManifestParser` reads YAML files declaring
//!    events and functions by hand.
//! 3. **In-memory registry**: `MemoryRegistry` holds both, indexed by name,
//!    topic0 and selector.

pub mod abi;
pub mod manifest;
pub mod memory;

pub use abi::{AbiSchemas, AbiTransformer};
pub use manifest::{DecodeTarget, ManifestParser};
pub use memory::MemoryRegistry;
