//! # chainabi-core
//!
//! Type system and head/tail decoder for the EVM ABI. A declared schema is
//! parsed once into immutable `TypeNode` trees; each decode call then turns
//! one caller-owned buffer into one named `DecodedRow`, or fails as a whole.
//!
//! ```
//! use chainabi_core::Schema;
//!
//! let schema = Schema::parse(&[("a", "uint256"), ("b", "bool")]).unwrap();
//! let mut data = vec![0u8; 64];
//! data[31] = 7;
//! data[63] = 1;
//! let row = schema.decode(&data).unwrap();
//! assert_eq!(row.get("a").unwrap().to_string(), "7");
//! assert_eq!(row.get("b").unwrap().as_bool(), Some(true));
//! ```

pub mod decode;
pub mod decoder;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod function;
pub mod parser;
pub mod reader;
pub mod scalar;
pub mod schema;
pub mod types;
pub mod value;

pub use decoder::{BatchDecodeResult, ErrorMode, ProgressCallback, RowDecoder};
pub use error::{AbiError, BatchDecodeError, RegistryError};
pub use event::{EventField, EventSchema, RawLog};
pub use function::FunctionSchema;
pub use parser::parse;
pub use reader::WordReader;
pub use schema::{Field, Schema};
pub use types::{TupleField, TypeKind, TypeNode};
pub use value::{Decimal, DecodedRow, DecodedValue};

pub use alloy_primitives::{Address, B256, I256, U256};
