//! # chainabi-batch
//!
//! Batch decode engine for historical data processing.
//!
//! ## Features
//! - Memory-bounded chunking (default 10,000 records per chunk)
//! - CPU-parallel decoding via Rayon
//! - Progress callbacks (for progress bars / ETAs)
//! - Three error modes: Skip, Collect, Throw
//!
//! ## Usage
//! ```
//! use chainabi_batch::{BatchEngine, BatchRequest};
//! use chainabi_core::{ErrorMode, Schema};
//!
//! let schema = Schema::parse(&[("n", "uint256")]).unwrap();
//! let engine = BatchEngine::new(schema);
//! let request = BatchRequest::new(vec![vec![0u8; 32], vec![1u8; 3]])
//!     .error_mode(ErrorMode::Collect);
//! let result = engine.decode(request).unwrap();
//! assert_eq!(result.rows.len(), 1);
//! assert_eq!(result.errors[0].0, 1);
//! ```

pub mod engine;
pub mod request;

pub use engine::{BatchEngine, BatchResult};
pub use request::BatchRequest;
