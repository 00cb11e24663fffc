//! The `RowDecoder` trait and associated progress/batch types.
//!
//! `Schema`, `FunctionSchema` and `EventSchema` all implement `RowDecoder`,
//! so the batch engine and registry can treat them uniformly. The trait is
//! `Send + Sync` so a decoder can be shared across Rayon threads behind an
//! `Arc` without locking.

use crate::error::{AbiError, BatchDecodeError};
use crate::event::{EventSchema, RawLog};
use crate::function::FunctionSchema;
use crate::schema::Schema;
use crate::value::DecodedRow;

/// Callback invoked by the batch engine during long-running decodes.
/// `decoded` is the number of records successfully decoded so far;
/// `total` is the total count in the current batch.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, decoded: usize, total: usize);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(usize, usize) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, decoded: usize, total: usize) {
        self(decoded, total)
    }
}

/// Controls how a batch reacts to individual decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Drop records that fail to decode.
    #[default]
    Skip,
    /// Collect decode errors alongside successes and return both at the end.
    Collect,
    /// Abort the entire batch on the first error.
    Throw,
}

/// Successful rows plus, in `Collect` mode, the failures by input index.
#[derive(Debug, Default)]
pub struct BatchDecodeResult {
    pub rows: Vec<DecodedRow>,
    /// Populated only when `ErrorMode::Collect` is used.
    pub errors: Vec<(usize, AbiError)>,
}

/// Anything that turns one raw record into one named row.
pub trait RowDecoder: Send + Sync {
    /// The raw record type, e.g. a byte buffer or a log.
    type Input: Sync;

    /// Decode a single record. Either the whole row or one error.
    fn decode_row(&self, input: &Self::Input) -> Result<DecodedRow, AbiError>;

    /// Decode records sequentially, applying `mode` to each failure.
    ///
    /// `chainabi-batch` provides a parallel, chunked version of this.
    fn decode_all(
        &self,
        inputs: &[Self::Input],
        mode: ErrorMode,
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<BatchDecodeResult, BatchDecodeError> {
        let mut result = BatchDecodeResult {
            rows: Vec::with_capacity(inputs.len()),
            errors: Vec::new(),
        };

        for (index, input) in inputs.iter().enumerate() {
            match self.decode_row(input) {
                Ok(row) => result.rows.push(row),
                Err(err) => match mode {
                    ErrorMode::Skip => {}
                    ErrorMode::Collect => result.errors.push((index, err)),
                    ErrorMode::Throw => {
                        return Err(BatchDecodeError::ItemFailed { index, source: err });
                    }
                },
            }

            if let Some(cb) = progress {
                cb.on_progress(result.rows.len(), inputs.len());
            }
        }

        Ok(result)
    }
}

/// A bare argument buffer.
impl RowDecoder for Schema {
    type Input = Vec<u8>;

    fn decode_row(&self, input: &Vec<u8>) -> Result<DecodedRow, AbiError> {
        self.decode(input)
    }
}

/// Full calldata, selector included.
impl RowDecoder for FunctionSchema {
    type Input = Vec<u8>;

    fn decode_row(&self, input: &Vec<u8>) -> Result<DecodedRow, AbiError> {
        self.decode_calldata(input)
    }
}

/// A log with its full topic list.
impl RowDecoder for EventSchema {
    type Input = RawLog;

    fn decode_row(&self, input: &RawLog) -> Result<DecodedRow, AbiError> {
        self.decode_log(&input.topics, &input.data)
    }
}
