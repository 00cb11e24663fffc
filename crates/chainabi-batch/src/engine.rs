//! `BatchEngine`: orchestrates chunked, parallel batch decoding.

use crate::request::BatchRequest;
use chainabi_core::{AbiError, BatchDecodeError, DecodedRow, ErrorMode, RowDecoder};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a batch decode job.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successfully decoded rows, in input order
    pub rows: Vec<DecodedRow>,
    /// (original_index, error) pairs, only populated in Collect mode
    pub errors: Vec<(usize, AbiError)>,
    /// Total raw records processed
    pub total_input: usize,
}

impl BatchResult {
    /// Records that failed, whether collected or skipped.
    pub fn failed(&self) -> usize {
        self.total_input - self.rows.len()
    }
}

/// Batch decode engine bound to one decoder.
pub struct BatchEngine<D> {
    decoder: Arc<D>,
}

impl<D: RowDecoder> BatchEngine<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder: Arc::new(decoder),
        }
    }

    /// Share a decoder that is also held elsewhere, e.g. by a registry.
    pub fn from_arc(decoder: Arc<D>) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Execute a batch decode request.
    ///
    /// Each chunk is decoded in parallel, then failures are handled in input
    /// order, so `Throw` always reports the lowest failing index.
    pub fn decode(&self, req: BatchRequest<D::Input>) -> Result<BatchResult, BatchDecodeError> {
        if req.concurrency == 0 {
            return self.run(&req);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(req.concurrency)
            .build()
            .map_err(|e| BatchDecodeError::Other(format!("building thread pool: {e}")))?;
        pool.install(|| self.run(&req))
    }

    fn run(&self, req: &BatchRequest<D::Input>) -> Result<BatchResult, BatchDecodeError> {
        let total_input = req.inputs.len();
        info!(
            "BatchEngine: decoding {} records (chunk_size={}, mode={:?})",
            total_input, req.chunk_size, req.error_mode
        );

        let mut out = BatchResult {
            rows: Vec::with_capacity(total_input),
            errors: Vec::new(),
            total_input,
        };
        let mut global_offset = 0usize;

        for chunk in req.inputs.chunks(req.chunk_size.max(1)) {
            let decoder = self.decoder.as_ref();
            let results: Vec<Result<DecodedRow, AbiError>> =
                chunk.par_iter().map(|input| decoder.decode_row(input)).collect();

            let mut skipped = 0usize;
            for (local_idx, result) in results.into_iter().enumerate() {
                let index = global_offset + local_idx;
                match result {
                    Ok(row) => out.rows.push(row),
                    Err(err) => match req.error_mode {
                        ErrorMode::Skip => skipped += 1,
                        ErrorMode::Collect => out.errors.push((index, err)),
                        ErrorMode::Throw => {
                            warn!(index, error = %err, "BatchEngine: aborting batch");
                            return Err(BatchDecodeError::ItemFailed { index, source: err });
                        }
                    },
                }
            }
            if skipped > 0 {
                warn!(skipped, offset = global_offset, "BatchEngine: skipped undecodable records");
            }

            global_offset += chunk.len();
            debug!(done = global_offset, total = total_input, "BatchEngine: chunk complete");

            if let Some(cb) = &req.on_progress {
                cb(out.rows.len(), total_input);
            }
        }

        info!(
            "BatchEngine: complete, {} decoded, {} errors",
            out.rows.len(),
            out.errors.len()
        );

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainabi_core::{EventSchema, RawLog, Schema, B256, U256};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn word(v: u64) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[24..].copy_from_slice(&v.to_be_bytes());
        w
    }

    /// Every third record is truncated.
    fn inputs(n: u64) -> Vec<Vec<u8>> {
        (0..n)
            .map(|i| if i % 3 == 2 { vec![0u8; 7] } else { word(i) })
            .collect()
    }

    fn engine() -> BatchEngine<Schema> {
        BatchEngine::new(Schema::parse(&[("n", "uint256")]).unwrap())
    }

    #[test]
    fn skip_mode_keeps_order() {
        let req = BatchRequest::new(inputs(10)).chunk_size(4);
        let out = engine().decode(req).unwrap();
        let values: Vec<_> = out
            .rows
            .iter()
            .map(|r| r.get("n").and_then(|v| v.as_uint()).unwrap())
            .collect();
        let expected: Vec<_> = [0u64, 1, 3, 4, 6, 7, 9].iter().map(|v| U256::from(*v)).collect();
        assert_eq!(values, expected);
        assert!(out.errors.is_empty());
        assert_eq!(out.failed(), 3);
    }

    #[test]
    fn collect_mode_reports_global_indices() {
        let req = BatchRequest::new(inputs(10))
            .chunk_size(4)
            .error_mode(ErrorMode::Collect);
        let out = engine().decode(req).unwrap();
        let idx: Vec<_> = out.errors.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, vec![2, 5, 8]);
        assert!(out.errors.iter().all(|(_, e)| e.kind() == "truncated"));
    }

    #[test]
    fn throw_mode_reports_first_failure() {
        let req = BatchRequest::new(inputs(10))
            .chunk_size(100)
            .error_mode(ErrorMode::Throw);
        let err = engine().decode(req).unwrap_err();
        assert!(matches!(err, BatchDecodeError::ItemFailed { index: 2, .. }));
    }

    #[test]
    fn progress_after_each_chunk() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let req = BatchRequest::new(inputs(10))
            .chunk_size(3)
            .on_progress(move |_, total| {
                assert_eq!(total, 10);
                seen.fetch_add(1, Ordering::Relaxed);
            });
        engine().decode(req).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn dedicated_pool() {
        let req = BatchRequest::new(inputs(30)).concurrency(2);
        let out = engine().decode(req).unwrap();
        assert_eq!(out.rows.len(), 20);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let req = BatchRequest::new(inputs(3)).chunk_size(0);
        assert_eq!(req.chunk_size, 1);
        assert_eq!(engine().decode(req).unwrap().rows.len(), 2);
    }

    #[test]
    fn event_logs() {
        let ev = EventSchema::parse("Ping", &[("id", "uint64", true)], false).unwrap();
        let topic0 = ev.topic0();
        let logs: Vec<RawLog> = (0..5u64)
            .map(|i| {
                let mut id = [0u8; 32];
                id[24..].copy_from_slice(&i.to_be_bytes());
                RawLog::new(vec![topic0, B256::from(id)], vec![])
            })
            .chain(std::iter::once(RawLog::new(vec![B256::ZERO], vec![])))
            .collect();
        let out = BatchEngine::new(ev)
            .decode(BatchRequest::new(logs).error_mode(ErrorMode::Collect))
            .unwrap();
        assert_eq!(out.rows.len(), 5);
        assert_eq!(out.errors[0].0, 5);
        assert_eq!(out.errors[0].1.kind(), "schema_mismatch");
    }
}
