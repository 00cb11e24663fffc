//! Batch decode request configuration.

use chainabi_core::ErrorMode;

/// Default maximum records per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Configuration for a batch decode job over records of type `I`.
pub struct BatchRequest<I> {
    /// The raw records to decode
    pub inputs: Vec<I>,
    /// Number of Rayon worker threads (0 = use the global pool)
    pub concurrency: usize,
    /// Max records per chunk (memory safety)
    pub chunk_size: usize,
    /// How to handle decode errors
    pub error_mode: ErrorMode,
    /// Optional progress callback, invoked after every chunk
    pub on_progress: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
}

impl<I> BatchRequest<I> {
    pub fn new(inputs: Vec<I>) -> Self {
        Self {
            inputs,
            concurrency: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            error_mode: ErrorMode::Skip,
            on_progress: None,
        }
    }

    /// Records per chunk; values below 1 are treated as 1.
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    pub fn concurrency(mut self, threads: usize) -> Self {
        self.concurrency = threads;
        self
    }

    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn on_progress<F: Fn(usize, usize) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }
}

impl<I> std::fmt::Debug for BatchRequest<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRequest")
            .field("inputs", &self.inputs.len())
            .field("concurrency", &self.concurrency)
            .field("chunk_size", &self.chunk_size)
            .field("error_mode", &self.error_mode)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
