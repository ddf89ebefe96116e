//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheap clonable cancellation handle.
///
/// Long CPU work polls this at clone-pair batch and outer graph
/// iteration boundaries. Once fired, partial results are discarded and
/// the operation returns [`AnalysisError::Cancelled`].
///
/// [`AnalysisError::Cancelled`]: crate::errors::AnalysisError::Cancelled
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
