//! Concurrency limiter for top-level operations
//!
//! At most `max` operations hold a permit at once; further callers queue
//! until a permit is released. Permits are released on drop, so an operation
//! that fails or panics still frees its slot.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// A counting limiter shared by every clone
#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    max: usize,
}

impl Limiter {
    /// Create a limiter allowing `max` concurrent operations (minimum 1)
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    /// Run `fut` once a permit is available
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is owned by the limiter and never closed.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .unwrap_or_else(|_| unreachable!("limiter semaphore closed"));
        fut.await
    }

    /// Maximum number of concurrent operations
    pub fn max_concurrent(&self) -> usize {
        self.max
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
