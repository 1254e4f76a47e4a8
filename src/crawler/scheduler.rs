//! Batch scheduler for detail-page work
//!
//! This module handles:
//! - Splitting the listing set into fixed-size chunks
//! - Running each chunk's workers concurrently
//! - Pausing between chunks to keep the request rate polite
//!
//! Chunks are strictly sequential: the next one starts only when every
//! worker of the current one has finished.

use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Runs work items in concurrent fixed-size batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    concurrency: usize,
    inter_batch_delay: Duration,
}

impl BatchScheduler {
    /// Creates a scheduler
    ///
    /// A concurrency of zero is treated as one.
    pub fn new(concurrency: usize, inter_batch_delay: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            inter_batch_delay,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }

    /// Sizes of the batches `len` items are split into
    ///
    /// # Example
    ///
    /// ```
    /// use adsweep::crawler::BatchScheduler;
    /// use std::time::Duration;
    ///
    /// let scheduler = BatchScheduler::new(5, Duration::ZERO);
    /// assert_eq!(scheduler.chunk_sizes(12), vec![5, 5, 2]);
    /// assert!(scheduler.chunk_sizes(0).is_empty());
    /// ```
    pub fn chunk_sizes(&self, len: usize) -> Vec<usize> {
        let full = len / self.concurrency;
        let mut sizes = vec![self.concurrency; full];
        if len % self.concurrency > 0 {
            sizes.push(len % self.concurrency);
        }
        sizes
    }

    /// Applies `worker` to every item and returns the results in input order
    ///
    /// Workers of one batch run concurrently on the current task; the
    /// scheduler waits `inter_batch_delay` between batches, never after the
    /// last one.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, worker: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let batch_count = self.chunk_sizes(total).len();
        let mut results = Vec::with_capacity(total);
        let mut remaining = items.into_iter();

        for batch in 0..batch_count {
            if batch > 0 && !self.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.inter_batch_delay).await;
            }

            let chunk: Vec<T> = remaining.by_ref().take(self.concurrency).collect();
            tracing::info!(
                batch = batch + 1,
                batches = batch_count,
                size = chunk.len(),
                "Processing batch"
            );

            results.extend(join_all(chunk.into_iter().map(&worker)).await);
        }

        results
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(500))
    }
}
