//! Leaf request counter

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts leaf-fetch attempts across the whole run.
///
/// Incremented once per attempt, successful or not. Read once traversal has
/// finished.
#[derive(Debug, Default)]
pub struct RequestCounter {
    attempts: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt, returning the new total
    pub fn increment(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(RequestCounter::new().get(), 0);
    }

    #[test]
    fn test_increment_returns_total() {
        let counter = RequestCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments() {
        let counter = Arc::new(RequestCounter::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    for _ in 0..250 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.get(), 4000);
    }
}
