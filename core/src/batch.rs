//! Order-preserving fan-out of independent read-only work over fixed-size rayon pools.

use crate::error::Result;
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Worker pools for batch calls.
///
/// Only the pool for the configured default worker count is kept alive between
/// calls. Any other per-call count gets a pool that is dropped when the call returns.
#[derive(Default)]
pub struct WorkerPools {
    default_workers: Option<usize>,
    default_pool: Mutex<Option<Arc<ThreadPool>>>,
}

fn build_pool(workers: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("hashrank-worker-{i}"))
        .build()?;
    tracing::debug!(workers, "built worker pool");
    Ok(pool)
}

impl WorkerPools {
    /// `default_workers` of `None` or `Some(0)` means the global rayon pool.
    pub fn new(default_workers: Option<usize>) -> Self {
        Self { default_workers: default_workers.filter(|&n| n > 0), default_pool: Mutex::new(None) }
    }

    fn default_pool(&self, workers: usize) -> Result<Arc<ThreadPool>> {
        let mut slot = self.default_pool.lock();
        if let Some(pool) = slot.as_ref() {
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(build_pool(workers)?);
        *slot = Some(Arc::clone(&pool));
        Ok(pool)
    }

    /// Worker count a call actually runs with: `Some(0)` and `None` both fall
    /// back to the default, which may itself be `None` (global pool).
    pub fn resolve(&self, workers: Option<usize>) -> Option<usize> {
        workers.filter(|&n| n > 0).or(self.default_workers)
    }

    /// Apply `f` to every item; `out[i] == f(&items[i])` whatever order the workers finish in.
    ///
    /// Blocks until every item is done.
    pub fn map<T, R, F>(&self, items: &[T], workers: Option<usize>, f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match self.resolve(workers) {
            None => Ok(items.par_iter().map(f).collect()),
            Some(n) if Some(n) == self.default_workers => {
                let pool = self.default_pool(n)?;
                Ok(pool.install(|| items.par_iter().map(f).collect()))
            }
            Some(n) => {
                let pool = build_pool(n)?;
                Ok(pool.install(|| items.par_iter().map(f).collect()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn preserves_input_order() {
        let pools = WorkerPools::new(None);
        let items: Vec<u64> = (0..64).collect();
        let out = pools
            .map(&items, Some(4), |&i| {
                // Early items finish last.
                std::thread::sleep(Duration::from_micros(64 - i));
                i * 10
            })
            .unwrap();
        assert_eq!(out, items.iter().map(|i| i * 10).collect::<Vec<_>>());
    }

    #[test]
    fn only_default_pool_is_kept() {
        let pools = WorkerPools::new(Some(2));
        for workers in 1..=40 {
            let out = pools.map(&[()], Some(workers), |_| rayon::current_num_threads()).unwrap();
            assert_eq!(out, vec![workers]);
        }
        // Only the default count (2) was cached.
        let cached = pools.default_pool.lock().as_ref().map(|p| p.current_num_threads());
        assert_eq!(cached, Some(2));
    }

    #[test]
    fn zero_workers_uses_configured_default() {
        let pools = WorkerPools::new(Some(2));
        assert_eq!(pools.resolve(Some(0)), Some(2));
        assert_eq!(pools.resolve(None), Some(2));
        assert_eq!(pools.resolve(Some(5)), Some(5));
        let out = pools.map(&[1, 2, 3], Some(0), |_| rayon::current_num_threads()).unwrap();
        assert_eq!(out, vec![2, 2, 2]);

        let global = WorkerPools::new(Some(0));
        assert_eq!(global.resolve(Some(0)), None);
        assert!(global.default_pool.lock().is_none());
    }
}
