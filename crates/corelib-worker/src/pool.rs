//! [`SequentialWorkerPool`]: a keyed registry of [`SequentialWorker`]s with lazy creation and
//! idle reaping (spec §3.4, §4.6).

use crate::executor::{Clock, SystemClock, TaskExecutor};
use crate::worker::SequentialWorker;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Tuning for [`SequentialWorkerPool`]'s idle-reap flush.
#[derive(Debug, Clone)]
pub struct SequentialWorkerPoolConfig {
    /// Minimum wall-clock time between flush attempts (spec §4.6: "more than 5 seconds").
    pub flush_interval: Duration,
}

impl Default for SequentialWorkerPoolConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(5),
        }
    }
}

/// A keyed map from arbitrary key to [`SequentialWorker`], creating workers lazily on first
/// [`Self::get`] and periodically retiring-and-removing idle ones.
pub struct SequentialWorkerPool<K> {
    workers: RwLock<HashMap<K, SequentialWorker>>,
    executor: Arc<dyn TaskExecutor>,
    clock: Arc<dyn Clock>,
    config: SequentialWorkerPoolConfig,
    last_flushed_millis: AtomicU64,
}

impl<K> std::fmt::Debug for SequentialWorkerPool<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialWorkerPool")
            .field("workers", &self.workers.read().len())
            .finish_non_exhaustive()
    }
}

impl<K> SequentialWorkerPool<K>
where
    K: Eq + Hash + Clone,
{
    /// A new, empty pool dispatching every lazily created worker onto `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self::with_config(executor, SequentialWorkerPoolConfig::default())
    }

    /// As [`Self::new`], with an explicit [`SequentialWorkerPoolConfig`].
    #[must_use]
    pub fn with_config(executor: Arc<dyn TaskExecutor>, config: SequentialWorkerPoolConfig) -> Self {
        Self::with_clock(executor, config, Arc::new(SystemClock))
    }

    /// As [`Self::with_config`], with an explicit [`Clock`] (used by tests to drive the flush
    /// throttle without a real sleep).
    #[must_use]
    pub fn with_clock(
        executor: Arc<dyn TaskExecutor>,
        config: SequentialWorkerPoolConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
            executor,
            clock,
            config,
            last_flushed_millis: AtomicU64::new(0),
        }
    }

    /// The worker for `key`, creating one lazily if this is the first request for it. Every call
    /// also runs the non-blocking flush check (spec §4.6): if the flush interval has elapsed and
    /// a compare-and-swap on the flush timestamp succeeds, idle workers are retired and removed.
    pub fn get(&self, key: K) -> SequentialWorker {
        self.maybe_flush();

        if let Some(worker) = self.workers.read().get(&key) {
            return worker.clone();
        }
        self.workers
            .write()
            .entry(key)
            .or_insert_with(|| SequentialWorker::new(Arc::clone(&self.executor)))
            .clone()
    }

    /// Number of keys currently registered, idle or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.read().len()
    }

    /// Whether the pool currently holds no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.read().is_empty()
    }

    fn maybe_flush(&self) {
        let now = self.clock.now_millis();
        let last = self.last_flushed_millis.load(Ordering::Acquire);
        let interval_ms = u64::try_from(self.config.flush_interval.as_millis()).unwrap_or(u64::MAX);
        if now.saturating_sub(last) < interval_ms {
            return;
        }
        if self
            .last_flushed_millis
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // Another thread already won the flush for this window.
            return;
        }
        self.flush();
    }

    fn flush(&self) {
        let mut workers = self.workers.write();
        let before = workers.len();
        workers.retain(|_, worker| {
            let idle = worker.pending_tasks_count() == 0 && !worker.is_running();
            if idle {
                worker.retire();
            }
            !idle
        });
        let removed = before - workers.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = workers.len(), "sequential worker pool flushed");
        }
    }
}
