//! Collaborator interfaces the core consumes (spec §6): an executor to run dispatched work and a
//! clock used only by [`crate::SequentialWorkerPool`]'s flush throttle.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

/// A unit of dispatched work, already wired to signal its own completion; the worker never
/// inspects its output, only that it has finished.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The "operations `submit(task)` and `schedule(task, delay)`" collaborator from spec §6.
///
/// [`SequentialWorker`](crate::SequentialWorker) only ever calls [`Self::submit`]; the
/// rate-limited worker in `corelib-ratelimit` additionally needs [`Self::schedule_at`] to arm its
/// periodic reset, hence the default implementation here rather than a second trait.
pub trait TaskExecutor: Send + Sync {
    /// Hand `fut` to the executor for immediate execution.
    fn submit(&self, fut: BoxFuture);

    /// Hand `fut` to the executor once wall-clock time `at` has passed.
    ///
    /// The default implementation spawns a task that sleeps until `at` via `tokio::time`, then
    /// submits `fut`; an executor backed by something other than tokio can override this.
    fn schedule_at(&self, at: Instant, fut: BoxFuture) {
        let sleep_until = tokio::time::Instant::from_std(at);
        self.submit(Box::pin(async move {
            tokio::time::sleep_until(sleep_until).await;
            fut.await;
        }));
    }
}

/// The default [`TaskExecutor`]: spawns onto a `tokio` runtime handle, matching the teacher's use
/// of `tokio::sync`/`tokio::time` throughout rather than a hand-rolled thread pool.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

impl TokioExecutor {
    /// Wrap an explicit runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Wrap the handle of whichever tokio runtime is currently entered.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime context, per
    /// [`tokio::runtime::Handle::current`].
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskExecutor for TokioExecutor {
    fn submit(&self, fut: BoxFuture) {
        self.handle.spawn(fut);
    }
}

/// Wall-clock source used only by the pool's flush throttling (spec §6).
///
/// Exposed in milliseconds rather than `Instant` so it can back the lock-free
/// compare-and-swap throttle described in spec §4.6 (an `AtomicU64` storing a millisecond
/// timestamp); `Instant` itself has no stable integer representation to CAS against.
pub trait Clock: Send + Sync {
    /// Current time, as milliseconds since an arbitrary but monotonically non-decreasing epoch.
    fn now_millis(&self) -> u64;
}

/// The real wall clock, backed by [`std::time::SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
            .min(u128::from(u64::MAX)) as u64
    }
}

/// A clock the test suite can advance by hand, so the pool's 5-second flush throttle (spec §8
/// S9) doesn't require a real sleep in unit tests — the same fake-time-source idiom the teacher
/// uses in its own proof-of-time test harness.
#[cfg(any(test, feature = "test-util"))]
pub mod test_support {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A [`Clock`] whose reading only changes when [`Self::advance`] is called.
    #[derive(Debug, Default)]
    pub struct ManualClock {
        millis: AtomicU64,
    }

    impl ManualClock {
        /// A clock starting at millisecond `0`.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Move the clock forward by `delta_millis`.
        pub fn advance(&self, delta_millis: u64) {
            self.millis.fetch_add(delta_millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.millis.load(Ordering::SeqCst)
        }
    }
}
