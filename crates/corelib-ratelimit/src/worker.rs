//! [`RateLimiterWorker`]: weighted admission of queued tasks gated by a periodic trigger (spec
//! §3.4, §4.5), built on `corelib_worker`'s `Task`/`Promise` plumbing.

use crate::trigger::{Trigger, TriggerContext};
use corelib_worker::executor::TaskExecutor;
use corelib_worker::task::{self, CancelSink, QueuedTask, TaskHandle};
use corelib_worker::WorkerError;
use futures::future::AbortHandle;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Configuration for a [`RateLimiterWorker`]: the admission ceiling and the trigger that governs
/// when `current_weight` resets to zero.
#[derive(Clone)]
pub struct RateLimiterWorkerConfig {
    /// Maximum total weight dispatched within one trigger period.
    pub limit: u32,
    /// Governs when the weight counter resets (spec §4.5's "reset loop").
    pub trigger: Arc<dyn Trigger>,
}

impl std::fmt::Debug for RateLimiterWorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterWorkerConfig")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

struct RunningTask {
    id: u64,
    abort_handle: Option<AbortHandle>,
}

struct State {
    queue: VecDeque<QueuedTask>,
    current_weight: u32,
    processing: bool,
    retired: bool,
    running: Option<RunningTask>,
}

struct Inner {
    state: Mutex<State>,
    executor: Arc<dyn TaskExecutor>,
    limit: u32,
    trigger: Arc<dyn Trigger>,
    trigger_ctx: Mutex<TriggerContext>,
    next_id: AtomicU64,
}

impl Inner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Admission + dispatch: the head of the queue goes out only if `current_weight +
    /// head.weight <= limit`; otherwise scheduling halts until the next reset clears
    /// `current_weight` (spec §4.5). A task heavier than `limit` therefore blocks the queue
    /// indefinitely — documented behavior, not an error.
    fn try_dispatch(self: &Arc<Self>) {
        let task = {
            let mut state = self.state.lock();
            if state.processing || state.retired {
                return;
            }
            let Some(front_weight) = state.queue.front().map(QueuedTask::weight) else {
                return;
            };
            if state.current_weight.saturating_add(front_weight) > self.limit {
                return;
            }
            let task = state.queue.pop_front().expect("front checked above; qed");
            state.current_weight = state.current_weight.saturating_add(front_weight);
            state.processing = true;
            state.running = Some(RunningTask {
                id: task.id(),
                abort_handle: task.abort_handle(),
            });
            task
        };

        let this = Arc::clone(self);
        let fut = task.into_future();
        self.executor.submit(Box::pin(async move {
            fut.await;
            {
                let mut state = this.state.lock();
                state.processing = false;
                state.running = None;
            }
            this.try_dispatch();
        }));
    }

    fn submit_sync<F, T>(self: &Arc<Self>, weight: u32, action: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut state = self.state.lock();
        if state.retired {
            drop(state);
            return TaskHandle::immediately_failed(WorkerError::InvalidState);
        }
        let id = self.next_id();
        let sink: Weak<dyn CancelSink> = Arc::downgrade(self);
        let (queued, handle) = task::build_sync_task(id, weight, sink, action);
        state.queue.push_back(queued);
        drop(state);
        self.try_dispatch();
        handle
    }

    fn submit_async<F, Fut, T>(self: &Arc<Self>, weight: u32, action: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut state = self.state.lock();
        if state.retired {
            drop(state);
            return TaskHandle::immediately_failed(WorkerError::InvalidState);
        }
        let id = self.next_id();
        let sink: Weak<dyn CancelSink> = Arc::downgrade(self);
        let (queued, handle) = task::build_async_task(id, weight, sink, action);
        state.queue.push_back(queued);
        drop(state);
        self.try_dispatch();
        handle
    }

    fn retire(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.retired {
            return;
        }
        state.retired = true;
        let drained: Vec<QueuedTask> = state.queue.drain(..).collect();
        drop(state);
        let count = drained.len();
        for queued in drained {
            queued.cancel();
        }
        tracing::debug!(cancelled = count, "rate-limited worker retired");
    }

    /// Arm the next reset: ask the trigger for the next instant given the current context, record
    /// it as `last_scheduled`, and schedule [`Self::on_reset_fired`] there. A trigger returning
    /// `None` stops the reset loop (no more firings, per the `Trigger` contract).
    fn arm_reset(self: Arc<Self>) {
        let ctx = *self.trigger_ctx.lock();
        let Some(at) = self.trigger.next_execution(&ctx) else {
            return;
        };
        self.trigger_ctx.lock().last_scheduled = Some(at);

        let this = Arc::clone(&self);
        self.executor.schedule_at(
            at,
            Box::pin(async move {
                this.on_reset_fired();
            }),
        );
    }

    fn on_reset_fired(self: Arc<Self>) {
        {
            let mut state = self.state.lock();
            state.current_weight = 0;
        }
        self.trigger_ctx.lock().last_completed = Some(Instant::now());
        tracing::debug!("rate limiter weight counter reset");

        Arc::clone(&self).arm_reset();
        self.try_dispatch();
    }
}

impl CancelSink for Inner {
    fn cancel_task(&self, id: u64) {
        let mut state = self.state.lock();
        if let Some(pos) = state.queue.iter().position(|t| t.id() == id) {
            let queued = state.queue.remove(pos).expect("position just found; qed");
            drop(state);
            queued.cancel();
            return;
        }
        if let Some(running) = &state.running {
            if running.id == id {
                if let Some(abort_handle) = &running.abort_handle {
                    abort_handle.abort();
                }
            }
        }
    }
}

/// Admits weighted tasks such that the sum of weights dispatched within one trigger period never
/// exceeds `limit` (spec §4.5). Cheaply `Clone`-able; every clone shares the same queue and weight
/// counter.
#[derive(Clone)]
pub struct RateLimiterWorker {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RateLimiterWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("RateLimiterWorker")
            .field("pending", &state.queue.len())
            .field("current_weight", &state.current_weight)
            .field("limit", &self.inner.limit)
            .field("retired", &state.retired)
            .finish()
    }
}

impl RateLimiterWorker {
    /// A new worker dispatching onto `executor`, with its reset loop armed immediately.
    #[must_use]
    pub fn new(executor: Arc<dyn TaskExecutor>, config: RateLimiterWorkerConfig) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                current_weight: 0,
                processing: false,
                retired: false,
                running: None,
            }),
            executor,
            limit: config.limit,
            trigger: config.trigger,
            trigger_ctx: Mutex::new(TriggerContext::default()),
            next_id: AtomicU64::new(0),
        });
        Arc::clone(&inner).arm_reset();
        Self { inner }
    }

    /// Enqueue a synchronous action with the given weight. Weight is charged against the limit
    /// at dispatch time, not at submission time.
    pub fn submit_task<F, T>(&self, weight: u32, action: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.inner.submit_sync(weight, action)
    }

    /// Enqueue an action returning a future, with the given weight. Weight is charged at
    /// dispatch, not at the inner future's completion (spec §4.5: "deliberate and documented").
    pub fn submit_async_task<F, Fut, T>(&self, weight: u32, action: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.submit_async(weight, action)
    }

    /// Terminal state: stops accepting new tasks, cancels every pending one, but lets a currently
    /// running task finish. Idempotent.
    pub fn retire(&self) {
        self.inner.retire();
    }

    /// Whether the worker is retired.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.inner.state.lock().retired
    }

    /// Whether a task is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().processing
    }

    /// Number of tasks queued but not yet dispatched (including any blocked on admission).
    #[must_use]
    pub fn pending_tasks_count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// The sum of weights dispatched since the last reset.
    #[must_use]
    pub fn current_weight(&self) -> u32 {
        self.inner.state.lock().current_weight
    }
}
