//! [`SequentialWorker`]: a FIFO queue with at most one dispatched task in flight, plus
//! retire/enable/disable gating (spec §3.4, §4.4).

use crate::error::WorkerError;
use crate::executor::TaskExecutor;
use crate::task::{self, CancelSink, QueuedTask, TaskHandle};
use futures::future::AbortHandle;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

struct RunningTask {
    id: u64,
    abort_handle: Option<AbortHandle>,
}

struct State {
    queue: VecDeque<QueuedTask>,
    processing: bool,
    retired: bool,
    enabled: bool,
    running: Option<RunningTask>,
}

struct WorkerInner {
    state: Mutex<State>,
    executor: Arc<dyn TaskExecutor>,
    next_id: AtomicU64,
}

impl WorkerInner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// The single scheduling decision point (spec §4.4's state diagram): pop the head of the
    /// queue if idle, enabled, and not retired, mark it running, and dispatch it onto the
    /// executor. The executor's completion callback re-enters this same function, so every
    /// dispatch — sync or async, first task or the Nth — goes through the executor rather than
    /// running on the submitter's stack; this trades the spec's optional "continue synchronously
    /// on the same executor thread" optimization for a uniform, always-correct path (see
    /// `DESIGN.md`).
    fn try_dispatch(self: &Arc<Self>) {
        let task = {
            let mut state = self.state.lock();
            if state.processing || state.retired || !state.enabled {
                return;
            }
            let Some(task) = state.queue.pop_front() else {
                return;
            };
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

    fn submit_sync<F, T>(self: &Arc<Self>, action: F) -> TaskHandle<T>
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
        let (queued, handle) = task::build_sync_task(id, 0, sink, action);
        state.queue.push_back(queued);
        drop(state);
        self.try_dispatch();
        handle
    }

    fn submit_async<F, Fut, T>(self: &Arc<Self>, action: F) -> TaskHandle<T>
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
        let (queued, handle) = task::build_async_task(id, 0, sink, action);
        state.queue.push_back(queued);
        drop(state);
        self.try_dispatch();
        handle
    }

    fn run_sync_if_idle<F, T>(self: &Arc<Self>, action: F) -> Result<TaskHandle<T>, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut state = self.state.lock();
        if state.retired {
            return Err(WorkerError::InvalidState);
        }
        if state.processing {
            return Err(WorkerError::Busy);
        }
        let id = self.next_id();
        let sink: Weak<dyn CancelSink> = Arc::downgrade(self);
        let (queued, handle) = task::build_sync_task(id, 0, sink, action);
        state.queue.push_back(queued);
        drop(state);
        self.try_dispatch();
        Ok(handle)
    }

    fn run_async_if_idle<F, Fut, T>(self: &Arc<Self>, action: F) -> Result<TaskHandle<T>, WorkerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut state = self.state.lock();
        if state.retired {
            return Err(WorkerError::InvalidState);
        }
        if state.processing {
            return Err(WorkerError::Busy);
        }
        let id = self.next_id();
        let sink: Weak<dyn CancelSink> = Arc::downgrade(self);
        let (queued, handle) = task::build_async_task(id, 0, sink, action);
        state.queue.push_back(queued);
        drop(state);
        self.try_dispatch();
        Ok(handle)
    }

    fn retire(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.retired {
            return;
        }
        state.retired = true;
        state.enabled = false;
        let drained: Vec<QueuedTask> = state.queue.drain(..).collect();
        drop(state);
        let count = drained.len();
        for queued in drained {
            queued.cancel();
        }
        tracing::debug!(cancelled = count, "sequential worker retired");
    }

    fn set_enabled(self: &Arc<Self>, enabled: bool) {
        let mut state = self.state.lock();
        if state.retired {
            return;
        }
        state.enabled = enabled;
        drop(state);
        tracing::debug!(enabled, "sequential worker gate changed");
        if enabled {
            self.try_dispatch();
        }
    }
}

impl CancelSink for WorkerInner {
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

/// Serializes execution of caller-submitted tasks on an externally supplied executor, at most
/// one task in flight at a time, with cancellation, retirement, and an enable/disable pause gate
/// (spec §4.4). Cheaply `Clone`-able; every clone refers to the same underlying queue.
#[derive(Clone)]
pub struct SequentialWorker {
    inner: Arc<WorkerInner>,
}

impl std::fmt::Debug for SequentialWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SequentialWorker")
            .field("pending", &state.queue.len())
            .field("processing", &state.processing)
            .field("retired", &state.retired)
            .field("enabled", &state.enabled)
            .finish()
    }
}

impl SequentialWorker {
    /// A new, idle worker dispatching onto `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            inner: Arc::new(WorkerInner {
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    processing: false,
                    retired: false,
                    enabled: true,
                    running: None,
                }),
                executor,
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Enqueue a synchronous action. Returns immediately with a handle observing the eventual
    /// result; fails the handle with [`WorkerError::InvalidState`] if the worker is retired.
    pub fn submit_task<F, T>(&self, action: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.inner.submit_sync(action)
    }

    /// Enqueue an action that itself returns a future; the future is only created once this task
    /// is actually dispatched.
    pub fn submit_async_task<F, Fut, T>(&self, action: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.submit_async(action)
    }

    /// Like [`Self::submit_task`], but fails synchronously with [`WorkerError::Busy`] instead of
    /// queueing behind a task currently in flight.
    pub fn run_task_if_idle<F, T>(&self, action: F) -> Result<TaskHandle<T>, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.inner.run_sync_if_idle(action)
    }

    /// Like [`Self::submit_async_task`], but fails synchronously with [`WorkerError::Busy`]
    /// instead of queueing behind a task currently in flight.
    pub fn run_async_task_if_idle<F, Fut, T>(&self, action: F) -> Result<TaskHandle<T>, WorkerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.run_async_if_idle(action)
    }

    /// Terminal state: stops accepting new tasks, cancels every pending one, but lets a currently
    /// running task finish. Idempotent.
    pub fn retire(&self) {
        self.inner.retire();
    }

    /// Pause dispatch between tasks. A task already running completes normally; no further task
    /// starts until [`Self::enable`] is called. A no-op once retired.
    pub fn disable(&self) {
        self.inner.set_enabled(false);
    }

    /// Resume dispatch after [`Self::disable`], immediately attempting to dispatch the queue
    /// head if one exists.
    pub fn enable(&self) {
        self.inner.set_enabled(true);
    }

    /// Whether the worker is retired.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.inner.state.lock().retired
    }

    /// Whether the worker currently accepts dispatch (ignored once retired).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.state.lock().enabled
    }

    /// Whether a task is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().processing
    }

    /// Number of tasks queued but not yet dispatched.
    #[must_use]
    pub fn pending_tasks_count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }
}
