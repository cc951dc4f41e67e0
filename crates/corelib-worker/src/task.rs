//! The `Task`/`Promise` plumbing shared by [`crate::SequentialWorker`] and
//! `corelib_ratelimit::RateLimiterWorker`: a type-erased unit of queued work plus the
//! submitter-visible handle used to await or cancel it (spec §3.4, §4.4).
//!
//! Both a sync action and an async action-returning-a-future are normalized here into the same
//! `QueuedTask` shape — a `FnOnce` that, once invoked, produces a `Future<Output = ()>` already
//! wired to deliver its result through a `oneshot` channel. This lets both worker types dispatch
//! by calling `into_future()` and awaiting it via their executor, with no per-task-type branching
//! at the dispatch site.

use crate::error::WorkerError;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{AbortHandle, Abortable, Aborted};
use parking_lot::Mutex;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

type ResultSender<T> = oneshot::Sender<Result<T, WorkerError>>;

/// Implemented by whichever worker owns a task's queue, so a [`TaskHandle::cancel`] can reach
/// back into that queue without `TaskHandle` itself being generic over the worker type.
pub trait CancelSink: Send + Sync {
    /// Remove the task `id` from the queue if still pending (delivering [`WorkerError::Cancelled`]
    /// to its handle), or abort its in-flight future if it is the task currently dispatched.
    /// A no-op if `id` has already completed.
    fn cancel_task(&self, id: u64);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// A task sitting in a worker's queue, fully type-erased to `Future<Output = ()>`.
pub struct QueuedTask {
    id: u64,
    weight: u32,
    abort_handle: Option<AbortHandle>,
    make_future: Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>,
    notify_cancelled: Box<dyn FnOnce() + Send>,
}

impl QueuedTask {
    /// The id assigned at submission time, used to match a [`TaskHandle::cancel`] call back to
    /// this entry.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The weight this task was submitted with (`0` for [`crate::SequentialWorker`], which
    /// ignores weight; meaningful for `corelib_ratelimit::RateLimiterWorker`'s admission check).
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// The handle that aborts this task's inner future if it is async and currently dispatched;
    /// `None` for sync tasks, which run to completion once started (spec §4.4: "does not
    /// interrupt a currently running task").
    #[must_use]
    pub fn abort_handle(&self) -> Option<AbortHandle> {
        self.abort_handle.clone()
    }

    /// Consume this task, producing the future a dispatch loop should poll to completion.
    #[must_use]
    pub fn into_future(self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        (self.make_future)()
    }

    /// Consume this task without running it, delivering [`WorkerError::Cancelled`] to its handle.
    /// Used when a task is removed from the queue before it was ever dispatched.
    pub fn cancel(self) {
        (self.notify_cancelled)();
    }
}

/// The submitter-visible handle returned by `submit_task`/`submit_async_task`. Implements
/// [`Future`] so it can be `.await`ed for the result, and exposes [`Self::cancel`] independent of
/// that.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, WorkerError>>,
    id: u64,
    sink: Option<Weak<dyn CancelSink>>,
}

impl<T> TaskHandle<T> {
    fn new(rx: oneshot::Receiver<Result<T, WorkerError>>, id: u64, sink: Weak<dyn CancelSink>) -> Self {
        Self {
            rx,
            id,
            sink: Some(sink),
        }
    }

    /// A handle that is already resolved, for submission paths that fail synchronously (e.g.
    /// submitting to a retired worker).
    #[must_use]
    pub fn immediately_failed(err: WorkerError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self {
            rx,
            id: 0,
            sink: None,
        }
    }

    /// Cancel this task: removes it from its worker's queue if not yet dispatched, or aborts its
    /// inner future if it is async and currently running. A no-op once the task has settled, or
    /// for a sync task already in flight (which the spec requires to run to completion).
    pub fn cancel(&self) {
        if let Some(sink) = self.sink.as_ref().and_then(Weak::upgrade) {
            sink.cancel_task(self.id);
        }
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, WorkerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_canceled)) => Poll::Ready(Err(WorkerError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Build a queued task wrapping a plain synchronous action. A panic inside `action` completes
/// the handle with [`WorkerError::TaskFailure`] instead of unwinding into the dispatch loop
/// (spec §7: "a thrown exception in a sync task completes that task's promise exceptionally").
pub fn build_sync_task<F, T>(
    id: u64,
    weight: u32,
    sink: Weak<dyn CancelSink>,
    action: F,
) -> (QueuedTask, TaskHandle<T>)
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let tx_slot: Arc<Mutex<Option<ResultSender<T>>>> = Arc::new(Mutex::new(Some(tx)));

    let tx_run = Arc::clone(&tx_slot);
    let make_future: Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send> =
        Box::new(move || {
            Box::pin(async move {
                let result = std::panic::catch_unwind(AssertUnwindSafe(action))
                    .map_err(|payload| WorkerError::TaskFailure(panic_message(&payload)));
                if let Some(tx) = tx_run.lock().take() {
                    let _ = tx.send(result);
                }
            })
        });

    let notify_cancelled: Box<dyn FnOnce() + Send> = Box::new(move || {
        if let Some(tx) = tx_slot.lock().take() {
            let _ = tx.send(Err(WorkerError::Cancelled));
        }
    });

    let task = QueuedTask {
        id,
        weight,
        abort_handle: None,
        make_future,
        notify_cancelled,
    };
    let handle = TaskHandle::new(rx, id, sink);
    (task, handle)
}

/// Build a queued task wrapping an action that returns a future. The future is only created
/// (`action()` called) once the task is actually dispatched, not at submission time. A panic
/// raised synchronously by `action`, or a panic inside the returned future, is caught the same
/// way as [`build_sync_task`]; cancellation during dispatch aborts the inner future via
/// [`Abortable`] and delivers [`WorkerError::Cancelled`].
pub fn build_async_task<F, Fut, T>(
    id: u64,
    weight: u32,
    sink: Weak<dyn CancelSink>,
    action: F,
) -> (QueuedTask, TaskHandle<T>)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let tx_slot: Arc<Mutex<Option<ResultSender<T>>>> = Arc::new(Mutex::new(Some(tx)));
    let (abort_handle, abort_registration) = AbortHandle::new_pair();

    let tx_run = Arc::clone(&tx_slot);
    let make_future: Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send> =
        Box::new(move || {
            Box::pin(async move {
                let guarded = AssertUnwindSafe(async move {
                    Abortable::new(action(), abort_registration).await
                })
                .catch_unwind()
                .await;

                let result = match guarded {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(Aborted)) => Err(WorkerError::Cancelled),
                    Err(payload) => Err(WorkerError::TaskFailure(panic_message(&payload))),
                };
                if let Some(tx) = tx_run.lock().take() {
                    let _ = tx.send(result);
                }
            })
        });

    let notify_cancelled: Box<dyn FnOnce() + Send> = Box::new(move || {
        if let Some(tx) = tx_slot.lock().take() {
            let _ = tx.send(Err(WorkerError::Cancelled));
        }
    });

    let task = QueuedTask {
        id,
        weight,
        abort_handle: Some(abort_handle),
        make_future,
        notify_cancelled,
    };
    let handle = TaskHandle::new(rx, id, sink);
    (task, handle)
}
