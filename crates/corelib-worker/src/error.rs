/// Error surfaced through a [`crate::TaskHandle`], never synchronously from a submit call (spec
/// §7's propagation policy: "worker methods never raise from submission").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    /// Returned synchronously by `run_*_if_idle` when a task is already in flight.
    #[error("worker is busy")]
    Busy,
    /// Submission to a retired worker, or an operation illegal in the worker's current state.
    #[error("worker is not in a valid state for this operation")]
    InvalidState,
    /// The task was cancelled before or during execution.
    #[error("task was cancelled")]
    Cancelled,
    /// The submitted action panicked (sync) or its future resolved to an error (async).
    #[error("task failed: {0}")]
    TaskFailure(String),
}
