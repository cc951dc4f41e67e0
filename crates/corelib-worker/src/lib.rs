//! Single-in-flight per-key task sequencing on top of a caller-supplied executor.
//!
//! [`SequentialWorker`] owns a FIFO queue of caller-submitted tasks and guarantees at most one is
//! dispatched at a time, with retire/enable/disable lifecycle control (spec §3.4, §4.4).
//! [`SequentialWorkerPool`] is a keyed registry of such workers, created lazily and reaped once
//! idle (spec §4.6). `corelib_ratelimit::RateLimiterWorker` builds its weighted admission queue
//! on top of the `task` module's `Task`/`Promise` plumbing exposed here.

mod error;
mod pool;
mod worker;

pub mod executor;
pub mod task;

pub use error::WorkerError;
pub use pool::{SequentialWorkerPool, SequentialWorkerPoolConfig};
pub use task::TaskHandle;
pub use worker::SequentialWorker;
