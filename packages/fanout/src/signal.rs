//! One-shot wait signals.
//!
//! A signal starts unset and can be fired exactly once; firing an already-fired signal is
//! a no-op. Registries use signals to let one-shot callbacks remove themselves the moment
//! an external party marks them "done", regardless of whether waiting is implemented by
//! blocking a worker thread or by cooperatively suspending a task.
//!
//! Two mirrored variants share the same contract:
//!
//! - [`Signal`] - thread-safe; waiting blocks the calling thread.
//! - [`LocalSignal`] - single-threaded; waiting suspends the calling task.
//!
//! Both guarantee that a waiter attaching after the signal has already fired observes the
//! set state immediately - there are no missed wakeups.

mod local;
mod sync;

pub use local::{LocalSignal, LocalSignalWait};
pub use sync::Signal;
