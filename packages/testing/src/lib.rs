#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in fanout packages.

use std::panic;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long a wrapped test may run before we declare it hung.
///
/// Miri executes thread synchronization dramatically slower, so it gets more headroom.
const TIMEOUT: Duration = if cfg!(miri) {
    Duration::from_secs(60)
} else {
    Duration::from_secs(10)
};

/// Runs a test body on a watchdog-supervised thread, panicking if it does not finish
/// within the timeout.
///
/// Several tests in this workspace block threads on signals or spin on waiter-thread
/// cleanup; a bug there would otherwise hang the whole suite. The body runs on its own
/// thread and reports back over a channel; if nothing arrives in time, the watchdog
/// panics instead of waiting forever.
///
/// Under mutation testing (`MUTATION_TESTING=1`) the body runs directly, so that hanging
/// mutations are detected by the mutation harness rather than masked by this wrapper.
///
/// # Panics
///
/// Panics if the body exceeds the timeout; a panic inside the body is resumed on the
/// calling thread.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// let sum = with_watchdog(|| 2 + 2);
/// assert_eq!(sum, 4);
/// ```
pub fn with_watchdog<F, R>(body: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return body();
    }

    let (result_tx, result_rx) = mpsc::channel();

    let body_thread = thread::spawn(move || {
        // A send failure means the watchdog gave up on us already; nothing to do.
        drop(result_tx.send(body()));
    });

    match result_rx.recv_timeout(TIMEOUT) {
        Ok(result) => {
            body_thread.join().expect("test body panicked after reporting its result");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test body exceeded the {TIMEOUT:?} watchdog timeout")
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            // The body dropped its channel without sending, which means it panicked.
            // Surface that panic here instead of inventing our own.
            match body_thread.join() {
                Ok(()) => panic!("test body disconnected without reporting a result"),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
    }
}
