//! Thread-safe one-shot signals.

use std::sync::{Arc, Condvar, Mutex};

use crate::ERR_POISONED_LOCK;

/// A one-shot, manually fired signal that can be shared across threads.
///
/// The signal starts unset. [`fire()`][Self::fire] sets it and wakes every blocked waiter;
/// firing again is a no-op. Cloning yields another handle to the same underlying state, so
/// any clone may fire and any clone may wait.
///
/// For the single-threaded counterpart that suspends a task instead of blocking a thread,
/// see [`LocalSignal`][crate::LocalSignal].
///
/// # Example
///
/// ```rust
/// use std::thread;
///
/// use fanout::Signal;
///
/// let signal = Signal::new();
/// let waiter = signal.clone();
///
/// let handle = thread::spawn(move || {
///     waiter.wait();
///     "woke up"
/// });
///
/// signal.fire();
/// assert_eq!(handle.join().unwrap(), "woke up");
/// ```
#[derive(Clone, Debug)]
pub struct Signal {
    core: Arc<SignalCore>,
}

#[derive(Debug)]
struct SignalCore {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    /// Creates a new unset signal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fanout::Signal;
    ///
    /// let signal = Signal::new();
    /// assert!(!signal.is_fired());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Arc::new(SignalCore {
                fired: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    /// Fires the signal, waking every waiter.
    ///
    /// Edge-triggered and idempotent: the first call sets the state, any further call is a
    /// no-op. Firing with zero waiters is legal.
    #[cfg_attr(test, mutants::skip)] // Wakeup primitive - causes test timeouts if tampered.
    pub fn fire(&self) {
        {
            let mut fired = self.core.fired.lock().expect(ERR_POISONED_LOCK);

            if *fired {
                return;
            }

            *fired = true;
        }

        // We notify outside the lock to avoid waking a waiter straight into contention.
        self.core.cond.notify_all();
    }

    /// Whether the signal has been fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        *self.core.fired.lock().expect(ERR_POISONED_LOCK)
    }

    /// Blocks the calling thread until the signal fires.
    ///
    /// Returns immediately if the signal has already fired - a waiter arriving after the
    /// fact never misses the wakeup.
    #[cfg_attr(test, mutants::skip)] // Wakeup primitive - causes test timeouts if tampered.
    pub fn wait(&self) {
        let mut fired = self.core.fired.lock().expect(ERR_POISONED_LOCK);

        while !*fired {
            fired = self.core.cond.wait(fired).expect(ERR_POISONED_LOCK);
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}
