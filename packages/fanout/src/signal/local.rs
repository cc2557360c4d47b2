//! Single-threaded one-shot signals.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A one-shot, manually fired signal for single-threaded use.
///
/// The signal starts unset. [`fire()`][Self::fire] sets it and wakes every suspended
/// waiter; firing again is a no-op. Cloning yields another handle to the same underlying
/// state. Waiting is cooperative: [`wait()`][Self::wait] returns a future that resolves
/// once the signal fires, consuming no dedicated thread.
///
/// For the thread-safe counterpart that blocks a thread instead, see
/// [`Signal`][crate::Signal].
///
/// # Example
///
/// ```rust
/// use fanout::LocalSignal;
/// use futures::executor::LocalPool;
/// use futures::task::LocalSpawnExt;
///
/// let mut pool = LocalPool::new();
/// let signal = LocalSignal::new();
///
/// let waiter = signal.clone();
/// pool.spawner()
///     .spawn_local(async move {
///         waiter.wait().await;
///         println!("woke up");
///     })
///     .unwrap();
///
/// signal.fire();
/// pool.run();
/// ```
#[derive(Clone, Debug)]
pub struct LocalSignal {
    core: Rc<LocalSignalCore>,
}

#[derive(Debug)]
struct LocalSignalCore {
    fired: Cell<bool>,

    /// Wakers of every waiter suspended on this signal. Drained on fire; a waiter polling
    /// after the fire never enters the list.
    wakers: RefCell<Vec<Waker>>,
}

impl LocalSignal {
    /// Creates a new unset signal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fanout::LocalSignal;
    ///
    /// let signal = LocalSignal::new();
    /// assert!(!signal.is_fired());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Rc::new(LocalSignalCore {
                fired: Cell::new(false),
                wakers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Fires the signal, waking every suspended waiter.
    ///
    /// Edge-triggered and idempotent: the first call sets the state, any further call is a
    /// no-op. Firing with zero waiters is legal.
    #[cfg_attr(test, mutants::skip)] // Wakeup primitive - causes test timeouts if tampered.
    pub fn fire(&self) {
        if self.core.fired.replace(true) {
            return;
        }

        for waker in self.core.wakers.take() {
            waker.wake();
        }
    }

    /// Whether the signal has been fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.core.fired.get()
    }

    /// Returns a future that resolves once the signal fires.
    ///
    /// Resolves immediately if the signal has already fired - a waiter arriving after the
    /// fact never misses the wakeup. Any number of waiters may be outstanding at once.
    #[must_use]
    pub fn wait(&self) -> LocalSignalWait<'_> {
        LocalSignalWait { signal: self }
    }
}

impl Default for LocalSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`LocalSignal::wait()`].
#[derive(Debug)]
pub struct LocalSignalWait<'a> {
    signal: &'a LocalSignal,
}

impl Future for LocalSignalWait<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.signal.core.fired.get() {
            return Poll::Ready(());
        }

        self.signal.core.wakers.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}
