//! Cooperative callback registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture, TryJoinAll};
use futures::task::{LocalSpawn, LocalSpawnExt, SpawnError};

use crate::name::KeyPolicy;
use crate::signal::LocalSignal;
use crate::track::CallbackId;

type Callback<A, T, E> = Rc<dyn Fn(&A) -> LocalBoxFuture<'static, Result<T, E>>>;

struct Entry<A, T, E> {
    seq: u64,
    callback: Callback<A, T, E>,
}

struct Points<A, T, E> {
    callbacks: HashMap<String, Vec<Entry<A, T, E>>>,
    next_seq: u64,
}

/// A cooperative callback registry for single-threaded use.
///
/// Callbacks are registered against event names and produce futures; invoking a name calls
/// every callback in registration order to obtain its future and combines them into one
/// aggregate completion. The aggregate resolves with every result, positionally in
/// registration order, once all complete - or fails as a whole on the first failure, in
/// which case other callbacks may already have started or completed independently. The
/// caller decides whether and when to await the aggregate.
///
/// One-shot registrations ([`register_once()`][Self::register_once]) suspend a lightweight
/// task on the host-supplied spawner instead of dedicating a thread; the callback is
/// removed within one scheduling turn of its [`LocalSignal`] firing.
///
/// Event names are canonicalized per the registry's [`KeyPolicy`], chosen at construction
/// and immutable thereafter. For the thread-capable synchronous variant, see
/// [`Track`][crate::Track].
///
/// # Example
///
/// ```rust
/// use fanout::LocalTrack;
/// use futures::FutureExt;
/// use futures::executor::LocalPool;
///
/// let pool = LocalPool::new();
/// let track = LocalTrack::<u32, u32, String>::new(pool.spawner());
///
/// track.register("tick", |input| {
///     let input = *input;
///     async move { Ok(input + 1) }.boxed_local()
/// });
/// track.register("tick", |input| {
///     let input = *input;
///     async move { Ok(input * 2) }.boxed_local()
/// });
///
/// let results = futures::executor::block_on(track.invoke("tick", &10)).unwrap();
/// assert_eq!(results, vec![11, 20]);
/// ```
pub struct LocalTrack<A, T, E> {
    points: Rc<RefCell<Points<A, T, E>>>,
    spawner: Box<dyn LocalSpawn>,
    policy: KeyPolicy,
}

impl<A, T, E> LocalTrack<A, T, E>
where
    A: 'static,
    T: 'static,
    E: 'static,
{
    /// Creates a new registry with [`KeyPolicy::Normalized`] name handling.
    ///
    /// The spawner is the host's cooperative scheduling capability; one-shot waiter tasks
    /// are spawned through it.
    #[must_use]
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self::with_key_policy(spawner, KeyPolicy::Normalized)
    }

    /// Creates a new registry with the given name handling policy.
    #[must_use]
    pub fn with_key_policy(spawner: impl LocalSpawn + 'static, policy: KeyPolicy) -> Self {
        Self {
            points: Rc::new(RefCell::new(Points {
                callbacks: HashMap::new(),
                next_seq: 0,
            })),
            spawner: Box::new(spawner),
            policy,
        }
    }

    /// Registers a durable callback against an event name.
    ///
    /// The callback is appended to the name's list; invocation fans out in registration
    /// order. Registering the same closure twice is not an error - it simply fans out
    /// twice. Returns a [`CallbackId`] for later removal.
    pub fn register<F>(&self, name: &str, callback: F) -> CallbackId
    where
        F: Fn(&A) -> LocalBoxFuture<'static, Result<T, E>> + 'static,
    {
        self.insert(name, Rc::new(callback))
    }

    /// Removes a previously registered callback.
    ///
    /// Returns `false`, without panicking, if the callback is no longer present - repeated
    /// removal is safe by design. The id carries the event name, so none is needed here.
    pub fn remove(&self, id: &CallbackId) -> bool {
        remove_entry(&self.points, id)
    }

    /// Registers a one-shot callback and returns the signal that retires it.
    ///
    /// The callback participates in fan-out like any durable registration until the
    /// returned [`LocalSignal`] is fired, at which point a waiter task removes it exactly
    /// once, within one scheduling turn. Firing the signal is the caller's responsibility;
    /// there is no built-in timeout.
    ///
    /// # Errors
    ///
    /// Returns the spawner's [`SpawnError`] if the waiter task cannot be scheduled, in
    /// which case nothing was registered.
    pub fn register_once<F>(&self, name: &str, callback: F) -> Result<LocalSignal, SpawnError>
    where
        F: Fn(&A) -> LocalBoxFuture<'static, Result<T, E>> + 'static,
    {
        let signal = LocalSignal::new();
        self.register_once_with(name, callback, &signal)?;
        Ok(signal)
    }

    /// Registers a one-shot callback retired by an existing signal.
    ///
    /// Attaches an additional independent waiter to `signal`, so several one-shot
    /// registrations can ride the same external fire event. A signal that has already
    /// fired retires the callback on the waiter's first scheduling turn.
    ///
    /// # Errors
    ///
    /// Returns the spawner's [`SpawnError`] if the waiter task cannot be scheduled, in
    /// which case nothing was registered.
    pub fn register_once_with<F>(
        &self,
        name: &str,
        callback: F,
        signal: &LocalSignal,
    ) -> Result<(), SpawnError>
    where
        F: Fn(&A) -> LocalBoxFuture<'static, Result<T, E>> + 'static,
    {
        // Arm first so a spawner failure leaves no orphaned registration behind.
        let key = self.policy.apply(name);
        let seq = self.peek_seq();
        self.arm(signal, CallbackId::new(key, seq))?;

        self.insert(name, Rc::new(callback));
        Ok(())
    }

    /// Invokes every callback registered for an event name and aggregates the results.
    ///
    /// Every callback is called in registration order to obtain its future; the returned
    /// aggregate completes once all futures complete, yielding their results positionally
    /// in registration order regardless of completion order, or fails on the first
    /// failure. A name with no registrations yields an aggregate that resolves to an
    /// empty collection.
    pub fn invoke(&self, name: &str, args: &A) -> TryJoinAll<LocalBoxFuture<'static, Result<T, E>>> {
        let key = self.policy.apply(name);

        let callbacks: Vec<Callback<A, T, E>> = {
            let points = self.points.borrow();

            points.callbacks.get(&key).map_or_else(Vec::new, |entries| {
                entries
                    .iter()
                    .map(|entry| Rc::clone(&entry.callback))
                    .collect()
            })
        };

        future::try_join_all(callbacks.iter().map(|callback| callback(args)))
    }

    /// Number of callbacks currently registered for an event name.
    #[must_use]
    pub fn callback_count(&self, name: &str) -> usize {
        let key = self.policy.apply(name);

        self.points.borrow().callbacks.get(&key).map_or(0, Vec::len)
    }

    fn insert(&self, name: &str, callback: Callback<A, T, E>) -> CallbackId {
        let key = self.policy.apply(name);
        let mut points = self.points.borrow_mut();

        let seq = points.next_seq;
        points.next_seq = points.next_seq.wrapping_add(1);

        points
            .callbacks
            .entry(key.clone())
            .or_default()
            .push(Entry { seq, callback });

        CallbackId::new(key, seq)
    }

    /// The sequence number the next registration will receive.
    fn peek_seq(&self) -> u64 {
        self.points.borrow().next_seq
    }

    /// Spawns the waiter task that retires a one-shot registration when the signal fires.
    fn arm(&self, signal: &LocalSignal, id: CallbackId) -> Result<(), SpawnError> {
        let signal = signal.clone();
        let points = Rc::clone(&self.points);

        self.spawner.spawn_local(async move {
            signal.wait().await;
            remove_entry(&points, &id);
        })
    }
}

impl<A, T, E> fmt::Debug for LocalTrack<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("events", &self.points.borrow().callbacks.len())
            .field("policy", &self.policy)
            .finish()
    }
}

fn remove_entry<A, T, E>(points: &RefCell<Points<A, T, E>>, id: &CallbackId) -> bool {
    let mut points = points.borrow_mut();

    // The per-name list persists even when emptied; only the entry goes away.
    let Some(entries) = points.callbacks.get_mut(id.key()) else {
        return false;
    };

    let Some(position) = entries.iter().position(|entry| entry.seq == id.seq()) else {
        return false;
    };

    entries.remove(position);
    true
}
