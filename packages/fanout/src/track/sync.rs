//! Synchronous callback registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::ERR_POISONED_LOCK;
use crate::name::KeyPolicy;
use crate::signal::Signal;
use crate::track::CallbackId;

type Callback<A, T, E> = Arc<dyn Fn(&A) -> Result<T, E> + Send + Sync>;

struct Entry<A, T, E> {
    seq: u64,
    callback: Callback<A, T, E>,
}

struct Points<A, T, E> {
    callbacks: HashMap<String, Vec<Entry<A, T, E>>>,
    next_seq: u64,
}

/// A synchronous callback registry.
///
/// Callbacks are registered against event names and fanned out in registration order when
/// the name is invoked, on the caller's own thread. Each callback returns a `Result`; the
/// first error halts the fan-out and is returned as-is - the registry never catches or
/// isolates callback failures.
///
/// One-shot registrations ([`register_once()`][Self::register_once]) dedicate one waiter
/// thread each, blocked on a [`Signal`] until the caller fires it; the callback is then
/// removed exactly once. This is a real resource cost proportional to the number of
/// outstanding one-shot registrations. For a variant that suspends tasks instead of
/// blocking threads and aggregates asynchronous results, see
/// [`LocalTrack`][crate::LocalTrack].
///
/// Event names are canonicalized per the registry's [`KeyPolicy`], chosen at construction
/// and immutable thereafter.
///
/// The internal mapping is guarded only far enough for waiter threads to remove their
/// entries; no ordering is promised between registrations and invocations racing on
/// different threads.
///
/// # Example
///
/// ```rust
/// use fanout::Track;
///
/// let track = Track::<u32, u32, String>::new();
/// track.register("tick", |input| Ok(input + 1));
/// track.register("tick", |input| Ok(input * 2));
///
/// // Results arrive in registration order.
/// assert_eq!(track.invoke("tick", &10).unwrap(), vec![11, 20]);
/// ```
pub struct Track<A, T, E> {
    points: Arc<Mutex<Points<A, T, E>>>,
    policy: KeyPolicy,
}

impl<A, T, E> Track<A, T, E>
where
    A: 'static,
    T: 'static,
    E: 'static,
{
    /// Creates a new registry with [`KeyPolicy::Normalized`] name handling.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fanout::Track;
    ///
    /// let track = Track::<(), (), ()>::new();
    /// track.register("My Event", |()| Ok(()));
    ///
    /// // Normalization makes these the same event.
    /// assert_eq!(track.invoke("my_event", &()).unwrap().len(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_policy(KeyPolicy::Normalized)
    }

    /// Creates a new registry with the given name handling policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fanout::{KeyPolicy, Track};
    ///
    /// let track = Track::<(), (), ()>::with_key_policy(KeyPolicy::Raw);
    /// track.register("My Event", |()| Ok(()));
    ///
    /// // Raw mode: the exact string is the key.
    /// assert!(track.invoke("my_event", &()).unwrap().is_empty());
    /// assert_eq!(track.invoke("My Event", &()).unwrap().len(), 1);
    /// ```
    #[must_use]
    pub fn with_key_policy(policy: KeyPolicy) -> Self {
        Self {
            points: Arc::new(Mutex::new(Points {
                callbacks: HashMap::new(),
                next_seq: 0,
            })),
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
        F: Fn(&A) -> Result<T, E> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(callback))
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
    /// returned [`Signal`] is fired, at which point a dedicated waiter thread removes it
    /// exactly once. Firing the signal is the caller's responsibility; there is no
    /// built-in timeout. Callers needing one must race the wait against an external timer
    /// and fire the signal themselves.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fanout::Track;
    ///
    /// let track = Track::<(), u32, String>::new();
    /// let signal = track.register_once("tick", |()| Ok(1));
    ///
    /// assert_eq!(track.invoke("tick", &()).unwrap(), vec![1]);
    ///
    /// signal.fire();
    /// // Once the waiter observes the fire, the callback no longer participates.
    /// while track.callback_count("tick") > 0 {
    ///     std::thread::yield_now();
    /// }
    /// assert!(track.invoke("tick", &()).unwrap().is_empty());
    /// ```
    pub fn register_once<F>(&self, name: &str, callback: F) -> Signal
    where
        F: Fn(&A) -> Result<T, E> + Send + Sync + 'static,
    {
        let signal = Signal::new();
        self.register_once_with(name, callback, &signal);
        signal
    }

    /// Registers a one-shot callback retired by an existing signal.
    ///
    /// Attaches an additional independent waiter to `signal`, so several one-shot
    /// registrations can ride the same external fire event. A signal that has already
    /// fired retires the callback promptly - the waiter observes the set state on arrival.
    pub fn register_once_with<F>(&self, name: &str, callback: F, signal: &Signal)
    where
        F: Fn(&A) -> Result<T, E> + Send + Sync + 'static,
    {
        let id = self.insert(name, Arc::new(callback));
        self.arm(signal, id);
    }

    /// Invokes every callback registered for an event name, in registration order.
    ///
    /// Returns the collected results positionally. The first callback error halts the
    /// fan-out and is returned - there is no partial-failure isolation. A name with no
    /// registrations yields an empty collection.
    ///
    /// Callbacks run outside the registry's internal lock, so they are free to register
    /// and remove entries themselves; such edits become visible to the next invocation,
    /// not the ongoing one.
    pub fn invoke(&self, name: &str, args: &A) -> Result<Vec<T>, E> {
        let key = self.policy.apply(name);

        let callbacks: Vec<Callback<A, T, E>> = {
            let points = self.points.lock().expect(ERR_POISONED_LOCK);

            points.callbacks.get(&key).map_or_else(Vec::new, |entries| {
                entries
                    .iter()
                    .map(|entry| Arc::clone(&entry.callback))
                    .collect()
            })
        };

        callbacks.iter().map(|callback| callback(args)).collect()
    }

    /// Number of callbacks currently registered for an event name.
    #[must_use]
    pub fn callback_count(&self, name: &str) -> usize {
        let key = self.policy.apply(name);
        let points = self.points.lock().expect(ERR_POISONED_LOCK);

        points.callbacks.get(&key).map_or(0, Vec::len)
    }

    fn insert(&self, name: &str, callback: Callback<A, T, E>) -> CallbackId {
        let key = self.policy.apply(name);
        let mut points = self.points.lock().expect(ERR_POISONED_LOCK);

        let seq = points.next_seq;
        points.next_seq = points.next_seq.wrapping_add(1);

        points
            .callbacks
            .entry(key.clone())
            .or_default()
            .push(Entry { seq, callback });

        CallbackId::new(key, seq)
    }

    /// Spawns the waiter that retires a one-shot registration when the signal fires.
    fn arm(&self, signal: &Signal, id: CallbackId) {
        let signal = signal.clone();
        let points = Arc::clone(&self.points);

        // One dedicated thread per outstanding one-shot registration. It blocks until the
        // signal fires, removes the entry exactly once, then exits. The handle is dropped
        // because nothing ever joins a waiter.
        drop(thread::spawn(move || {
            signal.wait();
            remove_entry(&points, &id);
        }));
    }
}

impl<A, T, E> Default for Track<A, T, E>
where
    A: 'static,
    T: 'static,
    E: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E> fmt::Debug for Track<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let points = self.points.lock().expect(ERR_POISONED_LOCK);

        f.debug_struct("Track")
            .field("events", &points.callbacks.len())
            .field("policy", &self.policy)
            .finish()
    }
}

fn remove_entry<A, T, E>(points: &Mutex<Points<A, T, E>>, id: &CallbackId) -> bool {
    let mut points = points.lock().expect(ERR_POISONED_LOCK);

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
