//! Per-instance invocation over a declarative event table, plus the dispatch sink that
//! lets handlers emit named values outward to a user-supplied callback.
//!
//! A [`Handle`] pairs a state value with a shared [`EventTable`] and threads the state
//! through the bound handler on every [`invoke()`][Handle::invoke]. When the table's
//! handlers return futures, a handle constructed with a spawner can additionally schedule
//! each result as a concurrent unit of work via
//! [`invoke_scheduled()`][Handle::invoke_scheduled].
//!
//! A [`Dispatcher`] is the outbound half: handlers (or any other code the state owns) push
//! name-plus-values notifications into it, and it forwards them to the sink the embedding
//! code configured - or silently drops them when no sink is set. Optionally, values can be
//! wrapped into a named-field [`Record`] whose shape is declared once per event name and
//! cached after first use.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, RemoteHandle};
use futures::task::{LocalSpawn, LocalSpawnExt, SpawnError};

use crate::table::EventTable;

/// A per-instance wrapper around an [`EventTable`].
///
/// Owns the instance state `H` and a shared reference to the (per-type, already merged)
/// table; [`invoke()`][Self::invoke] looks the handler up by name and calls it with the
/// state plus arguments. Single-threaded, like the declarative machinery it fronts.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use fanout::{EventTable, Handle};
///
/// struct Accumulator {
///     total: u32,
/// }
///
/// fn receive(accumulator: &mut Accumulator, amount: &u32) -> u32 {
///     accumulator.total += amount;
///     accumulator.total
/// }
///
/// let table = Rc::new(EventTable::builder().on("receive", receive).build());
///
/// let mut handle = Handle::new(Accumulator { total: 0 }, Rc::clone(&table));
/// assert_eq!(handle.invoke("receive", &4), 4);
/// assert_eq!(handle.invoke("receive", &6), 10);
/// ```
pub struct Handle<H, A, R> {
    state: H,
    table: Rc<EventTable<H, A, R>>,
    spawner: Option<Box<dyn LocalSpawn>>,
}

impl<H, A, R> Handle<H, A, R> {
    /// Creates a handle that invokes handlers directly, returning their results as-is.
    #[must_use]
    pub fn new(state: H, table: Rc<EventTable<H, A, R>>) -> Self {
        Self {
            state,
            table,
            spawner: None,
        }
    }

    /// Creates a handle that can additionally schedule handler results as concurrent
    /// units of work through the given spawner.
    ///
    /// The asynchronous-invocation mode is a construction-time choice; a handle built
    /// with [`new()`][Self::new] cannot schedule.
    #[must_use]
    pub fn with_spawner(
        state: H,
        table: Rc<EventTable<H, A, R>>,
        spawner: impl LocalSpawn + 'static,
    ) -> Self {
        Self {
            state,
            table,
            spawner: Some(Box::new(spawner)),
        }
    }

    /// Calls the handler bound to an event name, threading this instance's state through.
    ///
    /// # Panics
    ///
    /// Panics if no handler is bound for the name (see [`EventTable::invoke()`]).
    pub fn invoke(&mut self, name: &str, args: &A) -> R {
        self.table.invoke(&mut self.state, name, args)
    }

    /// Calls the handler bound to an event name, returning [`None`] if there is none.
    pub fn invoke_checked(&mut self, name: &str, args: &A) -> Option<R> {
        self.table.invoke_checked(&mut self.state, name, args)
    }

    /// The instance state.
    #[must_use]
    pub fn state(&self) -> &H {
        &self.state
    }

    /// The instance state, mutably.
    #[must_use]
    pub fn state_mut(&mut self) -> &mut H {
        &mut self.state
    }

    /// The event table this handle invokes against.
    #[must_use]
    pub fn table(&self) -> &EventTable<H, A, R> {
        &self.table
    }
}

impl<H, A, T, E> Handle<H, A, LocalBoxFuture<'static, Result<T, E>>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Calls the handler bound to an event name and schedules its future as a concurrent
    /// unit of work, returning a handle to the pending result instead of the result
    /// itself.
    ///
    /// The caller decides whether and when to await the returned [`RemoteHandle`];
    /// dropping it cancels the scheduled work.
    ///
    /// # Errors
    ///
    /// Returns the spawner's [`SpawnError`] if the unit of work cannot be scheduled.
    ///
    /// # Panics
    ///
    /// Panics if no handler is bound for the name, or if this handle was constructed
    /// without a spawner - scheduled invocation is a construction-time mode, and calling
    /// it on a direct-mode handle is a programmer error.
    pub fn invoke_scheduled(
        &mut self,
        name: &str,
        args: &A,
    ) -> Result<RemoteHandle<Result<T, E>>, SpawnError> {
        let future = self.invoke(name, args);

        let spawner = self
            .spawner
            .as_ref()
            .expect("handle was constructed without a spawner; scheduled invocation is unavailable");

        spawner.spawn_local_with_handle(future)
    }
}

impl<H, A, R> fmt::Debug for Handle<H, A, R>
where
    H: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("state", &self.state)
            .field("events", &self.table.len())
            .field("scheduled_mode", &self.spawner.is_some())
            .finish()
    }
}

/// The declared field layout of one event name's records.
///
/// Declared once via [`Dispatcher::define_record()`] and shared by every [`Record`]
/// subsequently dispatched under that name.
#[derive(Debug)]
pub struct RecordShape {
    name: String,
    fields: &'static [&'static str],
}

impl RecordShape {
    /// The event name this shape belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared field names, in positional order.
    #[must_use]
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}

/// A dispatched notification with named-field access to its values.
#[derive(Debug)]
pub struct Record<V> {
    shape: Rc<RecordShape>,
    values: Vec<V>,
}

impl<V> Record<V> {
    /// The event name this record was dispatched under.
    #[must_use]
    pub fn name(&self) -> &str {
        self.shape.name()
    }

    /// The value carried under a declared field name, if the field exists.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&V> {
        let position = self
            .shape
            .fields()
            .iter()
            .position(|candidate| *candidate == field)?;

        self.values.get(position)
    }

    /// The values in positional order.
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// The shared shape of every record dispatched under this name.
    #[must_use]
    pub fn shape(&self) -> &RecordShape {
        &self.shape
    }
}

/// Outbound notification sink for handler code.
///
/// Embedding code configures zero, one or both of:
///
/// - a flat sink receiving `(name, values)` - the plain ordered-arguments convention;
/// - a record sink receiving [`Record`]s with named-field access, for event names whose
///   shape was declared via [`define_record()`][Self::define_record].
///
/// A dispatcher without the relevant sink silently drops the notification - dispatching
/// is never an error.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use fanout::Dispatcher;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = Rc::clone(&seen);
/// let mut dispatcher = Dispatcher::with_sink(move |name: &str, values: &[u32]| {
///     sink.borrow_mut().push((name.to_string(), values.to_vec()));
/// });
///
/// dispatcher.dispatch("received", &[1, 2]);
/// assert_eq!(&*seen.borrow(), &[("received".to_string(), vec![1, 2])]);
/// ```
pub struct Dispatcher<V> {
    sink: Option<Box<dyn FnMut(&str, &[V])>>,
    record_sink: Option<Box<dyn FnMut(Record<V>)>>,
    field_lists: HashMap<String, &'static [&'static str]>,

    /// Shapes are built lazily on first dispatch of each name and cached here.
    shapes: RefCell<HashMap<String, Rc<RecordShape>>>,
}

impl<V> Dispatcher<V> {
    /// Creates a dispatcher with no sinks; every dispatch is silently dropped.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            record_sink: None,
            field_lists: HashMap::new(),
            shapes: RefCell::new(HashMap::new()),
        }
    }

    /// Creates a dispatcher forwarding flat `(name, values)` notifications to `sink`.
    #[must_use]
    pub fn with_sink(sink: impl FnMut(&str, &[V]) + 'static) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.sink = Some(Box::new(sink));
        dispatcher
    }

    /// Sets the sink receiving structured [`Record`] notifications.
    pub fn set_record_sink(&mut self, sink: impl FnMut(Record<V>) + 'static) {
        self.record_sink = Some(Box::new(sink));
    }

    /// Declares the field layout for records dispatched under an event name.
    ///
    /// Redeclaring a name replaces its layout and invalidates the cached shape.
    pub fn define_record(&mut self, name: &str, fields: &'static [&'static str]) {
        self.field_lists.insert(name.to_string(), fields);
        self.shapes.borrow_mut().remove(name);
    }

    /// Forwards a flat `(name, values)` notification to the flat sink, if one is set.
    pub fn dispatch(&mut self, name: &str, values: &[V]) {
        if let Some(sink) = &mut self.sink {
            sink(name, values);
        }
    }

    /// Wraps values into a [`Record`] for an event name and forwards it to the record
    /// sink, if one is set.
    ///
    /// The record's shape is built from the declared field layout on first use and cached
    /// for subsequent dispatches of the same name.
    ///
    /// # Panics
    ///
    /// Panics if no field layout was declared for the name, or if the value count does
    /// not match the declared field count - both are programmer errors.
    pub fn dispatch_record(&mut self, name: &str, values: Vec<V>) {
        let shape = self.shape(name);

        assert_eq!(
            values.len(),
            shape.fields().len(),
            "record for event {name:?} carries {} values but {} fields are declared",
            values.len(),
            shape.fields().len(),
        );

        if let Some(sink) = &mut self.record_sink {
            sink(Record { shape, values });
        }
    }

    fn shape(&self, name: &str) -> Rc<RecordShape> {
        if let Some(shape) = self.shapes.borrow().get(name) {
            return Rc::clone(shape);
        }

        let fields = self
            .field_lists
            .get(name)
            .copied()
            .unwrap_or_else(|| panic!("no record layout is declared for event {name:?}"));

        let shape = Rc::new(RecordShape {
            name: name.to_string(),
            fields,
        });

        self.shapes
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&shape));

        shape
    }
}

impl<V> Default for Dispatcher<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Dispatcher<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("has_sink", &self.sink.is_some())
            .field("has_record_sink", &self.record_sink.is_some())
            .field("declared_records", &self.field_lists.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::FutureExt;
    use futures::executor::LocalPool;
    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::table::EventTable;

    struct Accumulator {
        total: u32,
    }

    fn receive(accumulator: &mut Accumulator, amount: &u32) -> u32 {
        accumulator.total += amount;
        accumulator.total
    }

    #[test]
    fn invoke_threads_state_through_handler() {
        let table = Rc::new(EventTable::builder().on("receive", receive).build());
        let mut handle = Handle::new(Accumulator { total: 0 }, table);

        assert_eq!(handle.invoke("receive", &4), 4);
        assert_eq!(handle.invoke("receive", &6), 10);
        assert_eq!(handle.state().total, 10);
    }

    #[test]
    #[should_panic]
    fn invoke_on_unbound_name_panics() {
        let table = Rc::new(EventTable::<Accumulator, u32, u32>::builder().build());
        let mut handle = Handle::new(Accumulator { total: 0 }, table);

        handle.invoke("missing", &1);
    }

    #[test]
    fn invoke_checked_returns_none_for_unbound_name() {
        let table = Rc::new(EventTable::builder().on("receive", receive).build());
        let mut handle = Handle::new(Accumulator { total: 0 }, table);

        assert!(handle.invoke_checked("missing", &1).is_none());
    }

    #[test]
    fn handles_share_one_table() {
        let table = Rc::new(EventTable::builder().on("receive", receive).build());

        let mut first = Handle::new(Accumulator { total: 0 }, Rc::clone(&table));
        let mut second = Handle::new(Accumulator { total: 100 }, table);

        assert_eq!(first.invoke("receive", &1), 1);
        assert_eq!(second.invoke("receive", &1), 101);
    }

    fn deliver(
        accumulator: &mut Accumulator,
        amount: &u32,
    ) -> LocalBoxFuture<'static, Result<u32, String>> {
        accumulator.total += amount;
        let total = accumulator.total;

        async move { Ok(total) }.boxed_local()
    }

    #[test]
    fn scheduled_invocation_returns_pending_result() {
        let mut pool = LocalPool::new();

        let table = Rc::new(EventTable::builder().on("deliver", deliver).build());
        let mut handle =
            Handle::with_spawner(Accumulator { total: 0 }, table, pool.spawner());

        let pending = handle.invoke_scheduled("deliver", &4).unwrap();
        assert_eq!(pool.run_until(pending), Ok(4));
    }

    #[test]
    #[should_panic]
    fn scheduled_invocation_without_spawner_panics() {
        let table = Rc::new(EventTable::builder().on("deliver", deliver).build());
        let mut handle = Handle::new(Accumulator { total: 0 }, table);

        drop(handle.invoke_scheduled("deliver", &4));
    }

    #[test]
    fn direct_invocation_still_works_in_scheduled_mode() {
        let mut pool = LocalPool::new();

        let table = Rc::new(EventTable::builder().on("deliver", deliver).build());
        let mut handle =
            Handle::with_spawner(Accumulator { total: 0 }, table, pool.spawner());

        let future = handle.invoke("deliver", &4);
        assert_eq!(pool.run_until(future), Ok(4));
    }

    #[test]
    fn dispatcher_without_sink_drops_silently() {
        let mut dispatcher = Dispatcher::<u32>::new();
        dispatcher.dispatch("received", &[1, 2]);
    }

    #[test]
    fn dispatcher_forwards_to_flat_sink() {
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let mut dispatcher = Dispatcher::with_sink(move |name: &str, values: &[u32]| {
            sink.borrow_mut().push((name.to_string(), values.to_vec()));
        });

        dispatcher.dispatch("received", &[1, 2]);
        dispatcher.dispatch("closed", &[]);

        assert_eq!(
            &*seen.borrow(),
            &[
                ("received".to_string(), vec![1, 2]),
                ("closed".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn record_gives_named_field_access() {
        let seen = Rc::new(RefCell::new(Vec::new()));

        let mut dispatcher = Dispatcher::<u32>::new();
        dispatcher.define_record("moved", &["x", "y"]);

        let sink = Rc::clone(&seen);
        dispatcher.set_record_sink(move |record| {
            let x = *record.get("x").unwrap();
            let y = *record.get("y").unwrap();
            sink.borrow_mut().push((x, y));
        });

        dispatcher.dispatch_record("moved", vec![3, 4]);
        assert_eq!(&*seen.borrow(), &[(3, 4)]);
    }

    #[test]
    fn record_shape_is_cached_per_name() {
        let shapes = Rc::new(RefCell::new(Vec::new()));

        let mut dispatcher = Dispatcher::<u32>::new();
        dispatcher.define_record("moved", &["x", "y"]);

        let sink = Rc::clone(&shapes);
        dispatcher.set_record_sink(move |record: Record<u32>| {
            sink.borrow_mut().push(Rc::clone(&record.shape));
        });

        dispatcher.dispatch_record("moved", vec![1, 2]);
        dispatcher.dispatch_record("moved", vec![3, 4]);

        let shapes = shapes.borrow();
        assert!(Rc::ptr_eq(&shapes[0], &shapes[1]));
    }

    #[test]
    fn record_unknown_field_is_none() {
        let mut dispatcher = Dispatcher::<u32>::new();
        dispatcher.define_record("moved", &["x"]);
        dispatcher.set_record_sink(|record| {
            assert!(record.get("z").is_none());
        });

        dispatcher.dispatch_record("moved", vec![1]);
    }

    #[test]
    #[should_panic]
    fn record_value_count_mismatch_panics() {
        let mut dispatcher = Dispatcher::<u32>::new();
        dispatcher.define_record("moved", &["x", "y"]);

        dispatcher.dispatch_record("moved", vec![1]);
    }

    #[test]
    #[should_panic]
    fn record_for_undeclared_name_panics() {
        let mut dispatcher = Dispatcher::<u32>::new();
        dispatcher.dispatch_record("moved", vec![1]);
    }

    #[test]
    fn single_threaded_types() {
        assert_not_impl_any!(Handle<u32, u32, u32>: Send, Sync);
        assert_not_impl_any!(Dispatcher<u32>: Send, Sync);
    }
}
