//! Declarative single-handler event tables.
//!
//! An [`EventTable`] binds exactly one handler function per event name to a type, built
//! once by its author and immutable afterward. Tables merge through an inheritance chain:
//! a derived type's table inherits every ancestor binding and overlays its own
//! declarations on top, the way virtual methods would, with no walk-up at call time -
//! lookup is a single map access against the already-merged table.
//!
//! Handlers are plain `fn` pointers taking the instance plus arguments, so redeclaring the
//! exact inherited function is observably a no-op while binding a new function truly
//! overrides.
//!
//! # Example
//!
//! ```rust
//! use fanout::EventTable;
//!
//! struct Base {
//!     log: Vec<String>,
//! }
//!
//! fn on_open(base: &mut Base, name: &String) {
//!     base.log.push(format!("opened {name}"));
//! }
//!
//! fn on_close(base: &mut Base, name: &String) {
//!     base.log.push(format!("closed {name}"));
//! }
//!
//! let base_table = EventTable::builder().on("open", on_open).on("close", on_close).build();
//!
//! // A derived table inherits both bindings and overrides one of them.
//! fn on_close_quietly(_base: &mut Base, _name: &String) {}
//!
//! let derived_table = EventTable::builder()
//!     .inherit(&base_table)
//!     .on("close", on_close_quietly)
//!     .build();
//!
//! let mut instance = Base { log: Vec::new() };
//! derived_table.invoke(&mut instance, "open", &"door".to_string());
//! derived_table.invoke(&mut instance, "close", &"door".to_string());
//! assert_eq!(instance.log, vec!["opened door".to_string()]);
//! ```

use std::collections::HashMap;

use crate::name::KeyPolicy;

/// The single function statically bound to an event name for a given type.
///
/// A plain `fn` pointer rather than a boxed closure: handler identity is well-defined, so
/// "redeclare the inherited function" and "override with a new function" are distinct,
/// comparable acts.
pub type Handler<H, A, R> = fn(&mut H, &A) -> R;

/// An immutable mapping from event name to exactly one handler function.
///
/// Built through [`EventTable::builder()`] by the owning type's author, typically once per
/// type, and never mutated afterward. Invoking a name that was never bound is a programmer
/// error and panics; use [`invoke_checked()`][Self::invoke_checked] where absence is
/// expected.
///
/// `H` is the instance type threaded through handlers, `A` the argument type, `R` the
/// handler result. For asynchronous handling, pick an `R` that is itself a future and
/// schedule it via [`Handle`][crate::Handle].
#[derive(Clone, Debug)]
pub struct EventTable<H, A, R> {
    slots: HashMap<String, Handler<H, A, R>>,
    policy: KeyPolicy,
}

impl<H, A, R> EventTable<H, A, R> {
    /// Starts building a table with [`KeyPolicy::Normalized`] name handling.
    #[must_use]
    pub fn builder() -> EventTableBuilder<H, A, R> {
        Self::builder_with_key_policy(KeyPolicy::Normalized)
    }

    /// Starts building a table with the given name handling policy.
    #[must_use]
    pub fn builder_with_key_policy(policy: KeyPolicy) -> EventTableBuilder<H, A, R> {
        EventTableBuilder {
            inherited: HashMap::new(),
            own: HashMap::new(),
            policy,
        }
    }

    /// Calls the handler bound to an event name, threading the instance through.
    ///
    /// # Panics
    ///
    /// Panics if no handler is bound for the name. Exactly one handler is expected to
    /// exist for every name a type's author intends to invoke, so absence is a programmer
    /// error that fails loudly - unlike the lenient removal semantics of the callback
    /// registries.
    pub fn invoke(&self, instance: &mut H, name: &str, args: &A) -> R {
        self.invoke_checked(instance, name, args)
            .unwrap_or_else(|| panic!("no handler is bound for event {name:?}"))
    }

    /// Calls the handler bound to an event name, returning [`None`] if there is none.
    pub fn invoke_checked(&self, instance: &mut H, name: &str, args: &A) -> Option<R> {
        let handler = self.handler(name)?;
        Some(handler(instance, args))
    }

    /// Returns the handler bound to an event name, if any.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Handler<H, A, R>> {
        self.slots.get(&self.policy.apply(name)).copied()
    }

    /// Whether a handler is bound for an event name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(&self.policy.apply(name))
    }

    /// Number of bound event names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no bindings at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over the canonical names bound in this table, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

/// Builder for [`EventTable`].
///
/// Merge semantics follow the virtual-method model:
///
/// - [`inherit()`][Self::inherit] merges an ancestor table; when several ancestors bind
///   the same name, the ancestor inherited **last** wins, so callers list bases from most
///   distant to nearest.
/// - [`on()`][Self::on] records the built type's own declaration, which always wins over
///   anything inherited. Declaring the same name twice keeps the later declaration.
#[derive(Debug)]
pub struct EventTableBuilder<H, A, R> {
    inherited: HashMap<String, Handler<H, A, R>>,
    own: HashMap<String, Handler<H, A, R>>,
    policy: KeyPolicy,
}

impl<H, A, R> EventTableBuilder<H, A, R> {
    /// Merges every binding of an ancestor table into this one.
    ///
    /// Later `inherit` calls overwrite earlier ones on name collision. Ancestor entries
    /// are copied with their canonical keys as-is; ancestor tables are expected to share
    /// this builder's [`KeyPolicy`].
    #[must_use]
    pub fn inherit(mut self, ancestor: &EventTable<H, A, R>) -> Self {
        for (key, handler) in &ancestor.slots {
            self.inherited.insert(key.clone(), *handler);
        }

        self
    }

    /// Binds the built type's own handler for an event name.
    ///
    /// Own declarations always prevail over inherited ones. Binding the exact function
    /// already inherited under the name is a harmless no-op.
    #[must_use]
    pub fn on(mut self, name: &str, handler: Handler<H, A, R>) -> Self {
        self.own.insert(self.policy.apply(name), handler);
        self
    }

    /// Finalizes the merged table. The result is immutable.
    #[must_use]
    pub fn build(self) -> EventTable<H, A, R> {
        let mut slots = self.inherited;
        slots.extend(self.own);

        EventTable {
            slots,
            policy: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        total: u32,
    }

    fn add(counter: &mut Counter, amount: &u32) -> u32 {
        counter.total += amount;
        counter.total
    }

    fn double_add(counter: &mut Counter, amount: &u32) -> u32 {
        counter.total += amount * 2;
        counter.total
    }

    fn reset(counter: &mut Counter, _amount: &u32) -> u32 {
        counter.total = 0;
        counter.total
    }

    #[test]
    fn invoke_runs_bound_handler() {
        let table = EventTable::builder().on("add", add).build();
        let mut counter = Counter { total: 0 };

        assert_eq!(table.invoke(&mut counter, "add", &5), 5);
        assert_eq!(table.invoke(&mut counter, "add", &3), 8);
    }

    #[test]
    #[should_panic]
    fn invoke_on_unbound_name_panics() {
        let table = EventTable::<Counter, u32, u32>::builder().build();
        let mut counter = Counter { total: 0 };

        table.invoke(&mut counter, "missing", &1);
    }

    #[test]
    fn invoke_checked_returns_none_for_unbound_name() {
        let table = EventTable::builder().on("add", add).build();
        let mut counter = Counter { total: 0 };

        assert!(table.invoke_checked(&mut counter, "missing", &1).is_none());
        assert_eq!(table.invoke_checked(&mut counter, "add", &1), Some(1));
    }

    #[test]
    fn derived_table_inherits_base_binding() {
        let base = EventTable::builder().on("add", add).build();
        let derived = EventTable::builder().inherit(&base).build();

        let mut counter = Counter { total: 0 };
        assert_eq!(derived.invoke(&mut counter, "add", &5), 5);
    }

    #[test]
    fn own_declaration_overrides_inherited_one() {
        let base = EventTable::builder().on("add", add).build();
        let derived = EventTable::builder().inherit(&base).on("add", double_add).build();

        let mut counter = Counter { total: 0 };
        assert_eq!(derived.invoke(&mut counter, "add", &5), 10);

        // The base table is unaffected by the override.
        let mut other = Counter { total: 0 };
        assert_eq!(base.invoke(&mut other, "add", &5), 5);
    }

    #[test]
    fn redeclaring_inherited_handler_is_noop() {
        let base = EventTable::builder().on("add", add).build();
        let derived = EventTable::builder().inherit(&base).on("add", add).build();

        // Behaviorally indistinguishable from inheriting without the redeclaration.
        let mut counter = Counter { total: 0 };
        assert_eq!(derived.invoke(&mut counter, "add", &5), 5);
        assert_eq!(derived.len(), base.len());
    }

    #[test]
    fn nearest_ancestor_wins_on_collision() {
        let distant = EventTable::builder().on("add", add).on("reset", reset).build();
        let nearest = EventTable::builder().on("add", double_add).build();

        // Bases listed from most distant to nearest.
        let derived = EventTable::builder().inherit(&distant).inherit(&nearest).build();

        let mut counter = Counter { total: 0 };
        assert_eq!(derived.invoke(&mut counter, "add", &5), 10);
        assert_eq!(derived.invoke(&mut counter, "reset", &0), 0);
    }

    #[test]
    fn later_declaration_of_same_name_wins() {
        let table = EventTable::builder().on("add", add).on("add", double_add).build();

        let mut counter = Counter { total: 0 };
        assert_eq!(table.invoke(&mut counter, "add", &5), 10);
    }

    #[test]
    fn names_are_normalized_by_default() {
        let table = EventTable::builder().on("My Event", add).build();
        let mut counter = Counter { total: 0 };

        assert!(table.contains("my_event"));
        assert_eq!(table.invoke(&mut counter, "my_event", &5), 5);
    }

    #[test]
    fn raw_policy_keeps_names_distinct() {
        let table = EventTable::builder_with_key_policy(KeyPolicy::Raw)
            .on("My Event", add)
            .build();

        assert!(table.contains("My Event"));
        assert!(!table.contains("my_event"));
    }

    #[test]
    fn table_reports_its_bindings() {
        let table = EventTable::builder().on("add", add).on("reset", reset).build();

        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());

        let mut names: Vec<_> = table.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["add", "reset"]);
    }
}
