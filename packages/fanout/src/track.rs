//! Callback registries: many-callbacks-per-name fan-out dispatch.
//!
//! A registry maps event names to ordered lists of callbacks and invokes every callback
//! for a name on a single trigger, in registration order. Registrations can be durable
//! (removed explicitly via their [`CallbackId`]) or one-shot (removed automatically the
//! moment an associated signal fires).
//!
//! Two mirrored variants share the same surface; the choice between them is the
//! construction-time dispatch mode:
//!
//! - [`Track`] - synchronous: `invoke` calls every callback on the caller's own thread and
//!   returns the collected results. One-shot registrations dedicate one waiter thread each.
//! - [`LocalTrack`] - cooperative: callbacks produce futures and `invoke` returns a single
//!   aggregate that completes when all complete or fails when any fails. One-shot
//!   registrations suspend lightweight tasks instead of threads.

mod local;
mod sync;

pub use local::LocalTrack;
pub use sync::Track;

/// Identifies one registered callback within the registry that issued it.
///
/// Returned by the `register` family of methods and consumed by `remove`. Ids are never
/// reused by the issuing registry, so removal is exact: it targets the one registration
/// the id was issued for, even when the same closure was registered several times.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallbackId {
    key: String,
    seq: u64,
}

impl CallbackId {
    pub(crate) fn new(key: String, seq: u64) -> Self {
        Self { key, seq }
    }

    /// The canonical event name this callback was registered under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_exposes_canonical_key() {
        let id = CallbackId::new("my_event".to_string(), 7);
        assert_eq!(id.key(), "my_event");
    }

    #[test]
    fn ids_compare_by_contents() {
        let a = CallbackId::new("tick".to_string(), 1);
        let b = CallbackId::new("tick".to_string(), 1);
        let c = CallbackId::new("tick".to_string(), 2);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
