//! Embeddable publish/dispatch primitives.
//!
//! This crate lets callers register functions against string-keyed event names and later
//! trigger every registered function for a name, with results collected either synchronously
//! or as one aggregated asynchronous completion. A companion declarative mechanism binds
//! exactly one handler function per event name to a type, merged through an inheritance
//! chain, with no per-call lookup beyond a single map access.
//!
//! Two concurrency flavors are available for each mechanism and are selected once, at
//! construction time:
//!
//! - [`Track`] - synchronous fan-out; one-shot registrations are watched by dedicated
//!   threads blocking on a [`Signal`].
//! - [`LocalTrack`] - cooperative fan-out; callbacks produce futures that are aggregated
//!   into a single all-or-first-failure completion, and one-shot registrations are watched
//!   by lightweight tasks suspending on a [`LocalSignal`].
//! - [`EventTable`] with [`Handle`] - declarative single-handler binding, with optional
//!   scheduling of handler futures as concurrent units of work.
//!
//! # Synchronous fan-out
//!
//! ```rust
//! use fanout::Track;
//!
//! let track = Track::<u32, u32, String>::new();
//! track.register("tick", |input| Ok(input + 1));
//! track.register("tick", |input| Ok(input + 2));
//!
//! let results = track.invoke("tick", &10).unwrap();
//! assert_eq!(results, vec![11, 12]);
//! ```
//!
//! # Cooperative fan-out
//!
//! ```rust
//! use fanout::LocalTrack;
//! use futures::FutureExt;
//! use futures::executor::LocalPool;
//!
//! let pool = LocalPool::new();
//! let track = LocalTrack::<(), &'static str, String>::new(pool.spawner());
//!
//! track.register("tick", |_| async { Ok("a") }.boxed_local());
//! track.register("tick", |_| async { Ok("b") }.boxed_local());
//!
//! let results = futures::executor::block_on(track.invoke("tick", &())).unwrap();
//! assert_eq!(results, vec!["a", "b"]);
//! ```
//!
//! # Declarative binding
//!
//! ```rust
//! use fanout::EventTable;
//!
//! struct Counter {
//!     total: u32,
//! }
//!
//! fn add(counter: &mut Counter, amount: &u32) -> u32 {
//!     counter.total += amount;
//!     counter.total
//! }
//!
//! let table = EventTable::builder().on("add", add).build();
//!
//! let mut counter = Counter { total: 0 };
//! assert_eq!(table.invoke(&mut counter, "add", &5), 5);
//! assert_eq!(table.invoke(&mut counter, "add", &3), 8);
//! ```
//!
//! # Thread safety
//!
//! [`Track`] and [`Signal`] may be shared across threads; the registry guards its internal
//! mapping only far enough for one-shot waiter threads to remove their entries. No ordering
//! is promised between registrations and invocations racing on different threads.
//! [`LocalTrack`], [`LocalSignal`] and [`Handle`] are single-threaded by design.

pub mod handle;
pub mod name;
pub mod signal;
pub mod table;
pub mod track;

mod constants;

pub(crate) use constants::ERR_POISONED_LOCK;
pub use handle::{Dispatcher, Handle, Record, RecordShape};
pub use name::{KeyPolicy, normalize};
pub use signal::{LocalSignal, LocalSignalWait, Signal};
pub use table::{EventTable, EventTableBuilder, Handler};
pub use track::{CallbackId, LocalTrack, Track};
