#![forbid(unsafe_code)]

//! Typed observable process tags.
//!
//! # Role
//! A tag is one named quantity in an embedded control or HMI point table: a
//! sensor reading, a setpoint, a digital output. It carries its engineering
//! metadata (name, unit, advisory range, alarm thresholds) and notifies
//! listeners whenever a write changes its value.
//!
//! # Primary pieces
//! - **[`TagBase<T>`]**: the value engine. Every write funnels into one
//!   commit step that compares against the last committed value and notifies
//!   on a real change.
//! - **[`Tag`]**: the kind-agnostic identity and subscription contract used
//!   by tables that hold tags of different kinds.
//! - **Concrete kinds**: [`TagBool`], [`TagInt`], [`TagUnsigned`],
//!   [`TagLongInt`], [`TagLongUnsigned`], [`TagFloat`], [`TagDouble`], and
//!   the closed [`AnyTag`] variant.
//! - **[`IndexAllocator`]**: hands out construction-order identities; owned
//!   by whoever builds the table.
//! - **[`Description<T>`]**: configuration record for building a tag in one
//!   step.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use proctag::{IndexAllocator, TagBase, TagInt, listener};
//!
//! let mut indices = IndexAllocator::new();
//! let mut speed = TagInt::named(&mut indices, "Pump speed", "rpm").unwrap();
//!
//! let last = Rc::new(Cell::new((0, 0)));
//! let seen = Rc::clone(&last);
//! speed.on_change(listener(move |_: &TagBase<i32>, new: &i32, prev: &i32| {
//!     seen.set((*new, *prev));
//! }));
//!
//! speed.set(1200);
//! assert_eq!(last.get(), (1200, 0));
//!
//! speed += 300;
//! assert_eq!(last.get(), (1500, 1200));
//! ```
//!
//! # Execution model
//! Single-threaded and synchronous: listeners run on the writer's stack
//! before the write returns. Tags are `!Send` and `!Sync`; hosts with
//! interrupt-driven writers must serialize access themselves.

pub mod arith;
pub mod description;
pub mod error;
pub mod index;
pub mod kind;
pub mod label;
pub mod logging;
pub mod tag;
pub mod types;

pub use arith::{Arithmetic, Bitwise, Shift};
pub use description::Description;
pub use error::TagError;
pub use index::{IndexAllocator, MAX_INDEX_OVERRIDE, TagIndex};
pub use kind::{Change, TagType, TagValue, Value};
pub use label::{Label, NAME_CAPACITY, Name, UNIT_CAPACITY, Unit};
pub use tag::{ErasedListener, Listener, Tag, TagBase, erased_listener, listener};
pub use types::{
    AnyTag, TagBool, TagDouble, TagFloat, TagInt, TagLongInt, TagLongUnsigned, TagUnsigned,
};
