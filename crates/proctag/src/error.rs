#![forbid(unsafe_code)]

//! Errors raised at the configuration boundary.
//!
//! Reads, writes and subscriptions on a tag never fail. Only building a tag
//! from a [`Description`](crate::Description) and writing through the
//! type-erased [`Tag::set_value`](crate::Tag::set_value) path can be rejected.

use crate::index::TagIndex;
use crate::kind::TagType;

/// Errors from tag construction and type-erased writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// A name or unit does not fit its fixed-capacity label.
    LabelTooLong {
        field: &'static str,
        capacity: usize,
        len: usize,
    },
    /// An index override would break construction-order monotonicity.
    IndexOutOfOrder { requested: TagIndex, next: TagIndex },
    /// An index override left no room for the next index.
    IndexExhausted,
    /// A [`Value`](crate::Value) of the wrong kind was written to a tag.
    TypeMismatch { expected: TagType, found: TagType },
}

impl std::fmt::Display for TagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LabelTooLong {
                field,
                capacity,
                len,
            } => write!(f, "{field} is {len} bytes, capacity is {capacity} bytes"),
            Self::IndexOutOfOrder { requested, next } => write!(
                f,
                "index override {requested} is below the next free index {next}"
            ),
            Self::IndexExhausted => f.write_str("tag index space exhausted"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: tag is {expected}, value is {found}")
            }
        }
    }
}

impl std::error::Error for TagError {}
