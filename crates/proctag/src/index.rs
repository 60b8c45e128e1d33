#![forbid(unsafe_code)]

//! Construction-order tag identities.
//!
//! The component that builds the tag table owns one [`IndexAllocator`] and
//! passes it to every tag constructor. There is no hidden global counter, so
//! two independent tables (or two tests) never observe each other's indices.
//!
//! # Invariants
//!
//! 1. The first index handed out is 0.
//! 2. Every claim returns an index strictly greater than every earlier one,
//!    across all tag kinds sharing the allocator.
//! 3. An index is never handed out twice.

use std::fmt;

#[cfg(feature = "tracing")]
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// Unique identity of a tag within one allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagIndex(u32);

impl TagIndex {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TagIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TagIndex> for u32 {
    fn from(index: TagIndex) -> Self {
        index.0
    }
}

/// Largest index a description may request.
///
/// The upper half of the range is kept free so auto-assigned claims after
/// an override have as much room as a fresh allocator.
pub const MAX_INDEX_OVERRIDE: u32 = u32::MAX / 2;

/// Monotonic source of [`TagIndex`] values.
#[derive(Debug, Default)]
pub struct IndexAllocator {
    next: u32,
    claimed: usize,
}

impl IndexAllocator {
    /// A fresh allocator whose first claim yields index 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: 0,
            claimed: 0,
        }
    }

    /// Take the next index.
    ///
    /// # Panics
    ///
    /// Panics once every `u32` index has been handed out. With overrides
    /// capped at [`MAX_INDEX_OVERRIDE`] that takes more than two billion
    /// claims.
    pub fn claim(&mut self) -> TagIndex {
        match self.try_claim() {
            Ok(index) => index,
            Err(err) => panic!("{err}"),
        }
    }

    /// Take the next index, or fail with [`TagError::IndexExhausted`].
    pub fn try_claim(&mut self) -> Result<TagIndex, TagError> {
        let index = TagIndex(self.next);
        self.next = self.next.checked_add(1).ok_or(TagError::IndexExhausted)?;
        self.claimed += 1;

        #[cfg(feature = "tracing")]
        debug!(index = index.0, "tag index claimed");

        Ok(index)
    }

    /// Take a caller-chosen index, or the next one when `requested` is
    /// `None` or `Some(0)`.
    ///
    /// A requested index must not be below [`peek`](Self::peek) nor above
    /// [`MAX_INDEX_OVERRIDE`]; later claims continue after it.
    pub fn claim_or_override(&mut self, requested: Option<u32>) -> Result<TagIndex, TagError> {
        let Some(raw) = requested.filter(|raw| *raw != 0) else {
            return self.try_claim();
        };
        if raw < self.next {
            return Err(TagError::IndexOutOfOrder {
                requested: TagIndex(raw),
                next: TagIndex(self.next),
            });
        }
        if raw > MAX_INDEX_OVERRIDE {
            return Err(TagError::IndexExhausted);
        }
        let next = raw + 1;

        #[cfg(feature = "tracing")]
        debug!(index = raw, skipped = raw - self.next, "tag index overridden");

        self.next = next;
        self.claimed += 1;
        Ok(TagIndex(raw))
    }

    /// The index the next [`claim`](Self::claim) will return.
    #[must_use]
    pub const fn peek(&self) -> TagIndex {
        TagIndex(self.next)
    }

    /// How many indices have been handed out.
    #[must_use]
    pub const fn claimed(&self) -> usize {
        self.claimed
    }
}
