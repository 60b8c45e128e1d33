#![forbid(unsafe_code)]

//! Fixed-capacity text labels for tag names and engineering units.
//!
//! A [`Label<CAP>`] stores at most `CAP` bytes of UTF-8 inline, with no heap
//! allocation, so every tag has the same footprint regardless of its
//! metadata.
//!
//! # Invariants
//!
//! 1. `len <= CAP`.
//! 2. `bytes[..len]` is valid UTF-8 (truncation only cuts at char
//!    boundaries).
//! 3. `bytes[len..]` is zeroed, so derived equality compares contents.

use std::fmt;

use crate::error::TagError;

/// Capacity of a tag name in bytes.
pub const NAME_CAPACITY: usize = 31;
/// Capacity of an engineering unit in bytes.
pub const UNIT_CAPACITY: usize = 11;

/// Tag name label.
pub type Name = Label<NAME_CAPACITY>;
/// Engineering unit label.
pub type Unit = Label<UNIT_CAPACITY>;

/// Inline UTF-8 string of at most `CAP` bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label<const CAP: usize> {
    bytes: [u8; CAP],
    len: usize,
}

impl<const CAP: usize> Label<CAP> {
    /// The empty label.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bytes: [0; CAP],
            len: 0,
        }
    }

    /// Copy `text` into a label, rejecting text longer than `CAP` bytes.
    ///
    /// `field` names the label in the error (`"name"`, `"unit"`).
    pub fn new(field: &'static str, text: &str) -> Result<Self, TagError> {
        if text.len() > CAP {
            return Err(TagError::LabelTooLong {
                field,
                capacity: CAP,
                len: text.len(),
            });
        }
        Ok(Self::truncated(text))
    }

    /// Copy as much of `text` as fits, cutting at a char boundary.
    #[must_use]
    pub fn truncated(text: &str) -> Self {
        let mut end = text.len().min(CAP);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0; CAP];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self { bytes, len: end }
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Construction only ever copies whole chars.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum length in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAP
    }
}

impl<const CAP: usize> Default for Label<CAP> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const CAP: usize> fmt::Debug for Label<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const CAP: usize> fmt::Display for Label<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const CAP: usize> AsRef<str> for Label<CAP> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const CAP: usize> PartialEq<str> for Label<CAP> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const CAP: usize> PartialEq<&str> for Label<CAP> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
