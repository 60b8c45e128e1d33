#![forbid(unsafe_code)]

//! Construction-time metadata for a tag.
//!
//! A [`Description<T>`] is what a configuration loader hands to
//! [`TagBase::from_description`](crate::TagBase::from_description) to build
//! a tag in one step instead of setting each field by hand. Unset numeric
//! fields start at the kind's factory defaults (see [`crate::kind`]).
//!
//! With the `serde` feature, descriptions deserialize from any serde format
//! and every field is optional:
//!
//! ```json
//! { "name": "Boiler temperature", "unit": "degC", "max": 120.0, "alarm_high": 95.0 }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::kind::TagValue;

/// Metadata used to initialize a tag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Description<T> {
    /// Explicit index. `None` or `Some(0)` takes the next index from the
    /// allocator.
    pub index: Option<u32>,
    pub name: String,
    pub unit: String,
    pub min: T,
    pub max: T,
    /// Initial value for both the current and previous value.
    pub default: T,
    pub alarm_low: T,
    pub alarm_high: T,
}

impl<T: TagValue> Description<T> {
    /// A description with the given labels and factory defaults for
    /// everything else.
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            ..Self::default()
        }
    }

    /// Pin the tag to a specific index. Zero leaves it auto-assigned.
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the advisory valid range.
    #[must_use]
    pub fn with_range(mut self, min: T, max: T) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: T) -> Self {
        self.default = default;
        self
    }

    /// Set the alarm thresholds.
    #[must_use]
    pub fn with_alarms(mut self, low: T, high: T) -> Self {
        self.alarm_low = low;
        self.alarm_high = high;
        self
    }
}

impl<T: TagValue> Default for Description<T> {
    fn default() -> Self {
        Self {
            index: None,
            name: String::new(),
            unit: String::new(),
            min: T::MIN,
            max: T::MAX,
            default: T::DEFAULT,
            alarm_low: T::ALARM_LOW,
            alarm_high: T::ALARM_HIGH,
        }
    }
}
