#![forbid(unsafe_code)]

//! Tag identity contract and the generic value/notification engine.
//!
//! # Design
//!
//! [`TagBase<T>`] stores a current and a previous value. Every write (plain
//! [`set`](TagBase::set), [`apply`](TagBase::apply), the `std::ops`
//! assignment operators and the increment/decrement helpers) mutates the
//! current value and then runs one commit step:
//!
//! 1. compare current and previous with `T`'s own `==`;
//! 2. if they differ, call every registered listener with the tag, the new
//!    value and the previous value;
//! 3. set previous to current;
//! 4. return current.
//!
//! Float kinds follow IEEE equality, so writing `NaN` notifies every time.
//! `min`, `max` and the alarm thresholds are advisory: nothing clamps.
//!
//! # Listeners
//!
//! Listeners are reference-counted closures. Registering a clone of an
//! already registered `Rc` is a no-op, and removal matches by `Rc` identity.
//! The most recently registered listener runs first. Typed listeners
//! ([`Listener<T>`]) and type-erased ones ([`ErasedListener`]) share one
//! registry.
//!
//! # Re-entrancy
//!
//! Writes need `&mut` access, so a listener can never write back into the tag
//! that is notifying it. A listener that writes to another tag (captured, for
//! example, behind a `RefCell`) runs that tag's commit synchronously before
//! returning. Nothing bounds the depth of such chains; listener graphs must
//! not trigger each other without end.
//!
//! # Performance
//!
//! | Operation            | Complexity              |
//! |----------------------|-------------------------|
//! | `get()`              | O(1)                    |
//! | write                | O(L) where L = listeners |
//! | `on_change()`        | O(L) duplicate scan     |
//! | `remove_on_change()` | O(L)                    |

use std::fmt;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::description::Description;
use crate::error::TagError;
use crate::index::{IndexAllocator, TagIndex};
use crate::kind::{Change, TagType, TagValue, Value};
use crate::label::{Name, Unit};

/// Callback for a tag of known kind: `(tag, new, previous)`.
pub type Listener<T> = Rc<dyn Fn(&TagBase<T>, &T, &T)>;

/// Callback for a tag of unknown kind.
pub type ErasedListener = Rc<dyn Fn(&dyn Tag, &Change)>;

/// Wrap a closure as a [`Listener<T>`].
pub fn listener<T: TagValue>(f: impl Fn(&TagBase<T>, &T, &T) + 'static) -> Listener<T> {
    Rc::new(f)
}

/// Wrap a closure as an [`ErasedListener`].
pub fn erased_listener(f: impl Fn(&dyn Tag, &Change) + 'static) -> ErasedListener {
    Rc::new(f)
}

/// Capabilities shared by every tag regardless of the stored kind.
///
/// A table of heterogeneous tags works exclusively through this trait.
/// Values cross it as [`Value`]s; callers that need the primitive match on
/// [`tag_type`](Tag::tag_type) or use [`Value::get`].
pub trait Tag {
    fn name(&self) -> &str;

    fn unit(&self) -> &str;

    /// The fixed kind discriminator.
    fn tag_type(&self) -> TagType;

    /// The identity assigned at construction.
    fn index(&self) -> TagIndex;

    /// Current value. Never notifies.
    fn value(&self) -> Value;

    fn min(&self) -> Value;

    fn max(&self) -> Value;

    fn alarm_low(&self) -> Value;

    fn alarm_high(&self) -> Value;

    fn alarm_state(&self) -> bool;

    /// Record the verdict of an external alarm evaluator. Never notifies.
    fn set_alarm_state(&mut self, active: bool);

    /// Write through the commit path.
    ///
    /// Returns the resulting current value, or
    /// [`TagError::TypeMismatch`] if `value` is of another kind.
    fn set_value(&mut self, value: Value) -> Result<Value, TagError>;

    /// Register a kind-agnostic change listener. Idempotent.
    fn subscribe(&mut self, listener: ErasedListener);

    /// Remove a listener registered with [`subscribe`](Tag::subscribe).
    /// Removing an absent listener is a no-op.
    fn unsubscribe(&mut self, listener: &ErasedListener);

    /// Number of registered listeners of either flavor.
    fn listener_count(&self) -> usize;
}

enum Registered<T: TagValue> {
    Typed(Listener<T>),
    Erased(ErasedListener),
}

impl<T: TagValue> Registered<T> {
    fn is_typed(&self, other: &Listener<T>) -> bool {
        matches!(self, Self::Typed(l) if Rc::ptr_eq(l, other))
    }

    fn is_erased(&self, other: &ErasedListener) -> bool {
        matches!(self, Self::Erased(l) if Rc::ptr_eq(l, other))
    }
}

/// Typed observable value with identity and advisory metadata.
///
/// # Invariants
///
/// 1. Outside a write, `previous == current` for every non-NaN value.
/// 2. Listeners run only when a write produced a value unequal to the last
///    committed one.
/// 3. The registry never holds the same `Rc` twice.
/// 4. `index` and `tag_type()` never change after construction.
pub struct TagBase<T: TagValue> {
    name: Name,
    unit: Unit,
    index: TagIndex,
    min: T,
    max: T,
    alarm_low: T,
    alarm_high: T,
    default: T,
    current: T,
    previous: T,
    alarm_state: bool,
    /// Registration order; notification walks it back to front.
    listeners: Vec<Registered<T>>,
}

impl<T: TagValue> TagBase<T> {
    /// A tag with empty labels and the kind's factory metadata.
    #[must_use]
    pub fn new(indices: &mut IndexAllocator) -> Self {
        Self::build(indices.claim(), Name::empty(), Unit::empty(), &Description::default())
    }

    /// A tag with the given labels and the kind's factory metadata.
    pub fn named(indices: &mut IndexAllocator, name: &str, unit: &str) -> Result<Self, TagError> {
        let name = Name::new("name", name)?;
        let unit = Unit::new("unit", unit)?;
        Ok(Self::build(indices.claim(), name, unit, &Description::default()))
    }

    /// A tag initialized from a configuration record.
    ///
    /// Labels are validated before an index is claimed, so a rejected
    /// description does not consume one.
    pub fn from_description(
        indices: &mut IndexAllocator,
        description: &Description<T>,
    ) -> Result<Self, TagError> {
        let name = Name::new("name", &description.name)?;
        let unit = Unit::new("unit", &description.unit)?;
        let index = indices.claim_or_override(description.index)?;
        Ok(Self::build(index, name, unit, description))
    }

    fn build(index: TagIndex, name: Name, unit: Unit, description: &Description<T>) -> Self {
        Self {
            name,
            unit,
            index,
            min: description.min,
            max: description.max,
            alarm_low: description.alarm_low,
            alarm_high: description.alarm_high,
            default: description.default,
            current: description.default,
            previous: description.default,
            alarm_state: false,
            listeners: Vec::new(),
        }
    }

    /// Current value. Never notifies.
    #[inline]
    #[must_use]
    pub fn get(&self) -> T {
        self.current
    }

    /// Assign a value and notify listeners if it differs from the last
    /// committed value. Returns the new current value.
    pub fn set(&mut self, value: T) -> T {
        self.current = value;
        self.commit()
    }

    /// Replace the value with `f(current)` through the commit path.
    pub fn apply(&mut self, f: impl FnOnce(T) -> T) -> T {
        self.current = f(self.current);
        self.commit()
    }

    /// Register a typed listener. Registering the same `Rc` again is a no-op.
    pub fn on_change(&mut self, listener: Listener<T>) {
        if self.listeners.iter().any(|r| r.is_typed(&listener)) {
            return;
        }
        self.listeners.push(Registered::Typed(listener));
    }

    /// Remove a typed listener. Removing an absent listener is a no-op.
    pub fn remove_on_change(&mut self, listener: &Listener<T>) {
        if let Some(pos) = self.listeners.iter().position(|r| r.is_typed(listener)) {
            self.listeners.remove(pos);
        }
    }

    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[must_use]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    #[must_use]
    pub fn index(&self) -> TagIndex {
        self.index
    }

    #[must_use]
    pub fn tag_type(&self) -> TagType {
        T::KIND
    }

    #[must_use]
    pub fn min(&self) -> T {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> T {
        self.max
    }

    #[must_use]
    pub fn alarm_low(&self) -> T {
        self.alarm_low
    }

    #[must_use]
    pub fn alarm_high(&self) -> T {
        self.alarm_high
    }

    /// The configured baseline value.
    #[must_use]
    pub fn default_value(&self) -> T {
        self.default
    }

    #[must_use]
    pub fn alarm_state(&self) -> bool {
        self.alarm_state
    }

    pub fn set_alarm_state(&mut self, active: bool) {
        self.alarm_state = active;
    }

    /// Whether the current value lies within `[min, max]`.
    ///
    /// Informational only; writes are never rejected or clamped.
    #[must_use]
    pub fn in_range(&self) -> bool {
        self.current >= self.min && self.current <= self.max
    }

    /// Number of registered listeners of either flavor.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn commit(&mut self) -> T {
        if self.current != self.previous {
            self.notify();
        }
        self.previous = self.current;
        self.current
    }

    fn notify(&self) {
        #[cfg(feature = "tracing")]
        trace!(
            index = self.index.get(),
            kind = T::KIND.as_str(),
            new = %self.current,
            previous = %self.previous,
            listeners = self.listeners.len(),
            "tag changed"
        );

        let change = Change {
            new: self.current.into_value(),
            previous: self.previous.into_value(),
        };
        for registered in self.listeners.iter().rev() {
            match registered {
                Registered::Typed(cb) => cb(self, &self.current, &self.previous),
                Registered::Erased(cb) => cb(self as &dyn Tag, &change),
            }
        }
    }
}

impl<T: TagValue> Tag for TagBase<T> {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn unit(&self) -> &str {
        self.unit.as_str()
    }

    fn tag_type(&self) -> TagType {
        T::KIND
    }

    fn index(&self) -> TagIndex {
        self.index
    }

    fn value(&self) -> Value {
        self.current.into_value()
    }

    fn min(&self) -> Value {
        self.min.into_value()
    }

    fn max(&self) -> Value {
        self.max.into_value()
    }

    fn alarm_low(&self) -> Value {
        self.alarm_low.into_value()
    }

    fn alarm_high(&self) -> Value {
        self.alarm_high.into_value()
    }

    fn alarm_state(&self) -> bool {
        self.alarm_state
    }

    fn set_alarm_state(&mut self, active: bool) {
        self.alarm_state = active;
    }

    fn set_value(&mut self, value: Value) -> Result<Value, TagError> {
        let Some(v) = T::from_value(value) else {
            return Err(TagError::TypeMismatch {
                expected: T::KIND,
                found: value.tag_type(),
            });
        };
        Ok(self.set(v).into_value())
    }

    fn subscribe(&mut self, listener: ErasedListener) {
        if self.listeners.iter().any(|r| r.is_erased(&listener)) {
            return;
        }
        self.listeners.push(Registered::Erased(listener));
    }

    fn unsubscribe(&mut self, listener: &ErasedListener) {
        if let Some(pos) = self.listeners.iter().position(|r| r.is_erased(listener)) {
            self.listeners.remove(pos);
        }
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: TagValue> PartialEq<T> for TagBase<T> {
    fn eq(&self, other: &T) -> bool {
        self.current == *other
    }
}

impl<T: TagValue> fmt::Debug for TagBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagBase")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("type", &T::KIND)
            .field("value", &self.current)
            .field("alarm_state", &self.alarm_state)
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl<T: TagValue> fmt::Display for TagBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} = {}", self.name, self.current)
        } else {
            write!(f, "{} = {} {}", self.name, self.current, self.unit)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn int_tag() -> TagBase<i32> {
        TagBase::new(&mut IndexAllocator::new())
    }

    /// A listener that appends `(new, previous)` to a shared log.
    fn recorder<T: TagValue>() -> (Listener<T>, Rc<RefCell<Vec<(T, T)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let l = listener(move |_tag: &TagBase<T>, new: &T, prev: &T| {
            sink.borrow_mut().push((*new, *prev));
        });
        (l, log)
    }

    #[test]
    fn new_tag_holds_default() {
        let tag = int_tag();
        assert_eq!(tag.get(), 0);
        assert_eq!(tag.default_value(), 0);
        assert!(!tag.alarm_state());
        assert!(tag.name().is_empty());
        assert_eq!(tag.listener_count(), 0);
    }

    #[test]
    fn change_notifies_with_new_and_previous() {
        let mut tag = int_tag();
        let (l, log) = recorder();
        tag.on_change(l);

        assert_eq!(tag.set(5), 5);
        assert_eq!(*log.borrow(), vec![(5, 0)]);

        tag.set(5);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn same_value_is_silent() {
        let mut tag = int_tag();
        let (l, log) = recorder();
        tag.on_change(l);
        tag.set(0);
        tag.apply(|v| v);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn apply_goes_through_commit() {
        let mut tag = int_tag();
        let (l, log) = recorder();
        tag.on_change(l);
        tag.set(10);
        assert_eq!(tag.apply(|v| v * 3), 30);
        assert_eq!(*log.borrow(), vec![(10, 0), (30, 10)]);
    }

    #[test]
    fn duplicate_registration_is_idempotent() {
        let mut tag = int_tag();
        let (l, log) = recorder();
        tag.on_change(Rc::clone(&l));
        tag.on_change(Rc::clone(&l));
        assert_eq!(tag.listener_count(), 1);

        tag.set(1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn remove_stops_notifications() {
        let mut tag = int_tag();
        let (l, log) = recorder();
        tag.on_change(Rc::clone(&l));
        tag.set(1);
        tag.remove_on_change(&l);
        tag.set(2);
        assert_eq!(*log.borrow(), vec![(1, 0)]);
    }

    #[test]
    fn removing_absent_listener_is_noop() {
        let mut tag = int_tag();
        let (kept, log) = recorder();
        let (never_added, _) = recorder::<i32>();
        tag.on_change(kept);
        tag.remove_on_change(&never_added);
        assert_eq!(tag.listener_count(), 1);
        tag.set(3);
        assert_eq!(*log.borrow(), vec![(3, 0)]);
    }

    #[test]
    fn most_recent_listener_runs_first() {
        let mut tag = int_tag();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mk = |label: char| {
            let order = Rc::clone(&order);
            listener(move |_: &TagBase<i32>, _: &i32, _: &i32| order.borrow_mut().push(label))
        };
        let a = mk('A');
        let b = mk('B');
        let c = mk('C');
        tag.on_change(Rc::clone(&a));
        tag.on_change(Rc::clone(&b));
        tag.on_change(Rc::clone(&c));

        tag.set(1);
        assert_eq!(*order.borrow(), vec!['C', 'B', 'A']);

        // Removal keeps the relative order of the rest.
        order.borrow_mut().clear();
        tag.remove_on_change(&b);
        tag.set(2);
        assert_eq!(*order.borrow(), vec!['C', 'A']);
    }

    #[test]
    fn listener_sees_tag_identity() {
        let mut alloc = IndexAllocator::new();
        alloc.claim();
        let mut tag = TagBase::<u32>::named(&mut alloc, "Flow", "l/min").unwrap();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        tag.on_change(listener(move |t: &TagBase<u32>, new: &u32, _: &u32| {
            sink.set(Some((t.index(), t.get(), *new)));
        }));
        tag.set(12);
        assert_eq!(seen.get(), Some((TagIndex::new(1), 12, 12)));
    }

    #[test]
    fn nan_always_notifies() {
        let mut tag = TagBase::<f64>::new(&mut IndexAllocator::new());
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        tag.on_change(listener(move |_: &TagBase<f64>, _: &f64, _: &f64| {
            c.set(c.get() + 1);
        }));
        tag.set(f64::NAN);
        tag.set(f64::NAN);
        tag.set(f64::NAN);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn out_of_range_values_are_accepted() {
        let mut alloc = IndexAllocator::new();
        let desc = Description::<i32>::new("Valve", "%").with_range(0, 100);
        let mut tag = TagBase::from_description(&mut alloc, &desc).unwrap();
        assert!(tag.in_range());
        tag.set(250);
        assert_eq!(tag.get(), 250);
        assert!(!tag.in_range());
    }

    #[test]
    fn from_description_copies_metadata() {
        let mut alloc = IndexAllocator::new();
        let desc = Description::<f32>::new("Boiler", "degC")
            .with_range(-10.0, 150.0)
            .with_default(20.0)
            .with_alarms(5.0, 95.0);
        let tag = TagBase::from_description(&mut alloc, &desc).unwrap();
        assert_eq!(tag.name(), &"Boiler");
        assert_eq!(tag.unit(), &"degC");
        assert_eq!(tag.get(), 20.0);
        assert_eq!((tag.min(), tag.max()), (-10.0, 150.0));
        assert_eq!((tag.alarm_low(), tag.alarm_high()), (5.0, 95.0));
        assert_eq!(tag.index(), TagIndex::new(0));
    }

    #[test]
    fn default_value_is_baseline_for_change_detection() {
        let mut alloc = IndexAllocator::new();
        let desc = Description::<i64>::new("Counter", "").with_default(7);
        let mut tag = TagBase::from_description(&mut alloc, &desc).unwrap();
        let (l, log) = recorder();
        tag.on_change(l);
        tag.set(7);
        assert!(log.borrow().is_empty());
        tag.set(8);
        assert_eq!(*log.borrow(), vec![(8, 7)]);
    }

    #[test]
    fn rejected_description_does_not_claim_index() {
        let mut alloc = IndexAllocator::new();
        let desc = Description::<bool>::new("A name that is far too long to fit", "");
        assert!(matches!(
            TagBase::from_description(&mut alloc, &desc),
            Err(TagError::LabelTooLong { field: "name", .. })
        ));
        assert_eq!(alloc.claimed(), 0);
    }

    #[test]
    fn zero_index_override_takes_next_index() {
        let mut alloc = IndexAllocator::new();
        TagBase::<i32>::named(&mut alloc, "First", "").unwrap();
        let desc = Description::<i32>::new("Second", "").with_index(0);
        let tag = TagBase::from_description(&mut alloc, &desc).unwrap();
        assert_eq!(tag.index(), TagIndex::new(1));
        assert_eq!(alloc.peek(), TagIndex::new(2));
    }

    #[test]
    fn oversized_index_override_is_an_error() {
        let mut alloc = IndexAllocator::new();
        let desc = Description::<u32>::new("Far", "").with_index(u32::MAX - 1);
        assert_eq!(
            TagBase::from_description(&mut alloc, &desc).unwrap_err(),
            TagError::IndexExhausted
        );

        // Auto-assigned construction still works afterwards.
        let next = TagBase::from_description(&mut alloc, &Description::<u32>::new("Near", ""));
        assert_eq!(next.map(|t| t.index()), Ok(TagIndex::new(0)));
        assert_eq!(TagBase::<u32>::new(&mut alloc).index(), TagIndex::new(1));
    }

    #[test]
    fn erased_listener_gets_values_and_discriminator() {
        let mut tag = int_tag();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let l = erased_listener(move |t: &dyn Tag, change: &Change| {
            sink.borrow_mut().push((t.tag_type(), *change));
        });
        Tag::subscribe(&mut tag, Rc::clone(&l));
        Tag::subscribe(&mut tag, Rc::clone(&l));
        assert_eq!(tag.listener_count(), 1);

        tag.set(9);
        assert_eq!(
            *seen.borrow(),
            vec![(
                TagType::Int,
                Change {
                    new: Value::Int(9),
                    previous: Value::Int(0),
                }
            )]
        );

        Tag::unsubscribe(&mut tag, &l);
        tag.set(10);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn typed_and_erased_share_ordering() {
        let mut tag = int_tag();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        tag.on_change(listener(move |_: &TagBase<i32>, _: &i32, _: &i32| {
            o1.borrow_mut().push("typed");
        }));
        Tag::subscribe(
            &mut tag,
            erased_listener(move |_: &dyn Tag, _: &Change| o2.borrow_mut().push("erased")),
        );
        tag.set(1);
        assert_eq!(*order.borrow(), vec!["erased", "typed"]);
    }

    #[test]
    fn set_value_checks_kind() {
        let mut tag = int_tag();
        assert_eq!(tag.set_value(Value::Int(4)), Ok(Value::Int(4)));
        assert_eq!(tag.get(), 4);
        assert_eq!(
            tag.set_value(Value::Float(1.0)),
            Err(TagError::TypeMismatch {
                expected: TagType::Int,
                found: TagType::Float,
            })
        );
        assert_eq!(tag.get(), 4);
    }

    #[test]
    fn alarm_state_does_not_notify() {
        let mut tag = int_tag();
        let (l, log) = recorder();
        tag.on_change(l);
        tag.set_alarm_state(true);
        assert!(tag.alarm_state());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn listener_can_write_other_tag() {
        let mut alloc = IndexAllocator::new();
        let mut source = TagBase::<i32>::new(&mut alloc);
        let mirror = Rc::new(RefCell::new(TagBase::<i32>::new(&mut alloc)));

        let (l, mirror_log) = recorder();
        mirror.borrow_mut().on_change(l);

        let target = Rc::clone(&mirror);
        source.on_change(listener(move |_: &TagBase<i32>, new: &i32, _: &i32| {
            target.borrow_mut().set(*new * 2);
        }));

        source.set(21);
        assert_eq!(mirror.borrow().get(), 42);
        assert_eq!(*mirror_log.borrow(), vec![(42, 0)]);
    }

    #[test]
    fn display_and_debug() {
        let mut alloc = IndexAllocator::new();
        let mut tag = TagBase::<u32>::named(&mut alloc, "Speed", "rpm").unwrap();
        tag.set(1500);
        assert_eq!(tag.to_string(), "Speed = 1500 rpm");
        let dbg = format!("{tag:?}");
        assert!(dbg.contains("TagBase"));
        assert!(dbg.contains("1500"));
        assert!(dbg.contains("Unsigned"));
    }

    #[test]
    fn compares_with_primitive() {
        let mut tag = int_tag();
        tag.set(3);
        assert!(tag == 3);
        assert!(tag != 4);
    }
}
