#![forbid(unsafe_code)]

//! Concrete tag kinds and the closed [`AnyTag`] variant.
//!
//! Each concrete tag is [`TagBase`] bound to one primitive; the kind
//! discriminator and factory metadata come from that primitive's
//! [`TagValue`] impl. [`AnyTag`] holds any of the seven so a point table
//! can keep them in one collection and still reach the typed engine.

use crate::description::Description;
use crate::error::TagError;
use crate::index::IndexAllocator;
use crate::kind::{TagType, TagValue};
use crate::tag::{Tag, TagBase};

/// Digital point.
pub type TagBool = TagBase<bool>;
/// 32-bit signed point.
pub type TagInt = TagBase<i32>;
/// 32-bit unsigned point.
pub type TagUnsigned = TagBase<u32>;
/// 64-bit signed point.
pub type TagLongInt = TagBase<i64>;
/// 64-bit unsigned point.
pub type TagLongUnsigned = TagBase<u64>;
/// 32-bit float point.
pub type TagFloat = TagBase<f32>;
/// 64-bit float point.
pub type TagDouble = TagBase<f64>;

impl TagBool {
    /// Invert the value through the commit path; returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.apply(|v| !v)
    }
}

/// One tag of any kind.
#[derive(Debug)]
pub enum AnyTag {
    Bool(TagBool),
    Int(TagInt),
    Unsigned(TagUnsigned),
    LongInt(TagLongInt),
    LongUnsigned(TagLongUnsigned),
    Float(TagFloat),
    Double(TagDouble),
}

macro_rules! each_variant {
    ($self:expr, $tag:ident => $body:expr) => {
        match $self {
            AnyTag::Bool($tag) => $body,
            AnyTag::Int($tag) => $body,
            AnyTag::Unsigned($tag) => $body,
            AnyTag::LongInt($tag) => $body,
            AnyTag::LongUnsigned($tag) => $body,
            AnyTag::Float($tag) => $body,
            AnyTag::Double($tag) => $body,
        }
    };
}

impl AnyTag {
    /// A tag of the given kind with empty labels and factory metadata.
    #[must_use]
    pub fn new(kind: TagType, indices: &mut IndexAllocator) -> Self {
        match kind {
            TagType::Bool => Self::Bool(TagBase::new(indices)),
            TagType::Int => Self::Int(TagBase::new(indices)),
            TagType::Unsigned => Self::Unsigned(TagBase::new(indices)),
            TagType::LongInt => Self::LongInt(TagBase::new(indices)),
            TagType::LongUnsigned => Self::LongUnsigned(TagBase::new(indices)),
            TagType::Float => Self::Float(TagBase::new(indices)),
            TagType::Double => Self::Double(TagBase::new(indices)),
        }
    }

    /// Build the matching variant from a typed description.
    pub fn from_description<T>(
        indices: &mut IndexAllocator,
        description: &Description<T>,
    ) -> Result<Self, TagError>
    where
        T: TagValue,
        AnyTag: From<TagBase<T>>,
    {
        TagBase::from_description(indices, description).map(AnyTag::from)
    }

    /// Borrow through the kind-agnostic interface.
    #[must_use]
    pub fn as_tag(&self) -> &dyn Tag {
        each_variant!(self, t => t as &dyn Tag)
    }

    /// Mutably borrow through the kind-agnostic interface.
    pub fn as_tag_mut(&mut self) -> &mut dyn Tag {
        each_variant!(self, t => t as &mut dyn Tag)
    }

    #[must_use]
    pub fn tag_type(&self) -> TagType {
        self.as_tag().tag_type()
    }

    /// Borrow the typed engine if this tag stores `T`.
    #[must_use]
    pub fn downcast_ref<T>(&self) -> Option<&TagBase<T>>
    where
        T: TagValue,
        for<'a> &'a TagBase<T>: TryFrom<&'a AnyTag>,
    {
        <&TagBase<T>>::try_from(self).ok()
    }

    /// Mutably borrow the typed engine if this tag stores `T`.
    #[must_use]
    pub fn downcast_mut<T>(&mut self) -> Option<&mut TagBase<T>>
    where
        T: TagValue,
        for<'a> &'a mut TagBase<T>: TryFrom<&'a mut AnyTag>,
    {
        <&mut TagBase<T>>::try_from(self).ok()
    }
}

macro_rules! impl_kind_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<TagBase<$ty>> for AnyTag {
            fn from(tag: TagBase<$ty>) -> Self {
                AnyTag::$variant(tag)
            }
        }

        impl<'a> TryFrom<&'a AnyTag> for &'a TagBase<$ty> {
            type Error = TagError;

            fn try_from(tag: &'a AnyTag) -> Result<Self, TagError> {
                match tag {
                    AnyTag::$variant(t) => Ok(t),
                    other => Err(TagError::TypeMismatch {
                        expected: <$ty as TagValue>::KIND,
                        found: other.tag_type(),
                    }),
                }
            }
        }

        impl<'a> TryFrom<&'a mut AnyTag> for &'a mut TagBase<$ty> {
            type Error = TagError;

            fn try_from(tag: &'a mut AnyTag) -> Result<Self, TagError> {
                let found = tag.tag_type();
                match tag {
                    AnyTag::$variant(t) => Ok(t),
                    _ => Err(TagError::TypeMismatch {
                        expected: <$ty as TagValue>::KIND,
                        found,
                    }),
                }
            }
        }

        /// Read the current value, as a plain primitive.
        impl From<&TagBase<$ty>> for $ty {
            #[inline]
            fn from(tag: &TagBase<$ty>) -> Self {
                tag.get()
            }
        }
    )*};
}

impl_kind_conversions!(
    bool => Bool,
    i32 => Int,
    u32 => Unsigned,
    i64 => LongInt,
    u64 => LongUnsigned,
    f32 => Float,
    f64 => Double,
);
