#![forbid(unsafe_code)]

//! Arithmetic, bitwise and shift writes on tags.
//!
//! Each `std::ops` assignment operator computes the new value from the
//! current one and hands it to [`TagBase::apply`], so compound writes notify
//! exactly like a plain [`set`](TagBase::set) of the resulting value: once,
//! with the value before the operator as `previous`.
//!
//! Operators are available only where the primitive supports them:
//!
//! | Operators                   | Kinds                   |
//! |-----------------------------|-------------------------|
//! | `+= -= *= /= %=`, inc/dec   | all numeric kinds       |
//! | `&= \|= ^=`                 | `Bool` and integer kinds |
//! | `<<= >>=`                   | integer kinds           |
//!
//! # Overflow
//!
//! Integer writes are total. Addition, subtraction, multiplication,
//! increment/decrement and shifts wrap. Division or remainder by zero leaves
//! the value unchanged, which commits as a silent no-op. Float writes follow
//! IEEE semantics.

use std::ops::{
    AddAssign, BitAndAssign, BitOrAssign, BitXorAssign, DivAssign, MulAssign, RemAssign,
    ShlAssign, ShrAssign, SubAssign,
};

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::kind::TagValue;
use crate::tag::TagBase;

/// Numeric kinds: total `+ - * / %`.
pub trait Arithmetic: TagValue {
    const ONE: Self;

    fn tag_add(self, rhs: Self) -> Self;
    fn tag_sub(self, rhs: Self) -> Self;
    fn tag_mul(self, rhs: Self) -> Self;
    /// `None` only for integer division by zero.
    fn tag_div(self, rhs: Self) -> Option<Self>;
    /// `None` only for integer remainder by zero.
    fn tag_rem(self, rhs: Self) -> Option<Self>;
}

/// Kinds with `& | ^`.
pub trait Bitwise: TagValue {
    fn tag_and(self, rhs: Self) -> Self;
    fn tag_or(self, rhs: Self) -> Self;
    fn tag_xor(self, rhs: Self) -> Self;
}

/// Integer kinds: wrapping `<< >>`.
pub trait Shift: Arithmetic + Bitwise {
    fn tag_shl(self, bits: u32) -> Self;
    fn tag_shr(self, bits: u32) -> Self;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {$(
        impl Arithmetic for $ty {
            const ONE: Self = 1;

            #[inline]
            fn tag_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn tag_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline]
            fn tag_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline]
            fn tag_div(self, rhs: Self) -> Option<Self> {
                (rhs != 0).then(|| self.wrapping_div(rhs))
            }

            #[inline]
            fn tag_rem(self, rhs: Self) -> Option<Self> {
                (rhs != 0).then(|| self.wrapping_rem(rhs))
            }
        }

        impl Bitwise for $ty {
            #[inline]
            fn tag_and(self, rhs: Self) -> Self {
                self & rhs
            }

            #[inline]
            fn tag_or(self, rhs: Self) -> Self {
                self | rhs
            }

            #[inline]
            fn tag_xor(self, rhs: Self) -> Self {
                self ^ rhs
            }
        }

        impl Shift for $ty {
            #[inline]
            fn tag_shl(self, bits: u32) -> Self {
                self.wrapping_shl(bits)
            }

            #[inline]
            fn tag_shr(self, bits: u32) -> Self {
                self.wrapping_shr(bits)
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($ty:ty),*) => {$(
        impl Arithmetic for $ty {
            const ONE: Self = 1.0;

            #[inline]
            fn tag_add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn tag_sub(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline]
            fn tag_mul(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline]
            fn tag_div(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }

            #[inline]
            fn tag_rem(self, rhs: Self) -> Option<Self> {
                Some(self % rhs)
            }
        }
    )*};
}

impl_integer!(i32, u32, i64, u64);
impl_float!(f32, f64);

impl Bitwise for bool {
    #[inline]
    fn tag_and(self, rhs: Self) -> Self {
        self & rhs
    }

    #[inline]
    fn tag_or(self, rhs: Self) -> Self {
        self | rhs
    }

    #[inline]
    fn tag_xor(self, rhs: Self) -> Self {
        self ^ rhs
    }
}

impl<T: Arithmetic> TagBase<T> {
    /// Pre-increment: add one, return the new value.
    pub fn increment(&mut self) -> T {
        self.apply(|v| v.tag_add(T::ONE))
    }

    /// Pre-decrement: subtract one, return the new value.
    pub fn decrement(&mut self) -> T {
        self.apply(|v| v.tag_sub(T::ONE))
    }

    /// Post-increment: add one, return the value before the write.
    pub fn post_increment(&mut self) -> T {
        let before = self.get();
        self.increment();
        before
    }

    /// Post-decrement: subtract one, return the value before the write.
    pub fn post_decrement(&mut self) -> T {
        let before = self.get();
        self.decrement();
        before
    }

    fn apply_checked(&mut self, f: impl FnOnce(T) -> Option<T>) -> T {
        let current = self.get();
        match f(current) {
            Some(v) => self.set(v),
            None => {
                #[cfg(feature = "tracing")]
                warn!(
                    index = self.index().get(),
                    value = %current,
                    "integer division by zero ignored"
                );
                self.set(current)
            }
        }
    }
}

impl<T: Arithmetic> AddAssign<T> for TagBase<T> {
    fn add_assign(&mut self, rhs: T) {
        self.apply(|v| v.tag_add(rhs));
    }
}

impl<T: Arithmetic> SubAssign<T> for TagBase<T> {
    fn sub_assign(&mut self, rhs: T) {
        self.apply(|v| v.tag_sub(rhs));
    }
}

impl<T: Arithmetic> MulAssign<T> for TagBase<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.apply(|v| v.tag_mul(rhs));
    }
}

impl<T: Arithmetic> DivAssign<T> for TagBase<T> {
    fn div_assign(&mut self, rhs: T) {
        self.apply_checked(|v| v.tag_div(rhs));
    }
}

impl<T: Arithmetic> RemAssign<T> for TagBase<T> {
    fn rem_assign(&mut self, rhs: T) {
        self.apply_checked(|v| v.tag_rem(rhs));
    }
}

impl<T: Bitwise> BitAndAssign<T> for TagBase<T> {
    fn bitand_assign(&mut self, rhs: T) {
        self.apply(|v| v.tag_and(rhs));
    }
}

impl<T: Bitwise> BitOrAssign<T> for TagBase<T> {
    fn bitor_assign(&mut self, rhs: T) {
        self.apply(|v| v.tag_or(rhs));
    }
}

impl<T: Bitwise> BitXorAssign<T> for TagBase<T> {
    fn bitxor_assign(&mut self, rhs: T) {
        self.apply(|v| v.tag_xor(rhs));
    }
}

impl<T: Shift> ShlAssign<u32> for TagBase<T> {
    fn shl_assign(&mut self, bits: u32) {
        self.apply(|v| v.tag_shl(bits));
    }
}

impl<T: Shift> ShrAssign<u32> for TagBase<T> {
    fn shr_assign(&mut self, bits: u32) {
        self.apply(|v| v.tag_shr(bits));
    }
}
