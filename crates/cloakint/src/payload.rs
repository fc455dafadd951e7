//! Native integer types that can be sealed.

use core::fmt;

mod private {
    pub trait Sealed {}
}

/// A native integer of at most 64 bits.
///
/// Values are widened to 64 bits before sealing (sign-extended for signed
/// types) and truncated back on open. Arithmetic follows the native type:
/// wrapping on overflow, truncating division, and a native panic on a zero
/// divisor.
pub trait Payload: Copy + Send + Sync + fmt::Debug + PartialEq + private::Sealed + 'static {
    /// Sign- or zero-extends to 64 bits.
    fn widen(self) -> u64;
    /// Truncates a 64-bit word to this width.
    fn narrow(raw: u64) -> Self;
    /// `self == 0`.
    fn is_zero(self) -> bool;
    /// Wrapping addition.
    fn wrapping_add(self, rhs: Self) -> Self;
    /// Wrapping subtraction.
    fn wrapping_sub(self, rhs: Self) -> Self;
    /// Wrapping multiplication.
    fn wrapping_mul(self, rhs: Self) -> Self;
    /// Truncating division; wraps `MIN / -1`, panics on a zero divisor.
    fn wrapping_div(self, rhs: Self) -> Self;
    /// Remainder; wraps `MIN % -1` to zero, panics on a zero divisor.
    fn wrapping_rem(self, rhs: Self) -> Self;
}

macro_rules! impl_payload {
    ($($ty:ty => $wide:ty),* $(,)?) => {$(
        impl private::Sealed for $ty {}

        impl Payload for $ty {
            #[inline]
            fn widen(self) -> u64 {
                self as $wide as u64
            }

            #[inline]
            fn narrow(raw: u64) -> Self {
                raw as $ty
            }

            #[inline]
            fn is_zero(self) -> bool {
                self == 0
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$ty>::wrapping_add(self, rhs)
            }

            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$ty>::wrapping_sub(self, rhs)
            }

            #[inline]
            fn wrapping_mul(self, rhs: Self) -> Self {
                <$ty>::wrapping_mul(self, rhs)
            }

            #[inline]
            fn wrapping_div(self, rhs: Self) -> Self {
                <$ty>::wrapping_div(self, rhs)
            }

            #[inline]
            fn wrapping_rem(self, rhs: Self) -> Self {
                <$ty>::wrapping_rem(self, rhs)
            }
        }
    )*};
}

impl_payload!(
    u8 => u64,
    u16 => u64,
    u32 => u64,
    u64 => u64,
    i8 => i64,
    i16 => i64,
    i32 => i64,
    i64 => i64,
);
