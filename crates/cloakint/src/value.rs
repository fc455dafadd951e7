//! The sealed integer value type.

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Rem, RemAssign, Sub, SubAssign};

use crate::block::CiphertextBlock;
use crate::error::{fail_stop, CloakError};
use crate::keyring::{self, Keyring};
use crate::payload::Payload;

/// An integer that is only ever stored as AES ciphertext.
///
/// Every operation opens its operands, computes on the transient plaintext
/// and seals the result under a fresh salt, so two values holding the same
/// number almost never share ciphertext bytes. `Clone` re-seals instead of
/// copying bytes.
///
/// The `try_*` methods report failures as [`CloakError`]. Operators and the
/// plain accessors are fail-stop: any error aborts the operation with a panic
/// carrying the error message. Dividing by zero through `/` or `%` raises
/// Rust's native divide-by-zero panic.
pub struct Cloaked<T: Payload> {
    sealed: CiphertextBlock,
    _payload: PhantomData<T>,
}

/// Sealed `u8`.
pub type CloakedU8 = Cloaked<u8>;
/// Sealed `u16`.
pub type CloakedU16 = Cloaked<u16>;
/// Sealed `u32`.
pub type CloakedU32 = Cloaked<u32>;
/// Sealed `u64`.
pub type CloakedU64 = Cloaked<u64>;
/// Sealed `i8`.
pub type CloakedI8 = Cloaked<i8>;
/// Sealed `i16`.
pub type CloakedI16 = Cloaked<i16>;
/// Sealed `i32`.
pub type CloakedI32 = Cloaked<i32>;
/// Sealed `i64`.
pub type CloakedI64 = Cloaked<i64>;

impl<T: Payload> Cloaked<T> {
    fn from_sealed(sealed: CiphertextBlock) -> Self {
        Self {
            sealed,
            _payload: PhantomData,
        }
    }

    fn seal_with(keyring: &Keyring, value: T) -> Result<Self, CloakError> {
        keyring.seal(value.widen()).map(Self::from_sealed)
    }

    fn open_with(&self, keyring: &Keyring) -> Result<T, CloakError> {
        keyring.open(&self.sealed).map(T::narrow)
    }

    /// Seals `value`.
    pub fn try_new(value: T) -> Result<Self, CloakError> {
        Self::seal_with(keyring::global()?, value)
    }

    /// Seals `value`; fail-stop.
    pub fn new(value: T) -> Self {
        Self::try_new(value).unwrap_or_else(fail_stop)
    }

    /// Opens and returns the value.
    pub fn try_get(&self) -> Result<T, CloakError> {
        self.open_with(keyring::global()?)
    }

    /// Opens and returns the value; fail-stop.
    pub fn get(&self) -> T {
        self.try_get().unwrap_or_else(fail_stop)
    }

    /// Explicit conversion back to the native integer.
    pub fn to_native(&self) -> T {
        self.get()
    }

    /// Re-seals an independent copy with its own salt.
    pub fn try_clone(&self) -> Result<Self, CloakError> {
        let keyring = keyring::global()?;
        Self::seal_with(keyring, self.open_with(keyring)?)
    }

    /// Overwrites `self` with the value of `src`, sealed under a fresh salt.
    ///
    /// The borrow rules already rule out `src` aliasing `self`.
    pub fn try_assign_from(&mut self, src: &Self) -> Result<(), CloakError> {
        *self = src.try_clone()?;
        Ok(())
    }

    /// Fail-stop form of [`Cloaked::try_assign_from`].
    pub fn assign_from(&mut self, src: &Self) {
        self.try_assign_from(src).unwrap_or_else(fail_stop)
    }

    /// Re-seals the current value under a fresh salt.
    pub fn try_refresh(&mut self) -> Result<(), CloakError> {
        *self = self.try_clone()?;
        Ok(())
    }

    /// Fail-stop form of [`Cloaked::try_refresh`].
    pub fn refresh(&mut self) {
        self.try_refresh().unwrap_or_else(fail_stop)
    }

    /// Converts to another width with native `as` semantics.
    pub fn try_convert<U: Payload>(&self) -> Result<Cloaked<U>, CloakError> {
        let keyring = keyring::global()?;
        let value = self.open_with(keyring)?;
        Cloaked::<U>::seal_with(keyring, U::narrow(value.widen()))
    }

    /// Fail-stop form of [`Cloaked::try_convert`].
    pub fn convert<U: Payload>(&self) -> Cloaked<U> {
        self.try_convert().unwrap_or_else(fail_stop)
    }

    /// The ciphertext currently held.
    pub fn ciphertext(&self) -> &CiphertextBlock {
        &self.sealed
    }

    fn try_binary(&self, rhs: &Self, op: impl FnOnce(T, T) -> T) -> Result<Self, CloakError> {
        let keyring = keyring::global()?;
        let lhs = self.open_with(keyring)?;
        let rhs = rhs.open_with(keyring)?;
        Self::seal_with(keyring, op(lhs, rhs))
    }

    fn try_divisive(&self, rhs: &Self, op: impl FnOnce(T, T) -> T) -> Result<Self, CloakError> {
        let keyring = keyring::global()?;
        let lhs = self.open_with(keyring)?;
        let rhs = rhs.open_with(keyring)?;
        if rhs.is_zero() {
            return Err(CloakError::DivideByZero);
        }
        Self::seal_with(keyring, op(lhs, rhs))
    }

    /// Wrapping sum.
    pub fn try_add(&self, rhs: &Self) -> Result<Self, CloakError> {
        self.try_binary(rhs, T::wrapping_add)
    }

    /// Wrapping difference.
    pub fn try_sub(&self, rhs: &Self) -> Result<Self, CloakError> {
        self.try_binary(rhs, T::wrapping_sub)
    }

    /// Wrapping product.
    pub fn try_mul(&self, rhs: &Self) -> Result<Self, CloakError> {
        self.try_binary(rhs, T::wrapping_mul)
    }

    /// Truncating quotient; `DivideByZero` for a zero divisor.
    pub fn try_div(&self, rhs: &Self) -> Result<Self, CloakError> {
        self.try_divisive(rhs, T::wrapping_div)
    }

    /// Remainder; `DivideByZero` for a zero divisor.
    pub fn try_rem(&self, rhs: &Self) -> Result<Self, CloakError> {
        self.try_divisive(rhs, T::wrapping_rem)
    }

    /// `self += rhs` under a fresh salt.
    pub fn try_add_assign(&mut self, rhs: &Self) -> Result<(), CloakError> {
        *self = self.try_add(rhs)?;
        Ok(())
    }
}

impl<T: Payload> Clone for Cloaked<T> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(fail_stop)
    }
}

impl<T: Payload> Default for Cloaked<T> {
    fn default() -> Self {
        Self::new(T::narrow(0))
    }
}

impl<T: Payload> From<T> for Cloaked<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Payload> fmt::Debug for Cloaked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cloaked<{}>({})",
            core::any::type_name::<T>(),
            hex::encode(self.sealed.as_bytes())
        )
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $payload_op:path) => {
        impl<T: Payload> $trait<&Cloaked<T>> for &Cloaked<T> {
            type Output = Cloaked<T>;

            fn $method(self, rhs: &Cloaked<T>) -> Cloaked<T> {
                self.try_binary(rhs, $payload_op).unwrap_or_else(fail_stop)
            }
        }

        impl<T: Payload> $trait for Cloaked<T> {
            type Output = Cloaked<T>;

            fn $method(self, rhs: Cloaked<T>) -> Cloaked<T> {
                $trait::$method(&self, &rhs)
            }
        }

        impl<T: Payload> $trait<&Cloaked<T>> for Cloaked<T> {
            type Output = Cloaked<T>;

            fn $method(self, rhs: &Cloaked<T>) -> Cloaked<T> {
                $trait::$method(&self, rhs)
            }
        }

        impl<T: Payload> $trait<Cloaked<T>> for &Cloaked<T> {
            type Output = Cloaked<T>;

            fn $method(self, rhs: Cloaked<T>) -> Cloaked<T> {
                $trait::$method(self, &rhs)
            }
        }

        impl<T: Payload> $assign_trait<&Cloaked<T>> for Cloaked<T> {
            fn $assign_method(&mut self, rhs: &Cloaked<T>) {
                *self = $trait::$method(&*self, rhs);
            }
        }

        impl<T: Payload> $assign_trait for Cloaked<T> {
            fn $assign_method(&mut self, rhs: Cloaked<T>) {
                *self = $trait::$method(&*self, &rhs);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, Payload::wrapping_add);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, Payload::wrapping_sub);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, Payload::wrapping_mul);
impl_binary_op!(Div, div, DivAssign, div_assign, Payload::wrapping_div);
impl_binary_op!(Rem, rem, RemAssign, rem_assign, Payload::wrapping_rem);

macro_rules! impl_native_from {
    ($($ty:ty),*) => {$(
        impl From<&Cloaked<$ty>> for $ty {
            fn from(value: &Cloaked<$ty>) -> $ty {
                value.to_native()
            }
        }

        impl From<Cloaked<$ty>> for $ty {
            fn from(value: Cloaked<$ty>) -> $ty {
                value.to_native()
            }
        }
    )*};
}

impl_native_from!(u8, u16, u32, u64, i8, i16, i32, i64);
