//! Scalar types the calculators are generic over.
//!
//! Two instantiations are provided: `f64` for speed and [`Dual`](crate::Dual)
//! for forward-mode gradients. Converting between them is always explicit via
//! [`ValueAs`]; nothing narrows a `Dual` to `f64` behind the caller's back.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

/// Arithmetic capability required by the oscillation code.
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Lift a plain constant. Carries no gradient.
    fn from_f64(x: f64) -> Self;

    /// Plain numeric value.
    fn value(&self) -> f64;

    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn sqrt(self) -> Self;

    fn is_nan(&self) -> bool {
        self.value().is_nan()
    }

    /// Append the binary representation of `self` (little endian).
    fn write_bytes(&self, buf: &mut Vec<u8>);
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn sin(self) -> Self {
        f64::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        f64::cos(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn write_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

/// Explicit conversion between scalar types.
///
/// Widening (`f64` into a differentiable type) starts with a zero gradient.
/// Narrowing drops the gradient and must be asked for by name.
pub trait ValueAs<T> {
    fn value_as(&self) -> T;
}

impl ValueAs<f64> for f64 {
    #[inline]
    fn value_as(&self) -> f64 {
        *self
    }
}

/// Get the plain (or target-typed) value of `x`.
///
/// ```rust
/// use osccalc::{extract_value, Dual};
///
/// let x = Dual::<2>::variable(0.7, 1);
/// let plain: f64 = extract_value(&x);
/// assert_eq!(plain, 0.7);
/// ```
#[inline]
pub fn extract_value<T, S: ValueAs<T>>(x: &S) -> T {
    x.value_as()
}
