//! Forward-mode dual numbers.
//!
//! `Dual<N>` carries a value and the gradient with respect to `N` seeded
//! inputs. It is `Copy`, so calculators store it the same way they store `f64`.

use core::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::scalar::{Scalar, ValueAs};

/// Value plus an `N`-component gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual<const N: usize> {
    pub val: f64,
    pub grad: [f64; N],
}

impl<const N: usize> Dual<N> {
    /// A value with zero gradient.
    pub fn constant(val: f64) -> Self {
        Self { val, grad: [0.0; N] }
    }

    /// An independent variable seeded in gradient slot `index`.
    ///
    /// # Panics
    /// If `index >= N`.
    pub fn variable(val: f64, index: usize) -> Self {
        assert!(index < N, "gradient slot {index} out of range for Dual<{N}>");
        let mut grad = [0.0; N];
        grad[index] = 1.0;
        Self { val, grad }
    }

    /// Apply `f` with derivative `df` (both evaluated at `self.val`).
    #[inline]
    fn chain(self, f: f64, df: f64) -> Self {
        let mut grad = self.grad;
        for g in grad.iter_mut() {
            *g *= df;
        }
        Self { val: f, grad }
    }
}

impl<const N: usize> Add for Dual<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut grad = self.grad;
        for (g, r) in grad.iter_mut().zip(rhs.grad.iter()) {
            *g += r;
        }
        Self { val: self.val + rhs.val, grad }
    }
}

impl<const N: usize> Sub for Dual<N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut grad = self.grad;
        for (g, r) in grad.iter_mut().zip(rhs.grad.iter()) {
            *g -= r;
        }
        Self { val: self.val - rhs.val, grad }
    }
}

impl<const N: usize> Mul for Dual<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut grad = [0.0; N];
        for (i, g) in grad.iter_mut().enumerate() {
            *g = self.grad[i] * rhs.val + self.val * rhs.grad[i];
        }
        Self { val: self.val * rhs.val, grad }
    }
}

impl<const N: usize> Div for Dual<N> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let val = self.val / rhs.val;
        let mut grad = [0.0; N];
        for (i, g) in grad.iter_mut().enumerate() {
            *g = (self.grad[i] - val * rhs.grad[i]) / rhs.val;
        }
        Self { val, grad }
    }
}

impl<const N: usize> Neg for Dual<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.chain(-self.val, -1.0)
    }
}

impl<const N: usize> Zero for Dual<N> {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.grad.iter().all(|g| *g == 0.0)
    }
}

impl<const N: usize> One for Dual<N> {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl<const N: usize> Scalar for Dual<N> {
    #[inline]
    fn from_f64(x: f64) -> Self {
        Self::constant(x)
    }

    #[inline]
    fn value(&self) -> f64 {
        self.val
    }

    #[inline]
    fn sin(self) -> Self {
        self.chain(self.val.sin(), self.val.cos())
    }

    #[inline]
    fn cos(self) -> Self {
        self.chain(self.val.cos(), -self.val.sin())
    }

    /// At zero the derivative is infinite; components that are already zero
    /// stay zero instead of becoming `0 * inf = NaN`.
    #[inline]
    fn sqrt(self) -> Self {
        let root = self.val.sqrt();
        let df = 0.5 / root;
        let mut grad = self.grad;
        for g in grad.iter_mut() {
            if *g != 0.0 {
                *g *= df;
            }
        }
        Self { val: root, grad }
    }

    fn write_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.val.to_le_bytes());
        for g in &self.grad {
            buf.extend_from_slice(&g.to_le_bytes());
        }
    }
}

impl<const N: usize> ValueAs<Dual<N>> for f64 {
    #[inline]
    fn value_as(&self) -> Dual<N> {
        Dual::constant(*self)
    }
}

impl<const N: usize> ValueAs<f64> for Dual<N> {
    #[inline]
    fn value_as(&self) -> f64 {
        self.val
    }
}

impl<const N: usize> ValueAs<Dual<N>> for Dual<N> {
    #[inline]
    fn value_as(&self) -> Dual<N> {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::extract_value;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_product_rule() {
        let x = Dual::<2>::variable(3.0, 0);
        let y = Dual::<2>::variable(5.0, 1);
        let z = x * y + x;
        assert_eq!(z.val, 18.0);
        assert_eq!(z.grad, [6.0, 3.0]);
    }

    #[test]
    fn test_quotient_rule() {
        let x = Dual::<1>::variable(2.0, 0);
        let z = Dual::one() / x;
        assert!((z.val - 0.5).abs() < EPSILON);
        assert!((z.grad[0] + 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_elementary_functions() {
        let x = Dual::<1>::variable(0.3, 0);
        assert!((x.sin().grad[0] - 0.3_f64.cos()).abs() < EPSILON);
        assert!((x.cos().grad[0] + 0.3_f64.sin()).abs() < EPSILON);
        assert!((x.sqrt().grad[0] - 0.5 / 0.3_f64.sqrt()).abs() < EPSILON);
        assert_eq!((-x).grad[0], -1.0);
    }

    #[test]
    fn test_sqrt_at_zero_keeps_untouched_slots() {
        let x = Dual::<2>::constant(0.0);
        let root = x.sqrt();
        assert_eq!(root.val, 0.0);
        assert_eq!(root.grad, [0.0, 0.0]);

        let y = Dual::<2>::variable(0.0, 1).sqrt();
        assert_eq!(y.grad[0], 0.0);
        assert!(y.grad[1].is_infinite());
    }

    #[test]
    fn test_widen_and_narrow() {
        let wide: Dual<3> = extract_value(&1.25_f64);
        assert_eq!(wide, Dual::constant(1.25));

        let x = Dual::<3>::variable(1.25, 2);
        let narrow: f64 = extract_value(&x);
        assert_eq!(narrow, 1.25);

        let same: Dual<3> = extract_value(&x);
        assert_eq!(same.grad, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_bytes_include_gradient() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        Dual::<1>::constant(1.0).write_bytes(&mut a);
        Dual::<1>::variable(1.0, 0).write_bytes(&mut b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_variable_slot_checked() {
        let _ = Dual::<1>::variable(0.0, 1);
    }
}
