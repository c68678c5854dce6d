//! Moving a parameter set between calculators of different scalar types.

use crate::params::OscCalcAdjustable;
use crate::scalar::{Scalar, ValueAs};

/// Copy the eight standard parameters from `src` into `dst` through `dst`'s
/// setters, so every epoch in `dst` advances.
///
/// L and ρ are plain in both calculators. The other six go through
/// [`ValueAs`]: widening into a differentiable type starts with a zero
/// gradient, narrowing drops the gradient. NSI couplings are not part of the
/// standard set and are left alone.
///
/// ```rust
/// use osccalc::{copy_params, Dual, OscCalcAdjustable, PmnsOptCalc};
///
/// let mut plain = PmnsOptCalc::<f64>::new();
/// plain.set_th23(0.74);
/// let mut diff = PmnsOptCalc::<Dual<1>>::new();
/// copy_params(&plain, &mut diff);
/// assert_eq!(diff.th23(), Dual::constant(0.74));
/// ```
pub fn copy_params<T, U, Src, Dst>(src: &Src, dst: &mut Dst)
where
    T: Scalar + ValueAs<U>,
    U: Scalar,
    Src: OscCalcAdjustable<T> + ?Sized,
    Dst: OscCalcAdjustable<U> + ?Sized,
{
    dst.set_l(src.l());
    dst.set_rho(src.rho());

    dst.set_dcp(src.dcp().value_as());
    dst.set_dmsq21(src.dmsq21().value_as());
    dst.set_dmsq32(src.dmsq32().value_as());
    dst.set_th12(src.th12().value_as());
    dst.set_th13(src.th13().value_as());
    dst.set_th23(src.th23().value_as());
}
