//! Standard oscillation parameters, their epoch counters, and the calculator
//! traits built on them.

use sha2::{Digest, Sha256};

use crate::error::OscResult;
use crate::scalar::Scalar;

/// The eight standard parameters.
///
/// `l` (km) and `rho` (g/cm³) are plain in every calculator; the rest take
/// the calculator's scalar type so they can carry gradients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscParams<S> {
    pub l: f64,
    pub rho: f64,
    pub dmsq21: S,
    pub dmsq32: S,
    pub th12: S,
    pub th13: S,
    pub th23: S,
    pub dcp: S,
}

impl<S: Scalar> Default for OscParams<S> {
    fn default() -> Self {
        Self {
            l: 0.0,
            rho: 0.0,
            dmsq21: S::zero(),
            dmsq32: S::zero(),
            th12: S::zero(),
            th13: S::zero(),
            th23: S::zero(),
            dcp: S::zero(),
        }
    }
}

/// Generation counters, one per invalidation group.
///
/// `mix` covers θ12, θ13, θ23, δCP; `dm` covers Δm²21, Δm²32; `lr` covers L
/// and ρ. Zero means "never computed" when recorded on a cache entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epochs {
    pub mix: u64,
    pub dm: u64,
    pub lr: u64,
}

impl Epochs {
    /// True if any group in `self` advanced past `recorded`.
    #[inline]
    pub fn is_newer_than(&self, recorded: &Epochs) -> bool {
        self.mix > recorded.mix || self.dm > recorded.dm || self.lr > recorded.lr
    }
}

/// Parameter values plus their epochs. Every setter bumps its group's
/// counter, even when the value is unchanged.
#[derive(Debug, Clone)]
pub struct ParamStore<S> {
    params: OscParams<S>,
    epochs: Epochs,
}

impl<S: Scalar> Default for ParamStore<S> {
    fn default() -> Self {
        Self {
            params: OscParams::default(),
            epochs: Epochs::default(),
        }
    }
}

impl<S: Scalar> ParamStore<S> {
    pub fn params(&self) -> &OscParams<S> {
        &self.params
    }

    pub fn epochs(&self) -> Epochs {
        self.epochs
    }

    pub fn set_l(&mut self, l: f64) {
        self.epochs.lr += 1;
        self.params.l = l;
    }

    pub fn set_rho(&mut self, rho: f64) {
        self.epochs.lr += 1;
        self.params.rho = rho;
    }

    pub fn set_dmsq21(&mut self, dmsq21: S) {
        self.epochs.dm += 1;
        self.params.dmsq21 = dmsq21;
    }

    pub fn set_dmsq32(&mut self, dmsq32: S) {
        self.epochs.dm += 1;
        self.params.dmsq32 = dmsq32;
    }

    pub fn set_th12(&mut self, th12: S) {
        self.epochs.mix += 1;
        self.params.th12 = th12;
    }

    pub fn set_th13(&mut self, th13: S) {
        self.epochs.mix += 1;
        self.params.th13 = th13;
    }

    pub fn set_th23(&mut self, th23: S) {
        self.epochs.mix += 1;
        self.params.th23 = th23;
    }

    pub fn set_dcp(&mut self, dcp: S) {
        self.epochs.mix += 1;
        self.params.dcp = dcp;
    }
}

/// SHA-256 over `tag` followed by ρ, L, Δm²21, Δm²32, θ12, θ13, θ23, δCP in
/// the scalar type's binary representation.
pub fn params_hash<S: Scalar>(tag: &str, params: &OscParams<S>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());

    let mut buf = Vec::with_capacity(8 * core::mem::size_of::<S>());
    for x in [
        S::from_f64(params.rho),
        S::from_f64(params.l),
        params.dmsq21,
        params.dmsq32,
        params.th12,
        params.th13,
        params.th23,
        params.dcp,
    ] {
        x.write_bytes(&mut buf);
    }
    hasher.update(&buf);

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Probability interface.
pub trait OscCalc<S: Scalar> {
    /// P(`flav_before` → `flav_after`) at `e` GeV, with the flavor codes
    /// checked. See [`crate::flavor`] for the encoding.
    fn try_p(&mut self, flav_before: i32, flav_after: i32, e: f64) -> OscResult<S>;

    /// As [`try_p`](Self::try_p), treating a bad flavor code as a fatal
    /// programming error. NaN results are passed through.
    ///
    /// # Panics
    /// On an unknown flavor code or a neutrino/antineutrino mismatch.
    fn p(&mut self, flav_before: i32, flav_after: i32, e: f64) -> S {
        match self.try_p(flav_before, flav_after, e) {
            Ok(p) => p,
            Err(err) => panic!("{err}"),
        }
    }

    /// One probability per energy, with NaN replaced by zero.
    fn p_energies(&mut self, flav_before: i32, flav_after: i32, energies: &[f64]) -> Vec<S> {
        energies
            .iter()
            .map(|&e| {
                let p = self.p(flav_before, flav_after, e);
                if p.is_nan() {
                    S::zero()
                } else {
                    p
                }
            })
            .collect()
    }
}

/// Calculator whose standard parameters can be read and changed.
pub trait OscCalcAdjustable<S: Scalar>: OscCalc<S> {
    fn params(&self) -> &OscParams<S>;

    fn set_l(&mut self, l: f64);
    fn set_rho(&mut self, rho: f64);
    fn set_dmsq21(&mut self, dmsq21: S);
    fn set_dmsq32(&mut self, dmsq32: S);
    fn set_th12(&mut self, th12: S);
    fn set_th13(&mut self, th13: S);
    fn set_th23(&mut self, th23: S);
    fn set_dcp(&mut self, dcp: S);

    fn l(&self) -> f64 {
        self.params().l
    }

    fn rho(&self) -> f64 {
        self.params().rho
    }

    fn dmsq21(&self) -> S {
        self.params().dmsq21
    }

    fn dmsq32(&self) -> S {
        self.params().dmsq32
    }

    fn th12(&self) -> S {
        self.params().th12
    }

    fn th13(&self) -> S {
        self.params().th13
    }

    fn th23(&self) -> S {
        self.params().th23
    }

    fn dcp(&self) -> S {
        self.params().dcp
    }

    /// Content hash of the standard parameters, prefixed by `tag`.
    fn params_hash(&self, tag: &str) -> [u8; 32] {
        params_hash(tag, self.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual::Dual;

    #[test]
    fn test_epochs_strictly_increase_per_group() {
        let mut store = ParamStore::<f64>::default();
        assert_eq!(store.epochs(), Epochs::default());

        store.set_th12(0.58);
        store.set_th13(0.15);
        store.set_th23(0.74);
        store.set_dcp(0.0);
        assert_eq!(store.epochs(), Epochs { mix: 4, dm: 0, lr: 0 });

        store.set_dmsq21(7.5e-5);
        store.set_dmsq32(2.5e-3);
        store.set_l(1300.0);
        store.set_rho(2.8);
        assert_eq!(store.epochs(), Epochs { mix: 4, dm: 2, lr: 2 });
    }

    #[test]
    fn test_redundant_set_still_bumps() {
        let mut store = ParamStore::<f64>::default();
        store.set_rho(2.8);
        let before = store.epochs();
        store.set_rho(2.8);
        assert_eq!(store.epochs().lr, before.lr + 1);
        assert_eq!(store.params().rho, 2.8);
    }

    #[test]
    fn test_is_newer_than() {
        let recorded = Epochs { mix: 3, dm: 1, lr: 2 };
        assert!(!recorded.is_newer_than(&recorded));
        assert!(Epochs { lr: 3, ..recorded }.is_newer_than(&recorded));
        assert!(Epochs { dm: 2, ..recorded }.is_newer_than(&recorded));
        assert!(!Epochs::default().is_newer_than(&recorded));
    }

    #[test]
    fn test_hash_depends_on_tag_and_values() {
        let mut a = OscParams::<f64>::default();
        a.th23 = 0.74;
        let b = a;

        assert_eq!(params_hash("nova", &a), params_hash("nova", &b));
        assert_ne!(params_hash("nova", &a), params_hash("dune", &a));

        let mut c = a;
        c.rho = 2.8;
        assert_ne!(params_hash("nova", &a), params_hash("nova", &c));
    }

    #[test]
    fn test_hash_uses_scalar_representation() {
        let plain = OscParams::<f64> {
            th12: 0.5,
            ..OscParams::default()
        };
        let dual = OscParams::<Dual<1>> {
            th12: Dual::constant(0.5),
            ..OscParams::default()
        };
        assert_ne!(params_hash("", &plain), params_hash("", &dual));
    }
}
