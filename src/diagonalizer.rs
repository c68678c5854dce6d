//! The diagonalizer contract consumed by the calculators, and the NuFast
//! implementation used by default.

use crate::config::CalcConfig;
use crate::flavor::{Flavor, Sign};
use crate::nufast::{probability_matter_lbl, MatterParameters, ProbabilityMatrix};
use crate::scalar::Scalar;

/// Object that turns oscillation parameters into flavor transition
/// probabilities for one matter layer.
///
/// Implementations must be deterministic: the same configuration followed by
/// the same reset/propagate sequence yields bit-identical probabilities.
pub trait Diagonalizer<S: Scalar> {
    /// Fresh instance. Every cache entry owns one.
    fn from_config(config: &CalcConfig) -> Self
    where
        Self: Sized;

    /// Mixing angles and CP phase, radians. Note the 12, 23, 13 order.
    fn set_mix(&mut self, th12: S, th23: S, th13: S, dcp: S);

    /// Mass-squared splittings, eV².
    fn set_delta_msqrs(&mut self, dmsq21: S, dmsq32: S);

    /// Put the state back to a pure `flavor` neutrino.
    fn reset_to_flavour(&mut self, flavor: Flavor);

    /// Propagate `l` km at `e` GeV through electron density `ne` (ρ·Y_e, g/cm³).
    fn prop_matter(&mut self, l: f64, e: f64, ne: f64, sign: Sign);

    /// Probability of finding the propagated state in `flavor`.
    fn p(&self, flavor: Flavor) -> S;
}

/// [`Diagonalizer`] backed by the NuFast matter algorithm.
///
/// NuFast works at probability level, so each `prop_matter` call describes
/// a single constant-density layer starting from the last reset flavor.
///
/// One NuFast evaluation yields all nine probabilities. The matrix is kept
/// until the configuration or the (baseline, energy, density, sign) point
/// changes, so propagating the other two initial flavors only reads a row.
#[derive(Debug, Clone)]
pub struct NuFastDiagonalizer<S> {
    s12sq: S,
    s13sq: S,
    s23sq: S,
    delta: S,
    dmsq21: S,
    dmsq31: S,
    n_newton: u8,
    initial: Flavor,
    row: [S; 3],
    matrix: Option<(PropagationPoint, ProbabilityMatrix<S>)>,
    evaluations: usize,
}

/// Bit patterns of the `prop_matter` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PropagationPoint {
    l: u64,
    e: u64,
    ne: u64,
    sign: Sign,
}

impl<S: Scalar> NuFastDiagonalizer<S> {
    pub fn new(n_newton: u8) -> Self {
        Self {
            s12sq: S::zero(),
            s13sq: S::zero(),
            s23sq: S::zero(),
            delta: S::zero(),
            dmsq21: S::zero(),
            dmsq31: S::zero(),
            n_newton,
            initial: Flavor::Electron,
            row: [S::one(), S::zero(), S::zero()],
            matrix: None,
            evaluations: 0,
        }
    }

    /// Number of full NuFast evaluations run so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn matrix_at(
        &mut self,
        point: PropagationPoint,
        l: f64,
        e: f64,
        ne: f64,
    ) -> ProbabilityMatrix<S> {
        if let Some((at, matrix)) = &self.matrix {
            if *at == point {
                return *matrix;
            }
        }
        let params = MatterParameters {
            s12sq: self.s12sq,
            s13sq: self.s13sq,
            s23sq: self.s23sq,
            delta: self.delta,
            Dmsq21: self.dmsq21,
            Dmsq31: self.dmsq31,
            L: l,
            E: point.sign.factor() * e,
            rho: ne,
            Ye: 1.0,
            N_Newton: self.n_newton,
        };
        let matrix = probability_matter_lbl(&params);
        self.evaluations += 1;
        self.matrix = Some((point, matrix));
        matrix
    }
}

impl<S: Scalar> Diagonalizer<S> for NuFastDiagonalizer<S> {
    fn from_config(config: &CalcConfig) -> Self {
        Self::new(config.newton_iterations)
    }

    fn set_mix(&mut self, th12: S, th23: S, th13: S, dcp: S) {
        let sq = |th: S| {
            let s = th.sin();
            s * s
        };
        self.s12sq = sq(th12);
        self.s13sq = sq(th13);
        self.s23sq = sq(th23);
        self.delta = dcp;
        self.matrix = None;
    }

    fn set_delta_msqrs(&mut self, dmsq21: S, dmsq32: S) {
        self.dmsq21 = dmsq21;
        self.dmsq31 = dmsq32 + dmsq21;
        self.matrix = None;
    }

    fn reset_to_flavour(&mut self, flavor: Flavor) {
        self.initial = flavor;
        self.row = [S::zero(); 3];
        self.row[flavor.index()] = S::one();
    }

    fn prop_matter(&mut self, l: f64, e: f64, ne: f64, sign: Sign) {
        let point = PropagationPoint {
            l: l.to_bits(),
            e: e.to_bits(),
            ne: ne.to_bits(),
            sign,
        };
        self.row = self.matrix_at(point, l, e, ne)[self.initial.index()];
    }

    fn p(&self, flavor: Flavor) -> S {
        self.row[flavor.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> NuFastDiagonalizer<f64> {
        let mut d = NuFastDiagonalizer::new(2);
        d.set_mix(0.5843, 0.7367, 0.1477, 0.0);
        d.set_delta_msqrs(7.53e-5, 2.51e-3);
        d
    }

    #[test]
    fn test_reset_is_pure_state() {
        let mut d = configured();
        d.reset_to_flavour(Flavor::Tau);
        assert_eq!(d.p(Flavor::Tau), 1.0);
        assert_eq!(d.p(Flavor::Muon), 0.0);
    }

    #[test]
    fn test_row_sums_to_one() {
        let mut d = configured();
        for sign in [Sign::Neutrino, Sign::Antineutrino] {
            for flavor in Flavor::ALL {
                d.reset_to_flavour(flavor);
                d.prop_matter(1300.0, 2.0, 1.4, sign);
                let sum: f64 = Flavor::ALL.iter().map(|f| d.p(*f)).sum();
                assert!((sum - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_matches_direct_nufast() {
        let mut d = configured();
        d.reset_to_flavour(Flavor::Muon);
        d.prop_matter(1300.0, 2.0, 1.4, Sign::Neutrino);

        let s = |x: f64| x.sin() * x.sin();
        let params = MatterParameters {
            s12sq: s(0.5843),
            s13sq: s(0.1477),
            s23sq: s(0.7367),
            delta: 0.0,
            Dmsq21: 7.53e-5,
            Dmsq31: 2.51e-3 + 7.53e-5,
            L: 1300.0,
            E: 2.0,
            rho: 2.8,
            Ye: 0.5,
            N_Newton: 2,
        };
        let direct = probability_matter_lbl(&params);
        assert!((d.p(Flavor::Electron) - direct[1][0]).abs() < 1e-15);
    }

    #[test]
    fn test_one_evaluation_per_point() {
        let mut d = configured();
        for flavor in Flavor::ALL {
            d.reset_to_flavour(flavor);
            d.prop_matter(1300.0, 2.0, 1.4, Sign::Neutrino);
        }
        assert_eq!(d.evaluations(), 1);

        // each argument is part of the point
        d.prop_matter(1300.0, 2.5, 1.4, Sign::Neutrino);
        d.prop_matter(1300.0, 2.5, 1.4, Sign::Antineutrino);
        d.prop_matter(810.0, 2.5, 1.4, Sign::Antineutrino);
        d.prop_matter(810.0, 2.5, 1.3, Sign::Antineutrino);
        assert_eq!(d.evaluations(), 5);
    }

    #[test]
    fn test_new_configuration_discards_matrix() {
        let mut d = configured();
        d.reset_to_flavour(Flavor::Muon);
        d.prop_matter(1300.0, 2.0, 1.4, Sign::Neutrino);
        let before = d.p(Flavor::Electron);

        d.set_mix(0.5843, 0.7367, 0.1477, -1.9);
        d.prop_matter(1300.0, 2.0, 1.4, Sign::Neutrino);
        assert_eq!(d.evaluations(), 2);
        assert_ne!(d.p(Flavor::Electron), before);

        d.set_delta_msqrs(7.53e-5, 2.45e-3);
        d.prop_matter(1300.0, 2.0, 1.4, Sign::Neutrino);
        assert_eq!(d.evaluations(), 3);

        let mut fresh = NuFastDiagonalizer::new(2);
        fresh.set_mix(0.5843, 0.7367, 0.1477, -1.9);
        fresh.set_delta_msqrs(7.53e-5, 2.45e-3);
        fresh.reset_to_flavour(Flavor::Muon);
        fresh.prop_matter(1300.0, 2.0, 1.4, Sign::Neutrino);
        assert_eq!(d.p(Flavor::Electron).to_bits(), fresh.p(Flavor::Electron).to_bits());
    }

    #[test]
    fn test_deterministic() {
        let mut a = configured();
        let mut b = configured();
        a.reset_to_flavour(Flavor::Electron);
        b.reset_to_flavour(Flavor::Electron);
        a.prop_matter(810.0, 1.9, 1.3, Sign::Antineutrino);
        b.prop_matter(810.0, 1.9, 1.3, Sign::Antineutrino);
        assert_eq!(a.p(Flavor::Muon).to_bits(), b.p(Flavor::Muon).to_bits());
    }
}
