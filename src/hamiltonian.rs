//! General three-flavor propagator: builds the flavor-basis Hamiltonian,
//! including NSI couplings, and evolves a complex amplitude through it.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use num_complex::Complex64;

use crate::config::CalcConfig;
use crate::diagonalizer::Diagonalizer;
use crate::flavor::{Flavor, Sign};
use crate::nsi::{NsiCouplings, NsiDiagonalizer};
use crate::nufast::{EV_SQ_KM_TO_GEV_OVER4, YE_RHO_E_TO_A};

/// Exact constant-density propagation by Hermitian eigendecomposition.
///
/// Unlike [`NuFastDiagonalizer`](crate::NuFastDiagonalizer) this keeps the
/// amplitude between calls, so successive `prop_matter` calls chain layers
/// until the next `reset_to_flavour`.
#[derive(Debug, Clone)]
pub struct HamiltonianPropagator {
    th12: f64,
    th13: f64,
    th23: f64,
    dcp: f64,
    dmsq21: f64,
    dmsq31: f64,
    nsi: NsiCouplings,
    amp: Vector3<Complex64>,
}

impl Default for HamiltonianPropagator {
    fn default() -> Self {
        Self {
            th12: 0.0,
            th13: 0.0,
            th23: 0.0,
            dcp: 0.0,
            dmsq21: 0.0,
            dmsq31: 0.0,
            nsi: NsiCouplings::default(),
            amp: Vector3::new(
                Complex64::new(1.0, 0.0),
                Complex64::default(),
                Complex64::default(),
            ),
        }
    }
}

impl HamiltonianPropagator {
    /// PDG parametrization U = R23 · U13(δ) · R12.
    fn pmns(&self) -> Matrix3<Complex64> {
        let (s12, c12) = self.th12.sin_cos();
        let (s13, c13) = self.th13.sin_cos();
        let (s23, c23) = self.th23.sin_cos();
        let eid = Complex64::from_polar(1.0, self.dcp);
        let r = |x: f64| Complex64::new(x, 0.0);

        Matrix3::new(
            r(c12 * c13),
            r(s12 * c13),
            eid.conj() * s13,
            r(-s12 * c23) - eid * (c12 * s23 * s13),
            r(c12 * c23) - eid * (s12 * s23 * s13),
            r(s23 * c13),
            r(s12 * s23) - eid * (c12 * c23 * s13),
            r(-c12 * s23) - eid * (s12 * c23 * s13),
            r(c23 * c13),
        )
    }

    /// 2E·H in eV² for a neutrino at `e` GeV in electron density `ne`.
    fn hamiltonian(&self, e: f64, ne: f64, sign: Sign) -> Matrix3<Complex64> {
        let u = self.pmns();
        let masses = Matrix3::from_diagonal(&Vector3::new(
            Complex64::default(),
            Complex64::new(self.dmsq21, 0.0),
            Complex64::new(self.dmsq31, 0.0),
        ));
        let vacuum = u * masses * u.adjoint();

        let a = YE_RHO_E_TO_A * ne * e;
        let n = &self.nsi;
        let off = |norm: f64, phase: f64| Complex64::from_polar(norm, phase) * a;
        let r = |x: f64| Complex64::new(x * a, 0.0);
        let matter = Matrix3::new(
            r(1.0 + n.eps_ee),
            off(n.eps_emu, n.delta_emu),
            off(n.eps_etau, n.delta_etau),
            off(n.eps_emu, n.delta_emu).conj(),
            r(n.eps_mumu),
            off(n.eps_mutau, n.delta_mutau),
            off(n.eps_etau, n.delta_etau).conj(),
            off(n.eps_mutau, n.delta_mutau).conj(),
            r(n.eps_tautau),
        );

        match sign {
            Sign::Neutrino => vacuum + matter,
            Sign::Antineutrino => (vacuum - matter).map(|z| z.conj()),
        }
    }
}

impl Diagonalizer<f64> for HamiltonianPropagator {
    fn from_config(_config: &CalcConfig) -> Self {
        Self::default()
    }

    fn set_mix(&mut self, th12: f64, th23: f64, th13: f64, dcp: f64) {
        self.th12 = th12;
        self.th13 = th13;
        self.th23 = th23;
        self.dcp = dcp;
    }

    fn set_delta_msqrs(&mut self, dmsq21: f64, dmsq32: f64) {
        self.dmsq21 = dmsq21;
        self.dmsq31 = dmsq32 + dmsq21;
    }

    fn reset_to_flavour(&mut self, flavor: Flavor) {
        self.amp = Vector3::zeros();
        self.amp[flavor.index()] = Complex64::new(1.0, 0.0);
    }

    fn prop_matter(&mut self, l: f64, e: f64, ne: f64, sign: Sign) {
        let eigen = SymmetricEigen::new(self.hamiltonian(e, ne, sign));
        // exp(-i λ L / 2E) with λ in eV², L in km, E in GeV
        let k = 2.0 * EV_SQ_KM_TO_GEV_OVER4 * l / e;
        let phases = Matrix3::from_diagonal(
            &eigen
                .eigenvalues
                .map(|lambda| Complex64::from_polar(1.0, -lambda * k)),
        );
        let v = eigen.eigenvectors;
        self.amp = v * phases * v.adjoint() * self.amp;
    }

    fn p(&self, flavor: Flavor) -> f64 {
        self.amp[flavor.index()].norm_sqr()
    }
}

impl NsiDiagonalizer for HamiltonianPropagator {
    fn set_nsi(&mut self, nsi: &NsiCouplings) {
        self.nsi = *nsi;
    }
}
