//! Calculator with non-standard-interaction couplings.
//!
//! The extra couplings enter every part of the Hamiltonian, so there is no
//! point pushing parameter groups independently or keeping a large
//! energy-keyed cache: this calculator remembers only the last
//! (energy, sign) it evaluated.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::CalcConfig;
use crate::diagonalizer::Diagonalizer;
use crate::error::{OscError, OscResult};
use crate::flavor::{decode_transition, energy_key, Flavor, Sign};
use crate::hamiltonian::HamiltonianPropagator;
use crate::nufast::ProbabilityMatrix;
use crate::params::{OscCalc, OscCalcAdjustable, OscParams};

/// NSI matter couplings: three real diagonal epsilons and three complex
/// off-diagonal ones as (norm, phase).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NsiCouplings {
    pub eps_ee: f64,
    pub eps_mumu: f64,
    pub eps_tautau: f64,
    pub eps_emu: f64,
    pub eps_etau: f64,
    pub eps_mutau: f64,
    pub delta_emu: f64,
    pub delta_etau: f64,
    pub delta_mutau: f64,
}

/// Diagonalizer that also accepts NSI couplings.
pub trait NsiDiagonalizer: Diagonalizer<f64> {
    fn set_nsi(&mut self, nsi: &NsiCouplings);
}

/// Length of the vector used by [`OscCalcNsi::get_state`] / [`OscCalcNsi::set_state`].
pub const NSI_STATE_LEN: usize = 17;

/// Standard plus NSI calculator with a single-slot cache.
///
/// State vector order: θ12, θ13, θ23, δCP, Δm²21, Δm²32, ρ, L, ε_ee, ε_μμ,
/// ε_ττ, |ε_eμ|, |ε_eτ|, |ε_μτ|, δ_eμ, δ_eτ, δ_μτ.
pub struct OscCalcNsi<D = HamiltonianPropagator> {
    params: OscParams<f64>,
    nsi: NsiCouplings,
    config: CalcConfig,
    diag: D,
    mix_dirty: bool,
    dm_dirty: bool,
    prop_dirty: bool,
    eps_dirty: bool,
    /// Energy bits and sign of the cached matrix.
    prev: Option<(u64, Sign)>,
    probs: ProbabilityMatrix<f64>,
}

impl<D: NsiDiagonalizer> OscCalcNsi<D> {
    pub fn new() -> Self {
        Self::build(CalcConfig::default())
    }

    pub fn with_config(config: CalcConfig) -> OscResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CalcConfig) -> Self {
        Self {
            params: OscParams::default(),
            nsi: NsiCouplings::default(),
            diag: D::from_config(&config),
            config,
            mix_dirty: true,
            dm_dirty: true,
            prop_dirty: true,
            eps_dirty: true,
            prev: None,
            probs: [[0.0; 3]; 3],
        }
    }

    pub fn nsi(&self) -> &NsiCouplings {
        &self.nsi
    }

    pub fn set_nsi(&mut self, nsi: NsiCouplings) {
        self.eps_dirty = true;
        self.nsi = nsi;
    }

    pub fn set_eps_ee(&mut self, eps_ee: f64) {
        self.eps_dirty = true;
        self.nsi.eps_ee = eps_ee;
    }

    pub fn set_eps_emu(&mut self, eps_emu: f64) {
        self.eps_dirty = true;
        self.nsi.eps_emu = eps_emu;
    }

    pub fn set_eps_etau(&mut self, eps_etau: f64) {
        self.eps_dirty = true;
        self.nsi.eps_etau = eps_etau;
    }

    pub fn set_eps_mumu(&mut self, eps_mumu: f64) {
        self.eps_dirty = true;
        self.nsi.eps_mumu = eps_mumu;
    }

    pub fn set_eps_mutau(&mut self, eps_mutau: f64) {
        self.eps_dirty = true;
        self.nsi.eps_mutau = eps_mutau;
    }

    pub fn set_eps_tautau(&mut self, eps_tautau: f64) {
        self.eps_dirty = true;
        self.nsi.eps_tautau = eps_tautau;
    }

    pub fn set_delta_emu(&mut self, delta_emu: f64) {
        self.eps_dirty = true;
        self.nsi.delta_emu = delta_emu;
    }

    pub fn set_delta_etau(&mut self, delta_etau: f64) {
        self.eps_dirty = true;
        self.nsi.delta_etau = delta_etau;
    }

    pub fn set_delta_mutau(&mut self, delta_mutau: f64) {
        self.eps_dirty = true;
        self.nsi.delta_mutau = delta_mutau;
    }

    pub fn eps_ee(&self) -> f64 {
        self.nsi.eps_ee
    }

    pub fn eps_emu(&self) -> f64 {
        self.nsi.eps_emu
    }

    pub fn eps_etau(&self) -> f64 {
        self.nsi.eps_etau
    }

    pub fn eps_mumu(&self) -> f64 {
        self.nsi.eps_mumu
    }

    pub fn eps_mutau(&self) -> f64 {
        self.nsi.eps_mutau
    }

    pub fn eps_tautau(&self) -> f64 {
        self.nsi.eps_tautau
    }

    pub fn delta_emu(&self) -> f64 {
        self.nsi.delta_emu
    }

    pub fn delta_etau(&self) -> f64 {
        self.nsi.delta_etau
    }

    pub fn delta_mutau(&self) -> f64 {
        self.nsi.delta_mutau
    }

    /// All standard and NSI parameters in the documented order.
    pub fn get_state(&self) -> Vec<f64> {
        let p = &self.params;
        let n = &self.nsi;
        vec![
            p.th12,
            p.th13,
            p.th23,
            p.dcp,
            p.dmsq21,
            p.dmsq32,
            p.rho,
            p.l,
            n.eps_ee,
            n.eps_mumu,
            n.eps_tautau,
            n.eps_emu,
            n.eps_etau,
            n.eps_mutau,
            n.delta_emu,
            n.delta_etau,
            n.delta_mutau,
        ]
    }

    /// Inverse of [`get_state`](Self::get_state). Goes through the setters,
    /// so every dirty flag is raised.
    pub fn set_state(&mut self, state: &[f64]) -> OscResult<()> {
        let s: &[f64; NSI_STATE_LEN] = state.try_into().map_err(|_| OscError::StateLength {
            expected: NSI_STATE_LEN,
            got: state.len(),
        })?;

        self.set_th12(s[0]);
        self.set_th13(s[1]);
        self.set_th23(s[2]);
        self.set_dcp(s[3]);
        self.set_dmsq21(s[4]);
        self.set_dmsq32(s[5]);
        self.set_rho(s[6]);
        self.set_l(s[7]);
        self.set_nsi(NsiCouplings {
            eps_ee: s[8],
            eps_mumu: s[9],
            eps_tautau: s[10],
            eps_emu: s[11],
            eps_etau: s[12],
            eps_mutau: s[13],
            delta_emu: s[14],
            delta_etau: s[15],
            delta_mutau: s[16],
        });
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.mix_dirty || self.dm_dirty || self.prop_dirty || self.eps_dirty
    }
}

impl<D: NsiDiagonalizer> Default for OscCalcNsi<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Same parameters, fresh diagonalizer, nothing cached.
impl<D: NsiDiagonalizer> Clone for OscCalcNsi<D> {
    fn clone(&self) -> Self {
        let mut copy = Self::build(self.config.clone());
        copy.params = self.params;
        copy.nsi = self.nsi;
        copy
    }
}

impl<D: NsiDiagonalizer> OscCalc<f64> for OscCalcNsi<D> {
    fn try_p(&mut self, flav_before: i32, flav_after: i32, e: f64) -> OscResult<f64> {
        let (sign, from, to) = decode_transition(flav_before, flav_after)?;
        let (e, bits) = energy_key(e);
        let key = (bits, sign);

        if self.is_dirty() || self.prev != Some(key) {
            let p = self.params;
            if self.mix_dirty {
                self.diag.set_mix(p.th12, p.th23, p.th13, p.dcp);
            }
            if self.dm_dirty {
                self.diag.set_delta_msqrs(p.dmsq21, p.dmsq32);
            }
            if self.eps_dirty {
                self.diag.set_nsi(&self.nsi);
            }

            trace!(energy = e, ?sign, "recomputing NSI oscillation probabilities");
            let ne = p.rho * self.config.electron_fraction;
            for i in Flavor::ALL {
                self.diag.reset_to_flavour(i);
                self.diag.prop_matter(p.l, e, ne, sign);
                for j in Flavor::ALL {
                    self.probs[i.index()][j.index()] = self.diag.p(j);
                }
            }

            self.mix_dirty = false;
            self.dm_dirty = false;
            self.prop_dirty = false;
            self.eps_dirty = false;
            self.prev = Some(key);
        }

        Ok(self.probs[from.index()][to.index()])
    }
}

impl<D: NsiDiagonalizer> OscCalcAdjustable<f64> for OscCalcNsi<D> {
    fn params(&self) -> &OscParams<f64> {
        &self.params
    }

    fn set_l(&mut self, l: f64) {
        self.prop_dirty = true;
        self.params.l = l;
    }

    fn set_rho(&mut self, rho: f64) {
        self.prop_dirty = true;
        self.params.rho = rho;
    }

    fn set_dmsq21(&mut self, dmsq21: f64) {
        self.dm_dirty = true;
        self.params.dmsq21 = dmsq21;
    }

    fn set_dmsq32(&mut self, dmsq32: f64) {
        self.dm_dirty = true;
        self.params.dmsq32 = dmsq32;
    }

    fn set_th12(&mut self, th12: f64) {
        self.mix_dirty = true;
        self.params.th12 = th12;
    }

    fn set_th13(&mut self, th13: f64) {
        self.mix_dirty = true;
        self.params.th13 = th13;
    }

    fn set_th23(&mut self, th23: f64) {
        self.mix_dirty = true;
        self.params.th23 = th23;
    }

    fn set_dcp(&mut self, dcp: f64) {
        self.mix_dirty = true;
        self.params.dcp = dcp;
    }
}
