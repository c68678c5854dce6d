//! Energy-keyed cache of diagonalizers.
//!
//! A fit configures one set of parameters and then asks for every flavor
//! combination over a fixed set of energies (bin centres), but rarely in an
//! order that lets a single diagonalizer reuse its work. So each
//! (sign, energy) gets its own diagonalizer, and all nine probabilities are
//! stored the first time any of them is needed.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::CalcConfig;
use crate::diagonalizer::{Diagonalizer, NuFastDiagonalizer};
use crate::error::OscResult;
use crate::flavor::{decode_transition, energy_key, Flavor, Sign};
use crate::nufast::ProbabilityMatrix;
use crate::params::{Epochs, OscCalc, OscCalcAdjustable, OscParams, ParamStore};
use crate::scalar::Scalar;

struct CacheEntry<S, D> {
    diag: D,
    recorded: Epochs,
    probs: ProbabilityMatrix<S>,
}

impl<S: Scalar, D: Diagonalizer<S>> CacheEntry<S, D> {
    fn new(diag: D) -> Self {
        Self {
            diag,
            recorded: Epochs::default(),
            probs: [[S::zero(); 3]; 3],
        }
    }

    /// Bring the entry up to `current`. Mixing and splittings are pushed
    /// only if their own group moved; the propagation always reruns.
    fn refresh(&mut self, params: &OscParams<S>, current: Epochs, ne: f64, e: f64, sign: Sign) {
        if current.mix > self.recorded.mix {
            self.diag
                .set_mix(params.th12, params.th23, params.th13, params.dcp);
            self.recorded.mix = current.mix;
        }
        if current.dm > self.recorded.dm {
            self.diag.set_delta_msqrs(params.dmsq21, params.dmsq32);
            self.recorded.dm = current.dm;
        }

        trace!(energy = e, ?sign, "recomputing oscillation probabilities");
        for from in Flavor::ALL {
            self.diag.reset_to_flavour(from);
            self.diag.prop_matter(params.l, e, ne, sign);
            for to in Flavor::ALL {
                self.probs[from.index()][to.index()] = self.diag.p(to);
            }
        }
        self.recorded.lr = current.lr;
    }
}

/// Calculator that memoizes diagonalizations per (sign, energy).
///
/// Staleness is decided by comparing the calculator's [`Epochs`] against the
/// ones recorded on each entry, never by comparing parameter values.
///
/// ```rust
/// use osccalc::{OscCalc, OscCalcAdjustable, PmnsOptCalc};
///
/// let mut calc = PmnsOptCalc::<f64>::new();
/// calc.set_th12(0.5843);
/// calc.set_th13(0.1477);
/// calc.set_th23(0.7367);
/// calc.set_dcp(0.0);
/// calc.set_dmsq21(7.53e-5);
/// calc.set_dmsq32(2.51e-3);
/// calc.set_rho(2.8);
/// calc.set_l(1300.0);
///
/// let total: f64 = [12, 14, 16].iter().map(|&f| calc.p(14, f, 2.0)).sum();
/// assert!((total - 1.0).abs() < 1e-9);
/// ```
pub struct PmnsOptCalc<S, D = NuFastDiagonalizer<S>> {
    store: ParamStore<S>,
    config: CalcConfig,
    /// Indexed by [`Sign::slot`], keyed by the energy's bit pattern with
    /// `-0.0` folded onto `0.0`.
    cache: [HashMap<u64, CacheEntry<S, D>>; 2],
}

impl<S: Scalar, D: Diagonalizer<S>> PmnsOptCalc<S, D> {
    pub fn new() -> Self {
        Self::build(CalcConfig::default())
    }

    pub fn with_config(config: CalcConfig) -> OscResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CalcConfig) -> Self {
        Self {
            store: ParamStore::default(),
            config,
            cache: [HashMap::new(), HashMap::new()],
        }
    }

    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    pub fn epochs(&self) -> Epochs {
        self.store.epochs()
    }

    /// Number of cached energies for one sign.
    pub fn cache_len(&self, sign: Sign) -> usize {
        self.cache[sign.slot()].len()
    }

    /// Drop a partition that outgrew the limit. The caller is probably
    /// passing per-event energies rather than bin centres.
    fn evict_oversized(&mut self) {
        for (slot, map) in self.cache.iter_mut().enumerate() {
            if map.len() > self.config.cache_limit {
                debug!(
                    partition = slot,
                    size = map.len(),
                    "oscillation cache over limit, clearing partition"
                );
                map.clear();
            }
        }
    }
}

impl<S: Scalar, D: Diagonalizer<S>> Default for PmnsOptCalc<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies parameters and epochs; the cache starts empty so no diagonalizer
/// is ever owned by two calculators.
impl<S: Scalar, D: Diagonalizer<S>> Clone for PmnsOptCalc<S, D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            cache: [HashMap::new(), HashMap::new()],
        }
    }
}

impl<S: Scalar, D: Diagonalizer<S>> OscCalc<S> for PmnsOptCalc<S, D> {
    fn try_p(&mut self, flav_before: i32, flav_after: i32, e: f64) -> OscResult<S> {
        self.evict_oversized();

        let (sign, from, to) = decode_transition(flav_before, flav_after)?;
        let (e, key) = energy_key(e);

        let current = self.store.epochs();
        let params = *self.store.params();
        let ne = params.rho * self.config.electron_fraction;

        let config = &self.config;
        let entry = self.cache[sign.slot()]
            .entry(key)
            .or_insert_with(|| CacheEntry::new(D::from_config(config)));

        if current.is_newer_than(&entry.recorded) {
            entry.refresh(&params, current, ne, e, sign);
        }

        Ok(entry.probs[from.index()][to.index()])
    }
}

impl<S: Scalar, D: Diagonalizer<S>> OscCalcAdjustable<S> for PmnsOptCalc<S, D> {
    fn params(&self) -> &OscParams<S> {
        self.store.params()
    }

    fn set_l(&mut self, l: f64) {
        self.store.set_l(l);
    }

    fn set_rho(&mut self, rho: f64) {
        self.store.set_rho(rho);
    }

    fn set_dmsq21(&mut self, dmsq21: S) {
        self.store.set_dmsq21(dmsq21);
    }

    fn set_dmsq32(&mut self, dmsq32: S) {
        self.store.set_dmsq32(dmsq32);
    }

    fn set_th12(&mut self, th12: S) {
        self.store.set_th12(th12);
    }

    fn set_th13(&mut self, th13: S) {
        self.store.set_th13(th13);
    }

    fn set_th23(&mut self, th23: S) {
        self.store.set_th23(th23);
    }

    fn set_dcp(&mut self, dcp: S) {
        self.store.set_dcp(dcp);
    }
}
