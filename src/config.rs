//! Runtime configuration for the calculators.

use serde::{Deserialize, Serialize};

use crate::error::{OscError, OscResult};

/// Number of cached energies per sign partition before the partition is dropped.
pub const DEFAULT_CACHE_LIMIT: usize = 10_000;

/// Z/A of ordinary matter.
pub const DEFAULT_ELECTRON_FRACTION: f64 = 0.5;

/// Tuning knobs shared by [`PmnsOptCalc`](crate::PmnsOptCalc) and
/// [`OscCalcNsi`](crate::OscCalcNsi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// Maximum entries per sign partition. Exceeding it clears the whole
    /// partition on the next probability request.
    pub cache_limit: usize,

    /// Electron fraction Y_e; the effective electron density handed to the
    /// diagonalizer is `rho * electron_fraction`.
    pub electron_fraction: f64,

    /// Newton refinements of the largest matter eigenvalue (NuFast only).
    pub newton_iterations: u8,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            cache_limit: DEFAULT_CACHE_LIMIT,
            electron_fraction: DEFAULT_ELECTRON_FRACTION,
            newton_iterations: 2,
        }
    }
}

impl CalcConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> OscResult<()> {
        if self.cache_limit == 0 {
            return Err(OscError::Config("cache_limit must be > 0".to_string()));
        }
        if !self.electron_fraction.is_finite()
            || self.electron_fraction <= 0.0
            || self.electron_fraction > 1.0
        {
            return Err(OscError::Config(format!(
                "electron_fraction must be in (0, 1], got {}",
                self.electron_fraction
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> OscResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| OscError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
