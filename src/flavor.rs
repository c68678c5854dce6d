//! PDG flavor codes.
//!
//! Calculators take flavors as signed PDG codes: ±12 electron, ±14 muon,
//! ±16 tau, with a negative sign for antineutrinos. All decoding goes
//! through [`decode_transition`] so the precondition checks live in one place.

use crate::error::{OscError, OscResult};

/// Neutrino flavor, indexed 0 = e, 1 = μ, 2 = τ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Electron,
    Muon,
    Tau,
}

impl Flavor {
    pub const ALL: [Flavor; 3] = [Flavor::Electron, Flavor::Muon, Flavor::Tau];

    /// Row/column index into a probability matrix.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Flavor::Electron => 0,
            Flavor::Muon => 1,
            Flavor::Tau => 2,
        }
    }

    /// Unsigned PDG code.
    pub fn pdg(self) -> i32 {
        match self {
            Flavor::Electron => 12,
            Flavor::Muon => 14,
            Flavor::Tau => 16,
        }
    }
}

/// Neutrino vs antineutrino.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Neutrino,
    Antineutrino,
}

impl Sign {
    /// +1 for neutrinos, -1 for antineutrinos.
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            Sign::Neutrino => 1.0,
            Sign::Antineutrino => -1.0,
        }
    }

    /// Cache partition index.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Sign::Neutrino => 0,
            Sign::Antineutrino => 1,
        }
    }
}

/// Decode one signed PDG code.
pub fn decode_flavor(code: i32) -> OscResult<(Sign, Flavor)> {
    let flavor = match code.checked_abs() {
        Some(12) => Flavor::Electron,
        Some(14) => Flavor::Muon,
        Some(16) => Flavor::Tau,
        _ => return Err(OscError::UnknownFlavor(code)),
    };
    let sign = if code > 0 {
        Sign::Neutrino
    } else {
        Sign::Antineutrino
    };
    Ok((sign, flavor))
}

/// Decode an initial/final pair; both must be neutrinos or both antineutrinos.
pub fn decode_transition(before: i32, after: i32) -> OscResult<(Sign, Flavor, Flavor)> {
    let (sign, from) = decode_flavor(before)?;
    let (sign_after, to) = decode_flavor(after)?;
    if sign != sign_after {
        return Err(OscError::SignMismatch { before, after });
    }
    Ok((sign, from, to))
}

/// Normalized energy and the bit pattern the caches key it by. `-0.0` folds
/// onto `0.0` so both spellings of zero share one entry.
#[inline]
pub(crate) fn energy_key(e: f64) -> (f64, u64) {
    let e = if e == 0.0 { 0.0 } else { e };
    (e, e.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_zero_energies_share_a_key() {
        assert_eq!(energy_key(-0.0).1, energy_key(0.0).1);
        assert_eq!(energy_key(-0.0).0.to_bits(), 0.0f64.to_bits());
        assert_ne!(energy_key(2.0).1, energy_key(-2.0).1);
    }

    #[test]
    fn test_decode_all_codes() {
        for flavor in Flavor::ALL {
            assert_eq!(decode_flavor(flavor.pdg()), Ok((Sign::Neutrino, flavor)));
            assert_eq!(
                decode_flavor(-flavor.pdg()),
                Ok((Sign::Antineutrino, flavor))
            );
        }
        assert_eq!(Flavor::Tau.index(), 2);
    }

    #[test]
    fn test_decode_rejects_unknown() {
        for code in [0, 11, -13, 18, i32::MIN] {
            assert_eq!(decode_flavor(code), Err(OscError::UnknownFlavor(code)));
        }
    }

    #[test]
    fn test_transition_sign_mismatch() {
        assert_eq!(
            decode_transition(14, -12),
            Err(OscError::SignMismatch {
                before: 14,
                after: -12
            })
        );
        assert_eq!(
            decode_transition(-14, -12),
            Ok((Sign::Antineutrino, Flavor::Muon, Flavor::Electron))
        );
        assert!(matches!(
            decode_transition(14, 15),
            Err(OscError::UnknownFlavor(15))
        ));
    }
}
