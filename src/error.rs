//! Error type shared by the calculators.

use thiserror::Error;

/// Failures reported by the flavor decoder, state setters and configuration.
///
/// The probability entry points treat flavor errors as fatal and panic with
/// the message; `try_p` hands them back instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OscError {
    /// PDG code magnitude is not one of 12, 14, 16.
    #[error("unknown flavor code {0} (expected ±12, ±14 or ±16)")]
    UnknownFlavor(i32),

    /// Initial and final flavor codes disagree on neutrino vs antineutrino.
    #[error("flavor sign mismatch: {before} -> {after}")]
    SignMismatch { before: i32, after: i32 },

    /// State vector has the wrong number of entries.
    #[error("state vector must have {expected} entries, got {got}")]
    StateLength { expected: usize, got: usize },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

pub type OscResult<T> = Result<T, OscError>;
