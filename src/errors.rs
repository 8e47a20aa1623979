//! Shared error types used across submodules.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::ExportError;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum EmWaveError {
    /// Raised when a wave, medium, grid or timeline parameter is rejected at construction.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// Raised when a configuration file cannot be read or parsed.
    #[error("failed to load config {}: {reason}", path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying read or parse failure.
        reason: String,
    },
    /// Wraps export failures.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl EmWaveError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for construction-time parameter errors.
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, EmWaveError> {
    if !value.is_finite() {
        return Err(EmWaveError::invalid(name, format!("must be finite, got {value}")));
    }
    if value <= 0.0 {
        return Err(EmWaveError::invalid(name, format!("must be positive, got {value}")));
    }
    Ok(value)
}
