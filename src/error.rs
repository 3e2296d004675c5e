//! Error types for pumpsim.
//!
//! Two classes of failure exist in the panel model:
//!
//! 1. **Configuration errors** fail fast. A missing or nonsensical
//!    apparatus parameter is an authoring mistake and is never papered
//!    over with a default.
//! 2. **Physical out-of-range conditions** are never errors. They are
//!    clamped inside the tick and surface only as panel warnings.
//!
//! The remaining variants cover the Jidoka guard (a tick produced a
//! defective state) and the I/O surfaces of the drill runner.

use thiserror::Error;

/// Result type alias for pumpsim operations.
pub type PanelResult<T> = Result<T, PanelError>;

/// Unified error type for all pumpsim operations.
#[derive(Debug, Error)]
pub enum PanelError {
    // ===== Configuration Errors =====
    /// Invalid apparatus or tuning parameter.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// Tick called with a negative or non-finite time slice.
    #[error("Invalid timestep: {dt} (must be finite and >= 0)")]
    InvalidTimestep {
        /// The rejected time slice in seconds.
        dt: f64,
    },

    /// A drill or command referenced a line that does not exist.
    #[error("Unknown discharge line: {0}")]
    UnknownLine(String),

    // ===== Jidoka Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Field where the non-finite value was detected.
        location: String,
    },

    /// A state field escaped its clamped physical range.
    #[error("Jidoka: invariant '{name}' violated: {value} outside [{min}, {max}]")]
    InvariantViolation {
        /// Name of the violated invariant.
        name: String,
        /// Observed value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    // ===== Input / Output =====
    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PanelError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a non-finite value error for the named field.
    #[must_use]
    pub fn non_finite(location: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            location: location.into(),
        }
    }

    /// Check if this error is a Jidoka violation (defective tick output).
    #[must_use]
    pub const fn is_jidoka_violation(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteValue { .. } | Self::InvariantViolation { .. }
        )
    }

    /// Check if this error came from a bad apparatus or tuning table.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Validation(_))
    }
}
