//! # Error Types
//!
//! Structured error types for sc_force_core. Every failure that can reach a
//! caller is one of these variants, serialized with a `type` tag so that a
//! presentation layer can react to the kind of failure without parsing text.
//!
//! ## Taxonomy
//!
//! - [`CalcError::InvalidInput`] / [`CalcError::MissingField`] - the input record
//!   was rejected before any regime ran
//! - [`CalcError::UnsupportedRegime`] - no pipeline exists for the installation
//! - [`CalcError::SolverFailure`] - an implicit quantity has no valid root
//! - [`CalcError::Cancelled`] - a sweep was superseded by a newer run
//!
//! ## Example
//!
//! ```rust
//! use sc_force_core::errors::{CalcError, CalcResult};
//!
//! fn validate_span(l: f64) -> CalcResult<()> {
//!     if l <= 0.0 {
//!         return Err(CalcError::invalid_input("l", l.to_string(), "Span must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(validate_span(-1.0).unwrap_err().error_code(), "INVALID_INPUT");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for sc_force_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, inconsistent)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// No calculation pipeline for this installation
    #[error(
        "No calculation regime for attachment '{attachment}', loop at midspan '{loop_at_midspan}', \
         height difference >25% '{height_difference}', loop plane '{loop_plane}'"
    )]
    UnsupportedRegime {
        attachment: String,
        loop_at_midspan: String,
        height_difference: String,
        loop_plane: String,
    },

    /// The tiered root solver exhausted every tier
    #[error("No valid root for {quantity} ({mode} mode): {reason}")]
    SolverFailure {
        quantity: String,
        mode: String,
        reason: String,
    },

    /// A sweep was cancelled because a newer run superseded it
    #[error("Run {run_id} cancelled")]
    Cancelled { run_id: u64 },

    /// Calculation produced a non-physical intermediate
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a SolverFailure error
    pub fn solver_failure(
        quantity: impl Into<String>,
        mode: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::SolverFailure {
            quantity: quantity.into(),
            mode: mode.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(
        calculation_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// True for the deliberate abort of a superseded sweep.
    ///
    /// Callers should not report these as failures.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CalcError::Cancelled { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnsupportedRegime { .. } => "UNSUPPORTED_REGIME",
            CalcError::SolverFailure { .. } => "SOLVER_FAILURE",
            CalcError::Cancelled { .. } => "CANCELLED",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::solver_failure("eta", "normal", "no sign change");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"SolverFailure\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("d").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::Cancelled { run_id: 3 }.error_code(), "CANCELLED");
        assert!(CalcError::Cancelled { run_id: 3 }.is_cancellation());
        assert!(!CalcError::missing_field("d").is_cancellation());
    }

    #[test]
    fn test_unsupported_regime_message_echoes_tuple() {
        let error = CalcError::UnsupportedRegime {
            attachment: "Suspended".to_string(),
            loop_at_midspan: "yes".to_string(),
            height_difference: "yes".to_string(),
            loop_plane: "parallel".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("Suspended"));
        assert!(msg.contains("parallel"));
    }
}
