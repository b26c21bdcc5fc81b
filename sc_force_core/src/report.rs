//! # Calculation Report
//!
//! The record handed to a presentation or reporting layer: input, results at
//! both temperatures and the equations that produced them, stamped with an id
//! and creation time.
//!
//! ## Example
//!
//! ```rust
//! use sc_force_core::calculations::{Dispatcher, FormInput};
//! use sc_force_core::report::CalculationReport;
//!
//! let input = FormInput::twin_bundle_example().normalize().unwrap();
//! let report = CalculationReport::generate(&Dispatcher::default(), input).unwrap();
//!
//! let json = report.to_json().unwrap();
//! assert!(json.contains("\"regime\": \"suspended_plain\""));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{ConductorInput, Dispatcher, Regime, ResultPair};
use crate::equations::{Equation, EquationTracker};
use crate::errors::{CalcError, CalcResult};

/// Version of the engine that produced a report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One dispatcher run with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub regime: Regime,
    pub input: ConductorInput,
    pub results: ResultPair,
    /// Equations evaluated, each listed once
    pub equations: Vec<Equation>,
}

impl CalculationReport {
    /// Run `dispatcher` on `input` and wrap the outcome.
    pub fn generate(dispatcher: &Dispatcher, input: ConductorInput) -> CalcResult<Self> {
        let mut tracker = EquationTracker::new();
        let (regime, results) = dispatcher.calculate_with_tracker(&input, &mut tracker)?;
        Ok(CalculationReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            regime,
            input,
            results,
            equations: tracker.unique_equations(),
        })
    }

    pub fn to_json(&self) -> CalcResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> CalcResult<Self> {
        serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::pipeline::fixtures::single_conductor;
    use crate::calculations::FormInput;

    #[test]
    fn test_report_round_trip() {
        let input = FormInput::twin_bundle_example().normalize().unwrap();
        let report = CalculationReport::generate(&Dispatcher::default(), input).unwrap();
        assert_eq!(report.engine_version, ENGINE_VERSION);
        assert_eq!(report.regime, Regime::SuspendedPlain);
        assert!(report.equations.contains(&Equation::TensionFactorPsi));

        let restored = CalculationReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(restored.id, report.id);
        assert_eq!(restored.equations, report.equations);
        // Floats come back bit-exact, so the stored input is the one calculated
        assert_eq!(restored.input, report.input);
        assert_eq!(restored.results, report.results);
    }

    #[test]
    fn test_equations_listed_once() {
        let report =
            CalculationReport::generate(&Dispatcher::default(), single_conductor()).unwrap();
        let mut sorted = report.equations.clone();
        sorted.sort_by_key(|eq| format!("{:?}", eq));
        sorted.dedup();
        assert_eq!(sorted.len(), report.equations.len());
        assert!(!report.equations.contains(&Equation::ContractionTime));
    }

    #[test]
    fn test_failed_calculation_has_no_report() {
        let input = ConductorInput {
            l: -1.0,
            ..single_conductor()
        };
        let err = CalculationReport::generate(&Dispatcher::default(), input).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_malformed_json() {
        let err = CalculationReport::from_json("{not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
