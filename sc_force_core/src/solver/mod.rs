//! # Tiered Root Solver
//!
//! Finds the physically valid root of an implicit scalar equation. The
//! standard defines four quantities only implicitly (ψ, ξ, η and the
//! contraction time T_pi); each is described by an [`ImplicitEquation`] in
//! [`implicit`] and solved by a [`TieredSolver`].
//!
//! ## Tiers
//!
//! 1. **Closed form** ([`cubic`]) for the polynomial problems, roots outside
//!    the valid interval discarded
//! 2. **Bracketing** ([`bracket`]): Brent's method when the residual changes
//!    sign across the interval
//! 3. **Multi-start Newton** ([`newton`]) from a few seed points
//!
//! In [`SolverMode::Normal`] the numeric tiers decide the root and the closed
//! form serves as a cross-check, taking over only when both numeric tiers fail.
//! [`SolverMode::Loop`] skips the closed form (the sweep runs thousands of
//! solves). Exhausting every tier is a [`CalcError::SolverFailure`]; no default
//! value is ever substituted.
//!
//! ## Example
//!
//! ```rust
//! use sc_force_core::solver::{implicit::PsiEquation, TieredSolver};
//!
//! let solver = TieredSolver::default();
//! let root = solver.solve(&PsiEquation { phi: 9.72, zeta: 3.84 }).unwrap();
//! assert!((root.value - 0.594).abs() < 1e-3);
//! ```

pub mod bracket;
pub mod cubic;
pub mod implicit;
pub mod newton;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::errors::{CalcError, CalcResult};

/// Whether the closed-form tier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// All tiers; closed form as cross-check and last resort
    #[default]
    Normal,
    /// Numeric tiers only, used while sweeping
    Loop,
}

impl fmt::Display for SolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverMode::Normal => write!(f, "normal"),
            SolverMode::Loop => write!(f, "loop"),
        }
    }
}

/// Tolerances and iteration budgets of the numeric tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Absolute bracket width for Brent, relative step size for Newton
    pub tolerance: f64,
    /// Iteration cap per tier attempt
    pub max_iterations: usize,
    /// Largest accepted difference between closed-form and numeric root
    pub agreement_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 200,
            agreement_tolerance: 1e-9,
        }
    }
}

/// The tier that produced a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverTier {
    ClosedForm,
    Bracket,
    Newton,
}

/// A root together with the tier that found it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub value: f64,
    pub tier: SolverTier,
}

/// An implicit scalar equation `g(x) = 0` with one physically valid root.
pub trait ImplicitEquation {
    /// Name of the solved quantity, used in logs and errors
    const QUANTITY: &'static str;

    fn residual(&self, x: f64) -> f64;

    /// Interval searched by the bracketing tier
    fn bracket(&self) -> (f64, f64);

    /// Start points of the Newton tier, tried in order
    fn seeds(&self) -> Vec<f64>;

    /// Whether `x` is a physically valid root
    fn accepts(&self, x: f64) -> bool;

    /// All real roots from an algebraic solution, if one exists
    fn closed_form(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Runs the tier cascade for an [`ImplicitEquation`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TieredSolver {
    pub config: SolverConfig,
    pub mode: SolverMode,
}

impl TieredSolver {
    pub fn new(config: SolverConfig, mode: SolverMode) -> Self {
        Self { config, mode }
    }

    /// Same configuration, different mode
    pub fn with_mode(self, mode: SolverMode) -> Self {
        Self { mode, ..self }
    }

    /// Find the valid root of `equation`.
    ///
    /// # Errors
    /// [`CalcError::SolverFailure`] when no tier produces an accepted root.
    pub fn solve<E: ImplicitEquation>(&self, equation: &E) -> CalcResult<Root> {
        let closed = match self.mode {
            SolverMode::Normal => self.closed_form_root(equation),
            SolverMode::Loop => None,
        };

        match (self.numeric_root(equation), closed) {
            (Some(root), Some(algebraic)) => {
                let scale = root.value.abs().max(1.0);
                if (root.value - algebraic).abs() > self.config.agreement_tolerance * scale {
                    warn!(
                        quantity = E::QUANTITY,
                        numeric = root.value,
                        closed_form = algebraic,
                        "Closed-form and numeric roots disagree; keeping the numeric root"
                    );
                }
                Ok(root)
            }
            (Some(root), None) => Ok(root),
            (None, Some(algebraic)) => {
                warn!(
                    quantity = E::QUANTITY,
                    root = algebraic,
                    "Numeric tiers failed; using the closed-form root"
                );
                Ok(Root {
                    value: algebraic,
                    tier: SolverTier::ClosedForm,
                })
            }
            (None, None) => Err(CalcError::solver_failure(
                E::QUANTITY,
                self.mode.to_string(),
                "no tier produced a root inside the valid interval",
            )),
        }
    }

    fn closed_form_root<E: ImplicitEquation>(&self, equation: &E) -> Option<f64> {
        let root = equation
            .closed_form()?
            .into_iter()
            .find(|x| x.is_finite() && equation.accepts(*x));
        debug!(quantity = E::QUANTITY, ?root, "closed-form tier");
        root
    }

    fn numeric_root<E: ImplicitEquation>(&self, equation: &E) -> Option<Root> {
        let (lo, hi) = equation.bracket();
        let bracketed = bracket::brent(
            |x| equation.residual(x),
            lo,
            hi,
            self.config.tolerance,
            self.config.max_iterations,
        )
        .filter(|x| equation.accepts(*x));

        if let Some(value) = bracketed {
            debug!(quantity = E::QUANTITY, value, "bracket tier converged");
            return Some(Root {
                value,
                tier: SolverTier::Bracket,
            });
        }

        debug!(quantity = E::QUANTITY, lo, hi, "no sign change in bracket, trying Newton seeds");
        let value = newton::multistart(
            |x| equation.residual(x),
            &equation.seeds(),
            |x| equation.accepts(x),
            self.config.tolerance,
            self.config.max_iterations,
        )?;
        debug!(quantity = E::QUANTITY, value, "Newton tier converged");
        Some(Root {
            value,
            tier: SolverTier::Newton,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `x² - 2 = 0` on [0, 2], with a closed form that can be made to lie
    struct Sqrt2 {
        closed: Option<Vec<f64>>,
        bracket: (f64, f64),
    }

    impl ImplicitEquation for Sqrt2 {
        const QUANTITY: &'static str = "sqrt2";

        fn residual(&self, x: f64) -> f64 {
            x * x - 2.0
        }

        fn bracket(&self) -> (f64, f64) {
            self.bracket
        }

        fn seeds(&self) -> Vec<f64> {
            vec![1.0]
        }

        fn accepts(&self, x: f64) -> bool {
            (0.0..=2.0).contains(&x)
        }

        fn closed_form(&self) -> Option<Vec<f64>> {
            self.closed.clone()
        }
    }

    /// No real root at all
    struct Hopeless;

    impl ImplicitEquation for Hopeless {
        const QUANTITY: &'static str = "hopeless";

        fn residual(&self, x: f64) -> f64 {
            x * x + 1.0
        }

        fn bracket(&self) -> (f64, f64) {
            (-1.0, 1.0)
        }

        fn seeds(&self) -> Vec<f64> {
            vec![0.5]
        }

        fn accepts(&self, _x: f64) -> bool {
            true
        }
    }

    #[test]
    fn test_numeric_root_wins_over_closed_form() {
        let equation = Sqrt2 {
            closed: Some(vec![-1.5, 1.5]),
            bracket: (0.0, 2.0),
        };
        let root = TieredSolver::default().solve(&equation).unwrap();
        assert_eq!(root.tier, SolverTier::Bracket);
        assert!((root.value - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_newton_when_bracket_has_no_sign_change() {
        let equation = Sqrt2 {
            closed: None,
            bracket: (1.5, 2.0),
        };
        let root = TieredSolver::default().solve(&equation).unwrap();
        assert_eq!(root.tier, SolverTier::Newton);
        assert!((root.value - std::f64::consts::SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn test_closed_form_is_last_resort_in_normal_mode_only() {
        let fallback = Hopeless;
        let err = TieredSolver::default().solve(&fallback).unwrap_err();
        assert_eq!(err.error_code(), "SOLVER_FAILURE");

        struct ClosedOnly;
        impl ImplicitEquation for ClosedOnly {
            const QUANTITY: &'static str = "closed_only";
            fn residual(&self, _x: f64) -> f64 {
                f64::NAN
            }
            fn bracket(&self) -> (f64, f64) {
                (0.0, 1.0)
            }
            fn seeds(&self) -> Vec<f64> {
                vec![0.5]
            }
            fn accepts(&self, x: f64) -> bool {
                (0.0..=1.0).contains(&x)
            }
            fn closed_form(&self) -> Option<Vec<f64>> {
                Some(vec![3.0, 0.25])
            }
        }

        let root = TieredSolver::default().solve(&ClosedOnly).unwrap();
        assert_eq!(root.tier, SolverTier::ClosedForm);
        assert_eq!(root.value, 0.25);

        let err = TieredSolver::default()
            .with_mode(SolverMode::Loop)
            .solve(&ClosedOnly)
            .unwrap_err();
        match err {
            CalcError::SolverFailure { quantity, mode, .. } => {
                assert_eq!(quantity, "closed_only");
                assert_eq!(mode, "loop");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SolverMode::Normal.to_string(), "normal");
        assert_eq!(SolverMode::Loop.to_string(), "loop");
        assert_eq!(SolverMode::default(), SolverMode::Normal);
    }
}
