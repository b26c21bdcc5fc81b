//! # Implicit Quantities
//!
//! The four quantities the standard defines only through an equation:
//!
//! | Quantity | Equation              | Valid interval      | Closed form |
//! |----------|-----------------------|---------------------|-------------|
//! | ψ        | cubic, Figure 7       | [0, 1]              | yes         |
//! | ξ        | cubic, Annex A.9      | [j^(2/3), j]        | yes         |
//! | η        | Annex A.10            | [0, 1]              | no          |
//! | T_pi, ν2 | Annex A.7, in x = f·T_pi | (0, 2] bracket, x > 0 | no     |
//!
//! Residuals live in [`crate::equations`]; this module only states the search
//! intervals and seeds and wraps the solve.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{cubic, ImplicitEquation, TieredSolver};
use crate::equations::memo::{arg_key, ArgKey, MemoMap};
use crate::equations::{
    contraction_time_residual, eta_residual, psi_cubic_coefficients, psi_residual, xi_residual,
};
use crate::errors::CalcResult;

/// Slack on the ξ interval bounds for roots that land on an end point.
const XI_SLACK: f64 = 1e-7;

/// Upper edge of the η search interval.
const ETA_UPPER: f64 = 0.99999;

// =============================================================================
// ψ
// =============================================================================

/// `φ²·ψ³ + φ·(2 + ζ)·ψ² + (1 + 2ζ)·ψ - ζ·(2 + φ) = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsiEquation {
    pub phi: f64,
    pub zeta: f64,
}

impl ImplicitEquation for PsiEquation {
    const QUANTITY: &'static str = "psi";

    fn residual(&self, psi: f64) -> f64 {
        psi_residual(psi, self.phi, self.zeta)
    }

    fn bracket(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn seeds(&self) -> Vec<f64> {
        vec![0.1, 0.5, 0.9]
    }

    fn accepts(&self, psi: f64) -> bool {
        (0.0..=1.0).contains(&psi)
    }

    fn closed_form(&self) -> Option<Vec<f64>> {
        Some(cubic::real_roots(psi_cubic_coefficients(self.phi, self.zeta)))
    }
}

/// Tension factor ψ
pub fn solve_psi(solver: &TieredSolver, phi: f64, zeta: f64) -> CalcResult<f64> {
    Ok(solver.solve(&PsiEquation { phi, zeta })?.value)
}

// =============================================================================
// ξ
// =============================================================================

/// `ξ³ + ε_st·ξ² - j²·(1 + ε_st) = 0` with `j ≥ 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XiEquation {
    pub j: f64,
    pub eps_st: f64,
}

impl ImplicitEquation for XiEquation {
    const QUANTITY: &'static str = "xi";

    fn residual(&self, xi: f64) -> f64 {
        xi_residual(xi, self.j, self.eps_st)
    }

    fn bracket(&self) -> (f64, f64) {
        (self.j.powf(2.0 / 3.0), self.j)
    }

    fn seeds(&self) -> Vec<f64> {
        let (lo, hi) = self.bracket();
        vec![0.5 * (lo + hi), lo, hi]
    }

    fn accepts(&self, xi: f64) -> bool {
        let (lo, hi) = self.bracket();
        xi >= lo - XI_SLACK && xi <= hi + XI_SLACK
    }

    fn closed_form(&self) -> Option<Vec<f64>> {
        Some(cubic::real_roots([
            1.0,
            self.eps_st,
            0.0,
            -self.j * self.j * (1.0 + self.eps_st),
        ]))
    }
}

/// Factor ξ for clashing sub-conductors
pub fn solve_xi(solver: &TieredSolver, j: f64, eps_st: f64) -> CalcResult<f64> {
    Ok(solver.solve(&XiEquation { j, eps_st })?.value)
}

// =============================================================================
// η
// =============================================================================

/// Annex A.10 equation for η with `j < 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtaEquation {
    pub eps_st: f64,
    pub j: f64,
    pub nu_3: f64,
    pub n: f64,
    pub a_s: f64,
    pub d: f64,
}

impl ImplicitEquation for EtaEquation {
    const QUANTITY: &'static str = "eta";

    fn residual(&self, eta: f64) -> f64 {
        eta_residual(eta, self.eps_st, self.j, self.nu_3, self.n, self.a_s, self.d)
    }

    fn bracket(&self) -> (f64, f64) {
        (1e-8, ETA_UPPER)
    }

    fn seeds(&self) -> Vec<f64> {
        vec![0.2, 0.5, 0.8]
    }

    fn accepts(&self, eta: f64) -> bool {
        (0.0..=1.0).contains(&eta)
    }
}

/// Factor η for sub-conductors that do not clash.
///
/// When the residual is still negative at the upper edge of the interval the
/// sub-conductors touch and η = 1 without a search.
pub fn solve_eta(solver: &TieredSolver, equation: EtaEquation) -> CalcResult<f64> {
    if equation.residual(ETA_UPPER) < 0.0 {
        debug!(j = equation.j, "sub-conductors touch, eta = 1");
        return Ok(1.0);
    }
    Ok(solver.solve(&equation)?.value)
}

// =============================================================================
// T_pi AND ν2
// =============================================================================

/// Annex A.7 contraction-time equation in `x = f·T_pi`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractionTimeEquation {
    pub nu_1: f64,
    pub f: f64,
    pub tau: f64,
    pub gamma: f64,
}

impl ImplicitEquation for ContractionTimeEquation {
    const QUANTITY: &'static str = "T_pi";

    fn residual(&self, x: f64) -> f64 {
        contraction_time_residual(x, self.nu_1, self.f, self.tau, self.gamma)
    }

    fn bracket(&self) -> (f64, f64) {
        (1e-12, 2.0)
    }

    fn seeds(&self) -> Vec<f64> {
        vec![self.nu_1, 0.1, 0.5, 1.2]
    }

    fn accepts(&self, x: f64) -> bool {
        x > 0.0
    }
}

/// Time to the peak pinch force and the factor derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractionTime {
    /// T_pi in s
    pub t_pi: f64,
    /// ν2 = (ν1 / (f·T_pi))²
    pub nu_2: f64,
}

static CONTRACTION_TIME_MEMO: Lazy<MemoMap<ArgKey<6>, ContractionTime>> =
    Lazy::new(|| MemoMap::new(64));

/// Contraction time T_pi and factor ν2.
///
/// The result does not depend on the static tension, so a sweep solves it
/// once; successful solves are memoized by their exact arguments together
/// with the solver tolerance and iteration cap.
pub fn solve_contraction_time(
    solver: &TieredSolver,
    nu_1: f64,
    f: f64,
    tau: f64,
    gamma: f64,
) -> CalcResult<ContractionTime> {
    let key = arg_key([
        nu_1,
        f,
        tau,
        gamma,
        solver.config.tolerance,
        solver.config.max_iterations as f64,
    ]);
    CONTRACTION_TIME_MEMO.get_or_try_insert_with(key, || {
        let x = solver.solve(&ContractionTimeEquation { nu_1, f, tau, gamma })?.value;
        Ok(ContractionTime {
            t_pi: x / f,
            nu_2: (nu_1 / x).powi(2),
        })
    })
}
