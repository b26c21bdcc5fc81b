//! # Sub-Conductor Bundle Contraction
//!
//! Tensile force caused by the pinch effect in bundled main conductors,
//! SN EN 60865-1:2012 clauses 6.4.1, 6.4.2 and Annex A.7 to A.10.
//!
//! Two paths exist:
//!
//! - **Effective clashing** (eqs. (52), (53)): sub-conductors are close enough
//!   and spacers far enough apart that they are known to clash. The pinch force
//!   is then a fixed multiple of the swing-out tension (eq. (51)).
//! - **Contraction chain**: ν1 → τ, γ → T_pi/ν2 → ν3 → F_v → ε_st, ε_pi → j,
//!   then ξ (j ≥ 1, sub-conductors clash) or η (j < 1, they only approach),
//!   ν4, νe and finally F_pi,d.
//!
//! The implicit quantities (T_pi, ξ, η) are defined here by their residuals;
//! the root search lives in [`crate::solver`].
//!
//! ## Reference length
//!
//! Wherever the standard uses the spacer distance `l_s`, a bundle without
//! spacers falls back to the effective span (resting conductors) or the cord
//! length (strained conductors). See [`reference_length`].

use serde::{Deserialize, Serialize};

use super::{bundle_sine, mu_0_over_2pi, sqrt_clamped};

/// Outcome of the bundle position test `j ≥ 1`.
///
/// Exactly one of ξ and η exists for a bundle; carrying the solved factor in
/// the variant keeps the two formula sets from ever mixing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BundleContact {
    /// `j ≥ 1`: sub-conductors clash, factor ξ from Annex A.9
    Clashing { xi: f64 },
    /// `j < 1`: sub-conductors approach without clashing, factor η from Annex A.10
    Spread { eta: f64 },
}

impl BundleContact {
    /// Denominator term of νe: `ξ³` or `η⁴`
    #[inline]
    fn nu_e_divisor(self) -> f64 {
        match self {
            BundleContact::Clashing { xi } => xi.powi(3),
            BundleContact::Spread { eta } => eta.powi(4),
        }
    }

    /// Multiplier of `νe/ε_st` in F_pi,d: `ξ` or `η²`
    #[inline]
    fn force_multiplier(self) -> f64 {
        match self {
            BundleContact::Clashing { xi } => xi,
            BundleContact::Spread { eta } => eta * eta,
        }
    }
}

// =============================================================================
// EFFECTIVE CLASHING (6.4.1)
// =============================================================================

/// Whether sub-conductors clash effectively, eqs. (52) and (53)
///
/// ```text
/// a_s/d ≤ 2.0  and  l_s ≥ 50·a_s
/// a_s/d ≤ 2.5  and  l_s ≥ 70·a_s
/// ```
///
/// Single conductors never clash.
#[inline]
pub fn clash_guaranteed(a_s: f64, d: f64, l_s: f64, n: f64) -> bool {
    if n <= 1.0 {
        return false;
    }
    let ratio = a_s / d;
    (ratio <= 2.0 && l_s >= 50.0 * a_s) || (ratio <= 2.5 && l_s >= 70.0 * a_s)
}

/// Pinch force of effectively clashing sub-conductors `F_pi,d = 1.1·F_t,d`, eq. (51)
#[inline]
pub fn bundle_force_direct(f_td: f64) -> f64 {
    1.1 * f_td
}

// =============================================================================
// CONTRACTION CHAIN (6.4.1, ANNEX A.7, A.8)
// =============================================================================

/// Length the contraction formulas use in place of `l_s`.
///
/// The mean spacer distance when spacers exist, otherwise the effective span,
/// otherwise the cord length. `None` only if all three are missing.
pub fn reference_length(l_s: f64, l_eff: Option<f64>, l_c: Option<f64>) -> Option<f64> {
    if l_s != 0.0 {
        return Some(l_s);
    }
    match l_eff {
        Some(le) if le != 0.0 => Some(le),
        _ => l_c,
    }
}

/// Factor ν1
///
/// # Formula (eq. (55))
/// ```text
/// ν1 = f · (1/sin(180°/n)) · √( (a_s - d)·m_s / ((μ0/2π)·(I_k/n)²·(n-1)/a_s) )
/// ```
pub fn contraction_frequency_nu1(i_k: f64, a_s: f64, n: f64, m_s: f64, d: f64, f: f64) -> f64 {
    let pinch = mu_0_over_2pi() * (i_k / n).powi(2) * ((n - 1.0) / a_s);
    f * (1.0 / bundle_sine(n)) * ((a_s - d) * m_s / pinch).sqrt()
}

/// Network time constant τ derived from κ (Annex A.7, Figure 9)
///
/// ```text
/// τ = | 1 / ( (2π·f/3) · ln((κ - 1.02)/0.98) ) |
/// ```
///
/// κ below 1.1 is raised to 1.1 before evaluation.
#[inline]
pub fn network_time_constant(f: f64, kappa: f64) -> f64 {
    let kappa = kappa.max(1.1);
    (1.0 / ((2.0 * std::f64::consts::PI * f / 3.0) * ((kappa - 1.02) / 0.98).ln())).abs()
}

/// Phase angle `γ = arctan(2π·f·τ)` in radians (Annex A.7)
#[inline]
pub fn phase_angle(f: f64, tau: f64) -> f64 {
    (2.0 * std::f64::consts::PI * f * tau).atan()
}

/// Residual of the contraction-time equation at `x = f·T_pi` (Annex A.7)
///
/// ```text
/// g(x) = x · √(1 - A(x) + B(x) - C(x)) - ν1
/// ν2   = 1 - A + B - C = (ν1/x)²   at the root
/// ```
///
/// with `y = f·τ` and
///
/// ```text
/// A = (sin(4πx - 2γ) + sin 2γ) / (4πx)
/// B = (y/x)·(1 - e^(-2x/y))·sin²γ
/// C = 8πy·sin γ / (1 + (2πy)²) · [ (2πy·cos(2πx - γ) + sin(2πx - γ))/(2πx) · e^(-x/y)
///                                  + (sin γ - 2πy·cos γ)/(2πx) ]
/// ```
///
/// Below `x = 1e-12` the residual is `-ν1`. A slightly negative radicand is
/// clamped to zero.
pub fn contraction_time_residual(x: f64, nu_1: f64, f: f64, tau: f64, gamma: f64) -> f64 {
    if x < 1e-12 {
        return -nu_1;
    }
    let pi = std::f64::consts::PI;
    let y = f * tau;
    let two_pi_x = 2.0 * pi * x;
    let four_pi_x = 4.0 * pi * x;
    let decay = (-x / y).exp();

    let a = ((four_pi_x - 2.0 * gamma).sin() + (2.0 * gamma).sin()) / four_pi_x;
    let b = (y / x) * (1.0 - decay * decay) * gamma.sin().powi(2);

    let p = 2.0 * pi * y * (two_pi_x - gamma).cos() / two_pi_x;
    let q = (two_pi_x - gamma).sin() / two_pi_x;
    let r = (gamma.sin() - 2.0 * pi * y * gamma.cos()) / two_pi_x;
    let m = (p + q) * decay + r;
    let c = 8.0 * pi * y * gamma.sin() / (1.0 + (2.0 * pi * y).powi(2)) * m;

    x * sqrt_clamped(1.0 - a + b - c) - nu_1
}

/// Factor ν3 (Annex A.8, Figure 10)
///
/// ```text
/// ν3 = (d/a_s)/sin(180°/n) · √(a_s/d - 1) / arctan √(a_s/d - 1)
/// ```
#[inline]
pub fn nu3_factor(a_s: f64, d: f64, n: f64) -> f64 {
    let s = (a_s / d - 1.0).sqrt();
    (d / a_s) / bundle_sine(n) * (s / s.atan())
}

/// Short-circuit current force between the sub-conductors of a bundle
///
/// # Formula (eq. (54))
/// ```text
/// F_v = (n - 1) · (μ0/2π) · (I_k/n)² · (l_s/a_s) · (ν2/ν3)
/// ```
///
/// `length` is the [`reference_length`].
#[inline]
pub fn interbundle_force_fv(i_k: f64, a_s: f64, length: f64, n: f64, nu_2: f64, nu_3: f64) -> f64 {
    (n - 1.0) * mu_0_over_2pi() * (i_k / n).powi(2) * (length / a_s) * (nu_2 / nu_3)
}

/// Strain factor `ε_st = 1.5 · F_st·l_s²·N / (a_s - d)² · sin²(180°/n)`, eq. (56)
#[inline]
pub fn strain_factor_st(f_st: f64, length: f64, norm: f64, a_s: f64, n: f64, d: f64) -> f64 {
    1.5 * (f_st * length.powi(2) * norm / (a_s - d).powi(2)) * bundle_sine(n).powi(2)
}

/// Strain factor `ε_pi = 0.375·n · F_v·l_s³·N / (a_s - d)³ · sin³(180°/n)`, eq. (57)
#[inline]
pub fn strain_factor_pi(f_v: f64, length: f64, norm: f64, a_s: f64, n: f64, d: f64) -> f64 {
    0.375 * n * (f_v * length.powi(3) * norm / (a_s - d).powi(3)) * bundle_sine(n).powi(3)
}

/// Bundle position parameter `j = √(ε_pi / (1 + ε_st))`, eq. (58)
#[inline]
pub fn bundle_position_j(eps_st: f64, eps_pi: f64) -> f64 {
    (eps_pi / (1.0 + eps_st)).sqrt()
}

// =============================================================================
// IMPLICIT FACTORS ξ AND η (ANNEX A.9, A.10)
// =============================================================================

/// Residual of the ξ cubic (Annex A.9, Figure 11)
///
/// ```text
/// ξ³ + ε_st·ξ² - j²·(1 + ε_st) = 0,   j^(2/3) ≤ ξ ≤ j
/// ```
#[inline]
pub fn xi_residual(xi: f64, j: f64, eps_st: f64) -> f64 {
    xi.powi(3) + eps_st * xi * xi - j * j * (1.0 + eps_st)
}

/// Residual of the η equation (Annex A.10, Figure 12)
///
/// ```text
/// η³ + ε_st·η - j²·(1 + ε_st)·f_η(η) = 0,   0 ≤ η ≤ 1
///
/// f_η   = ν3 / (a_sw/a_s)
/// a_sw/a_s = u/sin(180°/n) · t/arctan t,   u = 1 - η·(1 - d/a_s),   t = √((1 - u)/u)
/// ```
///
/// η is clamped into `[1e-9, 1 - 1e-9]` before evaluation. For `t → 0` the
/// factor `t/arctan t` tends to 1 and is replaced by its limit.
pub fn eta_residual(eta: f64, eps_st: f64, j: f64, nu_3: f64, n: f64, a_s: f64, d: f64) -> f64 {
    let eta = eta.clamp(1e-9, 1.0 - 1e-9);
    let u = 1.0 - eta * (1.0 - d / a_s);
    let t = ((1.0 - u) / u).sqrt();
    let asw_over_as = if t < 1e-7 {
        u / bundle_sine(n)
    } else {
        u / bundle_sine(n) * (t / t.atan())
    };
    let f_eta = nu_3 / asw_over_as;
    eta.powi(3) + eps_st * eta - j * j * (1.0 + eps_st) * f_eta
}

// =============================================================================
// PINCH FORCE (6.4.2)
// =============================================================================

/// Factor ν4, eqs. (61) and (64)
///
/// ```text
/// ν4 = (a_s - d)/d                            for j ≥ 1
/// ν4 = η · (a_s - d) / (a_s - η·(a_s - d))    for j < 1
/// ```
#[inline]
pub fn nu4_factor(a_s: f64, d: f64, contact: BundleContact) -> f64 {
    match contact {
        BundleContact::Clashing { .. } => (a_s - d) / d,
        BundleContact::Spread { eta } => eta * (a_s - d) / (a_s - eta * (a_s - d)),
    }
}

/// Factor νe, eqs. (60) and (63)
///
/// ```text
/// νe = 1/2 + [ (9/8)·n·(n-1)·(μ0/2π)·(I_k/n)²·N·ν2·(l_s/(a_s-d))⁴ · sin⁴(180°/n)/X
///              · (1 - arctan √ν4 / √ν4) - 1/4 ]^(1/2)
/// ```
///
/// with `X = ξ³` for j ≥ 1 and `X = η⁴` for j < 1. The bracket is clamped at zero.
#[allow(clippy::too_many_arguments)]
pub fn nu_e_factor(
    i_k: f64,
    a_s: f64,
    norm: f64,
    n: f64,
    length: f64,
    d: f64,
    nu_2: f64,
    nu_4: f64,
    contact: BundleContact,
) -> f64 {
    let sqrt_nu4 = nu_4.sqrt();
    let bracket = 9.0 / 8.0
        * n
        * (n - 1.0)
        * mu_0_over_2pi()
        * (i_k / n).powi(2)
        * norm
        * nu_2
        * (length / (a_s - d)).powi(4)
        * bundle_sine(n).powi(4)
        / contact.nu_e_divisor()
        * (1.0 - sqrt_nu4.atan() / sqrt_nu4)
        - 0.25;
    0.5 + sqrt_clamped(bracket)
}

/// Pinch force from the contraction chain, eqs. (59) and (62)
///
/// ```text
/// F_pi,d = F_st · (1 + (νe/ε_st)·ξ)    for j ≥ 1
/// F_pi,d = F_st · (1 + (νe/ε_st)·η²)   for j < 1
/// ```
#[inline]
pub fn bundle_force_contracted(f_st: f64, nu_e: f64, eps_st: f64, contact: BundleContact) -> f64 {
    f_st * (1.0 + (nu_e / eps_st) * contact.force_multiplier())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{effective_modulus, stiffness_norm};
    use approx::assert_relative_eq;

    // Twin bundle of SN EN 60865-2 clause 8.3.1: I_k = 63 kA, n = 2,
    // a_s = 0.1 m, d = 37.4 mm, m_s = 4.24 kg/m, five spacers at 9.8 m

    const I_K: f64 = 63_000.0;
    const A_S: f64 = 0.1;
    const D: f64 = 0.0374;

    fn twin_bundle_norm() -> f64 {
        let e_eff = effective_modulus(60_000.0e6, 17_800.0, 2.0, 1090.0e-6);
        stiffness_norm(500_000.0, 48.0, 2.0, e_eff, 1090.0e-6)
    }

    #[test]
    fn test_clash_criteria() {
        // a_s/d = 1.8 with l_s ≥ 50·a_s
        assert!(clash_guaranteed(1.8 * D, D, 60.0 * 1.8 * D, 2.0));
        // a_s/d = 2.4 needs l_s ≥ 70·a_s
        assert!(!clash_guaranteed(2.4 * D, D, 60.0 * 2.4 * D, 2.0));
        assert!(clash_guaranteed(2.4 * D, D, 75.0 * 2.4 * D, 2.0));
        // a_s/d = 3.0 never clashes effectively
        assert!(!clash_guaranteed(3.0 * D, D, 1000.0, 2.0));
        // single conductor
        assert!(!clash_guaranteed(1.8 * D, D, 60.0 * 1.8 * D, 1.0));
    }

    #[test]
    fn test_direct_pinch_force() {
        assert_relative_eq!(
            bundle_force_direct(36_183.448_884),
            39_801.793_772_4,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_reference_length_fallbacks() {
        assert_eq!(reference_length(9.8, Some(40.0), Some(37.4)), Some(9.8));
        assert_eq!(reference_length(0.0, Some(40.0), None), Some(40.0));
        assert_eq!(reference_length(0.0, Some(0.0), Some(37.4)), Some(37.4));
        assert_eq!(reference_length(0.0, None, Some(37.4)), Some(37.4));
        assert_eq!(reference_length(0.0, None, None), None);
    }

    #[test]
    fn test_contraction_chain_twin_bundle() {
        let nu_1 = contraction_frequency_nu1(I_K, A_S, 2.0, 4.24, D, 50.0);
        assert_relative_eq!(nu_1, 0.578249, max_relative = 1e-5);

        let tau = network_time_constant(50.0, 1.81);
        let gamma = phase_angle(50.0, tau);
        assert_relative_eq!(tau, 0.044308, max_relative = 1e-4);
        assert_relative_eq!(gamma, 1.49908, max_relative = 1e-5);

        let nu_3 = nu3_factor(A_S, D, 2.0);
        assert_relative_eq!(nu_3, 0.530104, max_relative = 1e-5);

        let f_v = interbundle_force_fv(I_K, A_S, 9.8, 2.0, 1.890051, nu_3);
        assert_relative_eq!(f_v, 69_340.94, max_relative = 1e-5);

        let norm = twin_bundle_norm();
        let eps_st = strain_factor_st(17_800.0, 9.8, norm, A_S, 2.0, D);
        let eps_pi = strain_factor_pi(69_340.930_586, 9.8, norm, A_S, 2.0, D);
        assert_relative_eq!(eps_st, 37.739644, max_relative = 1e-6);
        assert_relative_eq!(eps_pi, 11_507.717958, max_relative = 1e-6);

        let j = bundle_position_j(eps_st, eps_pi);
        assert_relative_eq!(j, 17.235218, max_relative = 1e-6);
    }

    #[test]
    fn test_pinch_force_clashing_path() {
        let norm = twin_bundle_norm();
        let contact = BundleContact::Clashing { xi: 14.799681 };
        let nu_4 = nu4_factor(A_S, D, contact);
        assert_relative_eq!(nu_4, 1.673797, max_relative = 1e-6);

        let nu_e = nu_e_factor(I_K, A_S, norm, 2.0, 9.8, D, 1.890051, nu_4, contact);
        assert_relative_eq!(nu_e, 2.051059, max_relative = 1e-5);

        let f_pi = bundle_force_contracted(17_800.0, nu_e, 37.739644, contact);
        assert_relative_eq!(f_pi, 32_117.02, max_relative = 1e-5);
    }

    #[test]
    fn test_nu4_spread_path() {
        let eta = 0.058862;
        let a_s = 0.4;
        let expected = eta * (a_s - D) / (a_s - eta * (a_s - D));
        assert_eq!(nu4_factor(a_s, D, BundleContact::Spread { eta }), expected);
    }

    #[test]
    fn test_nu_e_clamps_negative_bracket() {
        // A huge ξ drives the first term to zero, leaving -1/4 under the root
        let contact = BundleContact::Clashing { xi: 1.0e12 };
        let nu_e = nu_e_factor(I_K, A_S, 5.8e-8, 2.0, 9.8, D, 1.89, 1.67, contact);
        assert_eq!(nu_e, 0.5);
    }

    #[test]
    fn test_network_time_constant_clamps_kappa() {
        assert_eq!(network_time_constant(50.0, 1.05), network_time_constant(50.0, 1.1));
        assert!(network_time_constant(50.0, 1.9) > network_time_constant(50.0, 1.5));
    }

    #[test]
    fn test_contraction_time_residual_root() {
        let nu_1 = contraction_frequency_nu1(I_K, A_S, 2.0, 4.24, D, 50.0);
        let tau = network_time_constant(50.0, 1.81);
        let gamma = phase_angle(50.0, tau);

        assert_eq!(contraction_time_residual(0.0, nu_1, 50.0, tau, gamma), -nu_1);
        let at_root = contraction_time_residual(0.420_608_285_367, nu_1, 50.0, tau, gamma);
        assert!(at_root.abs() < 1e-8);
    }

    #[test]
    fn test_xi_residual_bracket() {
        let (j, eps_st) = (17.235218_f64, 37.739644_f64);
        assert!(xi_residual(j.powf(2.0 / 3.0), j, eps_st) < 0.0);
        assert!(xi_residual(j, j, eps_st) > 0.0);
        assert!(xi_residual(14.799681, j, eps_st).abs() < 1e-2);
    }

    #[test]
    fn test_eta_residual_sign_change() {
        // Widely spaced twin bundle, a_s = 0.4 m: j < 1
        let (eps_st, j) = (2.5, 0.06);
        let nu_3 = nu3_factor(0.4, D, 2.0);
        assert!(eta_residual(1e-8, eps_st, j, nu_3, 2.0, 0.4, D) < 0.0);
        assert!(eta_residual(0.99999, eps_st, j, nu_3, 2.0, 0.4, D) > 0.0);
    }

    #[test]
    fn test_eta_residual_is_finite_at_limits() {
        let nu_3 = nu3_factor(0.4, D, 2.0);
        for eta in [0.0, 1e-12, 0.5, 1.0, 1.5] {
            assert!(eta_residual(eta, 2.5, 0.06, nu_3, 2.0, 0.4, D).is_finite());
        }
    }
}
