//! # Short-Circuit Force Equations
//!
//! Pure, stateless implementations of the formulas of SN EN 60865-1:2012
//! (flexible conductors) and the current factors of SN EN 60909-0 they build on.
//! Keeping every formula in one place enables:
//! - Verification against the worked examples of SN EN 60865-2
//! - Documentation of branch tables and cut-offs next to the formula
//! - One implementation shared by all calculation regimes
//!
//! ## Modules
//!
//! - [`conductor`] - swing, sag, stiffness, tension and fall forces, deflection (6.2)
//! - [`bundle`] - sub-conductor bundle contraction (6.4, Annex A.7 to A.10)
//! - [`loop_span`] - loops at midspan (6.2.5 to 6.2.7)
//! - [`short_circuit`] - peak and thermal-equivalent current factors (SN EN 60909-0)
//! - [`memo`] - small memo maps for the steps a sweep repeats unchanged
//! - [`registry`] - equation metadata, usage tracking and EQUATIONS.md generation
//!
//! ## Conventions
//!
//! - **Units**: SI throughout (A, m, m², kg/m, N, N/m², s, Hz)
//! - **Angles**: degrees for every swing angle (δ1, δ_end, δ_max, δ); γ in radians
//! - **Forces**: newtons; conversion to kN happens once on the result record

pub mod bundle;
pub mod conductor;
pub mod loop_span;
pub mod memo;
pub mod registry;
pub mod short_circuit;

/// Magnetic constant μ0 in H/m (CODATA 2018)
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// Standard acceleration of gravity g_n in m/s²
pub const G_N: f64 = 9.806_65;

/// Stress threshold σ_fin for the effective modulus in N/m²
pub const SIGMA_FIN: f64 = 50.0e6;

/// μ0/(2π), the prefactor of every electromagnetic force per unit length
#[inline]
pub(crate) fn mu_0_over_2pi() -> f64 {
    MU_0 / (2.0 * std::f64::consts::PI)
}

/// `sin(180°/n)`, the bundle geometry factor
#[inline]
pub(crate) fn bundle_sine(n: f64) -> f64 {
    (std::f64::consts::PI / n).sin()
}

/// Square root with the radicand clamped at zero.
///
/// Rounding can leave expressions that are physically ≥ 0 at -1e-17.
#[inline]
pub(crate) fn sqrt_clamped(x: f64) -> f64 {
    x.max(0.0).sqrt()
}

// Re-export commonly used items
pub use bundle::{
    bundle_force_contracted,
    bundle_force_direct,
    bundle_position_j,
    clash_guaranteed,
    contraction_frequency_nu1,
    contraction_time_residual,
    eta_residual,
    interbundle_force_fv,
    nu3_factor,
    nu4_factor,
    nu_e_factor,
    network_time_constant,
    phase_angle,
    reference_length,
    strain_factor_pi,
    strain_factor_st,
    xi_residual,
    BundleContact,
};

pub use conductor::{
    concentrated_mass_per_length,
    conductor_length,
    dynamic_sag,
    effective_length,
    effective_modulus,
    elastic_strain,
    end_swing_angle,
    fall_force,
    force_direction,
    force_per_length,
    force_ratio,
    force_ratio_under_looped,
    horizontal_deflection_resting,
    horizontal_deflection_strained,
    max_swing_angle,
    minimum_clearance,
    psi_cubic_coefficients,
    psi_residual,
    resultant_period,
    sag_factor_cd,
    sag_factor_cf,
    short_circuit_tension,
    spacer_distance_mean,
    static_sag,
    stiffness_norm,
    stress_factor,
    swing_period,
    tension_factor_phi,
    thermal_strain,
};

pub use registry::{
    CodeReference,
    Equation,
    EquationCategory,
    EquationMetadata,
    EquationTracker,
    EquationUsage,
    Variable,
    ALL_EQUATIONS,
    generate_equations_markdown,
};
