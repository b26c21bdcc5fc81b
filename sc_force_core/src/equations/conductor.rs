//! # Flexible Conductor Formulas
//!
//! Swing-out, sag and tension formulas for main conductors of flexible
//! (cable) arrangements, SN EN 60865-1:2012 clause 6.2.
//!
//! ## Notation
//!
//! - `l` = centre-line distance between supports (span)
//! - `l_c` = cord length of a main conductor (span minus strained insulator chains)
//! - `l_eff` = effective span of a conductor resting on post insulators
//! - `n` = number of sub-conductors, `m_s` = mass per unit length of one sub-conductor
//! - `F_st` = static tensile force, `F'` = characteristic force per unit length
//! - `r`, `δ1`, `δ_end`, `δ_max` = force ratio and swing-out angles (degrees)
//! - `φ`, `ψ`, `ζ` = tension factors and stress factor
//!
//! ## Branch Tables
//!
//! Several quantities switch formula at standard-defined cut-offs. The cut-off
//! direction is part of the formula: `t_k/T_res = 0.5` belongs to the lower
//! branch of δ_end, `t_k = T_res/4` to the upper branch of φ and ε_th.

use once_cell::sync::Lazy;

use super::memo::{arg_key, ArgKey, MemoMap};
use super::{mu_0_over_2pi, sqrt_clamped, G_N, SIGMA_FIN};

// =============================================================================
// GEOMETRY AND MASS
// =============================================================================

/// Mean centre-line distance between spacers `l_s`.
///
/// Absent and zero entries are ignored; no spacer at all yields `0.0`, which
/// later steps read as "no spacers".
pub fn spacer_distance_mean(distances: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = distances
        .iter()
        .flatten()
        .copied()
        .filter(|&ls| ls != 0.0)
        .collect();
    if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

/// Concentrated masses spread over the span, per sub-conductor and metre.
///
/// `m_c / (n · length)`, zero without concentrated masses.
#[inline]
pub fn concentrated_mass_per_length(m_c: Option<f64>, n: f64, length: f64) -> f64 {
    match m_c {
        Some(m) if m != 0.0 => m / (n * length),
        _ => 0.0,
    }
}

/// Cord length of a main conductor `l_c = l - 2·l_i` (clause 6.2.2).
///
/// Without strained insulator chains the cord spans the whole distance.
#[inline]
pub fn conductor_length(l: f64, l_i: Option<f64>) -> f64 {
    match l_i {
        Some(li) if li != 0.0 => l - 2.0 * li,
        _ => l,
    }
}

/// Effective span of a resting conductor `l_eff = l - 2·l_h_f`.
///
/// `l_h_f` is the length of the clamp on each post insulator.
#[inline]
pub fn effective_length(l: f64, l_h_f: Option<f64>) -> f64 {
    match l_h_f {
        Some(lhf) if lhf != 0.0 => l - 2.0 * lhf,
        _ => l,
    }
}

// =============================================================================
// ELECTROMAGNETIC LOAD AND SWING-OUT
// =============================================================================

static FORCE_PER_LENGTH_MEMO: Lazy<MemoMap<ArgKey<4>, f64>> = Lazy::new(|| MemoMap::new(32));

/// Characteristic electromagnetic force per unit length on a main conductor
///
/// # Formula (SN EN 60865-1:2012, eq. (19a))
/// ```text
/// F' = (μ0/2π) · 0.75 · (I_k²/a) · (l_c/l)
/// ```
///
/// Current flows through the whole cord length. Memoized: a sweep repeats this
/// with identical arguments at every grid point.
///
/// # Arguments
/// * `i_k` - initial symmetrical three-phase short-circuit current (r.m.s.) in A
/// * `l` - span in m
/// * `l_c` - cord length in m
/// * `a` - centre-line distance between main conductors in m
pub fn force_per_length(i_k: f64, l: f64, l_c: f64, a: f64) -> f64 {
    FORCE_PER_LENGTH_MEMO.get_or_insert_with(arg_key([i_k, l, l_c, a]), || {
        mu_0_over_2pi() * 0.75 * (i_k * i_k / a) * (l_c / l)
    })
}

/// Ratio of electromagnetic force to gravity `r = F' / (n·m_s·g_n)`, eq. (20)
///
/// `m_s` includes the distributed concentrated masses.
#[inline]
pub fn force_ratio(f_per_length: f64, n: f64, m_s: f64) -> f64 {
    f_per_length / (n * m_s * G_N)
}

/// Force ratio for an under-looped conductor
///
/// The weight term carries an extra factor of 1.2: `r = F' / (n·m_s·g_n·1.2)`.
#[inline]
pub fn force_ratio_under_looped(f_per_length: f64, n: f64, m_s: f64) -> f64 {
    f_per_length / (n * m_s * G_N * 1.2)
}

/// Direction of the resultant force on the conductor `δ1 = arctan r` in degrees, eq. (21)
#[inline]
pub fn force_direction(r: f64) -> f64 {
    r.atan().to_degrees()
}

/// Equivalent static conductor sag at midspan
///
/// # Formula (eq. (22))
/// ```text
/// f_es = n·m_s·g_n·l² / (8·F_st)
/// ```
#[inline]
pub fn static_sag(n: f64, m_s: f64, l: f64, f_st: f64) -> f64 {
    n * m_s * G_N * l * l / (8.0 * f_st)
}

/// Period of conductor oscillation `T = 2π·√(0.8·f_es/g_n)`, eq. (23)
#[inline]
pub fn swing_period(f_es: f64) -> f64 {
    2.0 * std::f64::consts::PI * (0.8 * f_es / G_N).sqrt()
}

/// Resulting period of the conductor oscillation during the short-circuit current flow
///
/// # Formula (eq. (24))
/// ```text
/// T_res = T / ( (1 + r²)^(1/4) · (1 - (π²/64)·(δ1/90°)²) )
/// ```
#[inline]
pub fn resultant_period(t: f64, r: f64, delta_1: f64) -> f64 {
    let pi2 = std::f64::consts::PI * std::f64::consts::PI;
    let damping = 1.0 - (pi2 / 64.0) * (delta_1 / 90.0).powi(2);
    t / ((1.0 + r * r).powf(0.25) * damping)
}

// =============================================================================
// STIFFNESS AND STRESS FACTOR
// =============================================================================

/// Actual Young's modulus of the stranded conductor
///
/// # Formula (eqs. (26), (27))
/// ```text
/// E_eff = E · (0.3 + 0.7·sin(F_st/(n·A_s·σ_fin) · 90°))   for F_st/(n·A_s) ≤ σ_fin
/// E_eff = E                                                for F_st/(n·A_s) > σ_fin
/// ```
///
/// with `σ_fin = 50 N/mm²`.
#[inline]
pub fn effective_modulus(e: f64, f_st: f64, n: f64, a_s: f64) -> f64 {
    let stress = f_st / (n * a_s);
    if stress <= SIGMA_FIN {
        e * (0.3 + 0.7 * (stress / SIGMA_FIN * 90.0).to_radians().sin())
    } else {
        e
    }
}

/// Stiffness norm of the conductor arrangement `N = 1/(S·l) + 1/(n·E_eff·A_s)`, eq. (25)
///
/// `S` is the resultant spring constant of both supports of the span in N/m.
#[inline]
pub fn stiffness_norm(s: f64, l: f64, n: f64, e_eff: f64, a_s: f64) -> f64 {
    1.0 / (s * l) + 1.0 / (n * e_eff * a_s)
}

/// Stress factor of the main conductor `ζ = (n·g_n·m_s·l)² / (24·F_st³·N)`, eq. (28)
#[inline]
pub fn stress_factor(n: f64, m_s: f64, l: f64, f_st: f64, norm: f64) -> f64 {
    (n * G_N * m_s * l).powi(2) / (24.0 * f_st.powi(3) * norm)
}

// =============================================================================
// SWING-OUT ANGLES
// =============================================================================

/// Swing-out angle at the end of the short-circuit current flow, in degrees
///
/// # Formula (eq. (29))
/// ```text
/// δ_end = δ1 · (1 - cos(360° · t_k1/T_res))   for 0 ≤ t_k1/T_res ≤ 0.5
/// δ_end = 2·δ1                                 for t_k1/T_res > 0.5
/// ```
///
/// Both branches meet at `2·δ1` when `t_k1/T_res = 0.5`.
#[inline]
pub fn end_swing_angle(delta_1: f64, t_k: f64, t_res: f64) -> f64 {
    let ratio = t_k / t_res;
    if ratio <= 0.5 {
        delta_1 * (1.0 - (360.0 * ratio).to_radians().cos())
    } else {
        2.0 * delta_1
    }
}

/// Maximum swing-out angle during or after the short circuit, in degrees
///
/// # Formulas (eqs. (30), (31))
/// ```text
/// χ = 1 - r·sin δ_end      for 0 ≤ δ_end ≤ 90°
/// χ = 1 - r                for δ_end > 90°
///
/// δ_max = 1.25 · arccos χ  for 0.766 < χ ≤ 1
/// δ_max = 10° + arccos χ   for -0.985 ≤ χ ≤ 0.766
/// δ_max = 180°             for χ < -0.985
/// ```
pub fn max_swing_angle(r: f64, delta_end: f64) -> f64 {
    let chi = if delta_end <= 90.0 {
        1.0 - r * delta_end.to_radians().sin()
    } else {
        1.0 - r
    };

    if chi > 0.766 && chi <= 1.0 {
        1.25 * chi.acos().to_degrees()
    } else if (-0.985..=0.766).contains(&chi) {
        10.0 + chi.acos().to_degrees()
    } else {
        180.0
    }
}

// =============================================================================
// TENSILE FORCE DURING THE SHORT CIRCUIT
// =============================================================================

/// Factor φ for the tensile force (eq. (32))
///
/// ```text
/// φ = 3·(√(1 + r²) - 1)                   for t_k1 ≥ T_res/4
/// φ = 3·(r·sin δ_end + cos δ_end - 1)     for t_k1 < T_res/4
/// ```
#[inline]
pub fn tension_factor_phi(t_k: f64, t_res: f64, r: f64, delta_end: f64) -> f64 {
    if t_k >= t_res / 4.0 {
        3.0 * ((1.0 + r * r).sqrt() - 1.0)
    } else {
        let de = delta_end.to_radians();
        3.0 * (r * de.sin() - (de.cos() - 1.0))
    }
}

/// Coefficients `[c3, c2, c1, c0]` of the cubic that defines ψ implicitly.
///
/// ```text
/// φ²·ψ³ + φ·(2 + ζ)·ψ² + (1 + 2ζ)·ψ - ζ·(2 + φ) = 0,   0 ≤ ψ ≤ 1
/// ```
#[inline]
pub fn psi_cubic_coefficients(phi: f64, zeta: f64) -> [f64; 4] {
    [
        phi * phi,
        phi * (2.0 + zeta),
        1.0 + 2.0 * zeta,
        -zeta * (2.0 + phi),
    ]
}

/// Residual of the ψ cubic at `psi`.
///
/// Negative at ψ = 0 and equal to `(φ + 1)²` at ψ = 1 for any ζ ≥ 0, so the
/// valid root is always bracketed by the unit interval.
#[inline]
pub fn psi_residual(psi: f64, phi: f64, zeta: f64) -> f64 {
    let [c3, c2, c1, c0] = psi_cubic_coefficients(phi, zeta);
    ((c3 * psi + c2) * psi + c1) * psi + c0
}

/// Short-circuit tensile force `F_t,d = F_st·(1 + φ·ψ)`, eq. (33)
#[inline]
pub fn short_circuit_tension(f_st: f64, phi: f64, psi: f64) -> f64 {
    f_st * (1.0 + phi * psi)
}

// =============================================================================
// DYNAMIC SAG
// =============================================================================

/// Elastic expansion `ε_ela = N·(F_t,d - F_st)`, eq. (34)
#[inline]
pub fn elastic_strain(norm: f64, f_td: f64, f_st: f64) -> f64 {
    norm * (f_td - f_st)
}

/// Thermal expansion of the conductor
///
/// # Formula (eq. (35))
/// ```text
/// ε_th = c_th · (I_k/(n·A_s))² · T_res/4   for t_k1 ≥ T_res/4
/// ε_th = c_th · (I_k/(n·A_s))² · t_k1      for t_k1 < T_res/4
/// ```
///
/// `c_th` is the material constant in m⁴/(A²·s).
#[inline]
pub fn thermal_strain(c_th: f64, i_k: f64, n: f64, a_s: f64, t_k: f64, t_res: f64) -> f64 {
    let duration = if t_k >= t_res / 4.0 { t_res / 4.0 } else { t_k };
    c_th * (i_k / (n * a_s)).powi(2) * duration
}

/// Dilatation factor `C_D = √(1 + (3/8)·(l/f_es)²·(ε_ela + ε_th))`, eq. (36)
#[inline]
pub fn sag_factor_cd(l: f64, f_es: f64, eps_ela: f64, eps_th: f64) -> f64 {
    sqrt_clamped(1.0 + 3.0 / 8.0 * (l / f_es).powi(2) * (eps_ela + eps_th))
}

/// Form factor for the increase of the dynamic sag, eq. (37)
///
/// | r              | C_F          |
/// |----------------|--------------|
/// | r ≤ 0.8        | 1.05         |
/// | 0.8 < r < 1.8  | 0.97 + 0.1·r |
/// | r ≥ 1.8        | 1.15         |
#[inline]
pub fn sag_factor_cf(r: f64) -> f64 {
    if r <= 0.8 {
        1.05
    } else if r < 1.8 {
        0.97 + 0.1 * r
    } else {
        1.15
    }
}

/// Dynamic conductor sag at midspan `f_ed = C_F·C_D·f_es`, eq. (38)
#[inline]
pub fn dynamic_sag(c_d: f64, c_f: f64, f_es: f64) -> f64 {
    c_d * c_f * f_es
}

// =============================================================================
// DROP FORCE, DEFLECTION, CLEARANCE
// =============================================================================

/// Drop force after the short circuit
///
/// # Formula (eq. (43))
/// ```text
/// F_f,d = 1.2 · F_st · √(1 + 8·ζ·δ_max/180°)
/// ```
#[inline]
pub fn fall_force(f_st: f64, zeta: f64, delta_max: f64) -> f64 {
    1.2 * f_st * sqrt_clamped(1.0 + 8.0 * zeta * delta_max / 180.0)
}

/// Maximum horizontal displacement of a conductor resting on post insulators, eq. (44)
///
/// `b_h = f_ed` for δ_max ≥ 90°, otherwise `f_ed·sin δ_max`.
#[inline]
pub fn horizontal_deflection_resting(f_ed: f64, delta_max: f64) -> f64 {
    if delta_max >= 90.0 {
        f_ed
    } else {
        f_ed * delta_max.to_radians().sin()
    }
}

/// Maximum horizontal displacement of a strained conductor, eq. (45)
///
/// `b_h = f_ed·sin δ1` for δ_max ≥ δ1, otherwise `f_ed·sin δ_max`.
#[inline]
pub fn horizontal_deflection_strained(f_ed: f64, delta_max: f64, delta_1: f64) -> f64 {
    if delta_max >= delta_1 {
        f_ed * delta_1.to_radians().sin()
    } else {
        f_ed * delta_max.to_radians().sin()
    }
}

/// Minimum air clearance between main conductors `a_min = a - 2·b_h`, eq. (48)
#[inline]
pub fn minimum_clearance(a: f64, b_h: f64) -> f64 {
    a - 2.0 * b_h
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Worked example SN EN 60865-2 clause 7.3: single conductor, I_k = 19 kA,
    // l = 10.4 m, a = 2 m, m_s = 0.671 kg/m, F_st = 350 N (-20 °C)

    #[test]
    fn test_single_conductor_swing_out_chain() {
        let f_a = force_per_length(19_000.0, 10.4, 10.4, 2.0);
        assert_relative_eq!(f_a, 27.075, max_relative = 1e-6);

        let r = force_ratio(f_a, 1.0, 0.671);
        assert_relative_eq!(r, 4.114578, max_relative = 1e-5);

        let delta_1 = force_direction(r);
        assert_relative_eq!(delta_1, 76.339779, max_relative = 1e-6);

        let f_es = static_sag(1.0, 0.671, 10.4, 350.0);
        assert_relative_eq!(f_es, 0.254186, max_relative = 1e-5);

        let t = swing_period(f_es);
        let t_res = resultant_period(t, r, delta_1);
        assert_relative_eq!(t, 0.904775, max_relative = 1e-5);
        assert_relative_eq!(t_res, 0.494563, max_relative = 1e-5);

        let delta_end = end_swing_angle(delta_1, 0.3, t_res);
        assert_relative_eq!(delta_end, 2.0 * delta_1, max_relative = 1e-12);
        assert_eq!(max_swing_angle(r, delta_end), 180.0);
        assert_relative_eq!(
            tension_factor_phi(0.3, t_res, r, delta_end),
            9.703061,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_stress_factor_single_conductor() {
        let e_eff = effective_modulus(55_000.0e6, 350.0, 1.0, 243.0e-6);
        let norm = stiffness_norm(100_000.0, 10.4, 1.0, e_eff, 243.0e-6);
        let zeta = stress_factor(1.0, 0.671, 10.4, 350.0, norm);
        assert_relative_eq!(zeta, 3.833871, max_relative = 1e-5);
    }

    #[test]
    fn test_effective_modulus_clamps_above_sigma_fin() {
        let e = 60_000.0e6;
        // 60 kN on 1 x 1000 mm² is 60 N/mm² > 50 N/mm²
        assert_eq!(effective_modulus(e, 60_000.0, 1.0, 1.0e-3), e);
        // Exactly at the threshold the sine term reaches 1
        assert_relative_eq!(effective_modulus(e, 50_000.0, 1.0, 1.0e-3), e, max_relative = 1e-12);
        assert!(effective_modulus(e, 10_000.0, 1.0, 1.0e-3) < e);
    }

    #[test]
    fn test_end_swing_angle_half_period_boundary() {
        let delta_1 = 40.0;
        let t_res = 1.0;
        // At exactly 0.5 the cosine branch is taken and equals 2·δ1
        let at = end_swing_angle(delta_1, 0.5, t_res);
        assert_relative_eq!(at, 2.0 * delta_1, max_relative = 1e-12);

        let below = end_swing_angle(delta_1, 0.5 - 1e-9, t_res);
        let above = end_swing_angle(delta_1, 0.5 + 1e-9, t_res);
        assert!((below - at).abs() < 1e-6);
        assert!((above - at).abs() < 1e-6);
    }

    #[test]
    fn test_end_swing_angle_takes_cosine_branch_at_boundary() {
        // With ratio 0.5 exactly, 1 - cos(180°) = 2 regardless of rounding in the second branch
        let delta_1 = 33.3;
        let value = end_swing_angle(delta_1, 0.25, 0.5);
        let cosine_branch = delta_1 * (1.0 - 180.0_f64.to_radians().cos());
        assert_eq!(value, cosine_branch);
    }

    #[test]
    fn test_max_swing_angle_branches() {
        // χ = 1 - 0.1·sin 30° = 0.95 → 1.25·arccos χ
        assert_relative_eq!(
            max_swing_angle(0.1, 30.0),
            1.25 * 0.95_f64.acos().to_degrees(),
            max_relative = 1e-12
        );
        // χ = 1 - 1.0·sin 60° ≈ 0.134 → 10° + arccos χ
        let chi = 1.0 - 60.0_f64.to_radians().sin();
        assert_relative_eq!(
            max_swing_angle(1.0, 60.0),
            10.0 + chi.acos().to_degrees(),
            max_relative = 1e-12
        );
        // δ_end > 90° uses χ = 1 - r; r = 2.5 → χ = -1.5 → 180°
        assert_eq!(max_swing_angle(2.5, 120.0), 180.0);
        // δ_end > 90°, r = 1.2 → χ = -0.2 → 10° + arccos(-0.2)
        assert_relative_eq!(
            max_swing_angle(1.2, 101.29),
            10.0 + (-0.2_f64).acos().to_degrees(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_phi_quarter_period_threshold() {
        let r: f64 = 1.2;
        let t_res = 0.8;
        let upper = 3.0 * ((1.0 + r * r).sqrt() - 1.0);
        assert_eq!(tension_factor_phi(0.2, t_res, r, 50.0), upper);
        assert!(tension_factor_phi(0.19, t_res, r, 50.0) != upper);
    }

    #[test]
    fn test_psi_residual_brackets_unit_interval() {
        for &(phi, zeta) in &[(1.731, 0.059), (9.72, 3.84), (1.5, 2.04), (0.2, 50.0)] {
            assert!(psi_residual(0.0, phi, zeta) < 0.0);
            assert_relative_eq!(
                psi_residual(1.0, phi, zeta),
                (phi + 1.0).powi(2),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_sag_factor_cf_table() {
        assert_eq!(sag_factor_cf(0.8), 1.05);
        assert_relative_eq!(sag_factor_cf(1.0), 1.07, max_relative = 1e-12);
        assert_eq!(sag_factor_cf(1.8), 1.15);
        assert_eq!(sag_factor_cf(2.0), 1.15);
        assert_eq!(sag_factor_cf(0.3), 1.05);
    }

    #[test]
    fn test_thermal_strain_uses_quarter_period_cap() {
        let capped = thermal_strain(0.27e-18, 19_000.0, 1.0, 243.0e-6, 0.3, 0.494563);
        let expected = 0.27e-18 * (19_000.0_f64 / 243.0e-6).powi(2) * 0.494563 / 4.0;
        assert_relative_eq!(capped, expected, max_relative = 1e-12);

        let short = thermal_strain(0.27e-18, 19_000.0, 1.0, 243.0e-6, 0.1, 0.494563);
        let expected_short = 0.27e-18 * (19_000.0_f64 / 243.0e-6).powi(2) * 0.1;
        assert_relative_eq!(short, expected_short, max_relative = 1e-12);
    }

    #[test]
    fn test_horizontal_deflection_variants() {
        assert_eq!(horizontal_deflection_resting(0.5, 90.0), 0.5);
        assert_relative_eq!(horizontal_deflection_resting(0.5, 30.0), 0.25, max_relative = 1e-12);
        assert_relative_eq!(
            horizontal_deflection_strained(0.5, 60.0, 30.0),
            0.25,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            horizontal_deflection_strained(0.5, 30.0, 60.0),
            0.25,
            max_relative = 1e-12
        );
        assert_relative_eq!(minimum_clearance(2.0, 0.46079), 1.07842, max_relative = 1e-9);
    }

    #[test]
    fn test_geometry_helpers() {
        assert_relative_eq!(conductor_length(48.0, Some(5.3)), 37.4, max_relative = 1e-12);
        assert_eq!(conductor_length(48.0, None), 48.0);
        assert_eq!(conductor_length(48.0, Some(0.0)), 48.0);
        assert_eq!(effective_length(10.4, Some(0.5)), 9.4);
        assert_eq!(effective_length(10.4, None), 10.4);
        assert_eq!(concentrated_mass_per_length(Some(20.0), 2.0, 40.0), 0.25);
        assert_eq!(concentrated_mass_per_length(None, 2.0, 40.0), 0.0);
    }

    #[test]
    fn test_spacer_distance_mean_ignores_absent_and_zero() {
        assert_eq!(spacer_distance_mean(&[]), 0.0);
        assert_eq!(spacer_distance_mean(&[None, Some(0.0)]), 0.0);
        assert_eq!(spacer_distance_mean(&[Some(9.0), None, Some(11.0), Some(0.0)]), 10.0);
    }
}
