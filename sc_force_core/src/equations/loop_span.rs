//! # Loops at Midspan
//!
//! Formulas for strained conductors with a dropper loop at midspan,
//! SN EN 60865-1:2012 clauses 6.2.2 (eq. (19b)), 6.2.5 and 6.2.7.
//!
//! The loop restricts the swing-out of the main conductor to an angle δ that
//! depends on whether the loop hangs in a plane parallel or perpendicular to
//! the main conductors. When the loop is long enough not to restrict the
//! swing, the plain-span formulas of [`super::conductor`] apply and the
//! limit functions here return `None`.

use super::mu_0_over_2pi;

/// Arc length of the loop, `l_v = 1.05·√(h² + w²)`.
///
/// `h` is the loop height and `w` the loop width; the factor is an average of
/// measured installations.
#[inline]
pub fn loop_arc_length(h: f64, w: f64) -> f64 {
    1.05 * (h * h + w * w).sqrt()
}

/// Characteristic force per unit length with current flowing through half the
/// span and the loop
///
/// # Formula (SN EN 60865-1:2012, eq. (19b))
/// ```text
/// F' = (μ0/2π) · 0.75 · (I_k²/a) · ((l_c/2 + l_v/2)/l)
/// ```
#[inline]
pub fn force_per_length_loop(i_k: f64, l: f64, l_c: f64, l_v: f64, a: f64) -> f64 {
    mu_0_over_2pi() * 0.75 * (i_k * i_k / a) * ((l_c / 2.0 + l_v / 2.0) / l)
}

fn acos_degrees(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Swing-out limit by a loop in a plane parallel to the main conductors, eq. (39)
///
/// ```text
/// δ = arccos( ((h + f_es)² + f_ed² - (l_v² - w²)) / (2·f_ed·(h + f_es)) )
/// ```
///
/// `None` when `l_v ≥ √((h + f_es + f_ed)² + w²)`: the loop does not restrict
/// the swing. Result in degrees.
pub fn swing_limit_parallel(f_es: f64, f_ed: f64, l_v: f64, h: f64, w: f64) -> Option<f64> {
    if l_v >= ((h + f_es + f_ed).powi(2) + w * w).sqrt() {
        return None;
    }
    let hs = h + f_es;
    Some(acos_degrees((hs * hs + f_ed * f_ed - (l_v * l_v - w * w)) / (2.0 * f_ed * hs)))
}

/// Swing-out limit by a loop in a plane perpendicular to the main conductors, eq. (39)
///
/// ```text
/// δ = arccos( ((h + f_es)² + f_ed² - (l_v² - w²)) / (2·f_ed·√((h + f_es)² + w²)) )
///   + arccos( (h + f_es) / √((h + f_es)² + w²) )
/// ```
///
/// `None` when `l_v ≥ √((h + f_es)² + w²) + f_ed`. Result in degrees.
pub fn swing_limit_perpendicular(f_es: f64, f_ed: f64, l_v: f64, h: f64, w: f64) -> Option<f64> {
    let hs = h + f_es;
    let diagonal = (hs * hs + w * w).sqrt();
    if l_v >= diagonal + f_ed {
        return None;
    }
    let numerator = hs * hs + f_ed * f_ed - (l_v * l_v - w * w);
    let swing = acos_degrees(numerator / (2.0 * f_ed * diagonal));
    Some(swing + acos_degrees(hs / diagonal))
}

/// Factor φ for a span with a loop at midspan, eqs. (40) and (41)
///
/// | condition            | φ                                   |
/// |----------------------|-------------------------------------|
/// | δ ≥ δ1, t_k1 ≥ T_res/4 | 3·(√(1 + r²) - 1)                 |
/// | δ ≥ δ1, t_k1 < T_res/4 | 3·(r·sin δ_end - cos δ_end + 1)   |
/// | δ < δ1, δ_end ≥ δ      | 3·(r·sin δ - cos δ + 1)           |
/// | δ < δ1, δ_end < δ      | 3·(r·sin δ_end - cos δ_end + 1)   |
pub fn tension_factor_phi_loop(
    t_k: f64,
    t_res: f64,
    r: f64,
    delta_end: f64,
    delta: f64,
    delta_1: f64,
) -> f64 {
    let swing_term = |angle: f64| {
        let rad = angle.to_radians();
        3.0 * (r * rad.sin() - (rad.cos() - 1.0))
    };

    if delta >= delta_1 {
        super::tension_factor_phi(t_k, t_res, r, delta_end)
    } else if delta_end >= delta {
        swing_term(delta)
    } else {
        swing_term(delta_end)
    }
}

/// Maximum horizontal displacement of a strained conductor with a loop, eqs. (46), (47)
///
/// `f_ed·sin δ1` whenever δ_max ≥ δ1. Otherwise the smaller of δ and δ_max
/// decides: `f_ed·sin δ_max` for δ ≥ δ_max, `f_ed·sin δ` for δ < δ_max.
pub fn horizontal_deflection_loop(f_ed: f64, delta_max: f64, delta_1: f64, delta: f64) -> f64 {
    let angle = if delta_max >= delta_1 {
        delta_1
    } else if delta >= delta_max {
        delta_max
    } else {
        delta
    };
    f_ed * angle.to_radians().sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{force_per_length, tension_factor_phi};
    use approx::assert_relative_eq;

    #[test]
    fn test_loop_arc_length() {
        assert_relative_eq!(loop_arc_length(3.0, 4.0), 5.25, max_relative = 1e-12);
    }

    #[test]
    fn test_loop_force_reduces_to_plain_span_for_full_loop() {
        // l_v = l_c gives the same load as current through the whole cord
        let plain = force_per_length(40_000.0, 30.0, 26.0, 3.0);
        let looped = force_per_length_loop(40_000.0, 30.0, 26.0, 26.0, 3.0);
        assert_relative_eq!(plain, looped, max_relative = 1e-12);
    }

    #[test]
    fn test_swing_limit_unrestricted_loop() {
        // A very long loop never restricts the swing
        assert_eq!(swing_limit_parallel(1.0, 1.2, 50.0, 3.0, 1.0), None);
        assert_eq!(swing_limit_perpendicular(1.0, 1.2, 50.0, 3.0, 1.0), None);
    }

    #[test]
    fn test_swing_limit_parallel_geometry() {
        // h + f_es = 4, f_ed = 1.5, w = 0.5, l_v = 3.5
        let delta = swing_limit_parallel(1.0, 1.5, 3.5, 3.0, 0.5).unwrap();
        let cos_delta: f64 = (16.0 + 2.25 - (12.25 - 0.25)) / (2.0 * 1.5 * 4.0);
        assert_relative_eq!(delta, cos_delta.acos().to_degrees(), max_relative = 1e-12);
        assert!(delta > 0.0 && delta < 180.0);
    }

    #[test]
    fn test_swing_limit_perpendicular_adds_loop_inclination() {
        let (f_es, f_ed, l_v, h, w) = (1.0, 1.5, 3.5, 3.0, 0.5);
        let delta = swing_limit_perpendicular(f_es, f_ed, l_v, h, w).unwrap();
        let diagonal = (16.0_f64 + 0.25).sqrt();
        let inclination = (4.0 / diagonal).acos().to_degrees();
        assert!(delta > inclination);
    }

    #[test]
    fn test_phi_loop_branches() {
        let (t_k, t_res, r, delta_end, delta_1) = (0.1, 0.8, 1.2, 40.0, 50.0);
        // δ ≥ δ1 falls back to the plain-span φ
        assert_eq!(
            tension_factor_phi_loop(t_k, t_res, r, delta_end, 60.0, delta_1),
            tension_factor_phi(t_k, t_res, r, delta_end)
        );
        // δ < δ1 and δ_end ≥ δ uses δ
        let at_delta = tension_factor_phi_loop(t_k, t_res, r, delta_end, 30.0, delta_1);
        let swing_term = |angle: f64| {
            let rad = angle.to_radians();
            3.0 * (r * rad.sin() - (rad.cos() - 1.0))
        };
        assert_relative_eq!(at_delta, swing_term(30.0), max_relative = 1e-12);
        // δ < δ1 and δ_end < δ uses δ_end
        let at_end = tension_factor_phi_loop(t_k, t_res, r, delta_end, 45.0, delta_1);
        assert_relative_eq!(at_end, swing_term(40.0), max_relative = 1e-12);
    }

    #[test]
    fn test_horizontal_deflection_loop_table() {
        let f_ed = 2.0;
        let sin = |deg: f64| deg.to_radians().sin();
        // δ_max ≥ δ1 → δ1, whatever δ is
        assert_relative_eq!(horizontal_deflection_loop(f_ed, 70.0, 50.0, 80.0), f_ed * sin(50.0));
        assert_relative_eq!(horizontal_deflection_loop(f_ed, 70.0, 50.0, 20.0), f_ed * sin(50.0));
        // δ_max < δ1, δ ≥ δ_max → δ_max
        assert_relative_eq!(horizontal_deflection_loop(f_ed, 40.0, 50.0, 45.0), f_ed * sin(40.0));
        // δ_max < δ1, δ < δ_max → δ
        assert_relative_eq!(horizontal_deflection_loop(f_ed, 40.0, 50.0, 30.0), f_ed * sin(30.0));
    }
}
