//! # Short-Circuit Current Quantities
//!
//! Peak and thermal-equivalent current factors per SN EN 60909-0. The force
//! formulas take `I_k` and `κ` as inputs; these helpers derive them from
//! network data.

use tracing::warn;

/// Factor κ for the peak short-circuit current from the network R/X ratio
///
/// ```text
/// κ = 1.02 + 0.98 · e^(-3·R/X)
/// ```
///
/// Use the smallest R/X of the branches carrying the fault current; the
/// result lies between 1.02 and 2.0.
#[inline]
pub fn kappa_from_rx(r_over_x: f64) -> f64 {
    1.02 + 0.98 * (-3.0 * r_over_x).exp()
}

/// Factor κ recovered from a known peak current `κ = i_p / (√2 · I_k″)`
#[inline]
pub fn kappa_from_peak(i_p: f64, i_k_initial: f64) -> f64 {
    i_p / (std::f64::consts::SQRT_2 * i_k_initial)
}

/// Default κ for the peak current when none is given (high-voltage limit).
pub const KAPPA_PEAK_DEFAULT: f64 = 2.0;

/// Peak short-circuit current `i_p = κ·√2·I_k″`
#[inline]
pub fn peak_current(i_k_initial: f64, kappa: f64) -> f64 {
    kappa * std::f64::consts::SQRT_2 * i_k_initial
}

/// Default κ for the heat-effect factor m. κ = 2.0 overstates the DC component.
pub const KAPPA_HEAT_DEFAULT: f64 = 1.95;

/// Factor m for the heat effect of the DC component
///
/// ```text
/// m = 1/(2·f·T_k·ln(κ - 1)) · (e^(4·f·T_k·ln(κ - 1)) - 1)
/// ```
///
/// # Arguments
/// * `t_k` - short-circuit duration in s
/// * `f` - system frequency in Hz (50 if unknown)
/// * `kappa` - peak factor, [`KAPPA_HEAT_DEFAULT`] if unknown
#[inline]
pub fn dc_heat_factor_m(t_k: f64, f: f64, kappa: f64) -> f64 {
    let ln = (kappa - 1.0).ln();
    (1.0 / (2.0 * f * t_k * ln)) * ((4.0 * f * t_k * ln).exp() - 1.0)
}

/// Factor n for the heat effect of the AC component
///
/// ```text
/// q = I_k″/I_k,   a = q/(0.88 + 0.17·q),   T_d′ = 3.1 s / a
///
/// n = 1/q² · [ 1 + T_d′/(20·T_k)·(1 - e^(-20·T_k/T_d′))·(q - a)²
///                + T_d′/(2·T_k)·(1 - e^(-2·T_k/T_d′))·(a - 1)²
///                + T_d′/(5·T_k)·(1 - e^(-10·T_k/T_d′))·(q - a)
///                + 2·T_d′/T_k·(1 - e^(-T_k/T_d′))·(a - 1)
///                + T_d′/(5.5·T_k)·(1 - e^(-11·T_k/T_d′))·(q - a)·(a - 1) ]
/// ```
///
/// This evaluation stays below the reference diagram of the standard (for
/// `I_k″ = I_k` it yields about 0.95 instead of 1). `n = 1` is always on the
/// safe side and should be preferred; the value is logged as a warning.
pub fn ac_heat_factor_n(i_k_initial: f64, i_k_steady: f64, t_k: f64) -> f64 {
    let q = i_k_initial / i_k_steady;
    let a = q / (0.88 + 0.17 * q);
    let t_d = 3.1 / a;

    let decay = |k: f64| 1.0 - (-k * t_k / t_d).exp();
    let bracket = 1.0
        + t_d / (20.0 * t_k) * decay(20.0) * (q - a).powi(2)
        + t_d / (2.0 * t_k) * decay(2.0) * (a - 1.0).powi(2)
        + t_d / (5.0 * t_k) * decay(10.0) * (q - a)
        + 2.0 * t_d / t_k * decay(1.0) * (a - 1.0)
        + t_d / (5.5 * t_k) * decay(11.0) * (q - a) * (a - 1.0);
    let n = bracket / (q * q);

    warn!(
        n,
        ratio = q,
        t_k,
        "AC heat factor n is below the reference diagram; n = 1 is on the safe side"
    );
    n
}

/// Thermal equivalent short-circuit current `I_th = I_k″·√(m + n)`
///
/// For far-from-generator faults lasting 0.5 s or more, `m + n = 1` is permitted.
#[inline]
pub fn thermal_equivalent_current(i_k_initial: f64, m: f64, n: f64) -> f64 {
    i_k_initial * (m + n).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kappa_from_rx() {
        assert_relative_eq!(kappa_from_rx(0.6), 1.181993, max_relative = 1e-6);
        assert_relative_eq!(kappa_from_rx(0.0), 2.0, max_relative = 1e-12);
        assert!(kappa_from_rx(10.0) > 1.02);
    }

    #[test]
    fn test_peak_current_roundtrip() {
        let i_p = peak_current(40.0, 1.8);
        assert_relative_eq!(i_p, 101.823376, max_relative = 1e-6);
        assert_relative_eq!(kappa_from_peak(i_p, 40.0), 1.8, max_relative = 1e-12);
        assert_relative_eq!(peak_current(1.0, KAPPA_PEAK_DEFAULT), 2.0 * std::f64::consts::SQRT_2);
    }

    #[test]
    fn test_dc_heat_factor_m() {
        let m = dc_heat_factor_m(0.3, 50.0, KAPPA_HEAT_DEFAULT);
        assert_relative_eq!(m, 0.619919, max_relative = 1e-5);
        assert_relative_eq!(dc_heat_factor_m(0.1, 50.0, 1.8), 0.442975, max_relative = 1e-5);
        // Longer faults shrink the DC contribution
        assert!(dc_heat_factor_m(1.0, 50.0, 1.8) < dc_heat_factor_m(0.1, 50.0, 1.8));
    }

    // Divergent path: the formula is reproduced as published; callers should use n = 1.
    #[test]
    fn test_ac_heat_factor_n_divergent_path() {
        assert_relative_eq!(ac_heat_factor_n(24.0, 19.2, 0.8), 0.860303, max_relative = 1e-5);
        // Far-from-generator fault: the diagram reads 1.0, the formula stays below it
        let far = ac_heat_factor_n(10.0, 10.0, 1.0);
        assert_relative_eq!(far, 0.948332, max_relative = 1e-5);
        assert!(far < 1.0);
    }

    #[test]
    fn test_thermal_equivalent_current() {
        let i_th = thermal_equivalent_current(24.0, 0.056, 0.86);
        assert_relative_eq!(i_th, 22.969893, max_relative = 1e-6);
        assert_relative_eq!(thermal_equivalent_current(24.0, 0.0, 1.0), 24.0);
    }
}
