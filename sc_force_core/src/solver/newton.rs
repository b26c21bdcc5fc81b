//! Newton iteration with a numerical derivative, started from several seeds.

/// Newton iteration from `x0` using a central-difference derivative.
///
/// Step `h = 1e-7·max(1, |x|)`. Converged when the update satisfies
/// `|dx| ≤ tol·max(1, |x|)`. `None` on a vanishing or non-finite derivative,
/// a non-finite iterate, or when the iteration budget runs out.
pub fn newton(f: impl Fn(f64) -> f64, x0: f64, tol: f64, max_iterations: usize) -> Option<f64> {
    let mut x = x0;
    for _ in 0..max_iterations {
        let fx = f(x);
        if !fx.is_finite() {
            return None;
        }
        let h = 1e-7 * x.abs().max(1.0);
        let slope = (f(x + h) - f(x - h)) / (2.0 * h);
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }

        let dx = fx / slope;
        x -= dx;
        if !x.is_finite() {
            return None;
        }
        if dx.abs() <= tol * x.abs().max(1.0) {
            return Some(x);
        }
    }
    None
}

/// First converged Newton root, over `seeds` in order, that `accept` admits.
pub fn multistart(
    f: impl Fn(f64) -> f64,
    seeds: &[f64],
    accept: impl Fn(f64) -> bool,
    tol: f64,
    max_iterations: usize,
) -> Option<f64> {
    seeds
        .iter()
        .filter_map(|&seed| newton(&f, seed, tol, max_iterations))
        .find(|&x| accept(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_newton_converges() {
        let root = newton(|x| x * x - 2.0, 1.0, 1e-12, 100).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_newton_flat_start_fails() {
        assert_eq!(newton(|x| x * x - 2.0, 0.0, 1e-12, 100), None);
    }

    #[test]
    fn test_multistart_skips_rejected_roots() {
        // Seeds near -√2 and +√2; only the positive root is admitted
        let root = multistart(|x| x * x - 2.0, &[-1.0, 1.0], |x| x > 0.0, 1e-12, 100).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-10);
        assert_eq!(multistart(|x| x * x - 2.0, &[-1.0], |x| x > 0.0, 1e-12, 100), None);
    }
}
