//! Brent's method on a sign-changing bracket.

/// Root of `f` inside `[a, b]` by Brent's method (inverse quadratic
/// interpolation safeguarded by bisection).
///
/// Returns `None` when `f(a)·f(b) > 0`, when the residual turns non-finite or
/// when `max_iterations` is exhausted. `tol` is the absolute bracket width at
/// which iteration stops.
pub fn brent(
    f: impl Fn(f64) -> f64,
    a: f64,
    b: f64,
    tol: f64,
    max_iterations: usize,
) -> Option<f64> {
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);
    if !fa.is_finite() || !fb.is_finite() || fa * fb > 0.0 {
        return None;
    }
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }

    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iterations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Some(b);
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let interpolate_limit = (3.0 * xm * q - (tol1 * q).abs()).min((e * q).abs());
            if 2.0 * p < interpolate_limit {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b);
        if !fb.is_finite() {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_brent_polynomial() {
        let root = brent(|x| x.powi(3) - 2.0 * x - 5.0, 2.0, 3.0, 1e-12, 100).unwrap();
        assert_abs_diff_eq!(root, 2.0945514815423265, epsilon = 1e-11);
    }

    #[test]
    fn test_brent_transcendental() {
        let root = brent(|x| x.cos() - x, 0.0, 1.0, 1e-12, 100).unwrap();
        assert_abs_diff_eq!(root, 0.7390851332151607, epsilon = 1e-11);
    }

    #[test]
    fn test_brent_requires_sign_change() {
        assert_eq!(brent(|x| x * x + 1.0, -1.0, 1.0, 1e-12, 100), None);
    }

    #[test]
    fn test_brent_endpoint_root() {
        assert_eq!(brent(|x| x - 1.0, 1.0, 2.0, 1e-12, 100), Some(1.0));
    }

    #[test]
    fn test_brent_non_finite_residual() {
        assert_eq!(brent(|x| if x > 0.5 { f64::NAN } else { x - 0.7 }, 0.0, 1.0, 1e-12, 100), None);
    }
}
