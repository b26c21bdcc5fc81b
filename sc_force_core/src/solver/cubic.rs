//! Real roots of polynomials up to degree three in closed form.

use std::f64::consts::PI;

/// Leading coefficients smaller than this count as zero.
const DEGENERATE: f64 = 1e-14;

/// Real roots of `c3·x³ + c2·x² + c1·x + c0`, ascending.
///
/// Cardano's formula for one real root, the trigonometric form for three.
/// Degenerate leading coefficients fall back to the quadratic and linear
/// cases. Each root gets two Newton polishing steps on the original
/// polynomial.
pub fn real_roots([c3, c2, c1, c0]: [f64; 4]) -> Vec<f64> {
    let mut roots = if c3.abs() < DEGENERATE {
        quadratic_roots(c2, c1, c0)
    } else {
        depressed_cubic_roots(c2 / c3, c1 / c3, c0 / c3)
    };

    let eval = |x: f64| ((c3 * x + c2) * x + c1) * x + c0;
    let slope = |x: f64| (3.0 * c3 * x + 2.0 * c2) * x + c1;
    for root in roots.iter_mut() {
        for _ in 0..2 {
            let d = slope(*root);
            if d != 0.0 {
                *root -= eval(*root) / d;
            }
        }
    }

    roots.retain(|x| x.is_finite());
    roots.sort_by(f64::total_cmp);
    roots
}

/// Roots of the monic cubic `x³ + a·x² + b·x + c`.
fn depressed_cubic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    // x = t - a/3  →  t³ + p·t + q = 0
    let shift = a / 3.0;
    let p = b - a * a / 3.0;
    let q = 2.0 * a.powi(3) / 27.0 - a * b / 3.0 + c;
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    let scale = 1e-14 * (q * q).max(p.abs().powi(3)).max(1.0);
    if disc.abs() <= scale {
        if p.abs() < DEGENERATE {
            return vec![-shift];
        }
        return vec![3.0 * q / p - shift, -3.0 * q / (2.0 * p) - shift];
    }

    if disc > 0.0 {
        let sqrt_disc = disc.sqrt();
        let u = (-q / 2.0 + sqrt_disc).cbrt();
        let v = (-q / 2.0 - sqrt_disc).cbrt();
        return vec![u + v - shift];
    }

    let radius = 2.0 * (-p / 3.0).sqrt();
    let angle = ((3.0 * q / (2.0 * p)) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
    (0..3)
        .map(|k| radius * (angle - 2.0 * PI * k as f64 / 3.0).cos() - shift)
        .collect()
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < DEGENERATE {
        if b.abs() < DEGENERATE {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // Citardauq form avoids cancellation for the smaller root
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / a, c / q]
}
