//! Simpson-rule quadrature helpers.

/// Number of sub-intervals used when integrating analytic integrands.
pub const DEFAULT_INTERVALS: usize = 1000;

/// Integrates tabulated samples on a possibly non-uniform abscissa.
///
/// Consecutive interval pairs use the three-point Simpson rule generalised to
/// unequal spacing. When the number of intervals is odd the last one falls
/// back to the trapezoid rule. Fewer than two samples integrate to zero.
pub fn simpson_samples(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut i = 0;
    while i + 2 < n {
        let h0 = xs[i + 1] - xs[i];
        let h1 = xs[i + 2] - xs[i + 1];
        let span = h0 + h1;
        total += span / 6.0
            * ((2.0 - h1 / h0) * ys[i]
                + span * span / (h0 * h1) * ys[i + 1]
                + (2.0 - h0 / h1) * ys[i + 2]);
        i += 2;
    }
    if i + 1 < n {
        total += 0.5 * (xs[i + 1] - xs[i]) * (ys[i] + ys[i + 1]);
    }
    total
}

/// Composite Simpson rule for `f` on `[lower, upper]`.
///
/// An odd interval count is rounded up to the next even number.
pub fn simpson<F>(f: F, lower: f64, upper: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if upper <= lower {
        return 0.0;
    }
    let intervals = {
        let n = intervals.max(2);
        n + n % 2
    };
    let h = (upper - lower) / intervals as f64;
    let mut total = f(lower) + f(upper);
    for k in 1..intervals {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        total += weight * f(lower + h * k as f64);
    }
    total * h / 3.0
}
