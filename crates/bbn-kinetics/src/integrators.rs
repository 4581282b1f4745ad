//! Variable-order Adams multi-step formulas.
//!
//! Derivative histories are passed newest first: `fs[0]` is `f_n`, `fs[1]` is
//! `f_{n-1}` and so on. Both solvers are pure functions of their inputs.

/// Highest order supported by either solver.
pub const MAX_ORDER: usize = 5;

const AB1: [f64; 1] = [1.0];
const AB2: [f64; 2] = [3.0 / 2.0, -1.0 / 2.0];
const AB3: [f64; 3] = [23.0 / 12.0, -16.0 / 12.0, 5.0 / 12.0];
const AB4: [f64; 4] = [55.0 / 24.0, -59.0 / 24.0, 37.0 / 24.0, -9.0 / 24.0];
const AB5: [f64; 5] = [
    1901.0 / 720.0,
    -2774.0 / 720.0,
    2616.0 / 720.0,
    -1274.0 / 720.0,
    251.0 / 720.0,
];

const AM1: [f64; 1] = [1.0];
const AM2: [f64; 2] = [1.0 / 2.0, 1.0 / 2.0];
const AM3: [f64; 3] = [5.0 / 12.0, 8.0 / 12.0, -1.0 / 12.0];
const AM4: [f64; 4] = [9.0 / 24.0, 19.0 / 24.0, -5.0 / 24.0, 1.0 / 24.0];
const AM5: [f64; 5] = [
    251.0 / 720.0,
    646.0 / 720.0,
    -264.0 / 720.0,
    106.0 / 720.0,
    -19.0 / 720.0,
];

/// Solver order available after `history_len` recorded evaluations.
pub fn order_for(history_len: usize) -> usize {
    (history_len + 1).min(MAX_ORDER)
}

fn clamp_order(order: usize) -> usize {
    order.clamp(1, MAX_ORDER)
}

/// Adams-Bashforth coefficients for `f_n, f_{n-1}, ...` at the given order.
pub fn adams_bashforth_coefficients(order: usize) -> &'static [f64] {
    match clamp_order(order) {
        1 => &AB1,
        2 => &AB2,
        3 => &AB3,
        4 => &AB4,
        _ => &AB5,
    }
}

/// Adams-Moulton coefficients for `f_{n+1}, f_n, ...` at the given order.
pub fn adams_moulton_coefficients(order: usize) -> &'static [f64] {
    match clamp_order(order) {
        1 => &AM1,
        2 => &AM2,
        3 => &AM3,
        4 => &AM4,
        _ => &AM5,
    }
}

/// Explicit Adams-Bashforth increment `h Σ b_j f_{n-j}`.
///
/// The order is clamped to the number of supplied evaluations; order 1 is the
/// forward Euler step `h · f_n`.
pub fn adams_bashforth_correction(fs: &[f64], h: f64, order: usize) -> f64 {
    if fs.is_empty() {
        return 0.0;
    }
    let order = clamp_order(order).min(fs.len());
    let sum: f64 = adams_bashforth_coefficients(order)
        .iter()
        .zip(fs)
        .map(|(b, f)| b * f)
        .sum();
    h * sum
}

/// Solves the Adams-Moulton step for a right-hand side linear in the unknown.
///
/// The new derivative is `f_{n+1} = A − B · y_{n+1}`, so the implicit formula
/// `y_{n+1} = y_n + h (c_0 f_{n+1} + Σ_{j≥1} c_j f_{n+1-j})` is solved directly:
///
/// `y_{n+1} = (y_n + h c_0 A + h Σ_{j≥1} c_j f_{n+1-j}) / (1 + h c_0 B)`.
///
/// `past` holds `f_n, f_{n-1}, ...`; the order is clamped to `past.len() + 1`.
pub fn adams_moulton_solve(y: f64, past: &[f64], a: f64, b: f64, h: f64, order: usize) -> f64 {
    let order = clamp_order(order).min(past.len() + 1);
    let coefficients = adams_moulton_coefficients(order);
    let explicit: f64 = coefficients[1..]
        .iter()
        .zip(past)
        .map(|(c, f)| c * f)
        .sum();
    let c0 = coefficients[0];
    (y + h * c0 * a + h * explicit) / (1.0 + h * c0 * b)
}
