//! Root finders for the bezier segment laws.
//!
//! A bezier segment is parameterized in `u ∈ [0, 1]`, but callers query it by
//! time. Evaluating it therefore means solving `x(u) = time` first. Quadratic
//! curves have a closed form; cubic curves go through Halley's method, then
//! regula falsi, and report when neither converged so the caller can fall
//! back to a straight line.

/// Convergence tolerance on `|x(u) - time|`.
#[cfg(feature = "precision-nano")]
pub const ENVELOPE_PRECISION: f64 = 1e-9;
/// Convergence tolerance on `|x(u) - time|`.
#[cfg(all(feature = "precision-micro", not(feature = "precision-nano")))]
pub const ENVELOPE_PRECISION: f64 = 1e-6;
/// Convergence tolerance on `|x(u) - time|` (10 microseconds).
#[cfg(not(any(feature = "precision-micro", feature = "precision-nano")))]
pub const ENVELOPE_PRECISION: f64 = 1e-5;

/// Two roots closer than this are the same root.
pub const ROOT_COINCIDENCE: f64 = 1e-7;

pub const HALLEY_MAX_ITERATIONS: usize = 25;
pub const REGULA_FALSI_MAX_ITERATIONS: usize = 10_000;

/// Outcome of solving a cubic bezier's x-component for `u`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CubicRoot {
    /// Halley's method converged.
    Halley(f64),
    /// Halley failed; regula falsi on `[0, 1]` converged.
    RegulaFalsi(f64),
    /// Neither method converged within `ENVELOPE_PRECISION`.
    Unresolved,
}

impl CubicRoot {
    /// The curve parameter, if one was found.
    pub fn parameter(self) -> Option<f64> {
        match self {
            CubicRoot::Halley(u) | CubicRoot::RegulaFalsi(u) => Some(u),
            CubicRoot::Unresolved => None,
        }
    }
}

/// Quadratic Bernstein blend of `p0, p1, p2` at `u`.
pub fn bernstein2(p0: f64, p1: f64, p2: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    v * v * p0 + 2.0 * v * u * p1 + u * u * p2
}

/// Cubic Bernstein blend of `p0..p3` at `u`.
pub fn bernstein3(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    v * v * v * p0 + 3.0 * v * v * u * p1 + 3.0 * v * u * u * p2 + u * u * u * p3
}

fn bernstein3_d1(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    3.0 * v * v * (p1 - p0) + 6.0 * v * u * (p2 - p1) + 3.0 * u * u * (p3 - p2)
}

fn bernstein3_d2(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
    6.0 * (1.0 - u) * (p2 - 2.0 * p1 + p0) + 6.0 * u * (p3 - 2.0 * p2 + p1)
}

fn admissible(u: f64) -> Option<f64> {
    if u.is_finite() && (-ROOT_COINCIDENCE..=1.0 + ROOT_COINCIDENCE).contains(&u) {
        Some(u.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Solve `x(u) = time` for a quadratic bezier with x-coordinates `x0, cx, x1`.
///
/// Returns the root in `[0, 1]`, or `None` when the discriminant is negative
/// or no root lies in range.
pub fn solve_quadratic_u(x0: f64, cx: f64, x1: f64, time: f64) -> Option<f64> {
    let a = x0 - 2.0 * cx + x1;
    let b = 2.0 * (cx - x0);
    let c = x0 - time;

    if libm::fabs(a) < ROOT_COINCIDENCE {
        // Control point sits midway: x(u) is linear in u.
        if libm::fabs(b) < ROOT_COINCIDENCE {
            return None;
        }
        return admissible(-c / b);
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = libm::sqrt(disc);
    let r1 = (-b + sq) / (2.0 * a);
    let r2 = (-b - sq) / (2.0 * a);
    if libm::fabs(r1 - r2) < ROOT_COINCIDENCE {
        return admissible(0.5 * (r1 + r2));
    }
    admissible(r1).or_else(|| admissible(r2))
}

/// Solve `x(u) = time` for a cubic bezier with x-coordinates `x0, c1, c2, x1`.
pub fn solve_cubic_u(x0: f64, c1: f64, c2: f64, x1: f64, time: f64) -> CubicRoot {
    if let Some(u) = halley(x0, c1, c2, x1, time) {
        return CubicRoot::Halley(u);
    }
    log::debug!("halley did not converge at t={time}, trying regula falsi");
    match regula_falsi(|u| bernstein3(x0, c1, c2, x1, u) - time) {
        Some(u) => CubicRoot::RegulaFalsi(u),
        None => CubicRoot::Unresolved,
    }
}

/// Halley iteration from a linear guess. `None` on a degenerate
/// denominator, a non-finite step, a step that does not reduce the error,
/// or when the iteration cap is reached.
fn halley(x0: f64, c1: f64, c2: f64, x1: f64, time: f64) -> Option<f64> {
    let span = x1 - x0;
    let mut u = if libm::fabs(span) > f64::EPSILON { ((time - x0) / span).clamp(0.0, 1.0) } else { 0.5 };
    let mut err = bernstein3(x0, c1, c2, x1, u) - time;

    for _ in 0..HALLEY_MAX_ITERATIONS {
        if libm::fabs(err) < ENVELOPE_PRECISION {
            return Some(u);
        }
        let d1 = bernstein3_d1(x0, c1, c2, x1, u);
        let d2 = bernstein3_d2(x0, c1, c2, x1, u);
        let denom = 2.0 * d1 * d1 - err * d2;
        if libm::fabs(denom) < f64::EPSILON {
            return None;
        }
        let step = 2.0 * err * d1 / denom;
        if !step.is_finite() {
            return None;
        }
        let next = (u - step).clamp(0.0, 1.0);
        let next_err = bernstein3(x0, c1, c2, x1, next) - time;
        if libm::fabs(next_err) >= libm::fabs(err) {
            return None;
        }
        u = next;
        err = next_err;
    }

    (libm::fabs(err) < ENVELOPE_PRECISION).then_some(u)
}

/// Regula falsi (Illinois variant) on a fresh `[0, 1]` bracket.
fn regula_falsi(f: impl Fn(f64) -> f64) -> Option<f64> {
    let (mut a, mut b) = (0.0_f64, 1.0_f64);
    let (mut fa, mut fb) = (f(a), f(b));

    if libm::fabs(fa) < ENVELOPE_PRECISION {
        return Some(a);
    }
    if libm::fabs(fb) < ENVELOPE_PRECISION {
        return Some(b);
    }
    if !(fa.is_finite() && fb.is_finite()) || (fa < 0.0) == (fb < 0.0) {
        return None;
    }

    // Which end was retained last: -1 = a, 1 = b.
    let mut side = 0;
    for _ in 0..REGULA_FALSI_MAX_ITERATIONS {
        let denom = fb - fa;
        if denom == 0.0 {
            return None;
        }
        let c = b - fb * (b - a) / denom;
        let fc = f(c);
        if !fc.is_finite() {
            return None;
        }
        if libm::fabs(fc) < ENVELOPE_PRECISION {
            return Some(c);
        }
        if (fc < 0.0) == (fa < 0.0) {
            a = c;
            fa = fc;
            if side == -1 {
                fb *= 0.5;
            }
            side = -1;
        } else {
            b = c;
            fb = fc;
            if side == 1 {
                fa *= 0.5;
            }
            side = 1;
        }
    }
    None
}
