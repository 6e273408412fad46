//! Per-segment interpolation laws.
//!
//! Every law maps (segment start, segment end, query time) to a value and
//! never returns NaN for finite input: the bezier laws fall back to a
//! straight line when their root finder gives up, and the exponential law
//! does the same when the geometric blend is undefined.

use crate::breakpoint::{Breakpoint, InterpKind};
use crate::solve::{self, CubicRoot};

/// Endpoint magnitude below which the exponential law degrades to linear.
pub const EXPONENTIAL_ZERO_THRESHOLD: f64 = 1e-4;

/// A segment: a breakpoint and its successor, if any.
#[derive(Clone, Copy, Debug)]
pub struct Segment<'a> {
    pub start: &'a Breakpoint,
    pub end: Option<&'a Breakpoint>,
}

impl<'a> Segment<'a> {
    pub fn new(start: &'a Breakpoint, end: Option<&'a Breakpoint>) -> Self {
        Self { start, end }
    }

    /// Value of this segment at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        interpolate(self.start, self.end, time)
    }

    /// Fractional position of `time` within the segment (0 for a
    /// zero-length or open-ended segment).
    pub fn position(&self, time: f64) -> f64 {
        match self.end {
            Some(end) if end.time > self.start.time => (time - self.start.time) / (end.time - self.start.time),
            _ => 0.0,
        }
    }
}

/// Evaluate the segment starting at `start` at `time`.
///
/// Queries before the segment start, or on a breakpoint without successor,
/// return the start value.
pub fn interpolate(start: &Breakpoint, end: Option<&Breakpoint>, time: f64) -> f64 {
    let Some(end) = end else { return start.value };
    if time.is_nan() || time < start.time {
        return start.value;
    }
    match start.kind {
        InterpKind::Linear => linear(start, end, time),
        InterpKind::NearestNeighbour => nearest_neighbour(start, end, time),
        InterpKind::QuadraticBezier => quadratic_bezier(start, end, time),
        InterpKind::CubicBezier => cubic_bezier(start, end, time),
        InterpKind::Exponential => exponential(start, end, time),
        InterpKind::UserDefined(user) => {
            let value = (user.0)(&Segment::new(start, Some(end)), time);
            if value.is_finite() { value } else { linear(start, end, time) }
        }
    }
}

/// Straight line through both endpoints. A zero-length segment yields the
/// end value.
pub fn linear(start: &Breakpoint, end: &Breakpoint, time: f64) -> f64 {
    let dt = end.time - start.time;
    if dt == 0.0 {
        return end.value;
    }
    start.value + (end.value - start.value) * (time - start.time) / dt
}

/// Value of the endpoint closest in time; ties go to the start.
pub fn nearest_neighbour(start: &Breakpoint, end: &Breakpoint, time: f64) -> f64 {
    if time - start.time <= end.time - time { start.value } else { end.value }
}

/// Quadratic bezier through one control point `(cx, cy)`.
pub fn quadratic_bezier(start: &Breakpoint, end: &Breakpoint, time: f64) -> f64 {
    let (Some(&cx), Some(&cy)) = (start.params.first(), start.params.get(1)) else {
        return linear(start, end, time);
    };
    match solve::solve_quadratic_u(start.time, cx, end.time, time) {
        Some(u) => solve::bernstein2(start.value, cy, end.value, u),
        None => {
            log::debug!("no quadratic bezier root at t={time}, using linear");
            linear(start, end, time)
        }
    }
}

/// Cubic bezier through control points `(c1x, c1y)` and `(c2x, c2y)`.
pub fn cubic_bezier(start: &Breakpoint, end: &Breakpoint, time: f64) -> f64 {
    let &[c1x, c1y, c2x, c2y, ..] = start.params.as_slice() else {
        return linear(start, end, time);
    };
    match solve::solve_cubic_u(start.time, c1x, c2x, end.time, time) {
        CubicRoot::Halley(u) | CubicRoot::RegulaFalsi(u) => {
            solve::bernstein3(start.value, c1y, c2y, end.value, u)
        }
        CubicRoot::Unresolved => {
            log::debug!("cubic bezier root unresolved at t={time}, using linear");
            linear(start, end, time)
        }
    }
}

/// Geometric blend `v1 * (v2 / v1)^n`, linear when either endpoint is
/// near zero or the endpoints differ in sign.
pub fn exponential(start: &Breakpoint, end: &Breakpoint, time: f64) -> f64 {
    let (v1, v2) = (start.value, end.value);
    if libm::fabs(v1) < EXPONENTIAL_ZERO_THRESHOLD || libm::fabs(v2) < EXPONENTIAL_ZERO_THRESHOLD {
        return linear(start, end, time);
    }
    let ratio = v2 / v1;
    let dt = end.time - start.time;
    if ratio <= 0.0 || dt == 0.0 {
        return linear(start, end, time);
    }
    let n = (time - start.time) / dt;
    v1 * libm::pow(ratio, n)
}
