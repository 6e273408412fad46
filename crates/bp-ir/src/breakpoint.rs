//! Breakpoint and interpolation kind types.

use arrayvec::ArrayVec;
use core::fmt;

use crate::interp::Segment;

/// Maximum shape parameters per breakpoint. Cubic bezier needs 4;
/// the rest is headroom for user-defined laws loaded from files.
pub const MAX_SHAPE_PARAMS: usize = 8;

/// Shape parameters carried by a breakpoint.
///
/// For bezier kinds these are control points laid out `x0 y0 x1 y1 ...`,
/// where `x` is a time and `y` a value.
pub type ShapeParams = ArrayVec<f64, MAX_SHAPE_PARAMS>;

/// Signature of a user-supplied segment law.
pub type InterpFn = fn(&Segment<'_>, f64) -> f64;

/// A user-supplied segment law.
#[derive(Clone, Copy)]
pub struct UserInterp(pub InterpFn);

impl fmt::Debug for UserInterp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserInterp({:p})", self.0 as *const ())
    }
}

impl PartialEq for UserInterp {
    fn eq(&self, other: &Self) -> bool {
        self.0 as *const () == other.0 as *const ()
    }
}

/// How to interpolate FROM a breakpoint TO the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InterpKind {
    /// Straight line to the next point.
    #[default]
    Linear,
    /// Whichever endpoint is closer in time.
    NearestNeighbour,
    /// Quadratic bezier with one control point `(cx, cy)`.
    QuadraticBezier,
    /// Cubic bezier with two control points `(c1x, c1y, c2x, c2y)`.
    CubicBezier,
    /// Geometric blend `v1 * (v2 / v1)^n`.
    Exponential,
    /// Caller-provided law. Has no file representation.
    UserDefined(UserInterp),
}

impl InterpKind {
    /// Kinds that can be written to a breakpoint file, in index order.
    pub const INDEXED: [InterpKind; 5] = [
        InterpKind::Linear,
        InterpKind::NearestNeighbour,
        InterpKind::CubicBezier,
        InterpKind::Exponential,
        InterpKind::QuadraticBezier,
    ];

    /// Look up a kind by its file index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::INDEXED.get(index as usize).copied()
    }

    /// File index of this kind (`None` for user-defined laws).
    pub fn index(&self) -> Option<u8> {
        match self {
            InterpKind::Linear => Some(0),
            InterpKind::NearestNeighbour => Some(1),
            InterpKind::CubicBezier => Some(2),
            InterpKind::Exponential => Some(3),
            InterpKind::QuadraticBezier => Some(4),
            InterpKind::UserDefined(_) => None,
        }
    }

    /// Minimum number of shape parameters this kind needs.
    pub fn required_params(&self) -> usize {
        match self {
            InterpKind::QuadraticBezier => 2,
            InterpKind::CubicBezier => 4,
            _ => 0,
        }
    }

    /// Whether the shape parameters are `(time, value)` control points.
    pub fn has_control_points(&self) -> bool {
        matches!(self, InterpKind::QuadraticBezier | InterpKind::CubicBezier)
    }

    /// Short display label.
    pub fn name(&self) -> &'static str {
        match self {
            InterpKind::Linear => "linear",
            InterpKind::NearestNeighbour => "nearest",
            InterpKind::QuadraticBezier => "quadratic-bezier",
            InterpKind::CubicBezier => "cubic-bezier",
            InterpKind::Exponential => "exponential",
            InterpKind::UserDefined(_) => "user-defined",
        }
    }
}

impl fmt::Display for InterpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A control point in a breakpoint chain.
#[derive(Clone, Debug, PartialEq)]
pub struct Breakpoint {
    /// Position in time (seconds or normalized units).
    pub time: f64,
    /// Value at this point.
    pub value: f64,
    /// Law for the segment starting here.
    pub kind: InterpKind,
    /// Kind-specific shape parameters.
    pub params: ShapeParams,
}

impl Breakpoint {
    /// Create a breakpoint without shape parameters.
    pub fn new(time: f64, value: f64, kind: InterpKind) -> Self {
        Self { time, value, kind, params: ShapeParams::new() }
    }

    /// Create a breakpoint with shape parameters.
    ///
    /// Parameters beyond `MAX_SHAPE_PARAMS` are dropped.
    pub fn with_params(time: f64, value: f64, kind: InterpKind, params: &[f64]) -> Self {
        let mut bp = Self::new(time, value, kind);
        bp.params.extend(params.iter().copied().take(MAX_SHAPE_PARAMS));
        bp
    }

    /// Control point `index` as `(time, value)`, for bezier kinds.
    pub fn control_point(&self, index: usize) -> Option<(f64, f64)> {
        if !self.kind.has_control_points() {
            return None;
        }
        let x = *self.params.get(index * 2)?;
        let y = *self.params.get(index * 2 + 1)?;
        Some((x, y))
    }

    /// Number of control points held (bezier kinds only).
    pub fn control_point_count(&self) -> usize {
        if self.kind.has_control_points() { self.params.len() / 2 } else { 0 }
    }

    /// Move the breakpoint and its time-valued shape parameters by `dt`.
    pub fn shift_time(&mut self, dt: f64) {
        self.time += dt;
        if self.kind.has_control_points() {
            for x in self.params.iter_mut().step_by(2) {
                *x += dt;
            }
        }
    }

    /// Scale the value and any value-valued shape parameters by `factor`.
    pub fn scale_value(&mut self, factor: f64) {
        self.value *= factor;
        if self.kind.has_control_points() {
            for y in self.params.iter_mut().skip(1).step_by(2) {
                *y *= factor;
            }
        }
    }

    /// Whether time, value and every parameter are finite.
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.value.is_finite() && self.params.iter().all(|p| p.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_index_round_trips() {
        for kind in InterpKind::INDEXED {
            let index = kind.index().unwrap();
            assert_eq!(InterpKind::from_index(index), Some(kind));
        }
        assert_eq!(InterpKind::from_index(5), None);
    }

    #[test]
    fn user_defined_has_no_index() {
        fn flat(_: &Segment<'_>, _: f64) -> f64 {
            0.0
        }
        assert_eq!(InterpKind::UserDefined(UserInterp(flat)).index(), None);
    }

    #[test]
    fn shift_moves_control_point_times_only() {
        let mut bp = Breakpoint::with_params(1.0, 0.5, InterpKind::CubicBezier, &[1.2, 0.4, 1.6, 0.9]);
        bp.shift_time(2.0);
        assert_eq!(bp.time, 3.0);
        assert_eq!(bp.value, 0.5);
        assert_eq!(bp.params.as_slice(), &[3.2, 0.4, 3.6, 0.9]);
    }

    #[test]
    fn shift_leaves_non_bezier_params_alone() {
        let mut bp = Breakpoint::with_params(0.0, 1.0, InterpKind::Exponential, &[0.25]);
        bp.shift_time(1.0);
        assert_eq!(bp.params.as_slice(), &[0.25]);
    }

    #[test]
    fn scale_touches_control_point_values() {
        let mut bp = Breakpoint::with_params(0.0, 2.0, InterpKind::QuadraticBezier, &[0.5, 4.0]);
        bp.scale_value(0.25);
        assert_eq!(bp.value, 0.5);
        assert_eq!(bp.params.as_slice(), &[0.5, 1.0]);
    }

    #[test]
    fn with_params_truncates() {
        let many = [0.0; MAX_SHAPE_PARAMS + 3];
        let bp = Breakpoint::with_params(0.0, 0.0, InterpKind::Linear, &many);
        assert_eq!(bp.params.len(), MAX_SHAPE_PARAMS);
    }

    #[test]
    fn control_points_need_bezier_kind() {
        let bp = Breakpoint::with_params(0.0, 0.0, InterpKind::Linear, &[0.5, 0.5]);
        assert_eq!(bp.control_point(0), None);
        let bp = Breakpoint::with_params(0.0, 0.0, InterpKind::QuadraticBezier, &[0.5, 0.7]);
        assert_eq!(bp.control_point(0), Some((0.5, 0.7)));
        assert_eq!(bp.control_point_count(), 1);
    }
}
