//! Editable envelope: a chain, its live cursor and its display bounds.

use alloc::vec::Vec;

use bp_ir::{check_sanity, Breakpoint, BreakpointChain, InterpKind, NodeKey, SanityError, MAX_SHAPE_PARAMS};

use crate::cursor::{Cursor, SeekStep};
use crate::sample::sample_view;

/// Time and value range an envelope is displayed and edited within.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub min_time: f64,
    pub max_time: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl Bounds {
    pub const UNIT: Bounds = Bounds { min_time: 0.0, max_time: 1.0, min_value: 0.0, max_value: 1.0 };

    /// Bounds covering every breakpoint of `chain`, anchored at time 0 and
    /// value 0.
    pub fn of(chain: &BreakpointChain) -> Self {
        let mut bounds = Bounds::default();
        for (_, bp) in chain.iter() {
            bounds.include(bp);
        }
        bounds
    }

    /// Grow the bounds so `bp` lies inside them.
    pub fn include(&mut self, bp: &Breakpoint) {
        self.min_time = self.min_time.min(bp.time);
        self.max_time = self.max_time.max(bp.time);
        self.min_value = self.min_value.min(bp.value);
        self.max_value = self.max_value.max(bp.value);
    }

    pub fn time_span(&self) -> f64 {
        self.max_time - self.min_time
    }

    pub fn value_span(&self) -> f64 {
        self.max_value - self.min_value
    }

    /// Time of sample `index` out of `count`, both ends inclusive.
    pub fn sample_time(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.min_time;
        }
        self.min_time + self.time_span() * index as f64 / (count - 1) as f64
    }

    /// Map `value` onto `[0, height]`. A zero value span maps to 0.
    pub fn scale_value(&self, value: f64, height: f64) -> f64 {
        let span = self.value_span();
        if span == 0.0 {
            return 0.0;
        }
        (value - self.min_value) / span * height
    }

    /// `x` limited to `[lo, hi]`; `hi` wins when the range is inverted.
    pub(crate) fn clamp_between(x: f64, lo: f64, hi: f64) -> f64 {
        x.max(lo).min(hi)
    }
}

/// Errors from editing an envelope.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no breakpoint {0:?} in this envelope")]
    UnknownBreakpoint(NodeKey),
    #[error("cannot remove the last breakpoint")]
    LastBreakpoint,
    #[error("{0} is not finite")]
    NonFinite(&'static str),
    #[error("{found} shape parameters given, at most {max} allowed", max = MAX_SHAPE_PARAMS)]
    TooManyParams { found: usize },
    #[error("breakpoint has no control point {index}")]
    NoControlPoint { index: usize },
}

/// A breakpoint chain with a live cursor.
///
/// Queries through `value_at` move the cursor; sampling for display does
/// not.
#[derive(Clone, Debug, Default)]
pub struct Envelope {
    pub(crate) chain: BreakpointChain,
    pub(crate) cursor: Cursor,
    pub(crate) bounds: Bounds,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a chain; bounds are computed from its breakpoints.
    pub fn from_chain(chain: BreakpointChain) -> Self {
        let bounds = Bounds::of(&chain);
        let cursor = Cursor::at(chain.first(), bounds.min_time);
        Self { chain, cursor, bounds }
    }

    pub fn chain(&self) -> &BreakpointChain {
        &self.chain
    }

    pub fn into_chain(self) -> BreakpointChain {
        self.chain
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn bounds_mut(&mut self) -> &mut Bounds {
        &mut self.bounds
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn get(&self, key: NodeKey) -> Option<&Breakpoint> {
        self.chain.get(key)
    }

    /// Keys in chain order.
    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.chain.iter().map(|(key, _)| key)
    }

    /// Move the cursor to the segment containing `time`.
    pub fn set_time(&mut self, time: f64) -> SeekStep {
        self.cursor.set_time(&self.chain, time)
    }

    /// Value at the cursor's current time.
    pub fn current_value(&self) -> f64 {
        self.cursor.value(&self.chain)
    }

    /// Seek to `time` and return the value there.
    pub fn value_at(&mut self, time: f64) -> f64 {
        self.cursor.value_at(&self.chain, time)
    }

    /// Start of the segment the cursor is on.
    pub fn current(&self) -> Option<NodeKey> {
        self.cursor.current()
    }

    pub fn time_now(&self) -> f64 {
        self.cursor.time_now()
    }

    /// Insert keeping time order. The cursor is left where it was.
    pub fn insert(&mut self, bp: Breakpoint) -> NodeKey {
        self.bounds.include(&bp);
        self.chain.insert(bp)
    }

    /// Build and insert a breakpoint.
    pub fn insert_breakpoint(
        &mut self,
        time: f64,
        value: f64,
        kind: InterpKind,
        params: &[f64],
    ) -> Result<NodeKey, EditError> {
        let bp = checked_breakpoint(time, value, kind, params)?;
        Ok(self.insert(bp))
    }

    fn ensure(&self, key: NodeKey) -> Result<(), EditError> {
        // Detached nodes are not part of the editable chain.
        if self.chain.first() == Some(key) || self.chain.predecessor(key).is_some() {
            Ok(())
        } else {
            Err(EditError::UnknownBreakpoint(key))
        }
    }

    /// Unlink a breakpoint. The last remaining breakpoint cannot be removed.
    pub fn remove(&mut self, key: NodeKey) -> Result<Breakpoint, EditError> {
        self.ensure(key)?;
        if self.chain.next(key).is_none() && self.chain.first() == Some(key) {
            return Err(EditError::LastBreakpoint);
        }
        let removed = self.chain.remove(key).ok_or(EditError::UnknownBreakpoint(key))?;
        if self.cursor.current() == Some(key) {
            let now = self.cursor.time_now();
            self.cursor = Cursor::new();
            self.cursor.set_time(&self.chain, now);
        }
        Ok(removed)
    }

    /// Move a breakpoint, clamping its time between its neighbours and its
    /// value into the bounds.
    pub fn move_breakpoint(&mut self, key: NodeKey, time: f64, value: f64) -> Result<(), EditError> {
        self.ensure(key)?;
        if !time.is_finite() || !value.is_finite() {
            return Err(EditError::NonFinite("breakpoint position"));
        }
        let lo = match self.chain.predecessor(key) {
            Some(prev) => self.chain.get(prev).map_or(self.bounds.min_time, |b| b.time),
            None => self.bounds.min_time,
        };
        let hi = match self.chain.next(key) {
            Some(next) => self.chain.get(next).map_or(self.bounds.max_time, |b| b.time),
            None => self.bounds.max_time,
        };
        let (min_value, max_value) = (self.bounds.min_value, self.bounds.max_value);
        let bp = self.chain.get_mut(key).ok_or(EditError::UnknownBreakpoint(key))?;
        bp.time = Bounds::clamp_between(time, lo, hi);
        bp.value = Bounds::clamp_between(value, min_value, max_value);
        Ok(())
    }

    /// Move control point `index` of a bezier breakpoint, clamped into the
    /// bounds.
    pub fn move_control_point(&mut self, key: NodeKey, index: usize, time: f64, value: f64) -> Result<(), EditError> {
        self.ensure(key)?;
        if !time.is_finite() || !value.is_finite() {
            return Err(EditError::NonFinite("control point"));
        }
        let bounds = self.bounds;
        let bp = self.chain.get_mut(key).ok_or(EditError::UnknownBreakpoint(key))?;
        if bp.control_point(index).is_none() {
            return Err(EditError::NoControlPoint { index });
        }
        bp.params[index * 2] = Bounds::clamp_between(time, bounds.min_time, bounds.max_time);
        bp.params[index * 2 + 1] = Bounds::clamp_between(value, bounds.min_value, bounds.max_value);
        Ok(())
    }

    pub fn set_value(&mut self, key: NodeKey, value: f64) -> Result<(), EditError> {
        self.ensure(key)?;
        if !value.is_finite() {
            return Err(EditError::NonFinite("value"));
        }
        let bp = self.chain.get_mut(key).ok_or(EditError::UnknownBreakpoint(key))?;
        bp.value = value;
        self.bounds.include(bp);
        Ok(())
    }

    /// Change the law of the segment starting at `key`. Switching to a
    /// bezier kind without enough parameters seeds control points on the
    /// straight line to the next breakpoint.
    pub fn set_kind(&mut self, key: NodeKey, kind: InterpKind) -> Result<(), EditError> {
        self.ensure(key)?;
        let end = self.chain.next(key).and_then(|k| self.chain.get(k)).map(|b| (b.time, b.value));
        let bp = self.chain.get_mut(key).ok_or(EditError::UnknownBreakpoint(key))?;
        bp.kind = kind;
        if bp.params.len() < kind.required_params() {
            let (t1, v1) = end.unwrap_or((bp.time, bp.value));
            let (t0, v0) = (bp.time, bp.value);
            let lerp = |f: f64| [t0 + (t1 - t0) * f, v0 + (v1 - v0) * f];
            bp.params.clear();
            match kind {
                InterpKind::QuadraticBezier => bp.params.extend(lerp(0.5)),
                InterpKind::CubicBezier => {
                    bp.params.extend(lerp(1.0 / 3.0));
                    bp.params.extend(lerp(2.0 / 3.0));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Replace the shape parameters of a breakpoint.
    pub fn set_params(&mut self, key: NodeKey, params: &[f64]) -> Result<(), EditError> {
        self.ensure(key)?;
        if params.len() > MAX_SHAPE_PARAMS {
            return Err(EditError::TooManyParams { found: params.len() });
        }
        if params.iter().any(|p| !p.is_finite()) {
            return Err(EditError::NonFinite("shape parameter"));
        }
        let bp = self.chain.get_mut(key).ok_or(EditError::UnknownBreakpoint(key))?;
        bp.params.clear();
        bp.params.extend(params.iter().copied());
        Ok(())
    }

    /// Scale every value so the largest becomes 1.
    pub fn normalize(&mut self) {
        let max = self.chain.iter().map(|(_, bp)| bp.value).fold(f64::NEG_INFINITY, f64::max);
        if !(max.is_finite() && max > 0.0) {
            log::warn!("cannot normalize envelope with maximum value {max}");
            return;
        }
        let factor = 1.0 / max;
        self.chain.for_each_mut(|bp| bp.scale_value(factor));
        self.bounds.min_value *= factor;
        self.bounds.max_value = 1.0;
    }

    /// Recompute bounds from the breakpoints.
    pub fn recompute_bounds(&mut self) {
        self.bounds = Bounds::of(&self.chain);
    }

    /// `width` values across the time bounds, scaled into `[0, height]`.
    /// The live cursor is not moved.
    pub fn sample_curve(&self, width: usize, height: f64) -> Vec<f64> {
        sample_view(&self.chain, &self.bounds, width, height)
    }

    pub fn check_sanity(&self) -> Result<(), SanityError> {
        check_sanity(&self.chain)
    }
}

impl From<BreakpointChain> for Envelope {
    fn from(chain: BreakpointChain) -> Self {
        Self::from_chain(chain)
    }
}

pub(crate) fn checked_breakpoint(
    time: f64,
    value: f64,
    kind: InterpKind,
    params: &[f64],
) -> Result<Breakpoint, EditError> {
    if !time.is_finite() {
        return Err(EditError::NonFinite("time"));
    }
    if !value.is_finite() {
        return Err(EditError::NonFinite("value"));
    }
    if params.len() > MAX_SHAPE_PARAMS {
        return Err(EditError::TooManyParams { found: params.len() });
    }
    if params.iter().any(|p| !p.is_finite()) {
        return Err(EditError::NonFinite("shape parameter"));
    }
    Ok(Breakpoint::with_params(time, value, kind, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ramp() -> Envelope {
        Envelope::from_chain(BreakpointChain::from_breakpoints([
            Breakpoint::new(0.0, 0.0, InterpKind::Linear),
            Breakpoint::new(1.0, 1.0, InterpKind::Linear),
        ]))
    }

    fn times(env: &Envelope) -> Vec<f64> {
        env.chain().iter().map(|(_, b)| b.time).collect()
    }

    #[test]
    fn value_at_midpoint() {
        let mut env = ramp();
        assert_eq!(env.value_at(0.5), 0.5);
        assert_eq!(env.current_value(), 0.5);
        assert_eq!(env.time_now(), 0.5);
    }

    #[test]
    fn insert_keeps_order_and_cursor() {
        let mut env = ramp();
        env.set_time(0.25);
        let before = env.current();
        env.insert_breakpoint(0.5, 0.9, InterpKind::Linear, &[]).unwrap();
        env.insert_breakpoint(0.75, 0.1, InterpKind::Linear, &[]).unwrap();
        assert_eq!(times(&env), [0.0, 0.5, 0.75, 1.0]);
        assert_eq!(env.current(), before);
        assert_eq!(env.time_now(), 0.25);
        assert!((env.value_at(0.25) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn insert_extends_bounds() {
        let mut env = ramp();
        env.insert_breakpoint(2.0, 3.0, InterpKind::Linear, &[]).unwrap();
        assert_eq!(env.bounds().max_time, 2.0);
        assert_eq!(env.bounds().max_value, 3.0);
    }

    #[test]
    fn insert_rejects_bad_input() {
        let mut env = ramp();
        assert_eq!(
            env.insert_breakpoint(f64::NAN, 0.0, InterpKind::Linear, &[]),
            Err(EditError::NonFinite("time"))
        );
        let many = [0.0; MAX_SHAPE_PARAMS + 1];
        assert_eq!(
            env.insert_breakpoint(0.5, 0.0, InterpKind::Linear, &many),
            Err(EditError::TooManyParams { found: MAX_SHAPE_PARAMS + 1 })
        );
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn remove_guards_last_breakpoint() {
        let mut env = ramp();
        let keys: Vec<_> = env.keys().collect();
        env.remove(keys[0]).unwrap();
        assert_eq!(env.remove(keys[1]), Err(EditError::LastBreakpoint));
        assert_eq!(env.remove(keys[0]), Err(EditError::UnknownBreakpoint(keys[0])));
    }

    #[test]
    fn remove_under_cursor_reseeks() {
        let mut env = Envelope::from_chain(BreakpointChain::from_breakpoints([
            Breakpoint::new(0.0, 0.0, InterpKind::Linear),
            Breakpoint::new(1.0, 1.0, InterpKind::Linear),
            Breakpoint::new(2.0, 0.0, InterpKind::Linear),
        ]));
        env.set_time(1.5);
        let under = env.current().unwrap();
        env.remove(under).unwrap();
        assert!((env.current_value() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn move_clamps_between_neighbours() {
        let mut env = Envelope::from_chain(BreakpointChain::from_breakpoints([
            Breakpoint::new(0.0, 0.0, InterpKind::Linear),
            Breakpoint::new(0.5, 0.5, InterpKind::Linear),
            Breakpoint::new(1.0, 1.0, InterpKind::Linear),
        ]));
        let middle = env.keys().nth(1).unwrap();
        env.move_breakpoint(middle, 3.0, -2.0).unwrap();
        let bp = env.get(middle).unwrap();
        assert_eq!((bp.time, bp.value), (1.0, 0.0));
        env.move_breakpoint(middle, -1.0, 0.25).unwrap();
        let bp = env.get(middle).unwrap();
        assert_eq!((bp.time, bp.value), (0.0, 0.25));
    }

    #[test]
    fn set_kind_seeds_control_points() {
        let mut env = ramp();
        let head = env.keys().next().unwrap();
        env.set_kind(head, InterpKind::QuadraticBezier).unwrap();
        assert_eq!(env.get(head).unwrap().params.as_slice(), &[0.5, 0.5]);
        env.set_kind(head, InterpKind::CubicBezier).unwrap();
        assert_eq!(env.get(head).unwrap().control_point_count(), 2);
        assert!((env.value_at(0.3) - 0.3).abs() < 1e-4);
    }

    #[test]
    fn move_control_point_clamps_to_bounds() {
        let mut env = ramp();
        let head = env.keys().next().unwrap();
        env.set_kind(head, InterpKind::QuadraticBezier).unwrap();
        env.move_control_point(head, 0, 5.0, 0.8).unwrap();
        assert_eq!(env.get(head).unwrap().control_point(0), Some((1.0, 0.8)));
        assert_eq!(env.move_control_point(head, 1, 0.5, 0.5), Err(EditError::NoControlPoint { index: 1 }));
    }

    #[test]
    fn normalize_scales_to_unit_max() {
        let mut env = Envelope::from_chain(BreakpointChain::from_breakpoints([
            Breakpoint::new(0.0, 1.0, InterpKind::Linear),
            Breakpoint::with_params(1.0, 4.0, InterpKind::QuadraticBezier, &[1.5, 2.0]),
            Breakpoint::new(2.0, 2.0, InterpKind::Linear),
        ]));
        env.normalize();
        let values: Vec<f64> = env.chain().iter().map(|(_, b)| b.value).collect();
        assert_eq!(values, [0.25, 1.0, 0.5]);
        let key = env.keys().nth(1).unwrap();
        assert_eq!(env.get(key).unwrap().params.as_slice(), &[1.5, 0.5]);
        assert_eq!(env.bounds().max_value, 1.0);
    }

    #[test]
    fn normalize_ignores_non_positive_max() {
        let mut env = Envelope::from_chain(BreakpointChain::from_breakpoints([
            Breakpoint::new(0.0, -1.0, InterpKind::Linear),
            Breakpoint::new(1.0, 0.0, InterpKind::Linear),
        ]));
        env.normalize();
        let values: Vec<f64> = env.chain().iter().map(|(_, b)| b.value).collect();
        assert_eq!(values, [-1.0, 0.0]);
    }

    #[test]
    fn sample_curve_leaves_cursor() {
        let mut env = ramp();
        env.set_time(0.75);
        let before = env.current();
        assert_eq!(env.sample_curve(3, 10.0), vec![0.0, 5.0, 10.0]);
        assert_eq!(env.current(), before);
        assert_eq!(env.time_now(), 0.75);
    }

    #[test]
    fn empty_envelope_reads_zero() {
        let mut env = Envelope::new();
        assert_eq!(env.value_at(1.0), 0.0);
        assert!(env.sample_curve(0, 1.0).is_empty());
    }
}
