//! Segment-locating cursor.
//!
//! A `Cursor` remembers the segment used by the last query. Sequential
//! queries either stay in that segment or step to the next one in O(1);
//! anything else rescans from the head of the view.

use bp_ir::{interpolate, NodeKey};

use crate::view::ChainView;

/// How the cursor moved on the last `set_time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekStep {
    /// The current segment still brackets the time.
    Stay,
    /// The following segment brackets the time.
    Advance,
    /// A scan from the head was needed.
    Scan,
    /// The view has no breakpoints.
    Empty,
}

/// Cursor into a breakpoint view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cursor {
    current: Option<NodeKey>,
    time_now: f64,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor parked on `key` at `time`.
    pub fn at(key: Option<NodeKey>, time: f64) -> Self {
        Self { current: key, time_now: time }
    }

    /// Segment start the cursor is on.
    pub fn current(&self) -> Option<NodeKey> {
        self.current
    }

    /// Time of the last query.
    pub fn time_now(&self) -> f64 {
        self.time_now
    }

    /// Move the cursor to the segment containing `time`.
    pub fn set_time<V: ChainView>(&mut self, view: &V, time: f64) -> SeekStep {
        self.time_now = time;
        let Some(head) = view.head() else {
            self.current = None;
            return SeekStep::Empty;
        };

        if let Some(step) = self.try_local(view, time) {
            return step;
        }
        if time.is_nan() {
            self.current = self.current.filter(|&k| view.breakpoint(k).is_some()).or(Some(head));
            return SeekStep::Stay;
        }

        log::trace!("cursor scan for t={time}");
        self.current = Some(scan(view, head, time));
        SeekStep::Scan
    }

    /// Rules 1 and 2: stay in the current segment, or step one forward.
    fn try_local<V: ChainView>(&mut self, view: &V, time: f64) -> Option<SeekStep> {
        let current = self.current?;
        let start = view.breakpoint(current)?.time;
        let Some(next) = view.next(current) else {
            // Parked on the tail: anything at or past it stays there.
            return (time >= start).then_some(SeekStep::Stay);
        };
        let end = view.breakpoint(next)?.time;
        if start <= time && time <= end {
            return Some(SeekStep::Stay);
        }
        let after = view.next(next)?;
        let after_time = view.breakpoint(after)?.time;
        if end <= time && time <= after_time {
            self.current = Some(next);
            return Some(SeekStep::Advance);
        }
        None
    }

    /// Value of the view at the cursor's time.
    pub fn value<V: ChainView>(&self, view: &V) -> f64 {
        let Some(start) = self.current.and_then(|k| view.breakpoint(k)) else {
            return 0.0;
        };
        let end = self.current.and_then(|k| view.next(k)).and_then(|k| view.breakpoint(k));
        interpolate(start, end, self.time_now)
    }

    /// Seek to `time` and evaluate there.
    pub fn value_at<V: ChainView>(&mut self, view: &V, time: f64) -> f64 {
        self.set_time(view, time);
        self.value(view)
    }
}

/// Rule 3: walk from `head` to the first segment whose end is at or after
/// `time`. Times before the head land on the head; times past the tail land
/// on the tail.
fn scan<V: ChainView>(view: &V, head: NodeKey, time: f64) -> NodeKey {
    let mut key = head;
    match view.breakpoint(head) {
        Some(bp) if time >= bp.time => {}
        _ => return head,
    }
    while let Some(next) = view.next(key) {
        match view.breakpoint(next) {
            Some(bp) if time <= bp.time => return key,
            Some(_) => key = next,
            None => return key,
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_ir::{Breakpoint, BreakpointChain, InterpKind};

    fn linear_chain(points: &[(f64, f64)]) -> BreakpointChain {
        BreakpointChain::from_breakpoints(points.iter().map(|&(t, v)| Breakpoint::new(t, v, InterpKind::Linear)))
    }

    fn start_time(chain: &BreakpointChain, cursor: &Cursor) -> f64 {
        chain.get(cursor.current().unwrap()).unwrap().time
    }

    #[test]
    fn sequential_queries_stay_or_advance() {
        let chain = linear_chain(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]);
        let mut cursor = Cursor::new();
        assert_eq!(cursor.set_time(&chain, 0.0), SeekStep::Scan);
        for i in 1..=30 {
            let step = cursor.set_time(&chain, i as f64 * 0.1);
            assert_ne!(step, SeekStep::Scan, "t={}", i as f64 * 0.1);
        }
        assert_eq!(start_time(&chain, &cursor), 2.0);
    }

    #[test]
    fn backwards_jump_rescans() {
        let chain = linear_chain(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]);
        let mut cursor = Cursor::new();
        cursor.set_time(&chain, 2.5);
        assert_eq!(cursor.set_time(&chain, 0.5), SeekStep::Scan);
        assert_eq!(start_time(&chain, &cursor), 0.0);
    }

    #[test]
    fn before_head_lands_on_head() {
        let chain = linear_chain(&[(1.0, 3.0), (2.0, 5.0)]);
        let mut cursor = Cursor::new();
        assert_eq!(cursor.value_at(&chain, 0.0), 3.0);
        assert_eq!(start_time(&chain, &cursor), 1.0);
    }

    #[test]
    fn past_tail_lands_on_tail() {
        let chain = linear_chain(&[(0.0, 0.0), (1.0, 4.0)]);
        let mut cursor = Cursor::new();
        assert_eq!(cursor.value_at(&chain, 7.0), 4.0);
        assert_eq!(start_time(&chain, &cursor), 1.0);
        assert_eq!(cursor.set_time(&chain, 8.0), SeekStep::Stay);
    }

    #[test]
    fn node_time_evaluates_to_node_value() {
        let chain = linear_chain(&[(0.0, 0.0), (1.0, 4.0), (2.0, -1.0)]);
        let mut cursor = Cursor::new();
        assert_eq!(cursor.value_at(&chain, 1.0), 4.0);
        assert_eq!(cursor.value_at(&chain, 2.0), -1.0);
        assert_eq!(cursor.value_at(&chain, 0.0), 0.0);
    }

    #[test]
    fn single_node_returns_its_value() {
        let chain = linear_chain(&[(0.5, 9.0)]);
        let mut cursor = Cursor::new();
        assert_eq!(cursor.value_at(&chain, 0.0), 9.0);
        assert_eq!(cursor.value_at(&chain, 3.0), 9.0);
    }

    #[test]
    fn empty_view_returns_zero() {
        let chain = BreakpointChain::new();
        let mut cursor = Cursor::new();
        assert_eq!(cursor.set_time(&chain, 1.0), SeekStep::Empty);
        assert_eq!(cursor.value(&chain), 0.0);
    }

    #[test]
    fn nan_keeps_cursor() {
        let chain = linear_chain(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        let mut cursor = Cursor::new();
        cursor.set_time(&chain, 1.5);
        cursor.set_time(&chain, f64::NAN);
        assert_eq!(start_time(&chain, &cursor), 1.0);
        assert_eq!(cursor.value(&chain), 2.0);
    }

    #[test]
    fn stale_key_rescans() {
        let mut chain = linear_chain(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let mut cursor = Cursor::new();
        cursor.set_time(&chain, 1.5);
        let stale = cursor.current().unwrap();
        chain.remove(stale);
        assert_eq!(cursor.set_time(&chain, 1.5), SeekStep::Scan);
        assert!((cursor.value(&chain) - 0.0).abs() < 1e-12);
    }
}
