//! Structural validity rules for a breakpoint chain.

use crate::chain::BreakpointChain;

/// Why a chain is not structurally valid.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SanityError {
    #[error("breakpoint {index}: time or value is not finite")]
    NonFinite { index: usize },
    #[error("breakpoint {index}: negative time {time}")]
    NegativeTime { index: usize, time: f64 },
    #[error("breakpoint {index}: time {time} precedes previous breakpoint at {previous}")]
    Unsorted { index: usize, time: f64, previous: f64 },
    #[error("breakpoint {index}: {kind} needs {needed} shape parameters, found {found}")]
    MissingShapeParams { index: usize, kind: &'static str, needed: usize, found: usize },
}

/// Check that times are finite, non-negative and non-decreasing, and that
/// every segment-starting bezier breakpoint carries its control points.
/// The final breakpoint's kind is not checked: it starts no segment.
pub fn check_sanity(chain: &BreakpointChain) -> Result<(), SanityError> {
    let mut previous: Option<f64> = None;
    let mut iter = chain.iter().enumerate().peekable();

    while let Some((index, (_, bp))) = iter.next() {
        if !bp.is_finite() {
            return Err(SanityError::NonFinite { index });
        }
        if bp.time < 0.0 {
            return Err(SanityError::NegativeTime { index, time: bp.time });
        }
        if let Some(previous) = previous {
            if bp.time < previous {
                return Err(SanityError::Unsorted { index, time: bp.time, previous });
            }
        }
        let needed = bp.kind.required_params();
        if iter.peek().is_some() && bp.params.len() < needed {
            return Err(SanityError::MissingShapeParams {
                index,
                kind: bp.kind.name(),
                needed,
                found: bp.params.len(),
            });
        }
        previous = Some(bp.time);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::{Breakpoint, InterpKind};

    fn bp(time: f64, kind: InterpKind, params: &[f64]) -> Breakpoint {
        Breakpoint::with_params(time, 0.5, kind, params)
    }

    #[test]
    fn valid_chain_passes() {
        let c = BreakpointChain::from_breakpoints([
            bp(0.0, InterpKind::CubicBezier, &[0.2, 0.1, 0.4, 0.9]),
            bp(0.5, InterpKind::QuadraticBezier, &[0.7, 0.2]),
            bp(0.5, InterpKind::Linear, &[]),
            bp(1.0, InterpKind::CubicBezier, &[]),
        ]);
        assert_eq!(check_sanity(&c), Ok(()));
    }

    #[test]
    fn empty_chain_passes() {
        assert_eq!(check_sanity(&BreakpointChain::new()), Ok(()));
    }

    #[test]
    fn unsorted_is_rejected() {
        let c = BreakpointChain::from_breakpoints([
            bp(0.0, InterpKind::Linear, &[]),
            bp(1.0, InterpKind::Linear, &[]),
            bp(0.5, InterpKind::Linear, &[]),
        ]);
        assert_eq!(check_sanity(&c), Err(SanityError::Unsorted { index: 2, time: 0.5, previous: 1.0 }));
    }

    #[test]
    fn negative_time_is_rejected() {
        let c = BreakpointChain::from_breakpoints([bp(-0.1, InterpKind::Linear, &[]), bp(1.0, InterpKind::Linear, &[])]);
        assert_eq!(check_sanity(&c), Err(SanityError::NegativeTime { index: 0, time: -0.1 }));
    }

    #[test]
    fn missing_bezier_params_are_rejected() {
        let c = BreakpointChain::from_breakpoints([
            bp(0.0, InterpKind::CubicBezier, &[0.2, 0.1]),
            bp(1.0, InterpKind::Linear, &[]),
        ]);
        assert_eq!(
            check_sanity(&c),
            Err(SanityError::MissingShapeParams { index: 0, kind: "cubic-bezier", needed: 4, found: 2 })
        );
    }

    #[test]
    fn non_finite_is_rejected() {
        let c = BreakpointChain::from_breakpoints([
            bp(0.0, InterpKind::Linear, &[]),
            bp(f64::INFINITY, InterpKind::Linear, &[]),
        ]);
        assert_eq!(check_sanity(&c), Err(SanityError::NonFinite { index: 1 }));
    }
}
