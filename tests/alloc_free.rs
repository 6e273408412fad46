//! Allocation-free query path tests.
//!
//! Seeking and evaluating must not touch the heap once an envelope is
//! built, whether it is a plain chain or a released ADSR reading through
//! its merged view.
//!
//! Runs under plain `cargo test`, no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use bp_engine::{AdsrEnvelope, Envelope};
use bp_ir::{Breakpoint, BreakpointChain, InterpKind};

const SAMPLE_RATE: f64 = 48_000.0;

fn every_law() -> Envelope {
    Envelope::from_chain(BreakpointChain::from_breakpoints([
        Breakpoint::new(0.0, 0.0, InterpKind::Linear),
        Breakpoint::new(0.2, 1.0, InterpKind::NearestNeighbour),
        Breakpoint::with_params(0.4, 0.5, InterpKind::CubicBezier, &[0.45, 0.9, 0.55, 0.1]),
        Breakpoint::new(0.6, 0.8, InterpKind::Exponential),
        Breakpoint::with_params(0.8, 0.2, InterpKind::QuadraticBezier, &[0.9, 0.7]),
        Breakpoint::new(1.0, 0.6, InterpKind::Linear),
    ]))
}

#[test]
fn sequential_queries_alloc_free() {
    let mut env = every_law();
    let mut acc = 0.0;
    assert_no_alloc(|| {
        for i in 0..SAMPLE_RATE as usize * 2 {
            acc += env.value_at(i as f64 / SAMPLE_RATE);
        }
    });
    assert!(acc.is_finite());
}

#[test]
fn random_access_alloc_free() {
    let mut env = every_law();
    let mut acc = 0.0;
    assert_no_alloc(|| {
        for i in 0..10_000usize {
            acc += env.value_at(((i * 7919) % 1000) as f64 / 900.0);
        }
    });
    assert!(acc.is_finite());
}

#[test]
fn adsr_lifecycle_alloc_free() {
    let mut adsr = AdsrEnvelope::new(0.05, 0.1, 0.6, 0.3);
    let mut acc = 0.0;
    assert_no_alloc(|| {
        for _ in 0..4 {
            for i in 0..SAMPLE_RATE as usize / 4 {
                acc += adsr.value_at(i as f64 / SAMPLE_RATE);
            }
            adsr.release(0.25);
            for i in SAMPLE_RATE as usize / 4..SAMPLE_RATE as usize {
                acc += adsr.value_at(i as f64 / SAMPLE_RATE);
            }
            adsr.reset();
        }
    });
    assert!(acc.is_finite());
}
