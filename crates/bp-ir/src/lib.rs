//! Core breakpoint types for the envelope engine.
//!
//! This crate defines breakpoints, the arena-backed chain that links them,
//! the per-segment interpolation laws and the root finders the bezier laws
//! depend on. Seeking and envelope lifecycles live in `bp-engine`; file
//! I/O lives in `bp-formats`.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod breakpoint;
mod chain;
mod interp;
mod sanity;
pub mod solve;

pub use breakpoint::{Breakpoint, InterpFn, InterpKind, ShapeParams, UserInterp, MAX_SHAPE_PARAMS};
pub use chain::{BreakpointChain, Iter, NodeKey};
pub use interp::{
    cubic_bezier, exponential, interpolate, linear, nearest_neighbour, quadratic_bezier, Segment,
    EXPONENTIAL_ZERO_THRESHOLD,
};
pub use sanity::{check_sanity, SanityError};
pub use solve::{CubicRoot, ENVELOPE_PRECISION};
