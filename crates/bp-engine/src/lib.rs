//! Seek engine and envelope lifecycles for breakpoint chains.
//!
//! A `Cursor` walks any `ChainView`: a plain `BreakpointChain` or the
//! `MergedView` an ADSR envelope presents once released. `Envelope` pairs a
//! chain with its live cursor and display bounds; `AdsrEnvelope` adds the
//! idle/released lifecycle on top.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod adsr;
mod cursor;
mod envelope;
mod sample;
mod view;

pub use adsr::{AdsrEnvelope, AdsrParams, AdsrStage, MIN_STAGE_DURATION};
pub use cursor::{Cursor, SeekStep};
pub use envelope::{Bounds, EditError, Envelope};
pub use sample::{plot_derivatives, sample_view};
pub use view::{ChainView, MergedView, Splice, Walk};
