//! Headless envelope editing session.
//!
//! Provides a unified API for opening, editing, plotting and saving
//! breakpoint documents that front ends (the CLI, or a GUI) can share.

mod plot;
mod session;
mod shared;

// Re-export common types so callers don't need the lower crates directly.
pub use bp_engine::{AdsrEnvelope, Bounds, EditError, Envelope};
pub use bp_formats::{LineDiagnostic, LoadError, SaveError};
pub use bp_ir::{Breakpoint, InterpKind, NodeKey};

pub use plot::Plot;
pub use session::{SaveOutcome, Session, SessionError};
pub use shared::SharedEnvelope;
