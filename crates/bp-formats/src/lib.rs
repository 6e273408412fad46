//! Breakpoint file loading and saving.
//!
//! One breakpoint per line:
//!
//! ```text
//! <time> <value> <kind> [<param0> <param1> ...]
//! ```
//!
//! Kind indices follow `InterpKind::INDEXED`. Malformed lines are skipped
//! and reported; the surviving chain must pass `check_sanity`.

mod file;
mod text;

pub use file::{load_breakpoints, save_breakpoints};
pub use text::{
    format_breakpoints, parse_breakpoint_bytes, parse_breakpoints, parse_line, write_breakpoints, LineDiagnostic, LoadReport,
    SkipReason,
};

use std::path::PathBuf;

use bp_ir::SanityError;

/// Error loading a breakpoint file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid breakpoint chain: {0}")]
    Invalid(#[from] SanityError),
}

/// Error saving a breakpoint file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("breakpoint {index} uses a user-defined law, which has no file representation")]
    UnsupportedKind { index: usize },
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}
