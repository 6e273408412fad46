//! Filesystem entry points.

use std::fs;
use std::path::Path;

use bp_ir::{check_sanity, BreakpointChain};

use crate::text::{format_breakpoints, parse_breakpoint_bytes, LoadReport};
use crate::{LoadError, SaveError};

/// Load a breakpoint file. Skipped lines are reported, not fatal; a chain
/// that fails the sanity check is.
pub fn load_breakpoints(path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let report = parse_breakpoint_bytes(&bytes);
    check_sanity(&report.chain)?;
    log::info!(
        "loaded {} breakpoints from {} ({} lines skipped)",
        report.chain.len(),
        path.display(),
        report.diagnostics.len()
    );
    Ok(report)
}

/// Save `chain` to `path`, replacing any existing file. Nothing is written
/// when the chain cannot be encoded.
pub fn save_breakpoints(path: impl AsRef<Path>, chain: &BreakpointChain) -> Result<(), SaveError> {
    let path = path.as_ref();
    let text = format_breakpoints(chain)?;
    fs::write(path, text).map_err(|source| SaveError::Io { path: path.to_path_buf(), source })?;
    log::info!("saved {} breakpoints to {}", chain.len(), path.display());
    Ok(())
}
