//! Line-oriented text encoding.

use std::fmt::Write as _;
use std::io::Write;

use bp_ir::{Breakpoint, BreakpointChain, InterpKind, MAX_SHAPE_PARAMS};

use crate::SaveError;

/// Why a line was skipped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("expected at least 3 fields, found {found}")]
    MissingFields { found: usize },
    #[error("{field} is not a number: {token:?}")]
    BadNumber { field: &'static str, token: String },
    #[error("unknown interpolation kind {token:?}")]
    UnknownKind { token: String },
    #[error("{found} shape parameters, at most {max} allowed", max = MAX_SHAPE_PARAMS)]
    TooManyParams { found: usize },
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// A skipped line and why.
#[derive(Clone, Debug, PartialEq)]
pub struct LineDiagnostic {
    /// 1-based line number.
    pub line: usize,
    pub reason: SkipReason,
}

/// Chain parsed from text plus the lines that were dropped.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub chain: BreakpointChain,
    pub diagnostics: Vec<LineDiagnostic>,
}

fn number(field: &'static str, token: &str) -> Result<f64, SkipReason> {
    match token.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(SkipReason::BadNumber { field, token: token.to_owned() }),
    }
}

/// Parse one non-blank line into a breakpoint.
pub fn parse_line(line: &str) -> Result<Breakpoint, SkipReason> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [time, value, kind, params @ ..] = fields.as_slice() else {
        return Err(SkipReason::MissingFields { found: fields.len() });
    };
    let time = number("time", time)?;
    let value = number("value", value)?;
    let kind = kind
        .parse::<u8>()
        .ok()
        .and_then(InterpKind::from_index)
        .ok_or_else(|| SkipReason::UnknownKind { token: (*kind).to_owned() })?;
    if params.len() > MAX_SHAPE_PARAMS {
        return Err(SkipReason::TooManyParams { found: params.len() });
    }
    let params = params.iter().map(|p| number("shape parameter", p)).collect::<Result<Vec<_>, _>>()?;
    Ok(Breakpoint::with_params(time, value, kind, &params))
}

/// Parse a whole file's text in file order. Blank lines are ignored;
/// malformed lines are skipped and reported.
pub fn parse_breakpoints(text: &str) -> LoadReport {
    parse_breakpoint_bytes(text.as_bytes())
}

/// Like `parse_breakpoints`, for raw file contents. Lines that are not
/// UTF-8 are skipped like any other malformed line.
pub fn parse_breakpoint_bytes(bytes: &[u8]) -> LoadReport {
    let mut report = LoadReport::default();
    let mut tail = None;
    for (index, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let parsed = match std::str::from_utf8(raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_line(line),
            Err(_) => Err(SkipReason::InvalidUtf8),
        };
        match parsed {
            Ok(bp) => tail = Some(report.chain.insert_after(tail, bp)),
            Err(reason) => {
                log::warn!("line {}: skipped: {reason}", index + 1);
                report.diagnostics.push(LineDiagnostic { line: index + 1, reason });
            }
        }
    }
    report
}

/// Write `chain` to `w`, one breakpoint per line.
pub fn write_breakpoints(w: &mut impl Write, chain: &BreakpointChain) -> Result<(), SaveError> {
    let text = format_breakpoints(chain)?;
    w.write_all(text.as_bytes())?;
    Ok(())
}

/// Encode `chain` as text. Fails on user-defined laws.
pub fn format_breakpoints(chain: &BreakpointChain) -> Result<String, SaveError> {
    let mut out = String::new();
    for (index, (_, bp)) in chain.iter().enumerate() {
        let kind = bp.kind.index().ok_or(SaveError::UnsupportedKind { index })?;
        // Writing to a String cannot fail.
        let _ = write!(out, "{:.6} {:.6} {}", bp.time, bp.value, kind);
        for p in &bp.params {
            let _ = write!(out, " {p:.6}");
        }
        out.push('\n');
    }
    Ok(out)
}
