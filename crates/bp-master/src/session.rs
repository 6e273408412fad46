//! Headless editing session: one envelope, its file and its cached plot.

use std::path::{Path, PathBuf};

use bp_engine::{Bounds, Cursor, EditError, Envelope};
use bp_formats::{LineDiagnostic, LoadError, SaveError};
use bp_ir::{Breakpoint, BreakpointChain, InterpKind, NodeKey};

use crate::plot::{Plot, PlotCache};

/// Errors surfaced by a `Session`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Result of `Session::save`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The document has never been saved; call `save_as`.
    NeedsPath,
}

/// An envelope document being edited.
pub struct Session {
    envelope: Envelope,
    path: Option<PathBuf>,
    dirty: bool,
    diagnostics: Vec<LineDiagnostic>,
    plot: PlotCache,
}

impl Session {
    /// Untitled document: a unit ramp down from 1 to 0.
    pub fn new() -> Self {
        let chain = BreakpointChain::from_breakpoints([
            Breakpoint::new(0.0, 1.0, InterpKind::Linear),
            Breakpoint::new(1.0, 0.0, InterpKind::Linear),
        ]);
        let mut envelope = Envelope::from_chain(chain);
        *envelope.bounds_mut() = Bounds::UNIT;
        Self { envelope, path: None, dirty: false, diagnostics: Vec::new(), plot: PlotCache::default() }
    }

    // --- Document ---

    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let report = bp_formats::load_breakpoints(path)?;
        let mut envelope = Envelope::from_chain(report.chain);
        let bounds = envelope.bounds_mut();
        if bounds.time_span() <= 0.0 {
            bounds.max_time = bounds.min_time + 1.0;
        }
        if bounds.value_span() <= 0.0 {
            bounds.max_value = bounds.min_value + 1.0;
        }
        Ok(Self {
            envelope,
            path: Some(path.to_path_buf()),
            dirty: false,
            diagnostics: report.diagnostics,
            plot: PlotCache::default(),
        })
    }

    /// Save to the document's path.
    pub fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        let Some(path) = self.path.clone() else {
            return Ok(SaveOutcome::NeedsPath);
        };
        bp_formats::save_breakpoints(&path, self.envelope.chain())?;
        self.dirty = false;
        Ok(SaveOutcome::Saved(path))
    }

    /// Save to `path` and make it the document's path.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        bp_formats::save_breakpoints(&path, self.envelope.chain())?;
        self.path = Some(path);
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Lines skipped when the document was opened.
    pub fn diagnostics(&self) -> &[LineDiagnostic] {
        &self.diagnostics
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }

    // --- Editing ---

    fn touched(&mut self) {
        self.dirty = true;
        self.plot.invalidate();
    }

    fn breakpoint(&self, key: NodeKey) -> Result<&Breakpoint, EditError> {
        self.envelope.get(key).ok_or(EditError::UnknownBreakpoint(key))
    }

    /// Add a linear breakpoint on the curve at `time`.
    pub fn insert_at(&mut self, time: f64) -> Result<NodeKey, SessionError> {
        let value = Cursor::new().value_at(self.envelope.chain(), time);
        let key = self.envelope.insert_breakpoint(time, value, InterpKind::Linear, &[])?;
        self.touched();
        Ok(key)
    }

    pub fn remove(&mut self, key: NodeKey) -> Result<Breakpoint, SessionError> {
        let removed = self.envelope.remove(key)?;
        self.touched();
        Ok(removed)
    }

    /// Move a breakpoint by `(dt, dv)`, held between its neighbours and
    /// within the value bounds.
    pub fn drag_breakpoint(&mut self, key: NodeKey, dt: f64, dv: f64) -> Result<(), SessionError> {
        let bp = self.breakpoint(key)?;
        let (time, value) = (bp.time + dt, bp.value + dv);
        self.envelope.move_breakpoint(key, time, value)?;
        self.touched();
        Ok(())
    }

    /// Move control point `index` by `(dt, dv)`, held within the bounds.
    pub fn drag_control_point(&mut self, key: NodeKey, index: usize, dt: f64, dv: f64) -> Result<(), SessionError> {
        let (time, value) = self
            .breakpoint(key)?
            .control_point(index)
            .ok_or(EditError::NoControlPoint { index })?;
        self.envelope.move_control_point(key, index, time + dt, value + dv)?;
        self.touched();
        Ok(())
    }

    pub fn set_kind(&mut self, key: NodeKey, kind: InterpKind) -> Result<(), SessionError> {
        self.envelope.set_kind(key, kind)?;
        self.touched();
        Ok(())
    }

    /// Set the right edge of the time axis. Negative or NaN becomes 0.
    pub fn set_max_time(&mut self, max_time: f64) {
        self.envelope.bounds_mut().max_time = if max_time > 0.0 { max_time } else { 0.0 };
        self.plot.invalidate();
    }

    pub fn normalize(&mut self) {
        self.envelope.normalize();
        self.touched();
    }

    // --- Display ---

    /// Display samples for a `width` x `height` plot.
    pub fn plot(&mut self, width: usize, height: f64) -> &Plot {
        self.plot.get(&self.envelope, width, height)
    }

    /// Whether `plot(width, height)` would be served from cache.
    pub fn plot_is_cached(&self, width: usize, height: f64) -> bool {
        self.plot.is_fresh(width, height)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
