//! Cached display samples.

use bp_engine::{plot_derivatives, Envelope};

/// Samples of an envelope scaled to a plot area, with per-sample slopes for
/// line drawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plot {
    pub width: usize,
    pub height: f64,
    pub samples: Vec<f64>,
    pub derivatives: Vec<f64>,
}

impl Plot {
    pub fn of(envelope: &Envelope, width: usize, height: f64) -> Self {
        let samples = envelope.sample_curve(width, height);
        let derivatives = plot_derivatives(&samples);
        Self { width, height, samples, derivatives }
    }
}

/// Recomputes the plot only after an edit or a size change.
#[derive(Clone, Debug, Default)]
pub(crate) struct PlotCache {
    plot: Option<Plot>,
}

impl PlotCache {
    pub fn invalidate(&mut self) {
        self.plot = None;
    }

    pub fn is_fresh(&self, width: usize, height: f64) -> bool {
        self.plot.as_ref().is_some_and(|p| p.width == width && p.height == height)
    }

    pub fn get(&mut self, envelope: &Envelope, width: usize, height: f64) -> &Plot {
        if !self.is_fresh(width, height) {
            self.plot = None;
        }
        self.plot.get_or_insert_with(|| {
            log::trace!("replotting at {width}x{height}");
            Plot::of(envelope, width, height)
        })
    }
}
