//! Display sampling.

use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::envelope::Bounds;
use crate::view::ChainView;

/// Sample `view` at `width` evenly spaced times across `bounds`, mapping
/// each value onto `[0, height]`. Uses its own cursor.
pub fn sample_view<V: ChainView>(view: &V, bounds: &Bounds, width: usize, height: f64) -> Vec<f64> {
    let mut cursor = Cursor::new();
    (0..width)
        .map(|i| {
            let value = cursor.value_at(view, bounds.sample_time(i, width));
            bounds.scale_value(value, height)
        })
        .collect()
}

/// Slope between consecutive samples; the last entry repeats the final
/// backward difference.
pub fn plot_derivatives(samples: &[f64]) -> Vec<f64> {
    let mut slopes: Vec<f64> = samples.windows(2).map(|w| w[1] - w[0]).collect();
    if let Some(&last) = slopes.last() {
        slopes.push(last);
    } else if !samples.is_empty() {
        slopes.push(0.0);
    }
    slopes
}
