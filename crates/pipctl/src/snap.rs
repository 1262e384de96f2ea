//! Snap-fraction round-trip sampling for `pipctl check-snap`.

use std::sync::Arc;

use pip_bounds::{BoundsAlgorithm, BoundsState, DisplayLayout};
use pip_config::PipConfig;
use pip_geom::Rect;

use crate::{Error, Result};

/// Largest accepted round-trip drift.
pub const TOLERANCE: f32 = 1e-3;

/// One sampled fraction.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapSample {
    /// Input fraction.
    pub fraction: f32,
    /// Bounds placed at `fraction` with the default size.
    pub bounds: Rect,
    /// Fraction recovered from `bounds`.
    pub round_trip: f32,
}

impl SnapSample {
    /// Distance between input and recovered fraction along the perimeter.
    pub fn error(&self) -> f32 {
        let d = (self.round_trip - self.fraction).abs();
        d.min(4.0 - d)
    }
}

/// Sample `count` evenly spaced fractions over `[0, 4)` on `layout`.
pub fn samples(config: Arc<PipConfig>, layout: DisplayLayout, count: usize) -> Vec<SnapSample> {
    let ratio = config.default_aspect_ratio;
    let algorithm = BoundsAlgorithm::new(config, BoundsState::new(layout));
    algorithm.update_size_limits();
    let size = algorithm.default_size(ratio);
    (0..count)
        .map(|i| {
            let fraction = 4.0 * i as f32 / count as f32;
            let bounds = algorithm.snap_fraction_to_bounds(fraction, size);
            SnapSample {
                fraction,
                bounds,
                round_trip: algorithm.bounds_to_snap_fraction(&bounds),
            }
        })
        .collect()
}

/// Fail on the first sample drifting beyond [`TOLERANCE`].
pub fn check(samples: &[SnapSample]) -> Result<()> {
    match samples.iter().find(|s| s.error() > TOLERANCE) {
        Some(s) => Err(Error::SnapDrift {
            fraction: s.fraction,
            error: s.error(),
        }),
        None => Ok(()),
    }
}
