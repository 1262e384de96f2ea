//! Tunables for picture-in-picture sizing and transition timing.
//!
//! A [`PipConfig`] is normally built from defaults and optionally overridden
//! from a RON file. Every field has a default, so a file only needs to name
//! the values it changes:
//!
//! ```ron
//! (
//!     enter_duration_ms: 300,
//!     default_aspect_ratio: 1.3333,
//! )
//! ```
#![warn(missing_docs)]

mod error;
mod loader;

use serde::Deserialize;

pub use error::{Error, excerpt_at};
pub use loader::{from_ron, load};

/// Default enter/expand animation duration.
pub const DEFAULT_ENTER_DURATION_MS: u64 = 425;
/// Default duration of an animated resize when the caller does not supply one.
pub const DEFAULT_RESIZE_DURATION_MS: u64 = 250;
/// Default snap fraction: the bottom-right corner of the movement bounds.
pub const DEFAULT_SNAP_FRACTION: f32 = 2.0;

/// Sizing and timing knobs consumed by the bounds algorithm and scheduler.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipConfig {
    /// Duration of the enter animation (ms).
    pub enter_duration_ms: u64,
    /// Duration of the expand-out animation (ms).
    pub expand_duration_ms: u64,
    /// Default duration of an animated resize (ms).
    pub resize_duration_ms: u64,
    /// Duration of the fade-out used by remove-with-fade (ms).
    pub remove_fade_duration_ms: u64,
    /// Duration of the overlay fade-in after a non-seamless resize (ms).
    pub overlay_fade_duration_ms: u64,
    /// Aspect ratio used when the app does not request one.
    pub default_aspect_ratio: f32,
    /// Narrowest accepted aspect ratio.
    pub min_aspect_ratio: f32,
    /// Widest accepted aspect ratio.
    pub max_aspect_ratio: f32,
    /// Default PiP short edge as a fraction of the display's short edge.
    pub default_size_fraction: f32,
    /// Maximum PiP extent as a fraction of the display's short edge.
    pub max_size_fraction: f32,
    /// Smallest allowed PiP edge (px).
    pub min_edge_size: f64,
    /// Gap kept between the PiP window and the display edges (px).
    pub screen_edge_inset: f64,
    /// Snap fraction used for the first entry when no re-entry state exists.
    pub default_snap_fraction: f32,
    /// Relative tolerance when matching a source hint's aspect ratio.
    pub source_hint_tolerance: f64,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            enter_duration_ms: DEFAULT_ENTER_DURATION_MS,
            expand_duration_ms: DEFAULT_ENTER_DURATION_MS,
            resize_duration_ms: DEFAULT_RESIZE_DURATION_MS,
            remove_fade_duration_ms: 250,
            overlay_fade_duration_ms: 350,
            default_aspect_ratio: 16.0 / 9.0,
            min_aspect_ratio: 1.0 / 2.39,
            max_aspect_ratio: 2.39,
            default_size_fraction: 0.23,
            max_size_fraction: 0.6,
            min_edge_size: 108.0,
            screen_edge_inset: 16.0,
            default_snap_fraction: DEFAULT_SNAP_FRACTION,
            source_hint_tolerance: 0.005,
        }
    }
}

impl PipConfig {
    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |field: &'static str, message: String| Error::Validation {
            path: None,
            field,
            message,
        };
        if !(self.min_aspect_ratio > 0.0) {
            return Err(invalid(
                "min_aspect_ratio",
                format!("must be positive, got {}", self.min_aspect_ratio),
            ));
        }
        if self.max_aspect_ratio < self.min_aspect_ratio {
            return Err(invalid(
                "max_aspect_ratio",
                format!(
                    "must be >= min_aspect_ratio ({} < {})",
                    self.max_aspect_ratio, self.min_aspect_ratio
                ),
            ));
        }
        if !(self.min_aspect_ratio..=self.max_aspect_ratio).contains(&self.default_aspect_ratio) {
            return Err(invalid(
                "default_aspect_ratio",
                format!(
                    "{} outside [{}, {}]",
                    self.default_aspect_ratio, self.min_aspect_ratio, self.max_aspect_ratio
                ),
            ));
        }
        for (field, v) in [
            ("default_size_fraction", self.default_size_fraction),
            ("max_size_fraction", self.max_size_fraction),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(invalid(field, format!("must be in (0, 1], got {v}")));
            }
        }
        if self.default_size_fraction > self.max_size_fraction {
            return Err(invalid(
                "default_size_fraction",
                "must not exceed max_size_fraction".to_string(),
            ));
        }
        if !(0.0..4.0).contains(&self.default_snap_fraction) {
            return Err(invalid(
                "default_snap_fraction",
                format!("must be in [0, 4), got {}", self.default_snap_fraction),
            ));
        }
        if self.min_edge_size <= 0.0 || self.screen_edge_inset < 0.0 {
            return Err(invalid(
                "min_edge_size",
                "edge sizes must be positive and insets non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp an aspect ratio into the accepted range.
    #[must_use]
    pub fn clamp_aspect_ratio(&self, ratio: f32) -> f32 {
        if !(ratio > 0.0) {
            return self.default_aspect_ratio;
        }
        ratio.clamp(self.min_aspect_ratio, self.max_aspect_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PipConfig::default().validate().unwrap();
    }

    #[test]
    fn inverted_aspect_range_is_rejected() {
        let cfg = PipConfig {
            min_aspect_ratio: 2.0,
            max_aspect_ratio: 1.0,
            ..PipConfig::default()
        };
        match cfg.validate() {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "max_aspect_ratio"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn clamp_aspect_ratio_falls_back_for_nonsense() {
        let cfg = PipConfig::default();
        assert_eq!(cfg.clamp_aspect_ratio(0.0), cfg.default_aspect_ratio);
        assert_eq!(cfg.clamp_aspect_ratio(10.0), cfg.max_aspect_ratio);
        assert_eq!(cfg.clamp_aspect_ratio(1.0), 1.0);
    }
}
