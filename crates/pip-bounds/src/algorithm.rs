//! Geometry calculations over [`BoundsState`] and the current display.

use std::sync::Arc;

use pip_config::PipConfig;
use pip_geom::{Insets, Rect, Size, aspect_ratio_matches};
use tracing::trace;

use crate::{BoundsState, PipParams, SnapAlgorithm};

/// Computes PiP target rectangles.
///
/// All methods read the shared [`BoundsState`] but never write it, except
/// [`BoundsAlgorithm::update_size_limits`] which recomputes the device-derived
/// size clamps after a display change.
#[derive(Clone)]
pub struct BoundsAlgorithm {
    /// Sizing tunables.
    config: Arc<PipConfig>,
    /// Geometry read for every computation.
    state: BoundsState,
    /// Perimeter snapping.
    snap: SnapAlgorithm,
}

impl BoundsAlgorithm {
    /// Build an algorithm bound to `state` and `config`.
    pub fn new(config: Arc<PipConfig>, state: BoundsState) -> Self {
        Self {
            config,
            state,
            snap: SnapAlgorithm,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PipConfig {
        &self.config
    }

    /// The geometry state this algorithm reads.
    pub fn state(&self) -> &BoundsState {
        &self.state
    }

    /// Display area available to PiP: stable insets plus the edge gap.
    pub fn inset_bounds(&self) -> Rect {
        let display = self.state.display_layout();
        display
            .bounds()
            .inset(&display.stable_insets)
            .inset(&Insets::uniform(self.config.screen_edge_inset))
    }

    /// Legal top-left positions for a window shaped like `bounds`.
    pub fn movement_bounds_for(&self, bounds: &Rect) -> Rect {
        let inset = self.inset_bounds();
        let right = inset.left().max(inset.right() - bounds.w);
        let bottom = inset.top().max(inset.bottom() - bounds.h);
        let bottom = inset
            .top()
            .max(bottom - self.state.bottom_obstruction());
        Rect::from_ltrb(inset.left(), inset.top(), right, bottom)
    }

    /// Movement bounds for the current PiP bounds.
    pub fn movement_bounds(&self) -> Rect {
        self.movement_bounds_for(&self.state.bounds())
    }

    /// Place a window of `size` at `fraction` along the movement perimeter.
    pub fn snap_fraction_to_bounds(&self, fraction: f32, size: Size) -> Rect {
        let probe = Rect::new(0.0, 0.0, size.width, size.height);
        let movement = self.movement_bounds_for(&probe);
        self.snap.apply_snap_fraction(size, &movement, fraction)
    }

    /// Snap fraction of `bounds` along its movement perimeter.
    pub fn bounds_to_snap_fraction(&self, bounds: &Rect) -> f32 {
        let movement = self.movement_bounds_for(bounds);
        self.snap.snap_fraction(bounds, &movement)
    }

    /// Move `bounds` onto the closest edge of its movement bounds.
    pub fn snap_rect_to_closest_edge(&self, bounds: &Rect) -> Rect {
        let movement = self.movement_bounds_for(bounds);
        self.snap.snap_rect_to_closest_edge(bounds, &movement)
    }

    /// Default PiP size for `aspect_ratio`, limited by the current max size.
    pub fn default_size(&self, aspect_ratio: f32) -> Size {
        let display = self.state.display_layout();
        let ar = f64::from(aspect_ratio);
        let edge = self
            .config
            .min_edge_size
            .max(display.short_edge() * f64::from(self.config.default_size_fraction));
        let size = if ar >= 1.0 {
            Size::new(edge * ar, edge)
        } else {
            Size::new(edge, edge / ar)
        };
        fit_within(size, self.state.max_size())
    }

    /// Default bounds: default size at the configured snap fraction.
    pub fn default_bounds(&self) -> Rect {
        let size = self.default_size(self.config.default_aspect_ratio);
        self.snap_fraction_to_bounds(self.config.default_snap_fraction, size)
    }

    /// Aspect ratio to use for `params`, clamped into the configured range.
    pub fn aspect_ratio_for(&self, params: &PipParams) -> f32 {
        params
            .aspect_ratio
            .map_or(self.config.default_aspect_ratio, |r| {
                self.config.clamp_aspect_ratio(r)
            })
    }

    /// Where PiP lands when entering, honouring saved re-entry state.
    pub fn entry_destination_bounds(&self, params: &PipParams) -> Rect {
        let ar = self.aspect_ratio_for(params);
        let (fraction, size) = match self.state.reentry_state() {
            Some(reentry) => (
                reentry.snap_fraction,
                reentry.size.unwrap_or_else(|| self.default_size(ar)),
            ),
            None => (self.config.default_snap_fraction, self.default_size(ar)),
        };
        let bounds = self.snap_fraction_to_bounds(fraction, size);
        trace!(%bounds, fraction, "entry destination");
        bounds
    }

    /// Bounds for a new aspect ratio, keeping the area and snap fraction of
    /// `current`.
    pub fn adjusted_destination_bounds(&self, current: &Rect, aspect_ratio: f32) -> Rect {
        let ar = f64::from(self.config.clamp_aspect_ratio(aspect_ratio));
        let area = current.w * current.h;
        let w = (area * ar).sqrt();
        let size = self.clamp_size(Size::new(w, w / ar));
        let fraction = self.bounds_to_snap_fraction(current);
        self.snap_fraction_to_bounds(fraction, size)
    }

    /// Destination for a user resize: `requested` clamped to the size limits,
    /// centred on `current` and kept inside the inset bounds.
    pub fn resize_destination(&self, current: &Rect, requested: Size) -> Rect {
        let size = self.clamp_size(requested);
        let centred = current.with_size_centered(size);
        let inset = self.inset_bounds();
        let x = centred
            .x
            .min(inset.right() - size.width)
            .max(inset.left());
        let y = centred
            .y
            .min(inset.bottom() - size.height)
            .max(inset.top());
        centred.offset_to(x, y)
    }

    /// The app's source hint, if it can be used to animate between
    /// `task_bounds` and `pip_bounds`.
    pub fn valid_source_hint_rect(
        &self,
        params: &PipParams,
        task_bounds: &Rect,
        pip_bounds: &Rect,
    ) -> Option<Rect> {
        let hint = params.source_rect_hint?;
        if hint.is_empty() || !task_bounds.contains(&hint) {
            return None;
        }
        aspect_ratio_matches(
            pip_bounds.aspect_ratio(),
            hint.aspect_ratio(),
            self.config.source_hint_tolerance,
        )
        .then_some(hint)
    }

    /// Recompute min/max size from the current display.
    pub fn update_size_limits(&self) {
        let display = self.state.display_layout();
        let edge = self.config.min_edge_size;
        let max = display.short_edge() * f64::from(self.config.max_size_fraction);
        self.state.set_min_size(Size::new(edge, edge));
        self.state.set_max_size(Size::new(max.max(edge), max.max(edge)));
    }

    /// Clamp `size` between the effective min and the max size.
    fn clamp_size(&self, size: Size) -> Size {
        let min = self.state.effective_min_size();
        let max = self.state.max_size();
        let clamp = |v: f64, lo: f64, hi: f64| if hi > lo { v.clamp(lo, hi) } else { v.max(lo) };
        Size::new(
            clamp(size.width, min.width, max.width),
            clamp(size.height, min.height, max.height),
        )
    }
}

/// Scale `size` down uniformly until it fits `max`; an empty `max` leaves it alone.
fn fit_within(size: Size, max: Size) -> Size {
    if max.is_empty() || !size.exceeds(&max) {
        return size;
    }
    let scale = (max.width / size.width).min(max.height / size.height);
    Size::new(size.width * scale, size.height * scale)
}
