use pip_geom::{Insets, Rect, Rotation};
use pip_ids::DisplayId;
use serde::Deserialize;

/// Metrics of the display hosting the PiP window.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DisplayLayout {
    /// Display identity.
    pub id: DisplayId,
    /// Width in the current rotation (px).
    pub width: f64,
    /// Height in the current rotation (px).
    pub height: f64,
    /// Insets occupied by persistent system bars.
    #[serde(default)]
    pub stable_insets: Insets,
    /// Current display rotation.
    #[serde(default)]
    pub rotation: Rotation,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self::new(DisplayId::DEFAULT, 1080.0, 2400.0)
    }
}

impl DisplayLayout {
    /// A display with no insets in its natural rotation.
    #[must_use]
    pub fn new(id: DisplayId, width: f64, height: f64) -> Self {
        Self {
            id,
            width,
            height,
            stable_insets: Insets::default(),
            rotation: Rotation::R0,
        }
    }

    /// Full display bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Length of the shorter display edge.
    #[must_use]
    pub fn short_edge(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Copy of this layout rotated to `rotation`, swapping extent and insets
    /// for quarter turns.
    #[must_use]
    pub fn rotated_to(&self, rotation: Rotation) -> Self {
        let delta = Rotation::delta(self.rotation, rotation);
        let (width, height) = if delta.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        let i = self.stable_insets;
        let stable_insets = match delta {
            Rotation::R0 => i,
            Rotation::R90 => Insets {
                left: i.top,
                top: i.right,
                right: i.bottom,
                bottom: i.left,
            },
            Rotation::R180 => Insets {
                left: i.right,
                top: i.bottom,
                right: i.left,
                bottom: i.top,
            },
            Rotation::R270 => Insets {
                left: i.bottom,
                top: i.left,
                right: i.top,
                bottom: i.right,
            },
        };
        Self {
            id: self.id,
            width,
            height,
            stable_insets,
            rotation,
        }
    }
}
