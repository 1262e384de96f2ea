use serde::{Deserialize, Serialize};

use crate::Rect;

/// Display rotation in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Natural orientation.
    #[default]
    R0,
    /// Rotated 90 degrees.
    R90,
    /// Rotated 180 degrees.
    R180,
    /// Rotated 270 degrees.
    R270,
}

impl Rotation {
    /// Build from a quarter-turn count; any integer is accepted and wrapped.
    #[must_use]
    pub fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Self::R0,
            1 => Self::R90,
            2 => Self::R180,
            _ => Self::R270,
        }
    }

    /// Quarter turns in `0..4`.
    #[must_use]
    pub fn quarter_turns(self) -> i32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 1,
            Self::R180 => 2,
            Self::R270 => 3,
        }
    }

    /// Rotation in degrees.
    #[must_use]
    pub fn degrees(self) -> f32 {
        self.quarter_turns() as f32 * 90.0
    }

    /// Rotation needed to go from `from` to `to`.
    #[must_use]
    pub fn delta(from: Self, to: Self) -> Self {
        Self::from_quarter_turns(to.quarter_turns() - from.quarter_turns())
    }

    /// True for 90 and 270 degrees, where width and height swap.
    #[must_use]
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }
}

/// Rotate `bounds` inside a parent of `parent_w` x `parent_h` by `rotation`.
///
/// The parent dimensions are those before the rotation is applied.
#[must_use]
pub fn rotate_bounds(bounds: &Rect, parent_w: f64, parent_h: f64, rotation: Rotation) -> Rect {
    let (l, t, r, b) = (bounds.left(), bounds.top(), bounds.right(), bounds.bottom());
    match rotation {
        Rotation::R0 => *bounds,
        Rotation::R90 => Rect::from_ltrb(t, parent_w - r, b, parent_w - l),
        Rotation::R180 => Rect::from_ltrb(parent_w - r, parent_h - b, parent_w - l, parent_h - t),
        Rotation::R270 => Rect::from_ltrb(parent_h - b, l, parent_h - t, r),
    }
}
