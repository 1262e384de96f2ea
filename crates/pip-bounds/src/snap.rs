//! Snap-fraction parameterisation of the movement-bounds perimeter.
//!
//! A snap fraction is a position on the perimeter of the movement bounds
//! (the set of legal top-left corners) expressed in `[0, 4)`, clockwise from
//! the top-left corner: `[0, 1)` is the top edge, `[1, 2)` the right edge,
//! `[2, 3)` the bottom edge (right to left) and `[3, 4)` the left edge (bottom
//! to top). Storing positions this way keeps relative placement when the
//! display size changes.

use pip_geom::{Rect, Size};

/// Stateless snap helpers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapAlgorithm;

impl SnapAlgorithm {
    /// Move `bounds` onto the nearest edge of `movement`.
    ///
    /// Ties prefer left, then top, then right, then bottom.
    #[must_use]
    pub fn snap_rect_to_closest_edge(&self, bounds: &Rect, movement: &Rect) -> Rect {
        let bounded_left = bounds.left().min(movement.right()).max(movement.left());
        let bounded_top = bounds.top().min(movement.bottom()).max(movement.top());

        let from_left = (bounds.left() - movement.left()).abs();
        let from_top = (bounds.top() - movement.top()).abs();
        let from_right = (movement.right() - bounds.left()).abs();
        let from_bottom = (movement.bottom() - bounds.top()).abs();
        let shortest = from_left.min(from_right).min(from_top.min(from_bottom));

        if shortest == from_left {
            bounds.offset_to(movement.left(), bounded_top)
        } else if shortest == from_top {
            bounds.offset_to(bounded_left, movement.top())
        } else if shortest == from_right {
            bounds.offset_to(movement.right(), bounded_top)
        } else {
            bounds.offset_to(bounded_left, movement.bottom())
        }
    }

    /// Snap fraction of `bounds` within `movement`.
    #[must_use]
    pub fn snap_fraction(&self, bounds: &Rect, movement: &Rect) -> f32 {
        let snapped = self.snap_rect_to_closest_edge(bounds, movement);
        let width_fraction = ratio(snapped.left() - movement.left(), movement.w);
        let height_fraction = ratio(snapped.top() - movement.top(), movement.h);
        let fraction = if snapped.top() == movement.top() {
            width_fraction
        } else if snapped.left() == movement.right() {
            1.0 + height_fraction
        } else if snapped.top() == movement.bottom() {
            2.0 + (1.0 - width_fraction)
        } else {
            3.0 + (1.0 - height_fraction)
        };
        fraction as f32
    }

    /// Place a window of `size` at `fraction` along the perimeter of `movement`.
    #[must_use]
    pub fn apply_snap_fraction(&self, size: Size, movement: &Rect, fraction: f32) -> Rect {
        let fraction = f64::from(fraction).rem_euclid(4.0);
        let base = Rect::new(0.0, 0.0, size.width, size.height);
        if fraction < 1.0 {
            base.offset_to(movement.left() + fraction * movement.w, movement.top())
        } else if fraction < 2.0 {
            let f = fraction - 1.0;
            base.offset_to(movement.right(), movement.top() + f * movement.h)
        } else if fraction < 3.0 {
            let f = fraction - 2.0;
            base.offset_to(movement.left() + (1.0 - f) * movement.w, movement.bottom())
        } else {
            let f = fraction - 3.0;
            base.offset_to(movement.left(), movement.top() + (1.0 - f) * movement.h)
        }
    }
}

/// `num / den`, or 0 for a degenerate denominator.
fn ratio(num: f64, den: f64) -> f64 {
    if den <= 0.0 { 0.0 } else { num / den }
}
