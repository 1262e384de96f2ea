//! Geometry primitives shared by the picture-in-picture crates.
//!
//! Coordinates are display pixels with the origin at the top-left corner and
//! `y` growing downwards. Values are `f64` so that bounds survive repeated
//! snap-fraction conversions without pixel quantisation.
#![warn(missing_docs)]

mod matrix;
mod rect;
mod rotation;

pub use matrix::Matrix;
pub use rect::{Insets, Point, Rect, Size};
pub use rotation::{Rotation, rotate_bounds};

/// Compare two floats within `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Compare two rectangles component-wise within `eps`.
#[inline]
pub fn rect_approx_eq(a: &Rect, b: &Rect, eps: f64) -> bool {
    approx_eq(a.x, b.x, eps)
        && approx_eq(a.y, b.y, eps)
        && approx_eq(a.w, b.w, eps)
        && approx_eq(a.h, b.h, eps)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate each edge of `from` towards `to`.
#[inline]
pub fn lerp_rect(from: &Rect, to: &Rect, t: f64) -> Rect {
    Rect::from_ltrb(
        lerp(from.left(), to.left(), t),
        lerp(from.top(), to.top(), t),
        lerp(from.right(), to.right(), t),
        lerp(from.bottom(), to.bottom(), t),
    )
}

/// True when two aspect ratios are within `tolerance` of each other, relative
/// to `expected`.
#[inline]
pub fn aspect_ratio_matches(expected: f64, actual: f64, tolerance: f64) -> bool {
    if expected <= 0.0 || actual <= 0.0 {
        return false;
    }
    ((expected - actual) / expected).abs() <= tolerance
}
