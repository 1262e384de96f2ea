use crate::Point;

/// 2D affine transform.
///
/// Maps `(x, y)` to `(sx*x + kx*y + tx, ky*x + sy*y + ty)`. The `post_*`
/// operations append a transform after the current one, matching how surface
/// matrices are composed: scale first, then translate, then rotate about a
/// pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// X scale.
    sx: f64,
    /// X skew.
    kx: f64,
    /// X translation.
    tx: f64,
    /// Y skew.
    ky: f64,
    /// Y scale.
    sy: f64,
    /// Y translation.
    ty: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy: 1.0,
            ty: 0.0,
        }
    }

    /// A pure scale.
    #[must_use]
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self {
            sx,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy,
            ty: 0.0,
        }
    }

    /// Apply `other` after `self`.
    #[must_use]
    pub fn post_concat(&self, other: &Self) -> Self {
        Self {
            sx: other.sx * self.sx + other.kx * self.ky,
            kx: other.sx * self.kx + other.kx * self.sy,
            tx: other.sx * self.tx + other.kx * self.ty + other.tx,
            ky: other.ky * self.sx + other.sy * self.ky,
            sy: other.ky * self.kx + other.sy * self.sy,
            ty: other.ky * self.tx + other.sy * self.ty + other.ty,
        }
    }

    /// Translate after the current transform.
    #[must_use]
    pub fn post_translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            tx: self.tx + dx,
            ty: self.ty + dy,
            ..*self
        }
    }

    /// Rotate by `degrees` about `(px, py)` after the current transform.
    #[must_use]
    pub fn post_rotate(&self, degrees: f32, px: f64, py: f64) -> Self {
        if degrees == 0.0 {
            return *self;
        }
        let rad = f64::from(degrees).to_radians();
        let (sin, cos) = rad.sin_cos();
        let rot = Self {
            sx: cos,
            kx: -sin,
            tx: px - cos * px + sin * py,
            ky: sin,
            sy: cos,
            ty: py - sin * px - cos * py,
        };
        self.post_concat(&rot)
    }

    /// Transform a point.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.sx * p.x + self.kx * p.y + self.tx,
            self.ky * p.x + self.sy * p.y + self.ty,
        )
    }

    /// Horizontal scale component.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        self.sx
    }

    /// Vertical scale component.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        self.sy
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Point {
        Point::new(self.tx, self.ty)
    }

    /// Row-major 3x3 values, suitable for handing to a compositor.
    #[must_use]
    pub fn values(&self) -> [f32; 9] {
        [
            self.sx as f32,
            self.kx as f32,
            self.tx as f32,
            self.ky as f32,
            self.sy as f32,
            self.ty as f32,
            0.0,
            0.0,
            1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx_eq;

    #[test]
    fn scale_then_translate() {
        let m = Matrix::scale(2.0, 0.5).post_translate(10.0, 20.0);
        let p = m.map_point(Point::new(4.0, 4.0));
        assert_eq!(p, Point::new(18.0, 22.0));
    }

    #[test]
    fn rotate_about_pivot_keeps_pivot_fixed() {
        let m = Matrix::identity().post_rotate(90.0, 50.0, 50.0);
        let pivot = m.map_point(Point::new(50.0, 50.0));
        assert!(approx_eq(pivot.x, 50.0, 1e-9));
        assert!(approx_eq(pivot.y, 50.0, 1e-9));
        let p = m.map_point(Point::new(60.0, 50.0));
        assert!(approx_eq(p.x, 50.0, 1e-9));
        assert!(approx_eq(p.y, 60.0, 1e-9));
    }

    #[test]
    fn zero_rotation_is_noop() {
        let m = Matrix::scale(3.0, 3.0);
        assert_eq!(m.post_rotate(0.0, 1.0, 1.0), m);
    }
}
