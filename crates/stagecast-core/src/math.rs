use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::zero()
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// True when either dimension is zero, negative or not a number.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn scaled(&self, factor: f64) -> Size2D {
        Size2D::new(self.width * factor, self.height * factor)
    }

    /// Largest size with this aspect ratio that fits inside `bounds`
    /// (CSS `object-fit: contain`). Empty input yields an empty size.
    pub fn fit_within(&self, bounds: Size2D) -> Size2D {
        if self.is_empty() || bounds.is_empty() {
            return Size2D::zero();
        }
        let factor = (bounds.width / self.width).min(bounds.height / self.height);
        self.scaled(factor)
    }
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size2D) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size2D {
        Size2D::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right() > other.x
            && self.x < other.right()
            && self.bottom() > other.y
            && self.y < other.bottom()
    }

    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Center `size` inside this rectangle.
    pub fn centered(&self, size: Size2D) -> Rect {
        Rect::new(
            self.x + (self.width - size.width) / 2.0,
            self.y + (self.height - size.height) / 2.0,
            size.width,
            size.height,
        )
    }
}

/// A 2D affine matrix mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)` (same layout as CSS `matrix()`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation in degrees (screen coordinates, y down).
    pub fn rotate_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self * other`: `other` is applied to a point first, then `self`.
    /// This is how CSS composes a transform list left to right.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        Affine2D {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point2D) -> Point2D {
        Point2D::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, or `None` when the transform collapses the plane.
    pub fn invert(&self) -> Option<Affine2D> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine2D {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    /// Axis-aligned bounds of `rect` after transformation.
    pub fn bounds_of(&self, rect: &Rect) -> Rect {
        let corners = [
            self.apply(Point2D::new(rect.x, rect.y)),
            self.apply(Point2D::new(rect.right(), rect.y)),
            self.apply(Point2D::new(rect.x, rect.bottom())),
            self.apply(Point2D::new(rect.right(), rect.bottom())),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}
