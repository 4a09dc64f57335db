use crate::geometry::primitives::Point;

/// Axis-aligned bounding rectangle.
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Rect {
        debug_assert!(x_min <= x_max && y_min <= y_max, "malformed rect");
        Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Smallest rect containing all points, `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let mut r = Rect {
            x_min: first.0,
            y_min: first.1,
            x_max: first.0,
            y_max: first.1,
        };
        for p in &points[1..] {
            r.x_min = r.x_min.min(p.0);
            r.y_min = r.y_min.min(p.1);
            r.x_max = r.x_max.max(p.0);
            r.y_max = r.y_max.max(p.1);
        }
        Some(r)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, p: Point, eps: f64) -> bool {
        p.0 >= self.x_min - eps
            && p.0 <= self.x_max + eps
            && p.1 >= self.y_min - eps
            && p.1 <= self.y_max + eps
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// True when the rects are separated beyond `eps` on either axis.
    pub fn disjoint(&self, other: &Rect, eps: f64) -> bool {
        self.x_max < other.x_min - eps
            || other.x_max < self.x_min - eps
            || self.y_max < other.y_min - eps
            || other.y_max < self.y_min - eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_and_union() {
        let a = Rect::from_points(&[Point(1.0, 2.0), Point(-1.0, 5.0), Point(0.0, 0.0)]).unwrap();
        assert_eq!(a, Rect::new(-1.0, 0.0, 1.0, 5.0));
        let b = Rect::new(0.0, -2.0, 3.0, 1.0);
        assert_eq!(a.union(&b), Rect::new(-1.0, -2.0, 3.0, 5.0));
        assert_eq!(a.union(&b).area(), 4.0 * 7.0);
    }

    #[test]
    fn empty_slice_has_no_bounds() {
        assert!(Rect::from_points(&[]).is_none());
    }
}
