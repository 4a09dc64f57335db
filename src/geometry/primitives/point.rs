use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};

/// Geometric primitive (x, y)
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn sq_distance(&self, other: Point) -> f64 {
        let (dx, dy) = (other.0 - self.0, other.1 - self.1);
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: Point) -> f64 {
        self.sq_distance(other).sqrt()
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.0 * other.0 + self.1 * other.1
    }

    /// z-component of the cross product, treating both as vectors.
    pub fn cross(&self, other: Point) -> f64 {
        self.0 * other.1 - self.1 * other.0
    }

    pub fn length(&self) -> f64 {
        (self.0 * self.0 + self.1 * self.1).sqrt()
    }

    pub fn normalized(&self) -> Point {
        let len = self.length();
        if len == 0.0 {
            Point(0.0, 0.0)
        } else {
            Point(self.0 / len, self.1 / len)
        }
    }

    /// Rotates the point about the origin by `degrees` (counter-clockwise).
    pub fn rotated(&self, degrees: f64) -> Point {
        let rad = degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        Point(self.0 * cos - self.1 * sin, self.0 * sin + self.1 * cos)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.0, self.1)
    }
}
