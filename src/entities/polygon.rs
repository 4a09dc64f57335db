use crate::geometry::primitives::{Point, Rect};
use crate::geometry::shoelace_area;

/// A part or sheet outline with optional holes.
///
/// `points` hold the outer boundary in insertion order; winding is whatever
/// the caller supplied and the shoelace sign reflects it. `children` are
/// holes, recursively. Templates held in an inventory are never mutated by
/// the search; the placement transform `(x, y, rotation)` is only ever set
/// on clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub id: usize,
    /// Shape-group tag: all instances cut from the same original outline
    /// share a source and can share derived geometry (offsets, NFPs).
    pub source: usize,
    pub points: Vec<Point>,
    /// Holes. A hole's own children would be islands; the nesting search
    /// only ever looks one level deep.
    pub children: Vec<Polygon>,
    pub sheet: bool,
    pub x: f64,
    pub y: f64,
    /// Degrees, counter-clockwise. `points` of a rotated clone are already
    /// rotated; this records the angle for reporting.
    pub rotation: f64,
    /// Priority parts are pulled to the front of every placement order.
    pub priority: bool,
    /// When set (and enabled in config), the only rotations this part may
    /// take, overriding the global rotation set.
    pub strict_angles: Option<Vec<f64>>,
}

impl Polygon {
    pub fn new(source: usize, points: Vec<Point>) -> Self {
        Polygon {
            id: 0,
            source,
            points,
            children: vec![],
            sheet: false,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            priority: false,
            strict_angles: None,
        }
    }

    /// Axis-aligned rectangle with its bottom-left corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Polygon::new(
            0,
            vec![
                Point(0.0, 0.0),
                Point(width, 0.0),
                Point(width, height),
                Point(0.0, height),
            ],
        )
    }

    /// Shoelace area of the outer boundary; sign follows the winding.
    pub fn signed_area(&self) -> f64 {
        shoelace_area(&self.points)
    }

    /// Outer area minus the area of all holes, always non-negative.
    pub fn net_area(&self) -> f64 {
        let holes: f64 = self.children.iter().map(|c| c.net_area()).sum();
        (self.signed_area().abs() - holes).max(0.0)
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(&self.points)
    }

    /// Clone with all points (holes included) rotated about the origin.
    /// The angle is recorded; the translation is reset.
    pub fn rotated(&self, degrees: f64) -> Polygon {
        let mut out = self.clone();
        out.rotation = degrees;
        out.x = 0.0;
        out.y = 0.0;
        if degrees != 0.0 {
            out.points = self.points.iter().map(|p| p.rotated(degrees)).collect();
            out.children = self.children.iter().map(|c| c.rotated(degrees)).collect();
        }
        out
    }

    /// Hole-aware offset: the outer boundary moves by `distance` (positive
    /// grows the part) and every hole moves the opposite way. Holes that
    /// collapse under the offset are dropped; a collapsing outer boundary
    /// returns `None`.
    pub fn offset_tree(&self, distance: f64) -> Option<Polygon> {
        let mut out = self.clone();
        out.points = crate::geometry::offset::offset_polygon(&self.points, distance)?;
        out.children.clear();
        for child in &self.children {
            if let Some(shrunk) = child.offset_tree(-distance) {
                out.children.push(shrunk);
            }
        }
        Some(out)
    }

    /// Outer boundary with the placement translation applied.
    pub fn translated_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .map(|p| Point(p.0 + self.x, p.1 + self.y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn net_area_subtracts_holes() {
        let mut p = Polygon::rectangle(10.0, 10.0);
        let mut hole = Polygon::rectangle(2.0, 3.0);
        hole.points.reverse(); // holes conventionally wind the other way
        p.children.push(hole);
        assert!(approx_eq!(f64, p.net_area(), 94.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, p.signed_area(), 100.0, epsilon = 1e-12));
    }

    #[test]
    fn rotation_rotates_holes_too() {
        let mut p = Polygon::rectangle(4.0, 2.0);
        p.children.push(Polygon::rectangle(1.0, 1.0));
        let r = p.rotated(90.0);
        assert!(approx_eq!(f64, r.rotation, 90.0, epsilon = 1e-12));
        let bb = r.bounds().unwrap();
        assert!(approx_eq!(f64, bb.width(), 2.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, bb.height(), 4.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, r.net_area(), p.net_area(), epsilon = 1e-9));
    }

    #[test]
    fn offset_tree_grows_outer_and_shrinks_holes() {
        let mut p = Polygon::rectangle(10.0, 10.0);
        let mut hole = Polygon::rectangle(4.0, 4.0);
        hole.points.reverse();
        p.children.push(hole);
        let off = p.offset_tree(1.0).unwrap();
        assert!(approx_eq!(f64, off.signed_area(), 144.0, epsilon = 1e-9));
        assert!(approx_eq!(
            f64,
            off.children[0].signed_area().abs(),
            4.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn offset_tree_drops_collapsing_holes() {
        let mut p = Polygon::rectangle(10.0, 10.0);
        let mut hole = Polygon::rectangle(1.0, 1.0);
        hole.points.reverse();
        p.children.push(hole);
        let off = p.offset_tree(0.6).unwrap();
        assert!(off.children.is_empty());
    }

    #[test]
    fn translated_points_apply_the_transform() {
        let mut p = Polygon::rectangle(2.0, 2.0);
        p.x = 5.0;
        p.y = -1.0;
        assert_eq!(p.translated_points()[0], Point(5.0, -1.0));
        assert_eq!(p.translated_points()[2], Point(7.0, 1.0));
    }
}
