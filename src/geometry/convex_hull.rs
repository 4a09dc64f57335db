use crate::geometry::primitives::Point;
use crate::geometry::shoelace_area;
use ordered_float::OrderedFloat;

/// Convex hull of a point set via Andrew's monotone chain, in ccw order.
/// Interior and edge-collinear points are dropped.
pub fn convex_hull_from_points(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by_key(|p| (OrderedFloat(p.0), OrderedFloat(p.1)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower = half_hull(points.iter().copied());
    let mut upper = half_hull(points.iter().rev().copied());
    // each chain ends on the point that opens the other
    lower.pop();
    upper.pop();
    lower.append(&mut upper);
    lower
}

/// Area of the convex hull of a point set.
pub fn convex_hull_area(points: Vec<Point>) -> f64 {
    shoelace_area(&convex_hull_from_points(points)).abs()
}

fn half_hull(points: impl Iterator<Item = Point>) -> Vec<Point> {
    let mut chain: Vec<Point> = Vec::new();
    for p in points {
        while chain.len() >= 2 && !turns_left(chain[chain.len() - 2], chain[chain.len() - 1], p) {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

fn turns_left(a: Point, b: Point, c: Point) -> bool {
    (b - a).cross(c - a) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let pts = vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 4.0),
            Point(0.0, 4.0),
            Point(2.0, 2.0), // interior
            Point(2.0, 0.0), // collinear on an edge
        ];
        let hull = convex_hull_from_points(pts);
        assert_eq!(hull.len(), 4);
        assert!(approx_eq!(
            f64,
            crate::geometry::shoelace_area(&hull).abs(),
            16.0,
            epsilon = 1e-12
        ));
    }

    #[test]
    fn hull_area_of_two_disjoint_squares() {
        // two unit squares a distance apart: hull is the 3x1 band spanning them
        let mut pts = vec![
            Point(0.0, 0.0),
            Point(1.0, 0.0),
            Point(1.0, 1.0),
            Point(0.0, 1.0),
        ];
        pts.extend([
            Point(2.0, 0.0),
            Point(3.0, 0.0),
            Point(3.0, 1.0),
            Point(2.0, 1.0),
        ]);
        assert!(approx_eq!(
            f64,
            convex_hull_area(pts),
            3.0,
            epsilon = 1e-12
        ));
    }
}
