use crate::geometry::primitives::Point;
use crate::geometry::shoelace_area;

/// Miter offset of a closed polygon. Positive `distance` grows the enclosed
/// area, negative shrinks it, regardless of the input winding.
///
/// Every edge is displaced along its outward normal and adjacent displaced
/// edges are re-intersected, so convex vertices extend and concave vertices
/// trim. Returns `None` when the result degenerates (fewer than 3 usable
/// vertices, or a shrink that collapses or inverts the polygon).
pub fn offset_polygon(points: &[Point], distance: f64) -> Option<Vec<Point>> {
    if points.len() < 3 {
        return None;
    }
    if distance == 0.0 {
        return Some(points.to_vec());
    }

    let area = shoelace_area(points);
    if area == 0.0 {
        return None;
    }
    // outward normal of a ccw edge (dx, dy) is (dy, -dx); flip for cw input
    let normal_sign = if area > 0.0 { 1.0 } else { -1.0 };

    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];

        let n_in = edge_normal(prev, cur, normal_sign)?;
        let n_out = edge_normal(cur, next, normal_sign)?;

        // displaced incoming and outgoing edge lines
        let a1 = prev + scale(n_in, distance);
        let a2 = cur + scale(n_in, distance);
        let b1 = cur + scale(n_out, distance);
        let b2 = next + scale(n_out, distance);

        let v = match line_intersection(a1, a2, b1, b2) {
            Some(p) => p,
            // near-parallel edges: shift the vertex along the shared normal
            None => cur + scale(n_out, distance),
        };
        out.push(v);
    }

    // every offset edge must keep its source edge's direction; a reversed
    // (or vanished) edge means the shrink crossed the collapse point, even
    // when the polygon flipped through itself on both axes and kept its
    // winding sign
    for i in 0..n {
        let src = points[(i + 1) % n] - points[i];
        let dst = out[(i + 1) % n] - out[i];
        if src.dot(dst) <= 0.0 {
            return None;
        }
    }
    let out_area = shoelace_area(&out);
    if out_area == 0.0 || out_area.signum() != area.signum() {
        return None;
    }
    Some(out)
}

fn scale(v: Point, s: f64) -> Point {
    Point(v.0 * s, v.1 * s)
}

fn edge_normal(a: Point, b: Point, sign: f64) -> Option<Point> {
    let d = b - a;
    let len = d.length();
    if len == 0.0 {
        return None;
    }
    Some(Point(sign * d.1 / len, -sign * d.0 / len))
}

/// Intersection of the infinite lines (a1, a2) and (b1, b2).
fn line_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let da = a2 - a1;
    let db = b2 - b1;
    let denom = da.cross(db);
    if denom.abs() < 1e-12 * da.length() * db.length() {
        return None;
    }
    let t = (b1 - a1).cross(db) / denom;
    Some(a1 + scale(da, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn square(s: f64) -> Vec<Point> {
        vec![
            Point(0.0, 0.0),
            Point(s, 0.0),
            Point(s, s),
            Point(0.0, s),
        ]
    }

    #[test]
    fn inflate_square_grows_each_side() {
        let off = offset_polygon(&square(10.0), 1.0).unwrap();
        // each side moves out by 1, miter corners extend: 12x12
        assert!(approx_eq!(
            f64,
            shoelace_area(&off),
            144.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn inflate_cw_square_also_grows() {
        let mut cw = square(10.0);
        cw.reverse();
        let off = offset_polygon(&cw, 1.0).unwrap();
        assert!(approx_eq!(
            f64,
            shoelace_area(&off).abs(),
            144.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn offset_round_trip_on_convex_polygon() {
        let tri = vec![Point(0.0, 0.0), Point(8.0, 0.0), Point(4.0, 6.0)];
        let grown = offset_polygon(&tri, 0.7).unwrap();
        let back = offset_polygon(&grown, -0.7).unwrap();
        for (a, b) in tri.iter().zip(back.iter()) {
            assert!(a.distance(*b) < 1e-9);
        }
    }

    #[test]
    fn overshrink_collapses_to_none() {
        assert!(offset_polygon(&square(2.0), -2.0).is_none());
    }

    #[test]
    fn overshrink_past_collapse_keeps_no_flipped_remnant() {
        // shrinking a unit square by 0.6 flips it through itself into a
        // small square of the original winding; still degenerate
        assert!(offset_polygon(&square(1.0), -0.6).is_none());
        let mut cw = square(1.0);
        cw.reverse();
        assert!(offset_polygon(&cw, -0.6).is_none());
    }

    #[test]
    fn shrink_to_exact_collapse_is_none() {
        assert!(offset_polygon(&square(4.0), -2.0).is_none());
    }

    #[test]
    fn degenerate_input_is_none() {
        assert!(offset_polygon(&[Point(0.0, 0.0), Point(1.0, 1.0)], 0.5).is_none());
    }
}
