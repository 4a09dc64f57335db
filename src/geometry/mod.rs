pub mod convex_hull;
pub mod nfp;
pub mod offset;
pub mod primitives;

use primitives::Point;

/// Signed shoelace area of a closed polygon given by its vertices in order.
/// Positive for counter-clockwise winding.
pub fn shoelace_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        sum += p.0 * q.1 - q.0 * p.1;
    }
    0.5 * sum
}

/// Returns the points in counter-clockwise order, reversing if needed.
pub fn ensure_ccw(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    if shoelace_area(&pts) < 0.0 {
        pts.reverse();
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn shoelace_square() {
        let sq = vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 4.0),
            Point(0.0, 4.0),
        ];
        assert!(approx_eq!(f64, shoelace_area(&sq), 16.0, epsilon = 1e-12));
        let mut cw = sq.clone();
        cw.reverse();
        assert!(approx_eq!(f64, shoelace_area(&cw), -16.0, epsilon = 1e-12));
        assert!(shoelace_area(&ensure_ccw(&cw)) > 0.0);
    }
}
