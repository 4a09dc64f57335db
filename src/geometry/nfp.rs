//! No-fit polygon construction by orbital sliding.
//!
//! The no-fit polygon (NFP) of a stationary polygon A and an orbiting polygon
//! B is the locus of B's reference vertex (its first point) over all
//! positions where B touches A without overlap. The inner-fit polygon (IFP)
//! is the analogous locus with B constrained to the inside of A.
//!
//! Construction follows the classic orbital method: start from a known
//! touching configuration, enumerate candidate translation vectors from the
//! current touching vertex/edge pairs, pick the longest feasible slide, trim
//! it against all obstructions and advance, until the path closes on the
//! start point. A step budget of `10 * (|A| + |B|)` bounds every trace;
//! blowing it means the trace failed and the caller gets `None`.

use crate::geometry::ensure_ccw;
use crate::geometry::primitives::{Point, Rect};

/// Outer no-fit polygon of `b` orbiting around stationary `a`.
///
/// Both inputs are interpreted by vertex order only; winding is normalized
/// internally. Returns the closed loop of reference-vertex positions, or
/// `None` when the trace fails (degenerate input, step budget exceeded, or
/// the loop never closes). Near-duplicate vertices within `eps` are merged.
pub fn no_fit_polygon(a: &[Point], b: &[Point], eps: f64) -> Option<Vec<Point>> {
    trace_nfp(a, b, false, eps)
}

/// Inner-fit polygon: positions of `b`'s reference vertex with `b` inside
/// container `a`. Uses an exact fast path when `a` is an axis-aligned
/// rectangle, otherwise the sliding trace with the inside flag.
pub fn inner_fit_polygon(a: &[Point], b: &[Point], eps: f64) -> Option<Vec<Point>> {
    if is_rectangle(a, eps) {
        return inner_fit_rectangle(a, b, eps);
    }
    trace_nfp(a, b, true, eps)
}

/// Exact IFP for an axis-aligned rectangular container: the reference vertex
/// ranges over a (possibly degenerate) rectangle.
pub fn inner_fit_rectangle(a: &[Point], b: &[Point], eps: f64) -> Option<Vec<Point>> {
    let ca = Rect::from_points(a)?;
    let cb = Rect::from_points(b)?;
    if cb.width() > ca.width() + eps || cb.height() > ca.height() + eps {
        return None;
    }
    let b0 = b[0];
    let x_min = ca.x_min - cb.x_min + b0.0;
    let x_max = (ca.x_max - cb.x_max + b0.0).max(x_min);
    let y_min = ca.y_min - cb.y_min + b0.1;
    let y_max = (ca.y_max - cb.y_max + b0.1).max(y_min);
    Some(vec![
        Point(x_min, y_min),
        Point(x_max, y_min),
        Point(x_max, y_max),
        Point(x_min, y_max),
    ])
}

/// True when every vertex sits on a corner of the bounding box and all four
/// corners are covered.
pub fn is_rectangle(points: &[Point], eps: f64) -> bool {
    let Some(bb) = Rect::from_points(points) else {
        return false;
    };
    if points.len() != 4 || bb.width() < eps || bb.height() < eps {
        return false;
    }
    let corners = [
        Point(bb.x_min, bb.y_min),
        Point(bb.x_max, bb.y_min),
        Point(bb.x_max, bb.y_max),
        Point(bb.x_min, bb.y_max),
    ];
    corners
        .iter()
        .all(|c| points.iter().any(|p| p.distance(*c) < eps))
}

/// Polygon overlap predicate with open boundaries: shared edges and touching
/// vertices do not count as an intersection. `b_off` translates `b`.
pub fn intersects(a: &[Point], b: &[Point], b_off: Point, eps: f64) -> bool {
    let (Some(ra), Some(rb)) = (Rect::from_points(a), Rect::from_points(b)) else {
        return false;
    };
    let rb = Rect::new(
        rb.x_min + b_off.0,
        rb.y_min + b_off.1,
        rb.x_max + b_off.0,
        rb.y_max + b_off.1,
    );
    if ra.disjoint(&rb, eps) {
        return false;
    }

    if b.iter()
        .any(|p| point_in_polygon(a, *p + b_off, eps) == Some(true))
    {
        return true;
    }
    if a.iter()
        .any(|p| point_in_polygon(b, *p - b_off, eps) == Some(true))
    {
        return true;
    }
    // coincident boundaries with overlapping interiors have no vertex of one
    // strictly inside the other; the centroids catch that case
    if point_in_polygon(a, centroid(b) + b_off, eps) == Some(true)
        || point_in_polygon(b, centroid(a) - b_off, eps) == Some(true)
    {
        return true;
    }

    let n = a.len();
    let m = b.len();
    for i in 0..n {
        let a1 = a[i];
        let a2 = a[(i + 1) % n];
        for j in 0..m {
            let b1 = b[j] + b_off;
            let b2 = b[(j + 1) % m] + b_off;
            if segments_cross(a1, a2, b1, b2, eps) {
                return true;
            }
        }
    }
    false
}

/// Ray-cast point-in-polygon. `Some(true)` strictly inside, `Some(false)`
/// strictly outside, `None` on the boundary (within `eps`).
pub fn point_in_polygon(polygon: &[Point], p: Point, eps: f64) -> Option<bool> {
    if polygon.len() < 3 {
        return Some(false);
    }
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if almost_equal(pi.0, p.0, eps) && almost_equal(pi.1, p.1, eps) {
            return None; // coincides with a vertex
        }
        if on_segment(pi, pj, p, eps) {
            return None; // exactly on an edge
        }
        if almost_equal(pi.0, pj.0, eps) && almost_equal(pi.1, pj.1, eps) {
            j = i;
            continue; // ignore very small edges
        }
        if ((pi.1 > p.1) != (pj.1 > p.1))
            && (p.0 < (pj.0 - pi.0) * (p.1 - pi.1) / (pj.1 - pi.1) + pi.0)
        {
            inside = !inside;
        }
        j = i;
    }
    Some(inside)
}

/// Total length over which two segments run coincident (collinear within
/// `eps` and overlapping in range). Used for common-line-cut accounting.
pub fn coincident_length(a1: Point, a2: Point, b1: Point, b2: Point, eps: f64) -> f64 {
    let d = a2 - a1;
    let len = d.length();
    if len < eps {
        return 0.0;
    }
    let u = d.normalized();
    // both b endpoints must lie on the infinite line through a
    let off1 = (b1 - a1).cross(u).abs();
    let off2 = (b2 - a1).cross(u).abs();
    if off1 > eps || off2 > eps {
        return 0.0;
    }
    let ta = 0.0_f64;
    let tb = len;
    let t1 = (b1 - a1).dot(u);
    let t2 = (b2 - a1).dot(u);
    let (lo, hi) = (t1.min(t2), t1.max(t2));
    (tb.min(hi) - ta.max(lo)).max(0.0)
}

// ---------------------------------------------------------------------------
// sliding trace internals
// ---------------------------------------------------------------------------

fn trace_nfp(a_in: &[Point], b_in: &[Point], inside: bool, eps: f64) -> Option<Vec<Point>> {
    if a_in.len() < 3 || b_in.len() < 3 {
        return None;
    }
    let a = ensure_ccw(a_in);
    let b = ensure_ccw(b_in);

    let start = if inside {
        search_start_point(&a, &b, true, eps)?
    } else {
        // orbiting polygon's top vertex against the stationary's bottom
        // vertex is guaranteed to lie on the outer NFP
        let a_min = a
            .iter()
            .copied()
            .reduce(|m, p| if p.1 < m.1 { p } else { m })?;
        let b_max = b
            .iter()
            .copied()
            .reduce(|m, p| if p.1 > m.1 { p } else { m })?;
        a_min - b_max
    };

    let mut off = start;
    let reference0 = b[0] + off;
    let mut reference = reference0;
    let mut nfp = vec![reference];
    let mut prev_vector: Option<Point> = None;

    let budget = 10 * (a.len() + b.len());
    let mut closed = false;
    for _ in 0..budget {
        let vectors = touching_vectors(&a, &b, off, eps);
        if vectors.is_empty() {
            return None;
        }

        // longest feasible slide among the candidates
        let mut chosen: Option<Point> = None;
        let mut max_d = 0.0_f64;
        for v in &vectors {
            let v_len = v.length();
            if v_len < eps {
                continue;
            }
            // skip vectors that point straight back where we came from
            if let Some(pv) = prev_vector {
                if v.dot(pv) < 0.0 {
                    let cross = v.normalized().cross(pv.normalized());
                    if cross.abs() < 1e-4 {
                        continue;
                    }
                }
            }
            let dir = v.normalized();
            let d = match polygon_slide_distance(&a, &b, off, dir, eps) {
                Some(hit) if hit < v_len => hit,
                _ => v_len,
            };
            if almost_equal(d, 0.0, eps) {
                continue;
            }
            // the midpoint of the slide must stay overlap-free (outer trace)
            // or contained (inner trace); this rejects grazing directions
            // that cut straight into the other polygon
            let mid = off + Point(dir.0 * d * 0.5, dir.1 * d * 0.5);
            let feasible = if inside {
                contained(&a, &b, mid, eps)
            } else {
                !intersects(&a, &b, mid, eps)
            };
            if !feasible {
                continue;
            }
            if d > max_d {
                max_d = d;
                chosen = Some(*v);
            }
        }

        let Some(chosen) = chosen else {
            return None;
        };
        prev_vector = Some(chosen);
        let dir = chosen.normalized();
        let translate = Point(dir.0 * max_d, dir.1 * max_d);

        reference = reference + translate;
        off = off + translate;

        if almost_equal(reference.0, reference0.0, eps)
            && almost_equal(reference.1, reference0.1, eps)
        {
            closed = true;
            break;
        }
        // when the trace started mid-edge the path may close onto an earlier
        // vertex instead of the exact start point
        if nfp
            .iter()
            .any(|p| almost_equal(p.0, reference.0, eps) && almost_equal(p.1, reference.1, eps))
        {
            closed = true;
            break;
        }
        nfp.push(reference);
    }

    if !closed || nfp.len() < 3 {
        return None;
    }
    Some(nfp)
}

/// Touching pairs of the current configuration turned into candidate slide
/// vectors. Type 0: vertex on vertex, type 1: B vertex on an A edge,
/// type 2: A vertex on a B edge.
fn touching_vectors(a: &[Point], b: &[Point], off: Point, eps: f64) -> Vec<Point> {
    let n = a.len();
    let m = b.len();
    let mut vectors = Vec::new();

    for i in 0..n {
        let next_i = (i + 1) % n;
        for j in 0..m {
            let next_j = (j + 1) % m;
            let bj = b[j] + off;
            if almost_equal(a[i].0, bj.0, eps) && almost_equal(a[i].1, bj.1, eps) {
                push_vertex_vertex(a, b, i, j, &mut vectors);
            } else if on_segment(a[i], a[next_i], bj, eps) {
                push_vertex_on_a_edge(a, b, off, next_i, j, &mut vectors);
            } else if on_segment(bj, b[next_j] + off, a[i], eps) {
                push_vertex_on_b_edge(a, b, off, i, next_j, &mut vectors);
            }
        }
    }
    vectors
}

fn push_vertex_vertex(a: &[Point], b: &[Point], i: usize, j: usize, out: &mut Vec<Point>) {
    let n = a.len();
    let m = b.len();
    let vertex_a = a[i];
    let prev_a = a[(i + n - 1) % n];
    let next_a = a[(i + 1) % n];
    let vertex_b = b[j];
    let prev_b = b[(j + m - 1) % m];
    let next_b = b[(j + 1) % m];

    out.push(prev_a - vertex_a);
    out.push(next_a - vertex_a);
    // sliding along B's edges moves the reference the opposite way
    out.push(vertex_b - prev_b);
    out.push(vertex_b - next_b);
}

fn push_vertex_on_a_edge(
    a: &[Point],
    b: &[Point],
    off: Point,
    edge_end: usize,
    j: usize,
    out: &mut Vec<Point>,
) {
    let n = a.len();
    let vertex_a = a[edge_end];
    let prev_a = a[(edge_end + n - 1) % n];
    let bj = b[j] + off;
    out.push(vertex_a - bj);
    out.push(prev_a - bj);
}

fn push_vertex_on_b_edge(
    a: &[Point],
    b: &[Point],
    off: Point,
    i: usize,
    edge_end: usize,
    out: &mut Vec<Point>,
) {
    let m = b.len();
    let prev_b = b[(edge_end + m - 1) % m] + off;
    let vertex_a = a[i];
    out.push(vertex_a - (b[edge_end] + off));
    out.push(vertex_a - prev_b);
}

/// Maximum distance `b` (translated by `off`) can slide along unit vector
/// `dir` before a vertex of either polygon crosses an edge of the other.
/// Every moving vertex is cast as a ray along `dir` against the stationary
/// edges, and every stationary vertex backwards against the moving edges;
/// the nearest hit bounds the slide. `None` means nothing lies in the way.
fn polygon_slide_distance(
    a: &[Point],
    b: &[Point],
    off: Point,
    dir: Point,
    eps: f64,
) -> Option<f64> {
    let rev = Point(-dir.0, -dir.1);
    let mut distance: Option<f64> = None;

    let n = a.len();
    let m = b.len();
    for j in 0..m {
        let p = b[j] + off;
        for i in 0..n {
            if let Some(t) = ray_segment_hit(p, dir, a[i], a[(i + 1) % n], eps) {
                if t > eps && distance.is_none_or(|d| t < d) {
                    distance = Some(t);
                }
            }
        }
    }
    for i in 0..n {
        for j in 0..m {
            if let Some(t) = ray_segment_hit(a[i], rev, b[j] + off, b[(j + 1) % m] + off, eps) {
                if t > eps && distance.is_none_or(|d| t < d) {
                    distance = Some(t);
                }
            }
        }
    }
    distance
}

/// First parameter `t >= 0` at which the ray `origin + t * dir` meets the
/// segment (s1, s2). A ray parallel to the segment never hits it; such an
/// obstruction is still seen through the segment's own endpoints being cast
/// the other way.
fn ray_segment_hit(origin: Point, dir: Point, s1: Point, s2: Point, eps: f64) -> Option<f64> {
    let seg = s2 - s1;
    let seg_len = seg.length();
    if seg_len < eps {
        return None;
    }
    let denom = dir.cross(seg);
    if denom.abs() < eps * seg_len {
        return None;
    }
    let diff = s1 - origin;
    let t = diff.cross(seg) / denom;
    let u = diff.cross(dir) / denom;
    if t >= -eps && (-eps..=1.0 + eps).contains(&u) {
        Some(t.max(0.0))
    } else {
        None
    }
}

/// `b` translated by `b_off` lies fully inside `a`, boundary contact allowed.
fn contained(a: &[Point], b: &[Point], b_off: Point, eps: f64) -> bool {
    if b.iter()
        .any(|p| point_in_polygon(a, *p + b_off, eps) == Some(false))
    {
        return false;
    }
    let n = a.len();
    let m = b.len();
    for i in 0..n {
        for j in 0..m {
            if segments_cross(
                a[i],
                a[(i + 1) % n],
                b[j] + b_off,
                b[(j + 1) % m] + b_off,
                eps,
            ) {
                return false;
            }
        }
    }
    true
}

/// Signed distance from `p` to segment (s1, s2) measured along `normal`.
/// `None` when the projection of `p` misses the segment (unless `infinite`).
fn point_distance(p: Point, s1: Point, s2: Point, normal: Point, infinite: bool) -> Option<f64> {
    let normal = normal.normalized();
    let dir = Point(normal.1, -normal.0);

    let pdot = p.dot(dir);
    let s1dot = s1.dot(dir);
    let s2dot = s2.dot(dir);
    let pdot_norm = p.dot(normal);
    let s1dot_norm = s1.dot(normal);
    let s2dot_norm = s2.dot(normal);

    if !infinite {
        let eps = 1e-9;
        let lo = s1dot.min(s2dot);
        let hi = s1dot.max(s2dot);
        // projection misses the segment or grazes an endpoint
        if pdot < lo + eps || pdot > hi - eps {
            return None;
        }
    }
    if s1dot == s2dot {
        return None;
    }
    Some(-(pdot_norm - s1dot_norm + (s1dot_norm - s2dot_norm) * (s1dot - pdot) / (s1dot - s2dot)))
}

/// Largest distance any vertex of `b` must travel along `direction` to land
/// on `a`'s boundary; used to find a feasible start for the inside trace.
fn polygon_projection_distance(
    a: &[Point],
    a_off: Point,
    b: &[Point],
    b_off: Point,
    direction: Point,
) -> Option<f64> {
    let mut distance: Option<f64> = None;
    let n = a.len();
    for bp in b {
        let p = *bp + b_off;
        let mut min_projection: Option<f64> = None;
        for j in 0..n {
            let s1 = a[j] + a_off;
            let s2 = a[(j + 1) % n] + a_off;
            // edges parallel to the direction can't be landed on
            if ((s2.1 - s1.1) * direction.0 - (s2.0 - s1.0) * direction.1).abs() < 1e-9 {
                continue;
            }
            if let Some(d) = point_distance(p, s1, s2, direction, false) {
                if min_projection.is_none() || d < min_projection.unwrap() {
                    min_projection = Some(d);
                }
            }
        }
        if let Some(mp) = min_projection {
            if distance.is_none() || mp > distance.unwrap() {
                distance = Some(mp);
            }
        }
    }
    distance
}

/// Finds a translation that places `b` touching `a` without overlap, inside
/// (`inside = true`) or outside the container, by pinning each B vertex to
/// each A vertex and sliding along the A edge when that configuration
/// overlaps.
fn search_start_point(a: &[Point], b: &[Point], inside: bool, eps: f64) -> Option<Point> {
    let n = a.len();
    for i in 0..n {
        let next_i = (i + 1) % n;
        for j in 0..b.len() {
            let mut off = a[i] - b[j];

            if let Some(start) = acceptable_start(a, b, off, inside, eps) {
                return Some(start);
            }

            // slide b along the a edge and retry
            let mut v = a[next_i] - a[i];
            let d1 = polygon_projection_distance(a, Point(0.0, 0.0), b, off, v);
            let d2 = polygon_projection_distance(b, off, a, Point(0.0, 0.0), Point(-v.0, -v.1));
            let d = match (d1, d2) {
                (Some(x), Some(y)) => Some(x.min(y)),
                (Some(x), None) => Some(x),
                (None, Some(y)) => Some(y),
                (None, None) => None,
            };
            // only slide until no longer negative
            let Some(d) = d else { continue };
            if d < eps {
                continue;
            }
            let vd2 = v.dot(v);
            if d * d < vd2 && !almost_equal(d * d, vd2, eps) {
                let vd = vd2.sqrt();
                v = Point(v.0 * d / vd, v.1 * d / vd);
            }
            off = off + v;

            if let Some(start) = acceptable_start(a, b, off, inside, eps) {
                return Some(start);
            }
        }
    }
    None
}

fn acceptable_start(a: &[Point], b: &[Point], off: Point, inside: bool, eps: f64) -> Option<Point> {
    if inside {
        if contained(a, b, off, eps) {
            return Some(off);
        }
    } else if !intersects(a, b, off, eps) {
        // first b vertex clearly on one side decides; it must be outside
        if b.iter().find_map(|p| point_in_polygon(a, *p + off, eps)) == Some(false) {
            return Some(off);
        }
    }
    None
}

fn centroid(points: &[Point]) -> Point {
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Point(0.0, 0.0), |acc, p| acc + *p);
    Point(sum.0 / n, sum.1 / n)
}

fn almost_equal(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// `p` strictly between `a` and `b` on the segment, endpoints excluded.
fn on_segment(a: Point, b: Point, p: Point, eps: f64) -> bool {
    // vertical line
    if almost_equal(a.0, b.0, eps) && almost_equal(p.0, a.0, eps) {
        return !almost_equal(p.1, b.1, eps)
            && !almost_equal(p.1, a.1, eps)
            && p.1 < b.1.max(a.1)
            && p.1 > b.1.min(a.1);
    }
    // horizontal line
    if almost_equal(a.1, b.1, eps) && almost_equal(p.1, a.1, eps) {
        return !almost_equal(p.0, b.0, eps)
            && !almost_equal(p.0, a.0, eps)
            && p.0 < b.0.max(a.0)
            && p.0 > b.0.min(a.0);
    }
    // range check
    if (p.0 < a.0 && p.0 < b.0)
        || (p.0 > a.0 && p.0 > b.0)
        || (p.1 < a.1 && p.1 < b.1)
        || (p.1 > a.1 && p.1 > b.1)
    {
        return false;
    }
    // exclude endpoints
    if (almost_equal(p.0, a.0, eps) && almost_equal(p.1, a.1, eps))
        || (almost_equal(p.0, b.0, eps) && almost_equal(p.1, b.1, eps))
    {
        return false;
    }
    let cross = (p.1 - a.1) * (b.0 - a.0) - (p.0 - a.0) * (b.1 - a.1);
    if cross.abs() > eps {
        return false;
    }
    let dot = (p.0 - a.0) * (b.0 - a.0) + (p.1 - a.1) * (b.1 - a.1);
    if dot < 0.0 || almost_equal(dot, 0.0, eps) {
        return false;
    }
    let len2 = a.sq_distance(b);
    if dot > len2 || almost_equal(dot, len2, eps) {
        return false;
    }
    true
}

/// Proper crossing of two segments: interiors intersect, touching endpoints
/// and collinear overlap excluded.
fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point, eps: f64) -> bool {
    let dp = p2 - p1;
    let dq = q2 - q1;
    let lp = dp.length();
    let lq = dq.length();
    if lp < eps || lq < eps {
        return false;
    }
    // perpendicular distances, sign gives the side
    let d1 = dq.cross(p1 - q1) / lq;
    let d2 = dq.cross(p2 - q1) / lq;
    let d3 = dp.cross(q1 - p1) / lp;
    let d4 = dp.cross(q2 - p1) / lp;
    d1 * d2 < -eps * eps && d3 * d4 < -eps * eps && d1.abs() > eps && d2.abs() > eps
}

/// Intersection point of two segments if they properly cross or touch
/// transversally; collinear pairs give `None`.
pub fn segment_intersection(p1: Point, p2: Point, q1: Point, q2: Point, eps: f64) -> Option<Point> {
    let dp = p2 - p1;
    let dq = q2 - q1;
    let denom = dp.cross(dq);
    if denom.abs() < eps * dp.length().max(1.0) * dq.length().max(1.0) {
        return None;
    }
    let t = (q1 - p1).cross(dq) / denom;
    let u = (q1 - p1).cross(dp) / denom;
    if (-eps..=1.0 + eps).contains(&t) && (-eps..=1.0 + eps).contains(&u) {
        Some(p1 + Point(dp.0 * t, dp.1 * t))
    } else {
        None
    }
}
