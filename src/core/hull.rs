//! core/hull.rs — planar convex hulls.

/// A point in the (x, y) plane.
pub type Point = (f64, f64);

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Convex hull by Andrew's monotone chain.
///
/// Returns the hull vertices counter-clockwise starting from the lowest-x
/// (then lowest-y) point, without repeating the first vertex. Collinear and
/// duplicate points are dropped, so degenerate inputs give one or two points.
/// Non-finite points are ignored.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Signed area (positive for counter-clockwise polygons).
pub fn polygon_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..polygon.len() {
        let (x0, y0) = polygon[i];
        let (x1, y1) = polygon[(i + 1) % polygon.len()];
        acc += x0 * y1 - x1 * y0;
    }
    0.5 * acc
}

/// Whether `p` lies inside or on a convex counter-clockwise polygon, with
/// tolerance `eps` on the edge test.
pub fn polygon_contains(polygon: &[Point], p: Point, eps: f64) -> bool {
    match polygon.len() {
        0 => false,
        1 => (polygon[0].0 - p.0).abs() <= eps && (polygon[0].1 - p.1).abs() <= eps,
        2 => {
            let (a, b) = (polygon[0], polygon[1]);
            let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt().max(f64::MIN_POSITIVE);
            let dist = cross(a, b, p).abs() / len;
            let within = |lo: f64, hi: f64, v: f64| lo.min(hi) - eps <= v && v <= lo.max(hi) + eps;
            dist <= eps && within(a.0, b.0, p.0) && within(a.1, b.1, p.1)
        }
        n => (0..n).all(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt().max(f64::MIN_POSITIVE);
            cross(a, b, p) / len >= -eps
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn square_with_interior_and_collinear_points() {
        let pts = [
            (0.0, 0.0),
            (1.0, 0.0),
            (0.5, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.5, 0.5),
            (1.0, 1.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull, vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_abs_diff_eq!(polygon_area(&hull), 1.0);
        assert!(polygon_contains(&hull, (0.5, 0.5), 1e-12));
        assert!(polygon_contains(&hull, (1.0, 0.5), 1e-12));
        assert!(!polygon_contains(&hull, (1.1, 0.5), 1e-12));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[(2.0, 3.0), (2.0, 3.0)]), vec![(2.0, 3.0)]);
        let segment = convex_hull(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(segment, vec![(0.0, 0.0), (2.0, 2.0)]);
        assert!(polygon_contains(&segment, (1.0, 1.0), 1e-9));
        assert!(!polygon_contains(&segment, (1.0, 1.5), 1e-9));
    }

    #[test]
    fn nan_points_are_ignored() {
        let hull = convex_hull(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(hull.len(), 3);
    }
}
