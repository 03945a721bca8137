//! Closed-ring simplification and smoothing.
//!
//! Rings are stored without a repeated closing vertex.

use super::Point;

/// Drop vertices that lie on a straight axis-aligned run.
pub(crate) fn collapse_collinear(ring: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let n = ring.len();
    if n < 3 {
        return ring.to_vec();
    }
    (0..n)
        .filter(|&i| {
            let prev = ring[(i + n - 1) % n];
            let curr = ring[i];
            let next = ring[(i + 1) % n];
            let vertical = prev.0 == curr.0 && curr.0 == next.0;
            let horizontal = prev.1 == curr.1 && curr.1 == next.1;
            !(vertical || horizontal)
        })
        .map(|i| ring[i])
        .collect()
}

/// Ramer-Douglas-Peucker on a closed ring.
///
/// The ring is cut at vertex 0 and at the vertex farthest from it, both
/// halves are simplified, and the result is rejoined. Rings that would drop
/// below three vertices, and non-positive tolerances, leave the ring as is.
pub(crate) fn simplify_closed(ring: &[Point], epsilon: f32) -> Vec<Point> {
    if ring.len() <= 3 || !(epsilon > 0.0) {
        return ring.to_vec();
    }

    let origin = ring[0];
    let far = (1..ring.len())
        .max_by(|&a, &b| dist_sq(ring[a], origin).total_cmp(&dist_sq(ring[b], origin)))
        .unwrap_or(1);

    let first_half = &ring[..=far];
    let mut second_half: Vec<Point> = ring[far..].to_vec();
    second_half.push(origin);

    let mut out = rdp(first_half, epsilon);
    let tail = rdp(&second_half, epsilon);
    // Skip the shared far vertex and the closing origin.
    out.extend_from_slice(&tail[1..tail.len() - 1]);

    if out.len() < 3 {
        ring.to_vec()
    } else {
        out
    }
}

/// Open-polyline Ramer-Douglas-Peucker, keeping both endpoints.
pub(crate) fn rdp(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_d = 0.0f32;
        let mut max_i = start;
        for i in start + 1..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > max_d {
                max_d = d;
                max_i = i;
            }
        }
        if max_d > epsilon {
            keep[max_i] = true;
            stack.push((start, max_i));
            stack.push((max_i, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// One pass of Chaikin corner cutting on a closed ring.
pub(crate) fn chaikin_closed(ring: &[Point]) -> Vec<Point> {
    let n = ring.len();
    if n < 3 {
        return ring.to_vec();
    }
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        out.push(Point::new(0.75 * a.x + 0.25 * b.x, 0.75 * a.y + 0.25 * b.y));
        out.push(Point::new(0.25 * a.x + 0.75 * b.x, 0.25 * a.y + 0.75 * b.y));
    }
    out
}

/// Shoelace area; positive for clockwise rings on a y-down grid.
pub(crate) fn signed_area(ring: &[Point]) -> f32 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (sum * 0.5) as f32
}

fn dist_sq(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

fn perpendicular_distance(p: Point, start: Point, end: Point) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return dist_sq(p, start).sqrt();
    }
    ((dy * p.x - dx * p.y + end.x * start.y - end.y * start.x).abs()) / len_sq.sqrt()
}
