//! Turning solved polylines into strictly horizontal/vertical ones.

use crate::geom::{Point, Rect};

/// Replaces every diagonal leg `a → b` with an elbow through `(a.x, b.y)`, or through
/// `(b.x, a.y)` when only that one keeps both legs out of every obstacle interior, then
/// drops duplicate and collinear points.
pub fn orthogonalize(points: &[Point], obstacles: &[Rect]) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let blocked = |from: Point, elbow: Point, to: Point| {
        obstacles
            .iter()
            .any(|r| r.overlaps_interior(from, elbow) || r.overlaps_interior(elbow, to))
    };
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(first);
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from.x != to.x && from.y != to.y {
            let vertical_first = Point::new(from.x, to.y);
            let horizontal_first = Point::new(to.x, from.y);
            let elbow = if blocked(from, vertical_first, to) && !blocked(from, horizontal_first, to)
            {
                horizontal_first
            } else {
                vertical_first
            };
            out.push(elbow);
        }
        out.push(to);
    }
    strip_redundant(&out)
}

/// Drops repeated points and middle points of straight horizontal or vertical runs.
pub fn strip_redundant(points: &[Point]) -> Vec<Point> {
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if deduped.last() != Some(&p) {
            deduped.push(p);
        }
    }
    if deduped.len() < 3 {
        return deduped;
    }
    let mut out = Vec::with_capacity(deduped.len());
    out.push(deduped[0]);
    for i in 1..deduped.len() - 1 {
        let (prev, cur, next) = (out[out.len() - 1], deduped[i], deduped[i + 1]);
        let straight = (prev.x == cur.x && cur.x == next.x) || (prev.y == cur.y && cur.y == next.y);
        if !straight {
            out.push(cur);
        }
    }
    out.push(deduped[deduped.len() - 1]);
    out
}
