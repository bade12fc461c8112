//! Integer geometry primitives: points, rectangles, compass bits and line segments.
//!
//! Rectangles follow pixel semantics: a rectangle `{x, y, width, height}` covers the
//! half-open ranges `x..x + width` and `y..y + height`, so its last covered column is
//! `right() - 1` and its last covered row is `bottom() - 1`.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }

    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Total Euclidean length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Relative position of a point with respect to a rectangle, as a set of compass bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Compass(u8);

impl Compass {
    pub const NONE: Self = Self(0);
    pub const NORTH: Self = Self(1);
    pub const SOUTH: Self = Self(4);
    pub const WEST: Self = Self(8);
    pub const EAST: Self = Self(16);
    pub const NORTH_WEST: Self = Self(1 | 8);
    pub const NORTH_EAST: Self = Self(1 | 16);
    pub const SOUTH_WEST: Self = Self(4 | 8);
    pub const SOUTH_EAST: Self = Self(4 | 16);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_north(self) -> bool {
        self.0 & Self::NORTH.0 != 0
    }

    pub const fn is_east(self) -> bool {
        self.0 & Self::EAST.0 != 0
    }

    /// Moves `point` away from the rectangle side(s) this compass names by `amount`
    /// along both axes.
    pub const fn push_outward(self, point: Point, amount: i32) -> Point {
        let y = if self.is_north() {
            point.y.saturating_sub(amount)
        } else {
            point.y.saturating_add(amount)
        };
        let x = if self.is_east() {
            point.x.saturating_add(amount)
        } else {
            point.x.saturating_sub(amount)
        };
        Point::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub const fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn top_right(&self) -> Point {
        Point::new(self.right() - 1, self.y)
    }

    pub const fn bottom_left(&self) -> Point {
        Point::new(self.x, self.bottom() - 1)
    }

    pub const fn bottom_right(&self) -> Point {
        Point::new(self.right() - 1, self.bottom() - 1)
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Strict containment: the point lies inside the rectangle and off its border pixels.
    pub const fn contains_proper(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() - 1 && p.y > self.y && p.y < self.bottom() - 1
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        let x1 = self.x.max(other.x);
        let x2 = self.right().min(other.right());
        let y1 = self.y.max(other.y);
        let y2 = self.bottom().min(other.bottom());
        x2 - x1 > 0 && y2 - y1 > 0
    }

    pub fn position_of(&self, p: Point) -> Compass {
        if self.contains(p) {
            return Compass::NONE;
        }
        let mut compass = Compass::NONE;
        if p.x < self.x {
            compass = Compass::WEST;
        } else if p.x >= self.right() {
            compass = Compass::EAST;
        }
        if p.y < self.y {
            compass = compass.union(Compass::NORTH);
        } else if p.y >= self.bottom() {
            compass = compass.union(Compass::SOUTH);
        }
        compass
    }

    /// Diagonal from the top-left to the bottom-right corner pixel.
    pub const fn main_diagonal(&self) -> Line {
        Line::new(self.top_left(), self.bottom_right())
    }

    /// Diagonal from the bottom-left to the top-right corner pixel.
    pub const fn anti_diagonal(&self) -> Line {
        Line::new(self.bottom_left(), self.top_right())
    }

    /// True when the bounding box of `a`..`b` reaches into the open interior of `self`.
    ///
    /// Exact for horizontal and vertical legs.
    pub fn overlaps_interior(&self, a: Point, b: Point) -> bool {
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        x1 > self.x && x0 < self.right() - 1 && y1 > self.y && y0 < self.bottom() - 1
    }

    /// True when the segment `a`..`b` passes through the open interior of `self`.
    /// Grazing a corner or running along a border does not count.
    pub fn cuts_interior(&self, a: Point, b: Point) -> bool {
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let axes = [
            (a.x, b.x, self.x, self.right() - 1),
            (a.y, b.y, self.y, self.bottom() - 1),
        ];
        for (from, to, min, max) in axes {
            let (from, delta) = (f64::from(from), f64::from(to) - f64::from(from));
            let (min, max) = (f64::from(min), f64::from(max));
            if delta == 0.0 {
                if from <= min || from >= max {
                    return false;
                }
                continue;
            }
            let (t0, t1) = ((min - from) / delta, (max - from) / delta);
            lo = lo.max(t0.min(t1));
            hi = hi.min(t0.max(t1));
        }
        hi - lo > 1e-9
    }
}

/// A directed straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Cross product of `start - end` with `other.end - end`.
    ///
    /// Its sign tells on which side of this segment `other` turns.
    pub fn cross_product(&self, other: &Line) -> i64 {
        let ax = i64::from(self.start.x) - i64::from(self.end.x);
        let ay = i64::from(self.start.y) - i64::from(self.end.y);
        let bx = i64::from(other.end.x) - i64::from(self.end.x);
        let by = i64::from(other.end.y) - i64::from(self.end.y);
        ax * by - ay * bx
    }

    /// Turn measure used to rank paths sharing a corner: `1 + cos` of the angle between
    /// the reversed incoming segment and `other`, negated for turns of the opposite hand.
    pub fn turn_cosine(&self, other: &Line) -> f64 {
        let ax = f64::from(self.start.x) - f64::from(self.end.x);
        let ay = f64::from(self.start.y) - f64::from(self.end.y);
        let bx = f64::from(other.end.x) - f64::from(other.start.x);
        let by = f64::from(other.end.y) - f64::from(other.start.y);
        let lengths = self.length() * other.length();
        let cos = if lengths == 0.0 {
            0.0
        } else {
            (ax * bx + ay * by) / lengths
        };
        let sin = ax * by - ay * bx;
        if sin < 0.0 { 1.0 + cos } else { -(1.0 + cos) }
    }

    /// Sign-carrying vertical extent, normalised so the segment runs left to right.
    pub const fn slope_sign(&self) -> i64 {
        let dy = self.end.y as i64 - self.start.y as i64;
        if self.end.x as i64 - self.start.x as i64 >= 0 {
            dy
        } else {
            -dy
        }
    }

    /// Closed-segment intersection; touching endpoints and collinear overlap count.
    pub fn intersects(&self, other: &Line) -> bool {
        let (a, b, c, d) = (self.start, self.end, other.start, other.end);
        if a.x.max(b.x) < c.x.min(d.x)
            || c.x.max(d.x) < a.x.min(b.x)
            || a.y.max(b.y) < c.y.min(d.y)
            || c.y.max(d.y) < a.y.min(b.y)
        {
            return false;
        }
        let d1 = orientation(c, d, a);
        let d2 = orientation(c, d, b);
        let d3 = orientation(a, b, c);
        let d4 = orientation(a, b, d);
        d1 * d2 <= 0 && d3 * d4 <= 0
    }
}

fn orientation(a: Point, b: Point, c: Point) -> i64 {
    let cross = (i64::from(b.x) - i64::from(a.x)) * (i64::from(c.y) - i64::from(a.y))
        - (i64::from(b.y) - i64::from(a.y)) * (i64::from(c.x) - i64::from(a.x));
    cross.signum()
}
