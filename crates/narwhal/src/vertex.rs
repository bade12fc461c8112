//! Visibility-graph vertices and the per-solve routing state shared by every path that
//! turns at them.

use rustc_hash::FxHashMap;

use crate::geom::{Compass, Point, Rect};
use crate::obstacle::ObstacleId;
use crate::path::PathId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub const fn compass(self) -> Compass {
        match self {
            Corner::TopLeft => Compass::NORTH_WEST,
            Corner::TopRight => Compass::NORTH_EAST,
            Corner::BottomLeft => Compass::SOUTH_WEST,
            Corner::BottomRight => Compass::SOUTH_EAST,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub(crate) const fn of(self, bounds: &Rect) -> Point {
        match self {
            Corner::TopLeft => bounds.top_left(),
            Corner::TopRight => bounds.top_right(),
            Corner::BottomLeft => bounds.bottom_left(),
            Corner::BottomRight => bounds.bottom_right(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

/// Identity of a visibility-graph node.
///
/// Corners are addressed through their obstacle so that growth is visible to every
/// query; free vertices are path endpoints that belong to no obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexId {
    Corner(ObstacleId, Corner),
    Free(Point),
}

impl VertexId {
    pub fn obstacle(self) -> Option<ObstacleId> {
        match self {
            VertexId::Corner(id, _) => Some(id),
            VertexId::Free(_) => None,
        }
    }
}

/// A vertex owned by an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub position: Point,
    pub original: Point,
    pub compass: Compass,
}

impl Vertex {
    pub(crate) const fn new(position: Point, compass: Compass) -> Self {
        Self {
            position,
            original: position,
            compass,
        }
    }

    /// Moves the vertex `amount` away from its obstacle, measured from the true corner.
    pub(crate) fn grow(&mut self, amount: i32) {
        self.position = self.compass.push_outward(self.original, amount);
    }

    pub(crate) fn shrink(&mut self) {
        self.position = self.original;
    }

    /// The region swept between the true corner and the grown corner, padded by `extra`.
    pub(crate) fn deformed_rect(&self, extra: i32) -> Rect {
        let (pos, orig) = (self.position, self.original);
        let (y, height) = if self.compass.is_north() {
            (pos.y - extra, orig.y - pos.y + extra)
        } else {
            (orig.y, pos.y - orig.y + extra)
        };
        let (x, width) = if self.compass.is_east() {
            (orig.x, pos.x - orig.x + extra)
        } else {
            (pos.x - extra, orig.x - pos.x + extra)
        };
        Rect::new(x, y, width, height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Classification {
    #[default]
    Unset,
    Innie,
    Outie,
}

impl Classification {
    pub(crate) fn flipped(self) -> Self {
        match self {
            Classification::Innie => Classification::Outie,
            _ => Classification::Innie,
        }
    }
}

/// Routing state of a vertex for the current solve.
#[derive(Debug, Clone, Default)]
pub(crate) struct VertexState {
    pub(crate) classification: Classification,
    /// Number of route segments ending at this vertex.
    pub(crate) total_count: i32,
    /// Innie paths bent so far during materialisation.
    pub(crate) count: i32,
    pub(crate) nearest_obstacle: i32,
    pub(crate) nearest_checked: bool,
    /// Bend distance per rank.
    pub(crate) offset: i32,
    pub(crate) visitors: Vec<PathId>,
    pub(crate) turn_cosines: FxHashMap<PathId, f64>,
}

impl VertexState {
    pub(crate) fn new(id: VertexId, spacing: i32) -> Self {
        let offset = match id {
            VertexId::Corner(..) => spacing,
            VertexId::Free(_) => 0,
        };
        Self {
            offset,
            ..Default::default()
        }
    }

    /// How far the owning corner grows during a growth pass.
    pub(crate) fn growth(&self, spacing: i32) -> i32 {
        if self.nearest_obstacle == 0 {
            self.total_count.saturating_mul(spacing)
        } else {
            (self.nearest_obstacle / 2 - 1).max(0)
        }
    }

    /// Shares the clearance to the nearest obstacle between every path on this corner.
    pub(crate) fn update_offset(&mut self) {
        if self.nearest_obstacle != 0 {
            self.offset = ((self.nearest_obstacle / 2 - 1) / self.total_count.max(1)).max(0);
        }
    }

    pub(crate) fn visit(&mut self, path: PathId, turn_cosine: f64) {
        if !self.visitors.contains(&path) {
            self.visitors.push(path);
        }
        self.turn_cosines.insert(path, turn_cosine);
    }
}
