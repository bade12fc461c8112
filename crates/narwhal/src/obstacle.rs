//! Rectangular obstacles and the ordered set the router keeps them in.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::geom::{Compass, Line, Point, Rect};
use crate::segment::Segment;
use crate::vertex::{Corner, Side, Vertex, VertexId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(u32);

#[derive(Debug, Clone)]
pub struct Obstacle {
    id: ObstacleId,
    bounds: Rect,
    corners: [Vertex; 4],
    midpoints: [Vertex; 2],
}

impl Obstacle {
    pub(crate) fn new(id: ObstacleId, bounds: Rect) -> Self {
        let corners = Corner::ALL.map(|c| Vertex::new(c.of(&bounds), c.compass()));
        let mid_y = bounds.y + bounds.height / 2 - 1;
        let midpoints = [
            Vertex::new(Point::new(bounds.x, mid_y), Compass::WEST),
            Vertex::new(Point::new(bounds.right() - 1, mid_y), Compass::EAST),
        ];
        Self {
            id,
            bounds,
            corners,
            midpoints,
        }
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn corner(&self, corner: Corner) -> &Vertex {
        &self.corners[corner.index()]
    }

    pub fn midpoint(&self, side: Side) -> &Vertex {
        match side {
            Side::Left => &self.midpoints[0],
            Side::Right => &self.midpoints[1],
        }
    }

    pub(crate) fn corner_mut(&mut self, corner: Corner) -> &mut Vertex {
        &mut self.corners[corner.index()]
    }

    pub(crate) fn at(&self, corner: Corner) -> VertexId {
        VertexId::Corner(self.id, corner)
    }

    pub(crate) fn contains_proper(&self, p: Point) -> bool {
        self.bounds.contains_proper(p)
    }

    /// True when `line` crosses either diagonal of the obstacle or ends strictly inside it.
    pub(crate) fn blocks(&self, line: &Line) -> bool {
        line.intersects(&self.bounds.main_diagonal())
            || line.intersects(&self.bounds.anti_diagonal())
            || self.contains_proper(line.start)
            || self.contains_proper(line.end)
    }

    /// True when the polyline leg `a`..`b` passes over the obstacle.
    pub(crate) fn crossed_by(&self, a: Point, b: Point) -> bool {
        let leg = Line::new(a, b);
        let main = Line::new(
            self.corner(Corner::TopLeft).position,
            self.corner(Corner::BottomRight).position,
        );
        let anti = Line::new(
            self.corner(Corner::TopRight).position,
            self.corner(Corner::BottomLeft).position,
        );
        leg.intersects(&main)
            || leg.intersects(&anti)
            || self.bounds.contains(a)
            || self.bounds.contains(b)
    }

    pub(crate) fn shrink(&mut self) {
        for vertex in &mut self.corners {
            vertex.shrink();
        }
    }
}

/// Obstacles in insertion order, addressed by id.
#[derive(Debug, Clone, Default)]
pub(crate) struct ObstacleSet {
    map: IndexMap<ObstacleId, Obstacle, FxBuildHasher>,
    next_id: u32,
}

impl ObstacleSet {
    pub(crate) fn insert(&mut self, bounds: Rect) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.map.insert(id, Obstacle::new(id, bounds));
        id
    }

    /// Removes the first obstacle with exactly these bounds.
    pub(crate) fn remove_by_bounds(&mut self, bounds: Rect) -> Option<Obstacle> {
        let index = self.map.values().position(|o| o.bounds == bounds)?;
        self.map.shift_remove_index(index).map(|(_, o)| o)
    }

    pub(crate) fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.map.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.map.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.map.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Obstacle> {
        self.map.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        match id {
            VertexId::Corner(obstacle, corner) => self.get(obstacle).map(|o| o.corner(corner)),
            VertexId::Free(_) => None,
        }
    }

    /// Current (possibly grown) coordinates of a vertex.
    ///
    /// Every corner a route references belongs to a live obstacle; a dangling corner
    /// resolves to the origin and is reported.
    pub(crate) fn position(&self, id: VertexId) -> Point {
        match id {
            VertexId::Free(p) => p,
            VertexId::Corner(..) => match self.vertex(id) {
                Some(v) => v.position,
                None => {
                    tracing::error!(vertex = ?id, "corner of a removed obstacle");
                    Point::default()
                }
            },
        }
    }

    pub(crate) fn line(&self, segment: Segment) -> Line {
        Line::new(self.position(segment.start), self.position(segment.end))
    }
}

#[cfg(test)]
mod tests {
    use super::ObstacleSet;
    use crate::geom::{Line, Point, Rect};
    use crate::vertex::{Corner, Side};

    #[test]
    fn obstacle_vertices_sit_on_the_last_covered_pixels() {
        let mut set = ObstacleSet::default();
        let id = set.insert(Rect::new(10, 10, 50, 50));
        let o = set.get(id).unwrap();
        assert_eq!(o.corner(Corner::TopLeft).position, Point::new(10, 10));
        assert_eq!(o.corner(Corner::TopRight).position, Point::new(59, 10));
        assert_eq!(o.corner(Corner::BottomLeft).position, Point::new(10, 59));
        assert_eq!(o.corner(Corner::BottomRight).position, Point::new(59, 59));
        assert_eq!(o.midpoint(Side::Left).position, Point::new(10, 34));
        assert_eq!(o.midpoint(Side::Right).position, Point::new(59, 34));
        assert_eq!(o.center(), Point::new(35, 35));
    }

    #[test]
    fn blocks_detects_segments_through_the_interior_only() {
        let mut set = ObstacleSet::default();
        let id = set.insert(Rect::new(10, 10, 50, 50));
        let o = set.get(id).unwrap();
        assert!(o.blocks(&Line::new(Point::new(0, 30), Point::new(100, 30))));
        assert!(!o.blocks(&Line::new(Point::new(0, 5), Point::new(100, 5))));
        assert!(o.blocks(&Line::new(Point::new(30, 30), Point::new(30, 100))));
    }

    #[test]
    fn remove_by_bounds_keeps_the_remaining_order() {
        let mut set = ObstacleSet::default();
        let a = set.insert(Rect::new(0, 0, 10, 10));
        set.insert(Rect::new(20, 0, 10, 10));
        let c = set.insert(Rect::new(40, 0, 10, 10));
        assert!(set.remove_by_bounds(Rect::new(20, 0, 10, 10)).is_some());
        assert!(set.remove_by_bounds(Rect::new(20, 0, 10, 10)).is_none());
        let ids: Vec<_> = set.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(set.len(), 2);
    }
}
