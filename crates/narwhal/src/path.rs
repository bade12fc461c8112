//! A single source-to-target route and its own visibility graph.

use crate::config::ThresholdPolicy;
use crate::geom::Point;
use crate::obstacle::{Obstacle, ObstacleId, ObstacleSet};
use crate::segment::Segment;
use crate::visibility::{GraphBuilder, VisibilityGraph};
use crate::vertex::VertexId;

/// Opaque handle to a path owned by a [`crate::Router`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub(crate) u32);

#[derive(Debug, Clone)]
pub(crate) struct Path {
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    pub(crate) bend_points: Option<Vec<Point>>,
    /// Taut route found by the shortest-path search.
    pub(crate) segments: Vec<Segment>,
    /// Route after growth passes; may carry extra corners.
    pub(crate) grown_segments: Vec<Segment>,
    pub(crate) points: Vec<Point>,
    /// Upper bound on route length for the next search; `None` searches everything.
    pub(crate) threshold: Option<f64>,
    prev_cost_ratio: f64,
    pub(crate) cost: f64,
    pub(crate) dirty: bool,
    pub(crate) inverted: bool,
    pub(crate) marked: bool,
    pub(crate) sub_path: Option<PathId>,
    /// Obstacles that properly contain one of the endpoints.
    pub(crate) excluded: Vec<ObstacleId>,
    pub(crate) graph: VisibilityGraph,
}

impl Path {
    pub(crate) fn new(start: Point, end: Point) -> Self {
        Self::between(VertexId::Free(start), VertexId::Free(end))
    }

    /// A split-off remainder of another path; it inherits the parent's grown route and is
    /// never searched on its own.
    pub(crate) fn between(source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            bend_points: None,
            segments: Vec::new(),
            grown_segments: Vec::new(),
            points: Vec::new(),
            threshold: None,
            prev_cost_ratio: 0.0,
            cost: 0.0,
            dirty: true,
            inverted: false,
            marked: false,
            sub_path: None,
            excluded: Vec::new(),
            graph: VisibilityGraph::default(),
        }
    }

    pub(crate) fn start_point(&self, obstacles: &ObstacleSet) -> Point {
        obstacles.position(self.source)
    }

    pub(crate) fn end_point(&self, obstacles: &ObstacleSet) -> Point {
        obstacles.position(self.target)
    }

    pub(crate) fn set_start(&mut self, start: Point) {
        let source = VertexId::Free(start);
        if self.source != source {
            self.source = source;
            self.dirty = true;
        }
    }

    pub(crate) fn set_end(&mut self, end: Point) {
        let target = VertexId::Free(end);
        if self.target != target {
            self.target = target;
            self.dirty = true;
        }
    }

    pub(crate) fn refresh_excluded(&mut self, obstacles: &ObstacleSet) {
        let (start, end) = (self.start_point(obstacles), self.end_point(obstacles));
        self.excluded = obstacles
            .iter()
            .filter(|o| o.contains_proper(start) || o.contains_proper(end))
            .map(Obstacle::id)
            .collect();
    }

    /// Clears per-solve state while keeping the taut route.
    pub(crate) fn reset_partial(&mut self) {
        self.marked = false;
        self.inverted = false;
        self.sub_path = None;
        self.dirty = false;
        self.grown_segments.clear();
        self.points.clear();
    }

    /// Forgets the route and the graph, and derives the next search bound from how long
    /// the previous route was relative to the straight distance.
    pub(crate) fn full_reset(&mut self, policy: ThresholdPolicy, obstacles: &ObstacleSet) {
        self.graph.clear();
        self.segments.clear();
        self.cost = 0.0;
        let distance = self.start_point(obstacles).distance(self.end_point(obstacles));
        self.threshold = match policy {
            ThresholdPolicy::Unbounded => None,
            _ if distance == 0.0 => None,
            ThresholdPolicy::Ellipse {
                initial_ratio,
                slack,
            } => {
                if self.prev_cost_ratio == 0.0 {
                    Some(distance * initial_ratio)
                } else {
                    Some(self.prev_cost_ratio * slack * distance)
                }
            }
        };
        self.reset_partial();
    }

    pub(crate) fn exceeds_threshold(&self) -> bool {
        self.threshold.is_some_and(|t| self.cost > t)
    }

    /// Builds the visibility graph and runs the shortest-path search.
    pub(crate) fn generate_shortest_path(&mut self, obstacles: &ObstacleSet) -> bool {
        let start = self.start_point(obstacles);
        let end = self.end_point(obstacles);
        if self.source == self.target || start == end {
            self.segments = vec![Segment::new(self.source, self.target)];
            self.cost = 0.0;
            return true;
        }
        GraphBuilder::new(
            obstacles,
            &self.excluded,
            (self.source, self.target),
            self.threshold,
            &mut self.graph,
        )
        .build();
        if self.graph.vertices.is_empty() {
            return false;
        }
        let Some((segments, cost)) = self.graph.shortest_path(self.source, self.target, obstacles)
        else {
            return false;
        };
        self.prev_cost_ratio = cost / start.distance(end);
        self.segments = segments;
        self.cost = cost;
        true
    }

    /// Dirties a clean path whose polyline runs over `obstacle`.
    pub(crate) fn test_and_set(&mut self, obstacle: &Obstacle) -> bool {
        if self.dirty || self.excluded.contains(&obstacle.id()) {
            return false;
        }
        if self.points.windows(2).any(|w| obstacle.crossed_by(w[0], w[1])) {
            self.dirty = true;
            return true;
        }
        false
    }

    /// Cuts the grown route at `index`: this path keeps segments `..=index` and ends at
    /// that segment's end; the returned path carries `index..` from its start onwards.
    pub(crate) fn split_at(&mut self, index: usize) -> Path {
        let pivot = self.grown_segments[index];
        let mut rest = Path::between(pivot.start, self.target);
        rest.dirty = false;
        rest.grown_segments = self.grown_segments.split_off(index);
        self.grown_segments.push(pivot);
        self.target = pivot.end;
        rest
    }

    /// Replaces the points of a path that could not be routed with its previous polyline,
    /// or the straight pair when it never had one.
    pub(crate) fn keep_stale(&mut self, previous: Vec<Point>, obstacles: &ObstacleSet) {
        self.points = if previous.is_empty() {
            vec![self.start_point(obstacles), self.end_point(obstacles)]
        } else {
            previous
        };
        self.dirty = true;
    }
}
