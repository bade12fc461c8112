//! Per-path visibility graph: construction by incremental obstacle expansion, and the
//! shortest-path labeling over it.

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::{Error, Result};
use crate::geom::{Compass, Line, Point};
use crate::obstacle::{Obstacle, ObstacleId, ObstacleSet};
use crate::segment::{Candidate, Segment};
use crate::vertex::{Corner, VertexId};

/// Costs closer than this are treated as equal when picking the next permanent vertex.
const COST_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default)]
pub(crate) struct VisibilityGraph {
    pub(crate) visible_obstacles: IndexSet<ObstacleId, FxBuildHasher>,
    pub(crate) vertices: IndexSet<VertexId, FxBuildHasher>,
    pub(crate) neighbors: FxHashMap<VertexId, Vec<VertexId>>,
}

impl VisibilityGraph {
    pub(crate) fn clear(&mut self) {
        self.visible_obstacles.clear();
        self.vertices.clear();
        self.neighbors.clear();
    }

    pub(crate) fn link(&mut self, segment: Segment) {
        let Segment { start, end } = segment;
        self.vertices.insert(start);
        self.vertices.insert(end);
        if start == end {
            return;
        }
        let forward = self.neighbors.entry(start).or_default();
        if !forward.contains(&end) {
            forward.push(end);
            self.neighbors.entry(end).or_default().push(start);
        }
    }

    /// Labels the graph outward from `source` and returns the route to `target` with its
    /// cost, or `None` when `target` is not connected to `source`.
    pub(crate) fn shortest_path(
        &self,
        source: VertexId,
        target: VertexId,
        obstacles: &ObstacleSet,
    ) -> Option<(Vec<Segment>, f64)> {
        let mut labels: FxHashMap<VertexId, Label> = FxHashMap::default();
        labels.insert(
            source,
            Label {
                cost: 0.0,
                predecessor: None,
                permanent: true,
            },
        );
        let mut current = source;

        while current != target {
            let neighbors = self.neighbors.get(&current).map_or(&[][..], Vec::as_slice);
            let base = labels.get(&current).map_or(0.0, |l| l.cost);
            let from = obstacles.position(current);
            for &next in neighbors {
                let cost = base + from.distance(obstacles.position(next));
                match labels.get_mut(&next) {
                    Some(label) if label.permanent => {}
                    Some(label) if cost < label.cost - COST_EPSILON => {
                        label.cost = cost;
                        label.predecessor = Some(current);
                    }
                    Some(_) => {}
                    None => {
                        labels.insert(
                            next,
                            Label {
                                cost,
                                predecessor: Some(current),
                                permanent: false,
                            },
                        );
                    }
                }
            }

            let mut best: Option<(VertexId, f64, Point)> = None;
            for &vertex in &self.vertices {
                let Some(label) = labels.get(&vertex) else {
                    continue;
                };
                if label.permanent {
                    continue;
                }
                let at = obstacles.position(vertex);
                let better = match best {
                    None => true,
                    Some((_, cost, p)) => {
                        label.cost < cost - COST_EPSILON
                            || ((label.cost - cost).abs() <= COST_EPSILON
                                && (at.y, at.x) < (p.y, p.x))
                    }
                };
                if better {
                    best = Some((vertex, label.cost, at));
                }
            }
            let (next, _, _) = best?;
            if let Some(label) = labels.get_mut(&next) {
                label.permanent = true;
            }
            current = next;
        }

        let cost = labels.get(&target)?.cost;
        let mut route = Vec::new();
        let mut vertex = target;
        while vertex != source {
            let predecessor = labels.get(&vertex)?.predecessor?;
            route.push(Segment::new(predecessor, vertex));
            vertex = predecessor;
        }
        route.reverse();
        Some((route, cost))
    }
}

#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    predecessor: Option<VertexId>,
    permanent: bool,
}

/// Expands a path's visibility graph from its direct start-end segment, pulling in each
/// obstacle the first time a candidate segment is blocked by it.
pub(crate) struct GraphBuilder<'a> {
    obstacles: &'a ObstacleSet,
    excluded: &'a [ObstacleId],
    source: VertexId,
    target: VertexId,
    source_point: Point,
    target_point: Point,
    threshold: Option<f64>,
    graph: &'a mut VisibilityGraph,
    stack: Vec<Candidate>,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(
        obstacles: &'a ObstacleSet,
        excluded: &'a [ObstacleId],
        (source, target): (VertexId, VertexId),
        threshold: Option<f64>,
        graph: &'a mut VisibilityGraph,
    ) -> Self {
        Self {
            obstacles,
            excluded,
            source,
            target,
            source_point: obstacles.position(source),
            target_point: obstacles.position(target),
            threshold,
            graph,
            stack: Vec::new(),
        }
    }

    pub(crate) fn build(mut self) {
        let direct = Segment::new(self.source, self.target);
        self.stack.push(Candidate::new(direct, None, None));
        while let Some(candidate) = self.stack.pop() {
            self.add_segment(candidate);
        }
    }

    /// Ellipse test: both ends must be reachable within the threshold via start and end.
    fn within_threshold(&self, line: &Line) -> bool {
        let Some(threshold) = self.threshold else {
            return true;
        };
        let reach = |p: Point| p.distance(self.source_point) + p.distance(self.target_point);
        reach(line.start) <= threshold && reach(line.end) <= threshold
    }

    fn add_segment(&mut self, candidate: Candidate) {
        let line = self.obstacles.line(candidate.segment);
        if !self.within_threshold(&line) {
            return;
        }
        let blocker = self
            .obstacles
            .iter()
            .filter(|o| !candidate.skips(o.id()) && !self.excluded.contains(&o.id()))
            .find(|o| o.blocks(&line))
            .map(Obstacle::id);
        match blocker {
            Some(id) => {
                if !self.graph.visible_obstacles.contains(&id) {
                    self.add_obstacle(id);
                }
            }
            None => self.graph.link(candidate.segment),
        }
    }

    fn add_obstacle(&mut self, id: ObstacleId) {
        let obstacles = self.obstacles;
        let Some(obstacle) = obstacles.get(id) else {
            return;
        };
        self.graph.visible_obstacles.insert(id);
        let others: Vec<ObstacleId> = self
            .graph
            .visible_obstacles
            .iter()
            .copied()
            .filter(|&other| other != id)
            .collect();
        for other in others {
            if let Some(other) = obstacles.get(other) {
                self.add_segments_between(obstacle, other);
            }
        }
        if let Err(err) = self.expand_towards_endpoints(obstacle) {
            debug_assert!(false, "{err}");
            tracing::error!(obstacle = ?id, %err, "skipping obstacle expansion");
        }
    }

    fn expand_towards_endpoints(&mut self, obstacle: &Obstacle) -> Result<()> {
        use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};

        let perimeter = [
            (TopLeft, TopRight),
            (TopRight, BottomRight),
            (BottomRight, BottomLeft),
            (BottomLeft, TopLeft),
        ];
        let source = self.segments_for_vertex(self.source, obstacle)?;
        let target = self.segments_for_vertex(self.target, obstacle)?;
        for (a, b) in perimeter {
            self.push(obstacle.at(a), obstacle.at(b), None, Some(obstacle.id()));
        }
        for segment in source.into_iter().chain(target) {
            self.stack
                .push(Candidate::new(segment, None, Some(obstacle.id())));
        }
        Ok(())
    }

    /// The two segments from `vertex` to the corners of `obstacle` that outline it as
    /// seen from the vertex.
    fn segments_for_vertex(&self, vertex: VertexId, obstacle: &Obstacle) -> Result<[Segment; 2]> {
        use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};

        let p = self.obstacles.position(vertex);
        let r = obstacle.bounds();
        let (a, b) = match r.position_of(p) {
            Compass::SOUTH_WEST | Compass::NORTH_EAST => (TopLeft, BottomRight),
            Compass::SOUTH_EAST | Compass::NORTH_WEST => (TopRight, BottomLeft),
            Compass::NORTH => (TopLeft, TopRight),
            Compass::EAST => (BottomRight, TopRight),
            Compass::SOUTH => (BottomRight, BottomLeft),
            Compass::WEST => (TopLeft, BottomLeft),
            _ if p.x == r.x => (TopLeft, BottomLeft),
            _ if p.y == r.y => (TopLeft, TopRight),
            _ if p.y == r.bottom() - 1 => (BottomLeft, BottomRight),
            _ if p.x == r.right() - 1 => (TopRight, BottomRight),
            _ => {
                return Err(Error::UnexpectedVertexPosition {
                    vertex: p,
                    bounds: r,
                });
            }
        };
        Ok([
            Segment::new(vertex, obstacle.at(a)),
            Segment::new(vertex, obstacle.at(b)),
        ])
    }

    fn add_segments_between(&mut self, source: &Obstacle, target: &Obstacle) {
        let (s, t) = (source.bounds(), target.bounds());
        if s.intersects(&t) {
            self.add_all_segments_between(source, target);
        } else if t.bottom() - 1 < s.y {
            self.add_segments_target_above(source, target);
        } else if s.bottom() - 1 < t.y {
            self.add_segments_target_above(target, source);
        } else if t.right() - 1 < s.x {
            self.add_segments_target_beside(source, target);
        } else {
            self.add_segments_target_beside(target, source);
        }
    }

    /// Tangent segments between two disjoint obstacles where `target` lies entirely above
    /// `source`.
    fn add_segments_target_above(&mut self, source: &Obstacle, target: &Obstacle) {
        use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};

        let (s, t) = (source.bounds(), target.bounds());
        let (left, left_cross) = if t.x > s.x {
            let cross = if t.x < s.right() - 1 {
                (TopRight, BottomLeft)
            } else {
                (BottomRight, TopLeft)
            };
            ((TopLeft, TopLeft), cross)
        } else if s.x == t.x {
            ((TopLeft, BottomLeft), (TopRight, BottomLeft))
        } else {
            ((BottomLeft, BottomLeft), (TopRight, BottomLeft))
        };
        let (right, right_cross) = if t.right() < s.right() {
            let cross = if t.right() - 1 > s.x {
                (TopLeft, BottomRight)
            } else {
                (BottomLeft, TopRight)
            };
            ((TopRight, TopRight), cross)
        } else if s.right() == t.right() {
            ((TopRight, BottomRight), (TopLeft, BottomRight))
        } else {
            ((BottomRight, BottomRight), (TopLeft, BottomRight))
        };
        for (a, b) in [left, left_cross, right, right_cross] {
            self.push(source.at(a), target.at(b), Some(source.id()), Some(target.id()));
        }
    }

    /// Tangent segments where `target` lies entirely left of `source` and overlaps it
    /// vertically.
    fn add_segments_target_beside(&mut self, source: &Obstacle, target: &Obstacle) {
        use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};

        let (s, t) = (source.bounds(), target.bounds());
        let (top, top_cross) = if t.y > s.y {
            let cross = if t.y < s.bottom() - 1 {
                (BottomLeft, TopRight)
            } else {
                (BottomRight, TopLeft)
            };
            ((TopLeft, TopLeft), cross)
        } else if s.y == t.y {
            ((TopLeft, TopRight), (BottomLeft, TopRight))
        } else {
            ((TopRight, TopRight), (BottomLeft, TopRight))
        };
        let (bottom, bottom_cross) = if t.bottom() < s.bottom() {
            let cross = if t.bottom() - 1 > s.y {
                (TopLeft, BottomRight)
            } else {
                (TopRight, BottomLeft)
            };
            ((BottomLeft, BottomLeft), cross)
        } else if s.bottom() == t.bottom() {
            ((BottomLeft, BottomRight), (TopLeft, BottomRight))
        } else {
            ((BottomRight, BottomRight), (TopLeft, BottomRight))
        };
        for (a, b) in [top, top_cross, bottom, bottom_cross] {
            self.push(source.at(a), target.at(b), Some(source.id()), Some(target.id()));
        }
    }

    /// Segments between two overlapping obstacles; each is kept only if it stays clear of
    /// both obstacles' interiors.
    fn add_all_segments_between(&mut self, source: &Obstacle, target: &Obstacle) {
        use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};

        let (s, t) = (source.bounds(), target.bounds());
        let mut pairs = vec![
            (BottomLeft, BottomLeft, false, false),
            (BottomRight, BottomRight, true, true),
            (TopLeft, TopLeft, true, true),
            (TopRight, TopRight, false, false),
        ];
        if s.bottom() == t.bottom() {
            pairs.push((BottomLeft, BottomRight, false, true));
            pairs.push((BottomRight, BottomLeft, true, false));
        }
        if s.y == t.y {
            pairs.push((TopLeft, TopRight, true, false));
            pairs.push((TopRight, TopLeft, false, true));
        }
        if s.x == t.x {
            pairs.push((BottomLeft, TopLeft, false, true));
            pairs.push((TopLeft, BottomLeft, true, false));
        }
        if s.right() == t.right() {
            pairs.push((BottomRight, TopRight, true, false));
            pairs.push((TopRight, BottomRight, false, true));
        }
        for (a, b, anti_source, anti_target) in pairs {
            let segment = Segment::new(source.at(a), target.at(b));
            self.add_connecting_segment(segment, source, target, anti_source, anti_target);
        }
    }

    /// `anti_*` selects which diagonal of each obstacle to test: the anti-diagonal for
    /// segments anchored at a top-left or bottom-right corner, the main one otherwise.
    fn add_connecting_segment(
        &mut self,
        segment: Segment,
        source: &Obstacle,
        target: &Obstacle,
        anti_source: bool,
        anti_target: bool,
    ) {
        let line = self.obstacles.line(segment);
        if !self.within_threshold(&line) {
            return;
        }
        if target.contains_proper(line.start) || source.contains_proper(line.end) {
            return;
        }
        let diagonal = |o: &Obstacle, anti: bool| {
            if anti {
                o.bounds().anti_diagonal()
            } else {
                o.bounds().main_diagonal()
            }
        };
        if line.intersects(&diagonal(source, anti_source))
            || line.intersects(&diagonal(target, anti_target))
        {
            return;
        }
        self.stack.push(Candidate::new(
            segment,
            Some(source.id()),
            Some(target.id()),
        ));
    }

    fn push(
        &mut self,
        start: VertexId,
        end: VertexId,
        exclude_a: Option<ObstacleId>,
        exclude_b: Option<ObstacleId>,
    ) {
        self.stack.push(Candidate::new(
            Segment::new(start, end),
            exclude_a,
            exclude_b,
        ));
    }
}
