//! Spacing: how far each shared corner must be pushed out, and the growth passes that
//! re-test routes against the pushed-out corners.

use crate::geom::{Line, Rect};
use crate::obstacle::ObstacleId;
use crate::path::PathId;
use crate::segment::{Segment, interior_vertices};
use crate::vertex::{Corner, VertexId};

use super::Router;

impl<D> Router<D> {
    pub(super) fn check_vertex_intersections(&mut self) {
        let mut pending = Vec::new();
        for id in self.active_paths() {
            if let Some(path) = self.paths.get(&id) {
                pending.extend(interior_vertices(&path.segments));
            }
        }
        for vertex in pending {
            self.check_vertex_for_intersections(vertex);
        }
    }

    /// Looks for other obstacles inside the square the corner would sweep if grown by
    /// its full spacing, and records the closest one so growth stops short of it.
    fn check_vertex_for_intersections(&mut self, vertex: VertexId) {
        let VertexId::Corner(owner, corner) = vertex else {
            return;
        };
        let Some(position) = self.obstacles.vertex(vertex).map(|v| v.position) else {
            return;
        };
        let spacing = self.config.spacing_px();
        let state = self.vertex_state(vertex);
        if state.nearest_obstacle != 0 || state.nearest_checked {
            return;
        }
        let side = state
            .total_count
            .saturating_mul(spacing)
            .saturating_mul(2)
            .saturating_add(1);
        let compass = corner.compass();
        let y = if compass.is_north() {
            position.y - side
        } else {
            position.y
        };
        let x = if compass.is_east() {
            position.x
        } else {
            position.x - side
        };
        let reach = Rect::new(x, y, side, side);

        let Some(state) = self.vertices.get_mut(&vertex) else {
            return;
        };
        for obstacle in self.obstacles.iter() {
            let bounds = obstacle.bounds();
            if obstacle.id() == owner || !reach.intersects(&bounds) {
                continue;
            }
            let side_of = bounds.position_of(position);
            if side_of.is_none() {
                continue;
            }
            let y_dist = if side_of.is_north() {
                bounds.y - position.y
            } else {
                position.y - bounds.bottom() + 1
            };
            let x_dist = if side_of.is_east() {
                position.x - bounds.right() + 1
            } else {
                bounds.x - position.x
            };
            let distance = x_dist.max(y_dist);
            if state.nearest_obstacle == 0 || distance < state.nearest_obstacle {
                state.nearest_obstacle = distance;
                state.update_offset();
            }
        }
        state.nearest_checked = true;
    }

    /// Runs growth passes until one makes no change or the configured count is reached.
    /// Afterwards every routed path has its grown segment chain.
    pub(super) fn grow_obstacles(&mut self) {
        for pass in 0..self.config.growth_passes {
            if pass > 0 && !self.grown_this_pass {
                break;
            }
            self.grown_this_pass = false;
            self.grow_obstacles_pass();
            tracing::trace!(pass, changed = self.grown_this_pass, "growth pass");
        }
        for id in self.active_paths() {
            if let Some(path) = self.paths.get_mut(&id) {
                if path.grown_segments.is_empty() {
                    path.grown_segments = path.segments.clone();
                }
            }
        }
    }

    fn grow_obstacles_pass(&mut self) {
        let spacing = self.config.spacing_px();
        for obstacle in self.obstacles.iter_mut() {
            for corner in Corner::ALL {
                let Some(state) = self.vertices.get(&obstacle.at(corner)) else {
                    continue;
                };
                if state.total_count > 0 {
                    obstacle.corner_mut(corner).grow(state.growth(spacing));
                }
            }
        }

        for id in self.active_paths() {
            let Some(path) = self.paths.get(&id) else {
                continue;
            };
            let excluded = path.excluded.clone();
            if path.grown_segments.is_empty() {
                for segment in path.segments.clone() {
                    self.test_offset_segment(segment, None, id, &excluded);
                }
            } else {
                let mut inserted = 0;
                for (s, segment) in path.grown_segments.clone().into_iter().enumerate() {
                    inserted += self.test_offset_segment(segment, Some(s + inserted), id, &excluded);
                }
            }
        }

        for obstacle in self.obstacles.iter_mut() {
            obstacle.shrink();
        }
    }

    /// Tests one segment of a path's chain against the grown obstacles. `index` is the
    /// segment's slot in the grown chain, or `None` while the chain is first being built.
    /// Returns the number of segments added to the chain.
    fn test_offset_segment(
        &mut self,
        segment: Segment,
        index: Option<usize>,
        id: PathId,
        excluded: &[ObstacleId],
    ) -> usize {
        if self.config.reroute_grown_intersections {
            if let Some(vertex) = self.offset_intersection(segment, excluded) {
                self.add_detour_vertex(vertex);
                let detour = [
                    Segment::new(segment.start, vertex),
                    Segment::new(vertex, segment.end),
                ];
                if let Some(path) = self.paths.get_mut(&id) {
                    match index {
                        Some(i) if i < path.grown_segments.len() => {
                            path.grown_segments[i] = detour[0];
                            path.grown_segments.insert(i + 1, detour[1]);
                        }
                        _ => path.grown_segments.extend(detour),
                    }
                }
                tracing::trace!(path = ?id, ?vertex, "route bent around a grown corner");
                return 1;
            }
        }
        if index.is_none() {
            if let Some(path) = self.paths.get_mut(&id) {
                path.grown_segments.push(segment);
            }
        }
        0
    }

    /// The corner of the first grown obstacle that `segment` clips, if bending around it
    /// keeps clear of the regions swept by the segment's own corners and of every
    /// obstacle interior. The nearer corner of the clipped diagonal is tried first.
    fn offset_intersection(&self, segment: Segment, excluded: &[ObstacleId]) -> Option<VertexId> {
        use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};

        let offset = self.config.spacing_px();
        let line = self.obstacles.line(segment);
        let detour_length = |c: VertexId| {
            let p = self.obstacles.position(c);
            line.start.distance(p) + line.end.distance(p)
        };
        for obstacle in self.obstacles.iter() {
            let id = obstacle.id();
            if segment.start.obstacle() == Some(id)
                || segment.end.obstacle() == Some(id)
                || excluded.contains(&id)
            {
                continue;
            }
            let at = |c: Corner| obstacle.corner(c).position;
            let main = Line::new(
                at(TopLeft).translate(-offset, -offset),
                at(BottomRight).translate(offset, offset),
            );
            let anti = Line::new(
                at(BottomLeft).translate(-offset, offset),
                at(TopRight).translate(offset, -offset),
            );
            let order = if line.slope_sign() < 0 {
                [(main, TopLeft, BottomRight), (anti, BottomLeft, TopRight)]
            } else {
                [(anti, BottomLeft, TopRight), (main, TopLeft, BottomRight)]
            };
            let Some((_, a, b)) = order.into_iter().find(|(d, _, _)| line.intersects(d)) else {
                continue;
            };
            let (a, b) = (obstacle.at(a), obstacle.at(b));
            let candidates = if detour_length(a) > detour_length(b) {
                [b, a]
            } else {
                [a, b]
            };
            if let Some(vertex) = candidates
                .into_iter()
                .find(|&c| self.detour_is_clear(segment, line, c, excluded))
            {
                return Some(vertex);
            }
        }
        None
    }

    /// Whether `segment` may bend at `vertex`: the corner's swept square must not meet the
    /// squares of the segment's end corners, and neither new leg, drawn to where the
    /// corner will be pushed out, may pass through an obstacle.
    fn detour_is_clear(
        &self,
        segment: Segment,
        line: Line,
        vertex: VertexId,
        excluded: &[ObstacleId],
    ) -> bool {
        let offset = self.config.spacing_px();
        let Some(corner) = self.obstacles.vertex(vertex) else {
            return false;
        };
        let swept = corner.deformed_rect(offset);
        let clashes = |end: VertexId| {
            self.obstacles
                .vertex(end)
                .is_some_and(|v| v.deformed_rect(offset).intersects(&swept))
        };
        if clashes(segment.end) || clashes(segment.start) {
            return false;
        }

        let routes = self.vertices.get(&vertex).map_or(0, |s| s.total_count);
        let reach = routes.saturating_add(1).saturating_mul(offset);
        let bend = corner.compass.push_outward(corner.original, reach);
        !self
            .obstacles
            .iter()
            .filter(|o| !excluded.contains(&o.id()))
            .any(|o| {
                let bounds = o.bounds();
                bounds.cuts_interior(line.start, bend) || bounds.cuts_interior(bend, line.end)
            })
    }

    /// Registers one more route on `vertex` and regrows it with the new count.
    fn add_detour_vertex(&mut self, vertex: VertexId) {
        let spacing = self.config.spacing_px();
        let state = self.vertex_state(vertex);
        state.total_count += 1;
        state.nearest_checked = false;
        if let VertexId::Corner(owner, corner) = vertex {
            if let Some(obstacle) = self.obstacles.get_mut(owner) {
                obstacle.corner_mut(corner).shrink();
            }
            self.check_vertex_for_intersections(vertex);
            let growth = self.vertices.get(&vertex).map_or(0, |s| s.growth(spacing));
            if let Some(obstacle) = self.obstacles.get_mut(owner) {
                obstacle.corner_mut(corner).grow(growth);
            }
        }
        if let Some(state) = self.vertices.get_mut(&vertex) {
            state.update_offset();
        }
        self.grown_this_pass = true;
    }
}
