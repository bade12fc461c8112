use crate::path::PathId;
use crate::segment::interior_vertices;
use crate::vertex::Classification;

use super::Router;

impl<D> Router<D> {
    /// Puts every routed path in drawing order: a path comes after each path sharing a
    /// corner with it that turns tighter there.
    pub(super) fn order_paths(&mut self) {
        self.ordered_paths.clear();
        for id in self.active_paths() {
            self.order_path(id);
        }
    }

    fn order_path(&mut self, id: PathId) {
        let Some(path) = self.paths.get_mut(&id) else {
            return;
        };
        if path.marked {
            return;
        }
        path.marked = true;
        let inverted = path.inverted;
        let grown = path.grown_segments.clone();

        let signed = |angle: f64, inverted: bool| if inverted { -angle } else { angle };
        for vertex in interior_vertices(&grown) {
            let Some(state) = self.vertices.get(&vertex) else {
                continue;
            };
            let angle_of = |p: PathId| state.turn_cosines.get(&p).copied().unwrap_or(0.0);
            let this_angle = signed(angle_of(id), inverted);
            let earlier: Vec<PathId> = state
                .visitors
                .iter()
                .copied()
                .filter(|&other| {
                    self.paths
                        .get(&other)
                        .is_some_and(|p| !p.marked && signed(angle_of(other), p.inverted) < this_angle)
                })
                .collect();
            for other in earlier {
                self.order_path(other);
            }
        }
        self.ordered_paths.push(id);
    }

    /// Materialises each path's polyline, bending it around every interior corner at a
    /// distance of `rank × offset`. Innies rank upwards from the corner, outies downwards
    /// from the number of routes on it, so parallel routes nest instead of overlapping.
    pub(super) fn bend_paths(&mut self) {
        for id in self.ordered_paths.clone() {
            let Some(path) = self.paths.get(&id) else {
                continue;
            };
            let mut points = vec![path.start_point(&self.obstacles)];
            for vertex in interior_vertices(&path.grown_segments) {
                let Some(corner) = self.obstacles.vertex(vertex).copied() else {
                    points.push(self.obstacles.position(vertex));
                    continue;
                };
                let Some(state) = self.vertices.get_mut(&vertex) else {
                    points.push(corner.original);
                    continue;
                };
                let rank = if state.classification == Classification::Innie {
                    state.count += 1;
                    state.count
                } else {
                    let rank = state.total_count;
                    state.total_count -= 1;
                    rank
                };
                let amount = rank.saturating_mul(state.offset);
                points.push(corner.compass.push_outward(corner.original, amount));
            }
            points.push(path.end_point(&self.obstacles));
            if let Some(path) = self.paths.get_mut(&id) {
                path.points = points;
            }
        }
    }
}
