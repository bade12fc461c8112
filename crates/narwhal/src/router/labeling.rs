//! Innie/outie labeling: which side of each shared corner every route passes on.
//!
//! A corner is an innie for a route that turns around it and an outie for one that
//! passes it on the outside. Within one route the labels must be consistent with a
//! single orientation; a route that contradicts itself once is inverted, and a second
//! contradiction splits off the rest of the route as a separate sub-path.

use crate::geom::Line;
use crate::obstacle::Obstacle;
use crate::path::PathId;
use crate::segment::Segment;
use crate::vertex::{Classification, VertexId};

use super::Router;

impl<D> Router<D> {
    pub(super) fn label_paths(&mut self) {
        let mut stack = self.active_paths();
        while let Some(id) = stack.pop() {
            let Some(path) = self.paths.get_mut(&id) else {
                continue;
            };
            if path.marked {
                continue;
            }
            path.marked = true;
            if let Some(sub_path) = self.label_path(id) {
                stack.push(sub_path);
            }
        }
        for id in &self.working_paths {
            if let Some(path) = self.paths.get_mut(id) {
                path.marked = false;
            }
        }
    }

    /// Labels the corners along one route. Returns the sub-path split off the route, if
    /// any.
    fn label_path(&mut self, id: PathId) -> Option<PathId> {
        let grown = self.paths.get(&id)?.grown_segments.clone();
        let mut agree = false;
        for index in 0..grown.len().saturating_sub(1) {
            let segment = grown[index];
            let vertex = segment.end;
            let VertexId::Corner(owner, _) = vertex else {
                continue;
            };
            let Some(center) = self.obstacles.get(owner).map(Obstacle::center) else {
                continue;
            };
            let incoming = self.obstacles.line(segment);
            let cross = incoming.cross_product(&Line::new(incoming.end, center));
            let inverted = self.paths.get(&id).is_some_and(|p| p.inverted);
            let expected = match cross.signum() {
                1 => Some(Classification::Innie),
                -1 => Some(Classification::Outie),
                _ => None,
            }
            .map(|c| if inverted { c.flipped() } else { c });

            match self.vertices.get(&vertex).map(|s| s.classification) {
                None | Some(Classification::Unset) => {
                    let label = expected.unwrap_or_else(|| self.label_of(segment.start));
                    self.vertex_state(vertex).classification = label;
                }
                Some(current) if expected.is_some_and(|e| e != current) => {
                    if inverted || agree {
                        return self.split_path(id, index);
                    }
                    self.invert_prior_vertices(id, &grown[..index]);
                }
                Some(_) => agree = true,
            }

            let turn = incoming.turn_cosine(&self.obstacles.line(grown[index + 1]));
            self.vertex_state(vertex).visit(id, turn);
        }
        None
    }

    /// The label a straight pass-through inherits from the corner it came from.
    fn label_of(&self, vertex: VertexId) -> Classification {
        match self.vertices.get(&vertex).map(|s| s.classification) {
            Some(Classification::Unset) | None => Classification::Innie,
            Some(label) => label,
        }
    }

    fn invert_prior_vertices(&mut self, id: PathId, prior: &[Segment]) {
        if let Some(path) = self.paths.get_mut(&id) {
            path.inverted = true;
        }
        for segment in prior {
            let state = self.vertex_state(segment.end);
            state.classification = state.classification.flipped();
        }
    }

    fn split_path(&mut self, id: PathId, index: usize) -> Option<PathId> {
        let rest = self.paths.get_mut(&id)?.split_at(index);
        let sub_path = self.allocate(rest);
        if let Some(path) = self.paths.get_mut(&id) {
            path.sub_path = Some(sub_path);
        }
        self.working_paths.push(sub_path);
        self.sub_paths.push(sub_path);
        tracing::trace!(path = ?id, ?sub_path, index, "path split at a conflicting corner");
        Some(sub_path)
    }
}

#[cfg(test)]
mod tests {
    use crate::geom::{Point, Rect};
    use crate::router::{Router, corner_of, crossing_scene};
    use crate::vertex::{Classification, Corner};

    fn route_and_label(router: &mut Router) {
        router.reconcile_bend_points();
        router.solve_dirty_paths();
        router.grow_and_label();
    }

    #[test]
    fn a_second_contradiction_splits_the_route_at_that_corner() {
        let (mut router, [diagonal, steep, over]) = crossing_scene();
        route_and_label(&mut router);

        let a_top_left = corner_of(&router, 0, Corner::TopLeft);
        let b_bottom_right = corner_of(&router, 1, Corner::BottomRight);
        assert_eq!(router.vertices[&a_top_left].classification, Classification::Outie);
        assert_eq!(router.vertices[&b_bottom_right].classification, Classification::Outie);
        assert!(!router.paths[&over].inverted);
        assert!(!router.paths[&steep].inverted);

        let head = &router.paths[&diagonal];
        assert!(head.inverted);
        assert_eq!(head.target, b_bottom_right);
        assert_eq!(head.grown_segments.len(), 2);
        let sub = head.sub_path.expect("split off a sub-path");
        assert_eq!(router.sub_paths, vec![sub]);
        assert!(router.working_paths.contains(&sub));

        let tail = &router.paths[&sub];
        assert!(!tail.inverted);
        assert_eq!(tail.source, a_top_left);
        assert_eq!(tail.grown_segments.len(), 2);
        assert_eq!(tail.grown_segments[0], head.grown_segments[1]);

        let visitors = &router.vertices[&b_bottom_right].visitors;
        assert!(visitors.contains(&sub));
        assert!(visitors.contains(&steep));
        assert!(!visitors.contains(&diagonal));
    }

    #[test]
    fn a_contradiction_after_a_fresh_corner_inverts_the_route_and_flips_that_corner() {
        let p = Point::new;
        let mut router: Router = Router::new();
        router.add_obstacle(Rect::new(10, 10, 50, 50));
        let over = router.add_path(p(0, 30), p(100, 30), ());
        // Grazes the top-right corner on its inner hand; labeled before `over`.
        let wrap = router.add_path(p(89, 40), p(29, -20), ());
        route_and_label(&mut router);

        let top_left = corner_of(&router, 0, Corner::TopLeft);
        let top_right = corner_of(&router, 0, Corner::TopRight);
        assert!(router.paths[&over].inverted);
        assert!(!router.paths[&wrap].inverted);
        assert_eq!(router.vertices[&top_left].classification, Classification::Innie);
        assert_eq!(router.vertices[&top_right].classification, Classification::Innie);
        assert!(router.sub_paths.is_empty());

        router.materialize();
        assert_eq!(
            router.points(over).unwrap(),
            &[p(0, 30), p(0, 0), p(69, 0), p(100, 30)]
        );
        assert_eq!(router.points(wrap).unwrap(), &[p(89, 40), p(79, -10), p(29, -20)]);
    }
}
