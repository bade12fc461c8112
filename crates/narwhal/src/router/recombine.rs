use crate::path::PathId;

use super::Router;

impl<D> Router<D> {
    /// Splices every split-off sub-path back onto the path it came from and drops it.
    pub(super) fn recombine_sub_paths(&mut self) {
        for id in self.ordered_paths.clone() {
            self.reconnect_sub_paths(id);
        }
        let sub_paths = std::mem::take(&mut self.sub_paths);
        self.working_paths.retain(|id| !sub_paths.contains(id));
        self.ordered_paths.retain(|id| !sub_paths.contains(id));
        for id in sub_paths {
            self.paths.remove(&id);
        }
    }

    fn reconnect_sub_paths(&mut self, id: PathId) {
        let Some(sub_id) = self.paths.get(&id).and_then(|p| p.sub_path) else {
            return;
        };
        self.reconnect_sub_paths(sub_id);
        let Some(sub) = self.paths.remove(&sub_id) else {
            return;
        };
        let Some(path) = self.paths.get_mut(&id) else {
            return;
        };
        // Both halves hold the segment at the split and its two ends.
        path.grown_segments.extend(sub.grown_segments.into_iter().skip(1));
        path.points.pop();
        path.points.extend(sub.points.into_iter().skip(1));
        path.graph.visible_obstacles.extend(sub.graph.visible_obstacles);
        path.target = sub.target;
        path.sub_path = None;
    }

    /// Stitches each constrained path's polyline together from its children.
    pub(super) fn recombine_child_paths(&mut self) {
        let policy = self.config.threshold;
        for (&parent, children) in &self.child_paths {
            let mut points = Vec::new();
            let mut segments = Vec::new();
            let mut visible = Vec::new();
            let mut joint = None;
            for child in children.iter().filter_map(|c| self.paths.get(c)) {
                if let Some((last, body)) = child.points.split_last() {
                    points.extend_from_slice(body);
                    joint = Some(*last);
                }
                segments.extend_from_slice(&child.segments);
                visible.extend(child.graph.visible_obstacles.iter().copied());
            }
            points.extend(joint);

            let Some(path) = self.paths.get_mut(&parent) else {
                continue;
            };
            path.full_reset(policy, &self.obstacles);
            path.points = points;
            path.segments = segments;
            path.graph.visible_obstacles.extend(visible);
        }
    }
}
