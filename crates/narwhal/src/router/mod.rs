//! The routing engine: obstacle and path bookkeeping, dirty tracking and the solve
//! pipeline.
//!
//! A solve first brings bend-constrained paths in line with their constraints and
//! re-searches every dirty path on its own. Everything after that is global over the
//! working paths: corners shared by several routes are grown apart, each corner learns
//! which side of it every route passes on, paths are put in a drawing order per corner,
//! and finally each route is bent around its corners at a rank-dependent offset.

mod growth;
mod labeling;
mod ordering;
mod recombine;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::config::{RouterConfig, ThresholdPolicy, validate_spacing};
use crate::error::{Error, Result};
use crate::geom::{Point, Rect};
use crate::obstacle::{Obstacle, ObstacleSet};
use crate::path::{Path, PathId};
use crate::rectilinear;
use crate::segment::interior_vertices;
use crate::vertex::{Corner, VertexId, VertexState};

/// Result of [`Router::solve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveOutcome {
    /// Paths whose polyline differs from the one before the solve.
    pub updated: Vec<PathId>,
    /// Paths with no obstacle-free route; they keep their previous polyline.
    pub unresolved: Vec<PathId>,
}

impl SolveOutcome {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.unresolved.is_empty()
    }
}

/// Routes paths around rectangular obstacles, re-solving only what changed.
///
/// `D` is an arbitrary payload stored with each path.
#[derive(Debug, Clone)]
pub struct Router<D = ()> {
    config: RouterConfig,
    obstacles: ObstacleSet,
    paths: FxHashMap<PathId, Path>,
    data: FxHashMap<PathId, D>,
    next_path_id: u32,
    /// Paths added by the client, in insertion order.
    user_paths: Vec<PathId>,
    /// Paths searched and bent by the solver: simple user paths, children of constrained
    /// paths, and, during a solve, split-off remainders.
    working_paths: Vec<PathId>,
    child_paths: IndexMap<PathId, Vec<PathId>, FxBuildHasher>,
    vertices: FxHashMap<VertexId, VertexState>,
    unresolved: FxHashSet<PathId>,
    sub_paths: Vec<PathId>,
    ordered_paths: Vec<PathId>,
    grown_this_pass: bool,
}

impl<D> Default for Router<D> {
    fn default() -> Self {
        Self::with_config(RouterConfig::default())
    }
}

impl<D> Router<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            obstacles: ObstacleSet::default(),
            paths: FxHashMap::default(),
            data: FxHashMap::default(),
            next_path_id: 0,
            user_paths: Vec::new(),
            working_paths: Vec::new(),
            child_paths: IndexMap::default(),
            vertices: FxHashMap::default(),
            unresolved: FxHashSet::default(),
            sub_paths: Vec::new(),
            ordered_paths: Vec::new(),
            grown_this_pass: false,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn spacing(&self) -> u32 {
        self.config.spacing
    }

    /// Spacing only affects the global passes, which run on every solve, so no path is
    /// dirtied. Values above [`MAX_SPACING`](crate::config::MAX_SPACING) are rejected.
    pub fn set_spacing(&mut self, spacing: u32) -> Result<()> {
        validate_spacing(spacing)?;
        self.config.spacing = spacing;
        Ok(())
    }

    pub fn threshold_policy(&self) -> ThresholdPolicy {
        self.config.threshold
    }

    pub fn set_threshold_policy(&mut self, policy: ThresholdPolicy) -> Result<()> {
        policy.validate()?;
        self.config.threshold = policy;
        Ok(())
    }

    /// Adds an obstacle; returns whether any solved path now runs over it.
    pub fn add_obstacle(&mut self, bounds: Rect) -> bool {
        let id = self.obstacles.insert(bounds);
        let Some(obstacle) = self.obstacles.get(id) else {
            return false;
        };
        let mut dirtied = false;
        for path_id in &self.working_paths {
            if let Some(path) = self.paths.get_mut(path_id) {
                dirtied |= path.test_and_set(obstacle);
            }
        }
        tracing::debug!(obstacle = ?id, ?bounds, dirtied, "obstacle added");
        dirtied
    }

    /// Removes the obstacle with exactly these bounds; returns whether any path that
    /// turned at it or searched around it was dirtied.
    pub fn remove_obstacle(&mut self, bounds: Rect) -> Result<bool> {
        let obstacle = self
            .obstacles
            .remove_by_bounds(bounds)
            .ok_or(Error::UnknownObstacle { rect: bounds })?;
        let id = obstacle.id();
        let mut dirtied = false;
        for corner in Corner::ALL {
            let Some(state) = self.vertices.get(&obstacle.at(corner)) else {
                continue;
            };
            for visitor in &state.visitors {
                if let Some(path) = self.paths.get_mut(visitor) {
                    path.dirty = true;
                    dirtied = true;
                }
            }
        }
        for path_id in &self.working_paths {
            let Some(path) = self.paths.get_mut(path_id) else {
                continue;
            };
            if !path.dirty && path.graph.visible_obstacles.contains(&id) {
                path.dirty = true;
                dirtied = true;
            }
        }
        self.vertices.retain(|vertex, _| vertex.obstacle() != Some(id));
        tracing::debug!(obstacle = ?id, ?bounds, dirtied, "obstacle removed");
        Ok(dirtied)
    }

    /// Moves an obstacle. Identical bounds are a no-op.
    pub fn update_obstacle(&mut self, old: Rect, new: Rect) -> Result<bool> {
        if old == new {
            return Ok(false);
        }
        let removed = self.remove_obstacle(old)?;
        let added = self.add_obstacle(new);
        Ok(removed || added)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn add_path(&mut self, start: Point, end: Point, data: D) -> PathId {
        let id = self.allocate(Path::new(start, end));
        self.data.insert(id, data);
        self.user_paths.push(id);
        self.working_paths.push(id);
        id
    }

    pub fn remove_path(&mut self, id: PathId) -> Result<D> {
        let data = self.data.remove(&id).ok_or(Error::UnknownPath { id })?;
        self.user_paths.retain(|&p| p != id);
        self.working_paths.retain(|&p| p != id);
        if let Some(children) = self.child_paths.shift_remove(&id) {
            for child in children {
                self.discard(child);
            }
        }
        self.discard(id);
        Ok(data)
    }

    /// Constrains a path to pass through `bend_points` in order. `None` or an empty list
    /// lifts the constraint.
    pub fn set_bend_points(&mut self, id: PathId, bend_points: Option<Vec<Point>>) -> Result<()> {
        let bend_points = bend_points.filter(|b| !b.is_empty());
        let path = self.user_path_mut(id)?;
        if path.bend_points != bend_points {
            path.bend_points = bend_points;
            path.dirty = true;
        }
        Ok(())
    }

    pub fn set_start_point(&mut self, id: PathId, start: Point) -> Result<()> {
        self.user_path_mut(id)?.set_start(start);
        Ok(())
    }

    pub fn set_end_point(&mut self, id: PathId, end: Point) -> Result<()> {
        self.user_path_mut(id)?.set_end(end);
        Ok(())
    }

    pub fn paths(&self) -> impl Iterator<Item = PathId> + '_ {
        self.user_paths.iter().copied()
    }

    pub fn data(&self, id: PathId) -> Option<&D> {
        self.data.get(&id)
    }

    pub fn data_mut(&mut self, id: PathId) -> Option<&mut D> {
        self.data.get_mut(&id)
    }

    /// The solved polyline, start and end included. Empty before the first solve.
    pub fn points(&self, id: PathId) -> Result<&[Point]> {
        Ok(&self.user_path(id)?.points)
    }

    /// The solved polyline with every diagonal leg replaced by an axis-aligned elbow.
    pub fn rectilinear_points(&self, id: PathId) -> Result<Vec<Point>> {
        let path = self.user_path(id)?;
        let start = path.start_point(&self.obstacles);
        let end = path.end_point(&self.obstacles);
        let blocking: Vec<Rect> = self
            .obstacles
            .iter()
            .map(Obstacle::bounds)
            .filter(|b| !b.contains_proper(start) && !b.contains_proper(end))
            .collect();
        Ok(rectilinear::orthogonalize(&path.points, &blocking))
    }

    pub fn start_point(&self, id: PathId) -> Result<Point> {
        Ok(self.user_path(id)?.start_point(&self.obstacles))
    }

    pub fn end_point(&self, id: PathId) -> Result<Point> {
        Ok(self.user_path(id)?.end_point(&self.obstacles))
    }

    pub fn bend_points(&self, id: PathId) -> Result<Option<&[Point]>> {
        Ok(self.user_path(id)?.bend_points.as_deref())
    }

    /// Whether the next solve will re-search this path or one of its constrained pieces.
    pub fn is_dirty(&self, id: PathId) -> Result<bool> {
        let path = self.user_path(id)?;
        let children = self.child_paths.get(&id).into_iter().flatten();
        Ok(path.dirty || children.filter_map(|c| self.paths.get(c)).any(|c| c.dirty))
    }

    /// False when the last solve found no route for this path.
    pub fn is_resolved(&self, id: PathId) -> Result<bool> {
        self.user_path(id)?;
        Ok(!self.is_unresolved(id))
    }

    /// Runs the solve pipeline and reports which paths changed.
    pub fn solve(&mut self) -> SolveOutcome {
        let before: Vec<(PathId, Vec<Point>)> = self
            .user_paths
            .iter()
            .filter_map(|&id| self.paths.get(&id).map(|p| (id, p.points.clone())))
            .collect();

        self.reconcile_bend_points();
        let solved = self.solve_dirty_paths();
        self.grow_and_label();
        self.materialize();

        let mut outcome = SolveOutcome::default();
        for (id, points) in before {
            if self.paths.get(&id).is_some_and(|p| p.points != points) {
                outcome.updated.push(id);
            }
            if self.is_unresolved(id) {
                outcome.unresolved.push(id);
            }
        }
        tracing::debug!(
            solved,
            updated = outcome.updated.len(),
            unresolved = outcome.unresolved.len(),
            "solve finished"
        );
        outcome
    }

    /// Global passes up to labeling: counts routes per corner, grows corners apart and
    /// labels every corner innie or outie, splitting routes that contradict themselves.
    fn grow_and_label(&mut self) {
        self.vertices.clear();
        self.count_vertices();
        self.check_vertex_intersections();
        self.grow_obstacles();
        self.label_paths();
    }

    /// Turns the labeled routes into final polylines.
    fn materialize(&mut self) {
        self.order_paths();
        self.bend_paths();
        self.recombine_sub_paths();
        self.recombine_child_paths();
        self.cleanup();
    }

    fn allocate(&mut self, path: Path) -> PathId {
        let id = PathId(self.next_path_id);
        self.next_path_id += 1;
        self.paths.insert(id, path);
        id
    }

    fn discard(&mut self, id: PathId) {
        self.working_paths.retain(|&p| p != id);
        self.paths.remove(&id);
        self.unresolved.remove(&id);
    }

    fn user_path(&self, id: PathId) -> Result<&Path> {
        if !self.data.contains_key(&id) {
            return Err(Error::UnknownPath { id });
        }
        self.paths.get(&id).ok_or(Error::UnknownPath { id })
    }

    fn user_path_mut(&mut self, id: PathId) -> Result<&mut Path> {
        if !self.data.contains_key(&id) {
            return Err(Error::UnknownPath { id });
        }
        self.paths.get_mut(&id).ok_or(Error::UnknownPath { id })
    }

    fn is_unresolved(&self, id: PathId) -> bool {
        self.unresolved.contains(&id)
            || self
                .child_paths
                .get(&id)
                .is_some_and(|children| children.iter().any(|c| self.unresolved.contains(c)))
    }

    /// Working paths that have a route this solve.
    fn active_paths(&self) -> Vec<PathId> {
        self.working_paths
            .iter()
            .copied()
            .filter(|id| !self.unresolved.contains(id))
            .collect()
    }

    fn vertex_state(&mut self, vertex: VertexId) -> &mut VertexState {
        let spacing = self.config.spacing_px();
        self.vertices
            .entry(vertex)
            .or_insert_with(|| VertexState::new(vertex, spacing))
    }

    /// Keeps one child path per bend-point gap for every dirty constrained path.
    fn reconcile_bend_points(&mut self) {
        for id in self.user_paths.clone() {
            let Some(path) = self.paths.get(&id) else {
                continue;
            };
            if !path.dirty {
                continue;
            }
            let wanted = path.bend_points.as_ref().map_or(1, |b| b.len() + 1);
            let current = self.child_paths.get(&id).map_or(1, Vec::len);
            if wanted != current {
                self.regenerate_child_paths(id, current, wanted);
            }
            self.refresh_child_endpoints(id);
        }
    }

    fn regenerate_child_paths(&mut self, id: PathId, current: usize, wanted: usize) {
        if wanted == 1 {
            if let Some(children) = self.child_paths.shift_remove(&id) {
                for child in children {
                    self.discard(child);
                }
            }
            if !self.working_paths.contains(&id) {
                self.working_paths.push(id);
            }
            return;
        }
        if current == 1 {
            self.working_paths.retain(|&p| p != id);
            self.unresolved.remove(&id);
        }
        let Some(parent) = self.paths.get(&id) else {
            return;
        };
        let (start, end) = (
            parent.start_point(&self.obstacles),
            parent.end_point(&self.obstacles),
        );
        let mut children = self.child_paths.shift_remove(&id).unwrap_or_default();
        while children.len() < wanted {
            let child = self.allocate(Path::new(start, end));
            self.working_paths.push(child);
            children.push(child);
        }
        while children.len() > wanted {
            if let Some(child) = children.pop() {
                self.discard(child);
            }
        }
        self.child_paths.insert(id, children);
    }

    fn refresh_child_endpoints(&mut self, id: PathId) {
        let Some(children) = self.child_paths.get(&id) else {
            return;
        };
        let Some(parent) = self.paths.get(&id) else {
            return;
        };
        let bends = parent.bend_points.clone().unwrap_or_default();
        let mut previous = parent.start_point(&self.obstacles);
        let end = parent.end_point(&self.obstacles);
        for (i, child) in children.iter().enumerate() {
            let next = bends.get(i).copied().unwrap_or(end);
            if let Some(child) = self.paths.get_mut(child) {
                child.set_start(previous);
                child.set_end(next);
            }
            previous = next;
        }
    }

    /// Searches every dirty working path, once within its threshold and once more
    /// without when that fails or the route overflows it.
    fn solve_dirty_paths(&mut self) -> usize {
        let policy = self.config.threshold;
        let mut solved = 0;
        for id in self.working_paths.clone() {
            let Some(path) = self.paths.get_mut(&id) else {
                continue;
            };
            path.refresh_excluded(&self.obstacles);
            if !path.dirty {
                path.reset_partial();
                continue;
            }
            solved += 1;
            let previous = std::mem::take(&mut path.points);
            path.full_reset(policy, &self.obstacles);
            let mut found = path.generate_shortest_path(&self.obstacles);
            if !found || path.exceeds_threshold() {
                path.full_reset(policy, &self.obstacles);
                path.threshold = None;
                found = path.generate_shortest_path(&self.obstacles);
            }
            if found {
                self.unresolved.remove(&id);
                tracing::debug!(
                    path = ?id,
                    cost = path.cost,
                    segments = path.segments.len(),
                    "path solved"
                );
            } else {
                path.keep_stale(previous, &self.obstacles);
                self.unresolved.insert(id);
                tracing::warn!(path = ?id, "no route found, keeping the previous polyline");
            }
        }
        solved
    }

    fn count_vertices(&mut self) {
        let spacing = self.config.spacing_px();
        for id in self.active_paths() {
            let Some(path) = self.paths.get(&id) else {
                continue;
            };
            for vertex in interior_vertices(&path.segments) {
                self.vertices
                    .entry(vertex)
                    .or_insert_with(|| VertexState::new(vertex, spacing))
                    .total_count += 1;
            }
        }
    }

    /// Drops per-solve scratch. Visibility graphs stay: their obstacle sets decide which
    /// paths an obstacle removal dirties.
    fn cleanup(&mut self) {
        for id in &self.working_paths {
            if let Some(path) = self.paths.get_mut(id) {
                path.marked = false;
            }
        }
        self.sub_paths.clear();
        self.ordered_paths.clear();
    }
}

/// Two boxes and three routes. `diagonal` runs on one straight line through box A's
/// top-left corner and box B's bottom-right corner, passing them on opposite hands. `over`
/// claims A's corner as an outie and `steep` claims B's corner as an outie, so `diagonal`
/// is inverted at A and split at B. Paths are added so that `over` and `steep` are
/// labeled first.
#[cfg(test)]
pub(crate) fn crossing_scene() -> (Router, [PathId; 3]) {
    let p = Point::new;
    let mut router = Router::new();
    router.add_obstacle(Rect::new(10, 10, 50, 50));
    router.add_obstacle(Rect::new(-40, 0, 31, 31));
    let diagonal = router.add_path(p(40, -20), p(-30, 50), ());
    let steep = router.add_path(p(0, 10), p(-20, 50), ());
    let over = router.add_path(p(0, 30), p(100, 30), ());
    (router, [diagonal, steep, over])
}

#[cfg(test)]
pub(crate) fn corner_of(router: &Router, obstacle: usize, corner: Corner) -> VertexId {
    let owner = router.obstacles.iter().nth(obstacle).map(Obstacle::id);
    VertexId::Corner(owner.expect("obstacle index in range"), corner)
}
