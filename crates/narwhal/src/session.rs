//! A keyed front end for diagram editors.
//!
//! Nodes become obstacles and edges become paths. Edges are only touched when the
//! embedding layer invalidates them; [`RoutingSession::route`] then pulls their current
//! endpoints into the router, solves, and hands back the edges whose polyline changed.

use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::config::RouterConfig;
use crate::error::Result;
use crate::geom::{Point, Rect};
use crate::path::PathId;
use crate::router::Router;

/// A freshly routed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedEdge<E> {
    pub edge: E,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct RoutingSession<N, E> {
    router: Router<E>,
    nodes: IndexMap<N, Rect, FxBuildHasher>,
    edges: IndexMap<E, PathId, FxBuildHasher>,
    /// Edges waiting to be pushed into the router, with their latest endpoints.
    stale: IndexMap<E, (Point, Point), FxBuildHasher>,
    constraints: FxHashMap<E, Vec<Point>>,
    dirty: bool,
    suppressed: bool,
}

impl<N, E> Default for RoutingSession<N, E> {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<N, E> RoutingSession<N, E> {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            router: Router::with_config(config),
            nodes: IndexMap::default(),
            edges: IndexMap::default(),
            stale: IndexMap::default(),
            constraints: FxHashMap::default(),
            dirty: false,
            suppressed: false,
        }
    }

    pub fn router(&self) -> &Router<E> {
        &self.router
    }

    /// True when something changed since the last [`RoutingSession::route`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn spacing(&self) -> u32 {
        self.router.spacing()
    }

    pub fn set_spacing(&mut self, spacing: u32) -> Result<()> {
        if self.router.spacing() != spacing {
            self.router.set_spacing(spacing)?;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Ignores invalidations for as long as the returned guard lives.
    pub fn suppress(&mut self) -> Suppressed<'_, N, E> {
        let previous = std::mem::replace(&mut self.suppressed, true);
        Suppressed {
            session: self,
            previous,
        }
    }
}

impl<N, E> RoutingSession<N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    /// Adds a node, or moves it when the key is already known.
    pub fn add_node(&mut self, key: N, bounds: Rect) -> Result<()> {
        if self.nodes.contains_key(&key) {
            return self.move_node(key, bounds);
        }
        self.router.add_obstacle(bounds);
        self.nodes.insert(key, bounds);
        self.dirty = true;
        Ok(())
    }

    pub fn move_node(&mut self, key: N, bounds: Rect) -> Result<()> {
        let Some(&old) = self.nodes.get(&key) else {
            return self.add_node(key, bounds);
        };
        if self.router.update_obstacle(old, bounds)? {
            self.dirty = true;
        }
        self.nodes.insert(key, bounds);
        Ok(())
    }

    /// Returns false for unknown keys.
    pub fn remove_node(&mut self, key: &N) -> Result<bool> {
        let Some(bounds) = self.nodes.shift_remove(key) else {
            return Ok(false);
        };
        if self.router.remove_obstacle(bounds)? {
            self.dirty = true;
        }
        Ok(true)
    }

    /// Records new endpoints for an edge. Returns false while suppressed.
    pub fn invalidate(&mut self, edge: E, start: Point, end: Point) -> bool {
        if self.suppressed {
            return false;
        }
        self.stale.insert(edge, (start, end));
        self.dirty = true;
        true
    }

    /// Sets the bend points an edge must pass through; an empty list lifts the constraint.
    pub fn set_constraint(&mut self, edge: E, bend_points: Vec<Point>) -> Result<()> {
        if bend_points.is_empty() {
            self.constraints.remove(&edge);
        } else {
            self.constraints.insert(edge.clone(), bend_points);
        }
        if let Some(&id) = self.edges.get(&edge) {
            if !self.stale.contains_key(&edge) {
                let endpoints = (self.router.start_point(id)?, self.router.end_point(id)?);
                self.stale.insert(edge, endpoints);
            }
            self.dirty = true;
        }
        Ok(())
    }

    pub fn contains_edge(&self, edge: &E) -> bool {
        self.edges.contains_key(edge) || self.stale.contains_key(edge)
    }

    pub fn points(&self, edge: &E) -> Option<&[Point]> {
        let &id = self.edges.get(edge)?;
        self.router.points(id).ok()
    }

    pub fn remove_edge(&mut self, edge: &E) -> Result<bool> {
        self.stale.shift_remove(edge);
        self.constraints.remove(edge);
        let Some(id) = self.edges.shift_remove(edge) else {
            return Ok(false);
        };
        self.router.remove_path(id)?;
        self.dirty = true;
        Ok(true)
    }

    /// Pushes stale edges into the router and solves. Returns the edges whose polyline
    /// changed, in insertion order.
    pub fn route(&mut self) -> Result<Vec<RoutedEdge<E>>> {
        if !self.dirty {
            return Ok(Vec::new());
        }
        let stale = std::mem::take(&mut self.stale);
        for (edge, (start, end)) in stale {
            let id = match self.edges.get(&edge) {
                Some(&id) => {
                    self.router.set_start_point(id, start)?;
                    self.router.set_end_point(id, end)?;
                    id
                }
                None => {
                    let id = self.router.add_path(start, end, edge.clone());
                    self.edges.insert(edge.clone(), id);
                    id
                }
            };
            let bends = self.constraints.get(&edge).cloned();
            self.router.set_bend_points(id, bends)?;
        }
        self.dirty = false;

        let outcome = self.router.solve();
        let mut routed = Vec::with_capacity(outcome.updated.len());
        for id in outcome.updated {
            let Some(edge) = self.router.data(id).cloned() else {
                continue;
            };
            let points = self.router.points(id)?.to_vec();
            routed.push(RoutedEdge { edge, points });
        }
        if !outcome.unresolved.is_empty() {
            tracing::warn!(count = outcome.unresolved.len(), "edges left unrouted");
        }
        Ok(routed)
    }
}

/// Guard returned by [`RoutingSession::suppress`].
pub struct Suppressed<'a, N, E> {
    session: &'a mut RoutingSession<N, E>,
    previous: bool,
}

impl<N, E> Deref for Suppressed<'_, N, E> {
    type Target = RoutingSession<N, E>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<N, E> DerefMut for Suppressed<'_, N, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<N, E> Drop for Suppressed<'_, N, E> {
    fn drop(&mut self) {
        self.session.suppressed = self.previous;
    }
}
