#![forbid(unsafe_code)]

//! Incremental orthogonal connector routing.
//!
//! `narwhal` routes point-to-point connectors around axis-aligned rectangular obstacles.
//! Each path gets a shortest obstacle-avoiding polyline over its own visibility graph;
//! routes sharing an obstacle corner are spread apart by a configurable spacing, and only
//! paths affected by an edit are searched again on the next [`Router::solve`].
//!
//! [`RoutingSession`] is a keyed layer for diagram editors that maps node and edge keys
//! onto the router's obstacles and paths.

pub mod config;
pub mod error;
pub mod geom;
pub mod obstacle;
mod path;
pub mod rectilinear;
mod router;
mod segment;
pub mod session;
pub mod vertex;
mod visibility;

pub use config::{MAX_SPACING, RouterConfig, ThresholdPolicy};
pub use error::{Error, Result};
pub use geom::{Compass, Line, Point, Rect, polyline_length};
pub use obstacle::{Obstacle, ObstacleId};
pub use path::PathId;
pub use router::{Router, SolveOutcome};
pub use session::{RoutedEdge, RoutingSession, Suppressed};
pub use vertex::{Corner, Side, Vertex};
