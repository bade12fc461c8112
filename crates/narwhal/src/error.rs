use crate::geom::{Point, Rect};
use crate::path::PathId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no obstacle with bounds {rect:?}")]
    UnknownObstacle { rect: Rect },
    #[error("unknown path handle: {id:?}")]
    UnknownPath { id: PathId },
    #[error(
        "threshold ratios must be finite and at least 1.0 (initial ratio {initial_ratio}, slack {slack})"
    )]
    InvalidThreshold { initial_ratio: f64, slack: f64 },
    #[error("spacing {spacing} exceeds the maximum of {max}")]
    InvalidSpacing { spacing: u32, max: u32 },
    #[error("vertex {vertex:?} has no enumerated position relative to obstacle {bounds:?}")]
    UnexpectedVertexPosition { vertex: Point, bounds: Rect },
    #[error("failed to parse router config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
