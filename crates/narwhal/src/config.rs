//! Router configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How far a path's visibility-graph search may stray from the straight line between its
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ThresholdPolicy {
    /// Always search the whole obstacle set.
    Unbounded,
    /// Only keep vertices inside an ellipse with the endpoints as foci. The first search
    /// of a path uses `initial_ratio × distance` as the major axis; later searches use the
    /// previous route's length ratio times `slack`. A search that fails or overflows the
    /// bound is retried once unbounded.
    Ellipse { initial_ratio: f64, slack: f64 },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::Ellipse {
            initial_ratio: 1.13,
            slack: 1.04,
        }
    }
}

impl ThresholdPolicy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            ThresholdPolicy::Unbounded => Ok(()),
            ThresholdPolicy::Ellipse {
                initial_ratio,
                slack,
            } => {
                let ok = |v: f64| v.is_finite() && v >= 1.0;
                if ok(initial_ratio) && ok(slack) {
                    Ok(())
                } else {
                    Err(Error::InvalidThreshold {
                        initial_ratio,
                        slack,
                    })
                }
            }
        }
    }
}

/// Largest accepted spacing. Corner growth multiplies it by the number of routes sharing
/// the corner, which has to stay well inside `i32`.
pub const MAX_SPACING: u32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Distance kept between parallel routes sharing an obstacle corner, and between a
    /// route and the corner it turns around.
    pub spacing: u32,
    pub threshold: ThresholdPolicy,
    /// Upper bound on obstacle growth passes per solve.
    pub growth_passes: u32,
    /// When a grown corner makes a route segment clip a neighbouring obstacle, bend the
    /// route around that obstacle's nearest corner as well.
    pub reroute_grown_intersections: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            spacing: 10,
            threshold: ThresholdPolicy::default(),
            growth_passes: 4,
            reroute_grown_intersections: true,
        }
    }
}

impl RouterConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: RouterConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_spacing(self.spacing)?;
        self.threshold.validate()
    }

    /// Spacing in pixels. Configs built by hand skip [`RouterConfig::validate`], so the
    /// bound is applied here as well.
    pub(crate) fn spacing_px(&self) -> i32 {
        i32::try_from(self.spacing.min(MAX_SPACING)).unwrap_or(i32::MAX)
    }
}

pub(crate) fn validate_spacing(spacing: u32) -> Result<()> {
    if spacing > MAX_SPACING {
        return Err(Error::InvalidSpacing {
            spacing,
            max: MAX_SPACING,
        });
    }
    Ok(())
}
