use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// What to do when a circle has no valid tangent position on its block's front chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnplaceablePolicy {
    /// Fail the whole run with [`Error::NoValidPlacement`].
    #[default]
    Abort,
    /// Leave the circle unplaced and keep packing.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackOptions {
    /// Radius multiplier. Zero collapses every circle to a point.
    #[serde(default)]
    pub padding: f64,
    /// Output span: the largest target is mapped onto this value.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Radius scale override. Derived from the median radius when absent.
    #[serde(default)]
    pub radius_scale: Option<f64>,
    #[serde(default)]
    pub on_unplaceable: UnplaceablePolicy,
    /// Upper bound on tangent candidates evaluated over a run.
    #[serde(default)]
    pub max_candidates: Option<usize>,
}

fn default_width() -> f64 {
    1.0
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            padding: 0.0,
            width: default_width(),
            radius_scale: None,
            on_unplaceable: UnplaceablePolicy::default(),
            max_candidates: None,
        }
    }
}

impl PackOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(Error::InvalidOption {
                name: "padding",
                value: self.padding,
            });
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidOption {
                name: "width",
                value: self.width,
            });
        }
        if let Some(radius_scale) = self.radius_scale {
            if !(radius_scale.is_finite() && radius_scale > 0.0) {
                return Err(Error::InvalidOption {
                    name: "radiusScale",
                    value: radius_scale,
                });
            }
        }
        Ok(())
    }
}
