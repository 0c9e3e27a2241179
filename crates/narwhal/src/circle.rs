use crate::geom::{Disc, Point};
use serde::{Deserialize, Serialize};

/// A circle to be packed. `target` and `radius` are rescaled in place by normalization; the
/// packer then fills in `placement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub target: f64,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl Circle {
    pub fn new(target: f64, radius: f64) -> Self {
        Self {
            target,
            radius,
            placement: None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.placement.map(|p| Point::new(p.x, p.y))
    }

    pub(crate) fn disc(&self) -> Option<Disc> {
        self.position().map(|center| Disc::new(center, self.radius))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// Distance from `(x, y)` to `(target, 0)`.
    pub distance: f64,
    /// Zero-based sequence number in which the circle was committed.
    pub order: usize,
}
