#![forbid(unsafe_code)]

//! Headless linear circle packing (port of the d3 `linearPack` layout).
//!
//! Circles are laid out along a baseline so that each one sits as close as possible to its target
//! position without overlapping anything placed before it. Sorted circles are grouped into
//! independent blocks by baseline overlap; inside a block every circle after the third is placed
//! tangent to a pair of members of the block's front chain.

pub mod block;
pub mod chain;
pub mod circle;
pub mod error;
pub mod geom;
pub mod options;
pub mod pack;
mod place;
pub mod scale;

pub use block::BlockSummary;
pub use circle::{Circle, Placement};
pub use error::{Error, Result};
pub use geom::{Interval, Point};
pub use options::{PackOptions, UnplaceablePolicy};
pub use pack::{LinearPack, PackSummary, Packer, RunStart, Step};
pub use scale::Normalization;

/// Headless entry point: normalizes `circles` in place and packs them to completion.
pub fn pack(circles: &mut [Circle], options: &PackOptions) -> Result<PackSummary> {
    LinearPack::new(circles, options.clone()).run()
}
