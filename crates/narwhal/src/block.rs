use crate::chain::{FrontChain, Slot};
use crate::geom::Interval;
use serde::{Deserialize, Serialize};

/// Mutable state of the placement block currently being packed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Block {
    /// Position in visit order of the first circle offered to this block.
    pub start: usize,
    /// Hull of member spans; `None` while the block is empty.
    pub bounds: Option<Interval>,
    /// Input indices of placed members, in placement order.
    pub members: Vec<usize>,
    pub chain: FrontChain,
    /// Chain slot the next search starts from. Set once the ring is built.
    pub head: Option<Slot>,
}

impl Block {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            ..Default::default()
        }
    }

    /// Whether a circle spanning `span` belongs to this block.
    pub fn admits(&self, span: &Interval) -> bool {
        self.bounds.is_none_or(|bounds| bounds.overlaps(span))
    }

    pub fn extend(&mut self, span: Interval) {
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.union(&span),
            None => span,
        });
    }

    pub fn summary(&self) -> Option<BlockSummary> {
        let bounds = self.bounds?;
        let ring = match self.head {
            Some(head) => self.chain.members(head),
            None => Vec::new(),
        };
        Some(BlockSummary {
            start: self.start,
            bounds,
            members: self.members.clone(),
            ring,
        })
    }
}

/// A finished placement block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Position in visit order where the block opened.
    pub start: usize,
    pub bounds: Interval,
    /// Input indices in placement order.
    pub members: Vec<usize>,
    /// Input indices in front-chain ring order. Empty for blocks with fewer than three members.
    pub ring: Vec<usize>,
}
