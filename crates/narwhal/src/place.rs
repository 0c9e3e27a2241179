use crate::chain::{FrontChain, Slot};
use crate::circle::Circle;
use crate::error::{Error, Result};
use crate::geom::{
    Disc, Interval, Point, distance_to_target, intersects, tangent_gap, tangent_place,
};

/// Caps the number of tangent placements evaluated over a run.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Budget {
    limit: Option<usize>,
    used: usize,
}

impl Budget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    fn charge(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.used >= limit {
                return Err(Error::BudgetExhausted { limit });
            }
        }
        self.used += 1;
        Ok(())
    }
}

/// A collision-free tangent position, copied out by value so later commits cannot alter it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub position: Point,
    pub distance: f64,
    /// Chain slot of the first circle of the tangent pair.
    pub after: Slot,
    /// Chain slot of the second circle of the tangent pair.
    pub partner: Slot,
}

/// Read-only view used while looking for a spot for one circle.
pub(crate) struct Search<'a> {
    pub circles: &'a [Circle],
    /// Input indices of every circle placed so far, across all blocks.
    pub placed: &'a [usize],
    pub index: usize,
}

impl Search<'_> {
    fn radius(&self) -> f64 {
        self.circles[self.index].radius
    }

    fn target(&self) -> f64 {
        self.circles[self.index].target
    }

    fn collides(&self, disc: Disc) -> bool {
        self.placed.iter().any(|&other| {
            self.circles[other]
                .disc()
                .is_some_and(|placed| intersects(placed, disc))
        })
    }

    /// Tangent position against the directed pair `(a, b)`, unless it hits a placed circle.
    fn try_pair(&self, a: Disc, b: Disc, budget: &mut Budget) -> Result<Option<(Point, f64)>> {
        budget.charge()?;
        let radius = self.radius();
        let position = tangent_place(a, b, radius);
        if self.collides(Disc::new(position, radius)) {
            return Ok(None);
        }
        Ok(Some((position, distance_to_target(position, self.target()))))
    }

    /// Third circle of a block: the upper solution against `(first, second)`, falling back to the
    /// mirrored one when the upper one runs into an earlier circle. Returns the position and
    /// whether the pair had to be reversed.
    pub fn third(
        &self,
        first: Disc,
        second: Disc,
        budget: &mut Budget,
    ) -> Result<Option<(Point, bool)>> {
        if let Some((position, _)) = self.try_pair(first, second, budget)? {
            return Ok(Some((position, false)));
        }
        Ok(self
            .try_pair(second, first, budget)?
            .map(|(position, _)| (position, true)))
    }

    /// Every collision-free tangent position reachable from the ring, in traversal order.
    ///
    /// Traversal visits `head.next, ..., head`. For each member whose span overlaps the new
    /// circle's target span, successors are paired with it until their gap exceeds the new
    /// circle's diameter.
    pub fn candidates(
        &self,
        chain: &FrontChain,
        head: Slot,
        budget: &mut Budget,
    ) -> Result<Vec<Candidate>> {
        let radius = self.radius();
        let span = Interval::around(self.target(), radius);
        let disc_at = |slot: Slot| self.circles[chain.circle(slot)].disc();

        let mut out = Vec::new();
        for j in chain.iter_from(chain.next(head)) {
            let Some(a) = disc_at(j) else { continue };
            if !a.span().overlaps(&span) {
                continue;
            }
            let mut k = chain.next(j);
            while k != j {
                let Some(b) = disc_at(k) else { break };
                if tangent_gap(a, b) > 2.0 * radius {
                    break;
                }
                if let Some((position, distance)) = self.try_pair(a, b, budget)? {
                    out.push(Candidate {
                        position,
                        distance,
                        after: j,
                        partner: k,
                    });
                }
                k = chain.next(k);
            }
        }
        Ok(out)
    }
}

/// Closest candidate to the target; the earliest one wins ties.
pub(crate) fn nearest(candidates: &[Candidate]) -> Option<Candidate> {
    candidates.iter().copied().fold(None, |best, c| match best {
        Some(b) if b.distance <= c.distance => Some(b),
        _ => Some(c),
    })
}
