use crate::block::{Block, BlockSummary};
use crate::chain::Slot;
use crate::circle::{Circle, Placement};
use crate::error::{Error, Result};
use crate::geom::{Interval, Point, distance_to_target};
use crate::options::{PackOptions, UnplaceablePolicy};
use crate::place::{Budget, Search, nearest};
use crate::scale::{Normalization, check_finite, normalize, visit_order};
use serde::{Deserialize, Serialize};

/// The first member of every block occupies the first slot of its chain.
const FIRST_SLOT: Slot = 0;

/// Payload of the start notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStart {
    pub circles: usize,
    pub scale: f64,
    pub radius_scale: f64,
}

type StartListener<'a> = Box<dyn FnMut(&RunStart) + 'a>;

/// Outcome of one [`Packer::step`]. Indices are positions in visit order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The circle was placed (or passed over); continue with the given position.
    Advance(usize),
    /// A new block was opened; the same position is offered again as its first circle.
    Retry(usize),
    Done,
    Failed(Error),
}

/// Results of a completed run. Placements are written back onto the circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSummary {
    pub normalization: Normalization,
    pub blocks: Vec<BlockSummary>,
    pub placed: usize,
    /// Input indices of circles left unplaced under [`UnplaceablePolicy::Skip`].
    pub skipped: Vec<usize>,
    /// Tangent placements evaluated.
    pub candidates: usize,
}

impl PackSummary {
    pub fn scale(&self) -> f64 {
        self.normalization.scale
    }

    pub fn radius_scale(&self) -> f64 {
        self.normalization.radius_scale
    }

    pub fn target_range(&self) -> Interval {
        self.normalization.target_range
    }
}

/// Linear pack layout over caller-owned circles.
///
/// ```
/// use narwhal::{Circle, LinearPack, PackOptions};
///
/// let mut circles = vec![Circle::new(1.0, 1.0), Circle::new(2.0, 1.0), Circle::new(3.0, 1.0)];
/// let opts = PackOptions { padding: 1.0, width: 3.0, ..Default::default() };
/// let summary = LinearPack::new(&mut circles, opts).run().unwrap();
/// assert_eq!(summary.placed, 3);
/// assert!(circles.iter().all(|c| c.placement.is_some()));
/// ```
pub struct LinearPack<'a> {
    circles: &'a mut [Circle],
    options: PackOptions,
    order: Vec<usize>,
    normalization: Option<Normalization>,
    listeners: Vec<StartListener<'a>>,
}

impl<'a> LinearPack<'a> {
    pub fn new(circles: &'a mut [Circle], options: PackOptions) -> Self {
        Self {
            circles,
            options,
            order: Vec::new(),
            normalization: None,
            listeners: Vec::new(),
        }
    }

    pub fn circles(&self) -> &[Circle] {
        &*self.circles
    }

    /// Scale factors, once [`normalize`](Self::normalize) or [`start`](Self::start) has run.
    pub fn normalization(&self) -> Option<Normalization> {
        self.normalization
    }

    /// Registers a callback fired each time a run starts.
    pub fn on_start(&mut self, listener: impl FnMut(&RunStart) + 'a) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Rescales targets and radii in place. Fails with [`Error::AlreadyNormalized`] on reuse.
    pub fn normalize(&mut self) -> Result<Normalization> {
        if self.normalization.is_some() {
            return Err(Error::AlreadyNormalized);
        }
        check_finite(self.circles)?;
        let order = visit_order(self.circles);
        let norm = normalize(self.circles, &order, &self.options)?;
        self.order = order;
        self.normalization = Some(norm);
        Ok(norm)
    }

    /// Normalizes if needed, clears previous placements, fires the start listeners and hands back
    /// the step driver.
    pub fn start(&mut self) -> Result<Packer<'_>> {
        let normalization = match self.normalization {
            Some(norm) => norm,
            None => self.normalize()?,
        };
        for circle in self.circles.iter_mut() {
            circle.placement = None;
        }

        let event = RunStart {
            circles: self.circles.len(),
            scale: normalization.scale,
            radius_scale: normalization.radius_scale,
        };
        tracing::debug!(
            circles = event.circles,
            scale = event.scale,
            radius_scale = event.radius_scale,
            "linear pack start"
        );
        for listener in &mut self.listeners {
            listener(&event);
        }

        Ok(Packer {
            circles: &mut *self.circles,
            order: &self.order,
            normalization,
            policy: self.options.on_unplaceable,
            budget: Budget::new(self.options.max_candidates),
            cursor: 0,
            block: Block::new(0),
            blocks: Vec::new(),
            placed: Vec::new(),
            skipped: Vec::new(),
            terminal: None,
        })
    }

    pub fn run(&mut self) -> Result<PackSummary> {
        self.start()?.run()
    }
}

/// Step-wise driver over one run. Owns the block context and front chain between steps.
pub struct Packer<'p> {
    circles: &'p mut [Circle],
    order: &'p [usize],
    normalization: Normalization,
    policy: UnplaceablePolicy,
    budget: Budget,
    cursor: usize,
    block: Block,
    blocks: Vec<BlockSummary>,
    placed: Vec<usize>,
    skipped: Vec<usize>,
    terminal: Option<Step>,
}

impl Packer<'_> {
    /// Position in visit order of the next circle to be offered.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn circles(&self) -> &[Circle] {
        &*self.circles
    }

    /// Blocks finished so far. The block being packed is appended once the run is done or when a
    /// new block opens.
    pub fn blocks(&self) -> &[BlockSummary] {
        &self.blocks
    }

    /// Drives the run until [`Step::Done`] or [`Step::Failed`].
    pub fn run(mut self) -> Result<PackSummary> {
        loop {
            match self.step() {
                Step::Advance(_) | Step::Retry(_) => {}
                Step::Done => return Ok(self.summary()),
                Step::Failed(err) => return Err(err),
            }
        }
    }

    pub fn summary(&self) -> PackSummary {
        PackSummary {
            normalization: self.normalization,
            blocks: self.blocks.clone(),
            placed: self.placed.len(),
            skipped: self.skipped.clone(),
            candidates: self.budget.used(),
        }
    }

    /// Offers the circle at the cursor to the current block. Once the run is done or failed,
    /// further calls keep returning that terminal step.
    pub fn step(&mut self) -> Step {
        if let Some(terminal) = &self.terminal {
            return terminal.clone();
        }
        let pos = self.cursor;
        let Some(&index) = self.order.get(pos) else {
            self.close_block();
            tracing::debug!(
                placed = self.placed.len(),
                blocks = self.blocks.len(),
                skipped = self.skipped.len(),
                "linear pack done"
            );
            return self.finish(Step::Done);
        };

        let Circle { target, radius, .. } = self.circles[index];
        if radius <= 0.0 {
            self.cursor += 1;
            return Step::Advance(self.cursor);
        }

        let span = Interval::around(target, radius);
        if !self.block.admits(&span) {
            self.close_block();
            self.block = Block::new(pos);
            tracing::debug!(position = pos, index, "starting new placement block");
            return Step::Retry(pos);
        }

        match self.place(index) {
            Ok(true) => {
                self.cursor += 1;
                Step::Advance(self.cursor)
            }
            Ok(false) => match self.policy {
                UnplaceablePolicy::Abort => {
                    self.finish(Step::Failed(Error::NoValidPlacement { index }))
                }
                UnplaceablePolicy::Skip => {
                    tracing::warn!(index, target, radius, "no valid placement, skipping circle");
                    self.skipped.push(index);
                    self.cursor += 1;
                    Step::Advance(self.cursor)
                }
            },
            Err(err) => self.finish(Step::Failed(err)),
        }
    }

    fn finish(&mut self, step: Step) -> Step {
        self.terminal = Some(step.clone());
        step
    }

    fn close_block(&mut self) {
        if let Some(summary) = self.block.summary() {
            self.blocks.push(summary);
        }
    }

    /// Places circle `index` inside the current block. `Ok(false)` means no valid spot exists.
    fn place(&mut self, index: usize) -> Result<bool> {
        let target = self.circles[index].target;
        let position = match self.block.members.len() {
            0 => {
                self.block.chain.link(index);
                Point::new(target, 0.0)
            }
            1 => {
                let first = &self.circles[self.block.members[0]];
                Point::new(first.target + first.radius + self.circles[index].radius, 0.0)
            }
            2 => {
                let (Some(first), Some(second)) = (
                    self.circles[self.block.members[0]].disc(),
                    self.circles[self.block.members[1]].disc(),
                ) else {
                    return Ok(false);
                };
                let search = Search {
                    circles: &*self.circles,
                    placed: &self.placed,
                    index,
                };
                let Some((position, reversed)) = search.third(first, second, &mut self.budget)?
                else {
                    return Ok(false);
                };
                let chain = &mut self.block.chain;
                let second_id = self.block.members[1];
                if reversed {
                    // first -> second -> new
                    let second_slot = chain.insert_after(FIRST_SLOT, second_id);
                    chain.insert_after(second_slot, index);
                    self.block.head = Some(second_slot);
                } else {
                    // first -> new -> second
                    let new_slot = chain.insert_after(FIRST_SLOT, index);
                    chain.insert_after(new_slot, second_id);
                    self.block.head = Some(FIRST_SLOT);
                }
                position
            }
            _ => {
                let Some(head) = self.block.head else {
                    return Ok(false);
                };
                let search = Search {
                    circles: &*self.circles,
                    placed: &self.placed,
                    index,
                };
                let candidates = search.candidates(&self.block.chain, head, &mut self.budget)?;
                tracing::trace!(index, candidates = candidates.len(), "tangent candidates");
                let Some(best) = nearest(&candidates) else {
                    return Ok(false);
                };
                tracing::trace!(
                    index,
                    after = self.block.chain.circle(best.after),
                    partner = self.block.chain.circle(best.partner),
                    distance = best.distance,
                    "tangent placement"
                );
                self.block.chain.insert_after(best.after, index);
                self.block.head = Some(best.after);
                best.position
            }
        };

        self.commit(index, position);
        Ok(true)
    }

    fn commit(&mut self, index: usize, position: Point) {
        let circle = &mut self.circles[index];
        circle.placement = Some(Placement {
            x: position.x,
            y: position.y,
            distance: distance_to_target(position, circle.target),
            order: self.placed.len(),
        });
        self.placed.push(index);
        self.block.members.push(index);
        self.block.extend(Interval::around(position.x, circle.radius));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(seed: u64, count: usize) -> Vec<Circle> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..count)
            .map(|_| Circle::new(9.0 + next(), 0.5 + next() * 2.5))
            .collect()
    }

    fn assert_block_consistent(packer: &Packer<'_>) {
        let block = &packer.block;
        assert!(block.chain.is_consistent());
        assert_eq!(block.chain.is_empty(), block.members.is_empty());
        if let Some(head) = block.head {
            let mut ring = block.chain.members(head);
            assert_eq!(block.chain.len(), block.members.len());
            assert_eq!(ring.len(), block.members.len());
            ring.sort_unstable();
            let mut members = block.members.clone();
            members.sort_unstable();
            assert_eq!(ring, members);
        } else {
            assert!(block.members.len() < 3);
        }
    }

    #[test]
    fn front_chain_stays_consistent_after_every_step() {
        for seed in 1..=8u64 {
            let mut circles = dense(seed, 40);
            let options = PackOptions {
                padding: 1.0,
                width: 10.0,
                radius_scale: Some(1.0),
                on_unplaceable: UnplaceablePolicy::Skip,
                ..Default::default()
            };
            let mut lp = LinearPack::new(&mut circles, options);
            let mut packer = lp.start().unwrap();
            loop {
                let step = packer.step();
                assert_block_consistent(&packer);
                match step {
                    Step::Advance(pos) | Step::Retry(pos) => assert_eq!(packer.cursor(), pos),
                    Step::Done => break,
                    Step::Failed(err) => panic!("unexpected failure: {err}"),
                }
            }
            let placed = packer
                .circles()
                .iter()
                .filter(|c| c.placement.is_some())
                .count();
            assert_eq!(placed, packer.summary().placed);
        }
    }

    fn unit_scale(width: f64) -> PackOptions {
        PackOptions {
            padding: 1.0,
            width,
            radius_scale: Some(1.0),
            ..Default::default()
        }
    }

    fn run_steps(packer: &mut Packer<'_>, count: usize) {
        for _ in 0..count {
            assert!(matches!(packer.step(), Step::Advance(_) | Step::Retry(_)));
            assert_block_consistent(packer);
        }
    }

    #[test]
    fn third_member_above_links_first_new_second() {
        let mut circles = vec![
            Circle::new(0.0, 1.0),
            Circle::new(1.0, 1.0),
            Circle::new(2.0, 1.0),
        ];
        let mut lp = LinearPack::new(&mut circles, unit_scale(2.0));
        let mut packer = lp.start().unwrap();
        run_steps(&mut packer, 3);

        assert_eq!(packer.block.head, Some(FIRST_SLOT));
        assert_eq!(packer.block.chain.members(FIRST_SLOT), vec![0, 2, 1]);
    }

    #[test]
    fn third_member_below_links_first_second_new() {
        // The second block's upper spot runs into the first block, so the pair is reversed.
        let mut circles = vec![
            Circle::new(5.5, 1.0),
            Circle::new(2.0, 0.5),
            Circle::new(0.5, 2.0),
            Circle::new(5.0, 0.5),
            Circle::new(2.5, 1.0),
            Circle::new(5.5, 8.0),
        ];
        let mut lp = LinearPack::new(&mut circles, unit_scale(5.5));
        let mut packer = lp.start().unwrap();
        // Three members, a block reset, then three more.
        run_steps(&mut packer, 7);

        let second_slot = packer.block.chain.next(FIRST_SLOT);
        assert_eq!(packer.block.head, Some(second_slot));
        assert_eq!(packer.block.chain.members(FIRST_SLOT), vec![3, 5, 0]);
        let below = packer.circles()[0].position().unwrap();
        assert!(below.y > 0.0);
        assert_eq!(packer.step(), Step::Done);
    }
}
