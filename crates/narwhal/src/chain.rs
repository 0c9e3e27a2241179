//! The front chain: a circular doubly-linked ring over circle indices.
//!
//! Links are slot indices into an arena, so the ring carries no ownership cycles. Members are only
//! ever inserted; the ring grows monotonically for the lifetime of a block.

#[derive(Debug, Clone, Copy)]
struct Link {
    circle: usize,
    next: usize,
    prev: usize,
}

/// Slot handle into a [`FrontChain`].
pub type Slot = usize;

#[derive(Debug, Clone, Default)]
pub struct FrontChain {
    links: Vec<Link>,
}

impl FrontChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Adds `circle` as a singleton ring (linked to itself) and returns its slot.
    pub fn link(&mut self, circle: usize) -> Slot {
        let slot = self.links.len();
        self.links.push(Link {
            circle,
            next: slot,
            prev: slot,
        });
        slot
    }

    /// Inserts `circle` directly after `after`, returning the new slot.
    pub fn insert_after(&mut self, after: Slot, circle: usize) -> Slot {
        let slot = self.link(circle);
        let next = self.links[after].next;
        self.links[after].next = slot;
        self.links[slot].prev = after;
        self.links[slot].next = next;
        self.links[next].prev = slot;
        slot
    }

    pub fn next(&self, slot: Slot) -> Slot {
        self.links[slot].next
    }

    pub fn prev(&self, slot: Slot) -> Slot {
        self.links[slot].prev
    }

    pub fn circle(&self, slot: Slot) -> usize {
        self.links[slot].circle
    }

    /// Walks the ring once starting at `start`.
    pub fn iter_from(&self, start: Slot) -> RingIter<'_> {
        RingIter {
            chain: self,
            start,
            cursor: Some(start),
        }
    }

    /// Circle indices in ring order starting at `start`.
    pub fn members(&self, start: Slot) -> Vec<usize> {
        self.iter_from(start).map(|slot| self.circle(slot)).collect()
    }

    /// Checks `next.prev == self` and `prev.next == self` for every slot.
    pub fn is_consistent(&self) -> bool {
        self.links.iter().enumerate().all(|(slot, link)| {
            link.next < self.links.len()
                && link.prev < self.links.len()
                && self.links[link.next].prev == slot
                && self.links[link.prev].next == slot
        })
    }
}

pub struct RingIter<'a> {
    chain: &'a FrontChain,
    start: Slot,
    cursor: Option<Slot>,
}

impl Iterator for RingIter<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let slot = self.cursor?;
        let next = self.chain.next(slot);
        self.cursor = (next != self.start).then_some(next);
        Some(slot)
    }
}
