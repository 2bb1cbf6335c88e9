//! Epoch-stamped visited set for graph traversal.
//!
//! Each node handle owns one stamp slot. A slot counts as visited when its stamp
//! equals the current epoch, so resetting the set means bumping the epoch.

/// Visited set keyed by node handle.
///
/// `reset()` is O(1) except once every `u16::MAX` calls, when the epoch wraps
/// and every stamp is zeroed.
#[derive(Debug)]
pub struct VisitedSet {
    stamps: Vec<u16>,
    epoch: u16,
}

impl VisitedSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            stamps: vec![0; capacity],
            epoch: 1,
        }
    }

    /// Forget every visit.
    pub fn reset(&mut self) {
        match self.epoch.checked_add(1) {
            Some(next) => self.epoch = next,
            None => {
                self.stamps.fill(0);
                self.epoch = 1;
            }
        }
    }

    /// Grow to cover handles `0..len`. Existing stamps are kept.
    pub fn grow_to(&mut self, len: usize) {
        if len > self.stamps.len() {
            self.stamps.resize(len, 0);
        }
    }

    /// Number of handles this set can track.
    pub fn capacity(&self) -> usize {
        self.stamps.len()
    }

    /// Record a visit. Returns `true` the first time `node` is seen since the last reset.
    #[inline]
    pub fn visit(&mut self, node: u32) -> bool {
        let slot = &mut self.stamps[node as usize];
        if *slot == self.epoch {
            return false;
        }
        *slot = self.epoch;
        true
    }
}

impl Default for VisitedSet {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_and_reset() {
        let mut seen = VisitedSet::new(8);
        assert!(seen.visit(3));
        assert!(!seen.visit(3));
        assert!(seen.visit(7));

        seen.reset();
        assert!(seen.visit(3));
        assert!(!seen.visit(3));
    }

    #[test]
    fn test_grow_keeps_marks() {
        let mut seen = VisitedSet::new(2);
        assert!(seen.visit(1));
        seen.grow_to(10);
        assert_eq!(seen.capacity(), 10);
        assert!(!seen.visit(1));
        assert!(seen.visit(9));
    }

    #[test]
    fn test_epoch_wraparound() {
        let mut seen = VisitedSet::new(4);
        // epoch starts at 1; after u16::MAX - 1 resets it sits at u16::MAX
        for _ in 0..(u16::MAX - 1) {
            seen.reset();
        }
        assert_eq!(seen.epoch, u16::MAX);
        seen.visit(2);

        // next reset overflows, wipes the stamps and restarts at 1
        seen.reset();
        assert_eq!(seen.epoch, 1);
        assert!(seen.visit(2));
    }
}
