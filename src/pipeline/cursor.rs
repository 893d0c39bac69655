//! Shared claim counters for dynamic work partitioning
//!
//! Every phase owns one cursor. Workers call [`PhaseCursor::claim_next`] in a
//! loop and process the returned index while it is below the phase bound, so
//! faster workers naturally take more units. No coordinator thread is needed.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Monotonic work index for one phase
#[derive(Debug, Default)]
pub struct PhaseCursor {
    next: AtomicUsize,
}

impl PhaseCursor {
    /// Create a cursor starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next unit of work, returning the pre-increment index.
    ///
    /// Never blocks. Indices past the bound are still handed out; callers
    /// stop as soon as they see one.
    pub fn claim_next(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Claim the next index if it is below `bound`
    pub fn claim_below(&self, bound: usize) -> Option<usize> {
        let idx = self.claim_next();
        (idx < bound).then_some(idx)
    }

    /// Units handed out so far, capped at `bound` (for progress display)
    pub fn claimed(&self, bound: usize) -> usize {
        self.next.load(Ordering::Relaxed).min(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_claim_next_is_sequential() {
        let cursor = PhaseCursor::new();
        assert_eq!(cursor.claim_next(), 0);
        assert_eq!(cursor.claim_next(), 1);
        assert_eq!(cursor.claim_next(), 2);
    }

    #[test]
    fn test_claim_below_stops_at_bound() {
        let cursor = PhaseCursor::new();
        assert_eq!(cursor.claim_below(2), Some(0));
        assert_eq!(cursor.claim_below(2), Some(1));
        assert_eq!(cursor.claim_below(2), None);
        assert_eq!(cursor.claimed(2), 2);
    }

    #[test]
    fn test_concurrent_claims_are_disjoint() {
        let cursor = Arc::new(PhaseCursor::new());
        let bound = 10_000;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cursor = Arc::clone(&cursor);
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(idx) = cursor.claim_below(bound) {
                        mine.push(idx);
                    }
                    mine
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for idx in handle.join().unwrap() {
                assert!(seen.insert(idx), "index {} claimed twice", idx);
            }
        }
        assert_eq!(seen.len(), bound);
    }
}
