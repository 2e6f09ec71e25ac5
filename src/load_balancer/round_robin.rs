//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::LoadBalancer;

/// Round-robin selector.
/// Owns the cursor and advances it one slot per selection, wrapping at `len`.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_index(&self, len: usize) -> usize {
        debug_assert!(len > 0, "round robin over an empty pool");

        // Read, compute and advance as one CAS step. A loser re-reads the
        // winner's value, so no two callers share a pre-advance cursor.
        let mut current = self.cursor.load(Ordering::Acquire);
        loop {
            let index = current % len;
            let next = (index + 1) % len;
            match self.cursor.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return index,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Barrier;

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();

        assert_eq!(lb.next_index(3), 0);
        assert_eq!(lb.next_index(3), 1);
        assert_eq!(lb.next_index(3), 2);
        assert_eq!(lb.next_index(3), 0);
    }

    #[test]
    fn single_backend_always_selected() {
        let lb = RoundRobin::new();
        for _ in 0..5 {
            assert_eq!(lb.next_index(1), 0);
        }
    }

    #[test]
    fn first_cycle_never_repeats() {
        let lb = RoundRobin::new();
        let seen: HashSet<usize> = (0..7).map(|_| lb.next_index(7)).collect();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn contended_turns_form_complete_cycles() {
        const LEN: usize = 4;
        const THREADS: usize = 8;
        const PER_THREAD: usize = 500;

        let lb = RoundRobin::new();
        let start = Barrier::new(THREADS);

        let mut counts = [0usize; LEN];
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        start.wait();
                        (0..PER_THREAD)
                            .map(|_| lb.next_index(LEN))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                for index in handle.join().unwrap() {
                    counts[index] += 1;
                }
            }
        });

        // A lost or doubled advance would skew the counts or the final cursor.
        assert_eq!(counts, [THREADS * PER_THREAD / LEN; LEN]);
        assert_eq!(lb.next_index(LEN), 0);
    }
}
