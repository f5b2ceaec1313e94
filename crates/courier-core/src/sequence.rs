use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide monotonic counter for token events.
///
/// The first number issued is 1; the counter is never reset and is shared
/// across every concurrent run in the process, so numbers observed by any
/// single delivery stream are strictly increasing even when runs interleave.
/// Lifecycle: created once at process start, dropped at shutdown, never a
/// hidden module-level global.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    issued: AtomicU64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically issue the next sequence number.
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The last number issued so far (0 before the first token).
    pub fn last_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_at_one() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.last_issued(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.last_issued(), 2);
    }

    #[test]
    fn concurrent_increments_never_collide() {
        let counter = Arc::new(SequenceCounter::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            handles.push(std::thread::spawn(move || {
                (0..250).map(|_| counter.next()).collect::<Vec<u64>>()
            }));
        }

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        // Every thread observes its own numbers strictly increasing, and the
        // union is exactly 1..=2000 with no duplicates.
        all.sort_unstable();
        assert_eq!(all, (1..=2000).collect::<Vec<u64>>());
        assert_eq!(counter.last_issued(), 2000);
    }

    #[test]
    fn per_caller_sequences_strictly_increase() {
        let counter = SequenceCounter::new();
        let mut previous = 0;
        for _ in 0..100 {
            let n = counter.next();
            assert!(n > previous);
            previous = n;
        }
    }
}
