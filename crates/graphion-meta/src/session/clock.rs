//! Session id generation.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use graphion_protocol::SessionId;

/// Generates session ids from the microsecond wall clock.
///
/// Ids are strictly increasing process-wide: when two calls land in the
/// same microsecond (or the clock steps backward), the later call gets the
/// previous id plus one. The id therefore doubles as the session's
/// creation timestamp.
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    last: AtomicI64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique session id.
    pub fn next_id(&self) -> SessionId {
        let now = wall_clock_micros();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

fn wall_clock_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_strictly_increase() {
        let clock = SessionIdGenerator::new();
        let mut prev = clock.next_id();
        for _ in 0..1000 {
            let id = clock.next_id();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn test_concurrent_ids_distinct() {
        let clock = Arc::new(SessionIdGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let clock = clock.clone();
            handles.push(std::thread::spawn(move || {
                (0..500).map(|_| clock.next_id()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate session id {}", id);
            }
        }
        assert_eq!(seen.len(), 8 * 500);
    }

    #[test]
    fn test_ids_track_wall_clock() {
        let clock = SessionIdGenerator::new();
        let before = wall_clock_micros();
        let id = clock.next_id();
        assert!(id >= before);
    }
}
