use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Per-book source of strictly increasing nanosecond timestamps.
///
/// Wall-clock time can stall or repeat at nanosecond resolution; resting
/// orders rely on `ts` for FIFO tie-breaks, so ties advance the last value
/// by one instead.
pub struct MonotonicClock {
    last: u64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    pub fn now_ns(&mut self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        self.last = if wall > self.last {
            wall
        } else {
            self.last + 1
        };
        self.last
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn next_trade_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_strictly_increase() {
        let mut clock = MonotonicClock::new();
        let mut last = 0;
        for _ in 0..10_000 {
            let ts = clock.now_ns();
            assert!(ts > last);
            last = ts;
        }
    }

    #[test]
    fn trade_ids_are_unique() {
        let a = next_trade_id();
        let b = next_trade_id();
        assert_ne!(a, b);
    }
}
