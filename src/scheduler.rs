// Flush scheduler
//
// Decides after each message whether the snapshot is due. A flush fires when
// the seconds since start are a whole number of minutes, at most once per
// wall clock minute.

use crate::constants::FLUSH_PERIOD_SECS;

/// Current wall clock time in seconds since epoch
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, Default)]
pub struct FlushScheduler {
    /// Minute (now / 60) of the last flush; `None` before the first one
    last_flush_minute: Option<i64>,
}

impl FlushScheduler {
    pub fn new() -> Self {
        FlushScheduler { last_flush_minute: None }
    }

    /// True when a flush is due at `now`; marks the minute as flushed
    pub fn poll(&mut self, now: i64, uptime: i64) -> bool {
        let minute = now.div_euclid(FLUSH_PERIOD_SECS);
        let aligned = (now - uptime).rem_euclid(FLUSH_PERIOD_SECS) == 0;
        if aligned && self.last_flush_minute != Some(minute) {
            self.last_flush_minute = Some(minute);
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn last_flush_minute(&self) -> Option<i64> {
        self.last_flush_minute
    }
}
