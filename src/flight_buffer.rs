// Flight dedup buffer
//
// Remembers which (ICAO24, callsign) pairs were seen recently so that one flight
// counts once towards its airline. Lookups ignore timestamps; stale entries keep
// suppressing until the next eviction pass.

/// Last appearance of an (ICAO24, callsign) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightStamp {
    pub icao24: String,
    pub callsign: String,
    /// Seconds since epoch
    pub timestamp: i64,
}

impl FlightStamp {
    pub fn new(icao24: impl Into<String>, callsign: impl Into<String>, timestamp: i64) -> Self {
        FlightStamp {
            icao24: icao24.into(),
            callsign: callsign.into(),
            timestamp,
        }
    }
}

/// Unkeyed list of flight stamps with linear lookup
#[derive(Debug, Clone, Default)]
pub struct FlightBuffer {
    entries: Vec<FlightStamp>,
}

impl FlightBuffer {
    pub fn new() -> Self {
        FlightBuffer { entries: Vec::new() }
    }

    /// True if the pair is buffered, whatever its age
    pub fn contains(&self, icao24: &str, callsign: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.icao24 == icao24 && e.callsign == callsign)
    }

    /// Append unconditionally; callers gate on `contains`
    pub fn insert(&mut self, stamp: FlightStamp) {
        self.entries.push(stamp);
    }

    /// Remove every entry older than `ttl` seconds at `now`; returns how many went
    pub fn evict(&mut self, now: i64, ttl: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| now - e.timestamp <= ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlightStamp> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLIGHT_BUFFER_TTL_SECS;

    #[test]
    fn test_contains_after_insert() {
        let mut buf = FlightBuffer::new();
        assert!(!buf.contains("ABCDEF", "RYR123"));

        buf.insert(FlightStamp::new("ABCDEF", "RYR123", 1000));
        assert!(buf.contains("ABCDEF", "RYR123"));
        assert!(!buf.contains("ABCDEF", "RYR124"));
        assert!(!buf.contains("ABCDE0", "RYR123"));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_contains_ignores_age() {
        let mut buf = FlightBuffer::new();
        buf.insert(FlightStamp::new("ABCDEF", "RYR123", 0));
        // long past the TTL but not evicted yet
        assert!(buf.contains("ABCDEF", "RYR123"));
    }

    #[test]
    fn test_evict_removes_only_stale_entries() {
        let mut buf = FlightBuffer::new();
        buf.insert(FlightStamp::new("AAAAAA", "DLH1", 0));
        buf.insert(FlightStamp::new("BBBBBB", "DLH2", 1000));
        buf.insert(FlightStamp::new("CCCCCC", "DLH3", 2000));
        buf.insert(FlightStamp::new("DDDDDD", "DLH4", 200));

        let now = 2000;
        let removed = buf.evict(now, FLIGHT_BUFFER_TTL_SECS);
        // 2000 - 200 == 1800 is still within the window
        assert_eq!(removed, 1);
        assert_eq!(buf.len(), 3);
        assert!(!buf.contains("AAAAAA", "DLH1"));
        assert!(buf.contains("DDDDDD", "DLH4"));
        assert!(buf.iter().all(|e| now - e.timestamp <= FLIGHT_BUFFER_TTL_SECS));
    }

    #[test]
    fn test_evict_removes_consecutive_stale_entries() {
        let mut buf = FlightBuffer::new();
        for i in 0..5 {
            buf.insert(FlightStamp::new(format!("00000{}", i), "EZY1", 0));
        }
        buf.insert(FlightStamp::new("FFFFFF", "EZY2", 5000));

        assert_eq!(buf.evict(5000, FLIGHT_BUFFER_TTL_SECS), 5);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.evict(5000, FLIGHT_BUFFER_TTL_SECS), 0);
    }
}
