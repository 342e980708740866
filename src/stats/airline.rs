// Airline counts
// Flights per ICAO airline designator, taken from the callsign prefix

use std::collections::BTreeMap;

/// ICAO airline designator of a callsign
///
/// Three uppercase ASCII letters followed by a digit, e.g. "RYR" of "RYR123".
/// Registrations such as "N12345" or "OKABC" have none.
pub fn airline_prefix(callsign: &str) -> Option<&str> {
    let b = callsign.as_bytes();
    if b.len() < 4 {
        return None;
    }
    if b[..3].iter().all(u8::is_ascii_uppercase) && b[3].is_ascii_digit() {
        Some(&callsign[..3])
    } else {
        None
    }
}

/// True for keys the snapshot and charts accept: three uppercase ASCII letters
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() == 3 && prefix.bytes().all(|b| b.is_ascii_uppercase())
}

/// Prefix to flight count; every stored count is at least 1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirlineCounts {
    counts: BTreeMap<String, u64>,
}

impl AirlineCounts {
    pub fn new() -> Self {
        AirlineCounts { counts: BTreeMap::new() }
    }

    /// Count one flight of the airline
    pub fn increment(&mut self, prefix: &str) {
        *self.counts.entry(prefix.to_string()).or_insert(0) += 1;
    }

    /// Set a count directly (snapshot restore); zero counts are not stored
    pub fn insert(&mut self, prefix: impl Into<String>, count: u64) {
        if count > 0 {
            self.counts.insert(prefix.into(), count);
        }
    }

    pub fn get(&self, prefix: &str) -> Option<u64> {
        self.counts.get(prefix).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Airlines in prefix order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
