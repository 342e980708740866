// Altitude histogram
// Position reports per flight level, FL000 to FL500

use crate::constants::{ALTITUDE_BUCKETS, MAX_FLIGHT_LEVEL};

/// Flight level of a barometric altitude in feet (truncating division)
///
/// `None` outside FL000..=FL500. Altitudes of -99..=99 ft all map to FL000.
#[inline]
pub fn flight_level(altitude_ft: i32) -> Option<usize> {
    let fl = altitude_ft / 100;
    if fl < 0 || fl as usize > MAX_FLIGHT_LEVEL {
        None
    } else {
        Some(fl as usize)
    }
}

/// Exactly 501 buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltitudeHistogram {
    buckets: Vec<u64>,
}

impl Default for AltitudeHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl AltitudeHistogram {
    pub fn new() -> Self {
        AltitudeHistogram {
            buckets: vec![0; ALTITUDE_BUCKETS],
        }
    }

    /// `None` unless there are exactly 501 buckets
    pub fn from_buckets(buckets: Vec<u64>) -> Option<Self> {
        if buckets.len() == ALTITUDE_BUCKETS {
            Some(AltitudeHistogram { buckets })
        } else {
            None
        }
    }

    /// Count one report; returns its flight level, or `None` when dropped
    pub fn record(&mut self, altitude_ft: i32) -> Option<usize> {
        let fl = flight_level(altitude_ft)?;
        self.buckets[fl] += 1;
        Some(fl)
    }

    pub fn get(&self, fl: usize) -> Option<u64> {
        self.buckets.get(fl).copied()
    }

    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_level() {
        assert_eq!(flight_level(38000), Some(380));
        assert_eq!(flight_level(38099), Some(380));
        assert_eq!(flight_level(0), Some(0));
        assert_eq!(flight_level(-50), Some(0));
        assert_eq!(flight_level(50099), Some(500));
        assert_eq!(flight_level(50100), None);
        assert_eq!(flight_level(60000), None);
        assert_eq!(flight_level(-300), None);
    }

    #[test]
    fn test_record() {
        let mut hist = AltitudeHistogram::new();
        assert_eq!(hist.buckets().len(), ALTITUDE_BUCKETS);

        assert_eq!(hist.record(38000), Some(380));
        assert_eq!(hist.record(38050), Some(380));
        assert_eq!(hist.record(60000), None);
        assert_eq!(hist.record(-1200), None);

        assert_eq!(hist.get(380), Some(2));
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn test_from_buckets_requires_501() {
        assert!(AltitudeHistogram::from_buckets(vec![0; 500]).is_none());
        assert!(AltitudeHistogram::from_buckets(vec![0; 501]).is_some());
    }
}
