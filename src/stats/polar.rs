// Polar range plot
// Farthest observed position per whole degree of bearing from the receiver

use crate::constants::POLAR_SLOTS;
use crate::geodesy::{bearing, distance, Coordinate};

/// Maps a bearing in degrees onto its slot index
///
/// Bearings are rounded to the nearest degree; 359.5 and above round to 360,
/// which is the same direction as 0.
#[inline]
pub fn slot_for(bearing_deg: f64) -> usize {
    let slot = bearing_deg.round() as usize;
    if slot >= POLAR_SLOTS {
        slot % POLAR_SLOTS
    } else {
        slot
    }
}

/// Exactly 360 slots, each holding the farthest position seen on that bearing
#[derive(Debug, Clone, PartialEq)]
pub struct PolarRange {
    slots: Vec<Coordinate>,
}

impl PolarRange {
    /// Every slot starts at the reference position (zero range)
    pub fn new(reference: Coordinate) -> Self {
        PolarRange {
            slots: vec![reference; POLAR_SLOTS],
        }
    }

    /// Rebuild from stored slots; `None` unless there are exactly 360
    pub fn from_slots(slots: Vec<Coordinate>) -> Option<Self> {
        if slots.len() == POLAR_SLOTS {
            Some(PolarRange { slots })
        } else {
            None
        }
    }

    /// Offer an observed position; it replaces its slot only when strictly
    /// farther from the reference. Returns the slot when replaced.
    pub fn offer(&mut self, reference: Coordinate, position: Coordinate) -> Option<usize> {
        let slot = slot_for(bearing(reference, position));
        let range = distance(reference, position);
        if range > distance(reference, self.slots[slot]) {
            self.slots[slot] = position;
            Some(slot)
        } else {
            None
        }
    }

    pub fn get(&self, slot: usize) -> Option<Coordinate> {
        self.slots.get(slot).copied()
    }

    pub fn slots(&self) -> &[Coordinate] {
        &self.slots
    }

    /// Range of every slot in km
    pub fn ranges(&self, reference: Coordinate) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().map(move |p| distance(reference, *p))
    }

    /// Farthest reach over all bearings in km
    pub fn max_range(&self, reference: Coordinate) -> f64 {
        self.ranges(reference).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: Coordinate = Coordinate::new(50.0, 16.0);

    #[test]
    fn test_slot_for_folds_360() {
        assert_eq!(slot_for(0.0), 0);
        assert_eq!(slot_for(0.4), 0);
        assert_eq!(slot_for(0.5), 1);
        assert_eq!(slot_for(359.4), 359);
        assert_eq!(slot_for(359.6), 0);
        assert_eq!(slot_for(359.9999), 0);
    }

    #[test]
    fn test_new_is_all_reference() {
        let polar = PolarRange::new(REF);
        assert_eq!(polar.slots().len(), POLAR_SLOTS);
        assert!(polar.slots().iter().all(|p| *p == REF));
        assert_eq!(polar.max_range(REF), 0.0);
    }

    #[test]
    fn test_offer_keeps_farthest() {
        let mut polar = PolarRange::new(REF);
        let near = Coordinate::new(50.5, 16.0);
        let far = Coordinate::new(51.0, 16.0);

        assert_eq!(polar.offer(REF, near), Some(0));
        assert_eq!(polar.offer(REF, far), Some(0));
        assert_eq!(polar.offer(REF, near), None);
        assert_eq!(polar.get(0), Some(far));

        let east = Coordinate::new(50.0, 17.0);
        assert_eq!(polar.offer(REF, east), Some(90));
        assert_eq!(polar.get(90), Some(east));
        assert!(polar.max_range(REF) > 100.0);
    }

    #[test]
    fn test_offer_reference_position_is_ignored() {
        let mut polar = PolarRange::new(REF);
        assert_eq!(polar.offer(REF, REF), None);
    }

    #[test]
    fn test_from_slots_requires_360() {
        assert!(PolarRange::from_slots(vec![REF; 359]).is_none());
        assert!(PolarRange::from_slots(vec![REF; 360]).is_some());
    }
}
