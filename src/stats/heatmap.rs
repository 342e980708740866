// Heat map
//
// Counts airborne position reports per 0.01 degree cell. A cell key is built by
// printing round(lat*100) and round(lon*100) back to back and reading the text
// as one integer, stopping at the first non-digit (so a negative longitude
// contributes nothing). Stored snapshots depend on this exact encoding.

use std::collections::BTreeMap;

use crate::geodesy::Coordinate;

/// Legacy cell key of a position
pub fn cell_key(position: Coordinate) -> i32 {
    let lat100 = (position.lat * 100.0).round() as i32;
    let lon100 = (position.lon * 100.0).round() as i32;
    leading_int(&format!("{}{}", lat100, lon100))
}

/// Longest leading signed integer of `s`, 0 when there is none
fn leading_int(s: &str) -> i32 {
    let bytes = s.as_bytes();
    let (negative, start) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    // at most 4 latitude and 5 longitude digits, always fits
    let mut value: i64 = 0;
    for b in bytes[start..].iter().take_while(|b| b.is_ascii_digit()) {
        value = value * 10 + i64::from(b - b'0');
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Approximate cell centre of a key
///
/// The encoding does not record where latitude ends, so the first four digits
/// (after an optional sign) are read as latitude and the rest as longitude.
/// Exact for latitudes of 10 to 90 degrees and non-negative longitudes.
pub fn cell_position(key: i32) -> Coordinate {
    let text = key.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.as_str()),
    };
    let split = digits.len().min(4);
    let lat100: f64 = digits[..split].parse().unwrap_or(0.0);
    let lon100: f64 = digits[split..].parse().unwrap_or(0.0);
    Coordinate::new(sign * lat100 / 100.0, lon100 / 100.0)
}

/// Cell key to report count; every stored count is at least 1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeatMap {
    cells: BTreeMap<i32, u64>,
}

impl HeatMap {
    pub fn new() -> Self {
        HeatMap { cells: BTreeMap::new() }
    }

    /// Count one report at `position`; returns the cell key
    pub fn record(&mut self, position: Coordinate) -> i32 {
        let key = cell_key(position);
        *self.cells.entry(key).or_insert(0) += 1;
        key
    }

    /// Set a cell directly (snapshot restore); zero counts are not stored
    pub fn insert(&mut self, key: i32, count: u64) {
        if count > 0 {
            self.cells.insert(key, count);
        }
    }

    pub fn get(&self, key: i32) -> Option<u64> {
        self.cells.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (i32, u64)> + '_ {
        self.cells.iter().map(|(k, v)| (*k, *v))
    }
}
