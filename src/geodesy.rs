// Geodesy module - spherical earth helpers
//
// Provides:
// - degree/radian conversion
// - haversine great-circle distance in km
// - forward azimuth on the rhumb line (Mercator dPhi)
// - nautical mile / kilometre conversion
//
// Positions are decimal degrees on a sphere of radius EARTH_RADIUS_KM.

use std::f64::consts::PI;
use std::fmt;

use crate::constants::{EARTH_RADIUS_KM, NM_PER_KM};

/// A position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// True when both axes are finite and within lat [-90, 90], lon [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

#[inline]
pub fn to_degrees(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

/// Nautical miles to kilometres
#[inline]
pub fn to_km(nm: f64) -> f64 {
    nm / NM_PER_KM
}

/// Kilometres to nautical miles
#[inline]
pub fn to_nm(km: f64) -> f64 {
    km * NM_PER_KM
}

/// Returns great-circle distance in km between two positions (haversine)
///
/// Symmetric in its arguments; the distance of a point to itself is exactly zero.
/// NaN in either position yields NaN.
///
/// # Example
/// ```
/// use adsb_stats::geodesy::{distance, Coordinate};
/// let d = distance(Coordinate::new(51.5074, -0.1278), Coordinate::new(48.8566, 2.3522));
/// assert!((d - 344.0).abs() < 5.0);
/// ```
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = to_radians(a.lat);
    let lat_b = to_radians(b.lat);
    let dlat = lat_a - lat_b;
    let dlon = to_radians(a.lon) - to_radians(b.lon);

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns the forward azimuth from `from` to `to` in degrees, in [0, 360)
///
/// Uses the rhumb-line formulation: dPhi is the difference of Mercator
/// latitudes and the longitude difference is folded into (-pi, pi].
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let mut dlon = to_radians(to.lon) - to_radians(from.lon);
    let dphi = ((to_radians(to.lat) / 2.0 + PI / 4.0).tan()
        / (to_radians(from.lat) / 2.0 + PI / 4.0).tan())
    .ln();

    if dlon.abs() > PI {
        if dlon > 0.0 {
            dlon -= 2.0 * PI;
        } else {
            dlon += 2.0 * PI;
        }
    }

    let deg = (to_degrees(dlon.atan2(dphi)) + 360.0) % 360.0;
    // (-tiny + 360) % 360 rounds to exactly 360.0 in f64
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_radian_conversion_roundtrip() {
        for d in [-180.0, -45.5, 0.0, 16.1, 90.0, 359.9] {
            assert!((to_degrees(to_radians(d)) - d).abs() < EPSILON);
        }
        assert!((to_radians(180.0) - PI).abs() < EPSILON);
    }

    #[test]
    fn test_distance_london_paris() {
        let d = distance(Coordinate::new(51.5074, -0.1278), Coordinate::new(48.8566, 2.3522));
        // ~344 km on this sphere
        assert!((d - 344.0).abs() < 5.0, "Distance: {} km", d);
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        let p = Coordinate::new(50.0, 16.0);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            (Coordinate::new(50.0, 16.0), Coordinate::new(50.1, 16.1)),
            (Coordinate::new(-33.9, 18.4), Coordinate::new(35.7, 139.7)),
            (Coordinate::new(10.0, 179.5), Coordinate::new(10.0, -179.5)),
        ];
        for (a, b) in pairs {
            let d1 = distance(a, b);
            let d2 = distance(b, a);
            assert!(d1 > 0.0);
            assert!((d1 - d2).abs() < EPSILON, "{} vs {}", d1, d2);
        }
    }

    #[test]
    fn test_distance_nan_propagates() {
        let d = distance(Coordinate::new(f64::NAN, 16.0), Coordinate::new(50.0, 16.0));
        assert!(d.is_nan());
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(50.0, 16.0);
        let north = bearing(origin, Coordinate::new(51.0, 16.0));
        let east = bearing(origin, Coordinate::new(50.0, 17.0));
        let south = bearing(origin, Coordinate::new(49.0, 16.0));
        let west = bearing(origin, Coordinate::new(50.0, 15.0));

        assert!(north.abs() < EPSILON, "north: {}", north);
        assert!((east - 90.0).abs() < EPSILON, "east: {}", east);
        assert!((south - 180.0).abs() < EPSILON, "south: {}", south);
        assert!((west - 270.0).abs() < EPSILON, "west: {}", west);
    }

    #[test]
    fn test_bearing_range() {
        let origin = Coordinate::new(50.0, 16.0);
        for i in 0..72 {
            let angle = to_radians(i as f64 * 5.0);
            let p = Coordinate::new(50.0 + angle.cos(), 16.0 + angle.sin());
            let b = bearing(origin, p);
            assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
        }
    }

    #[test]
    fn test_bearing_across_antimeridian() {
        // Going east across 180 is a short hop east, not a trip west
        let b = bearing(Coordinate::new(0.0, 179.5), Coordinate::new(0.0, -179.5));
        assert!((b - 90.0).abs() < EPSILON, "bearing: {}", b);

        let b = bearing(Coordinate::new(0.0, -179.5), Coordinate::new(0.0, 179.5));
        assert!((b - 270.0).abs() < EPSILON, "bearing: {}", b);
    }

    #[test]
    fn test_bearing_nan_does_not_panic() {
        assert!(bearing(Coordinate::new(50.0, 16.0), Coordinate::new(f64::NAN, 16.0)).is_nan());
    }

    #[test]
    fn test_nm_km_conversion() {
        assert!((to_km(0.53996) - 1.0).abs() < EPSILON);
        assert!((to_nm(1.0) - 0.53996).abs() < EPSILON);
        assert!((to_nm(to_km(250.0)) - 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(50.0, 16.0).is_valid());
        assert!(!Coordinate::new(91.0, 16.0).is_valid());
        assert!(!Coordinate::new(50.0, f64::INFINITY).is_valid());
    }
}
