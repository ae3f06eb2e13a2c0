//! Spherical geometry helpers for route coordinates.
//!
//! All angles are degrees on the way in and out. Distances are metres on a
//! spherical earth.

use serde::{Deserialize, Serialize};

/// Mean earth radius used by the directions data, in metres
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Compare two coordinates after rounding both to `decimals` places
    pub fn matches(&self, other: &Coordinate, decimals: u32) -> bool {
        let factor = 10f64.powi(decimals as i32);
        (self.lat * factor).round() == (other.lat * factor).round()
            && (self.lng * factor).round() == (other.lng * factor).round()
    }
}

/// How positions between two waypoints are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Straight lerp in lat/lng space
    Linear,
    /// Along the great circle through both points
    #[default]
    GreatCircle,
}

/// Great-circle distance between two coordinates (haversine)
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    EARTH_RADIUS_M * angular_distance(a, b)
}

fn angular_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Initial bearing from `a` towards `b`, in degrees within [-180, 180)
///
/// Coincident points have no defined bearing and yield 0.
pub fn heading(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    wrap_degrees(y.atan2(x).to_degrees())
}

/// Position `fraction` of the way from `a` to `b`
pub fn interpolate(a: &Coordinate, b: &Coordinate, fraction: f64, mode: InterpolationMode) -> Coordinate {
    match mode {
        InterpolationMode::Linear => lerp(a, b, fraction),
        InterpolationMode::GreatCircle => slerp(a, b, fraction),
    }
}

fn lerp(a: &Coordinate, b: &Coordinate, fraction: f64) -> Coordinate {
    // Take the short way across the antimeridian
    let dlng = wrap_degrees(b.lng - a.lng);
    Coordinate {
        lat: a.lat + (b.lat - a.lat) * fraction,
        lng: wrap_degrees(a.lng + dlng * fraction),
    }
}

fn slerp(a: &Coordinate, b: &Coordinate, fraction: f64) -> Coordinate {
    let d = angular_distance(a, b);
    if d < 1e-12 {
        return *a;
    }

    let lat1 = a.lat.to_radians();
    let lng1 = a.lng.to_radians();
    let lat2 = b.lat.to_radians();
    let lng2 = b.lng.to_radians();

    let wa = ((1.0 - fraction) * d).sin() / d.sin();
    let wb = (fraction * d).sin() / d.sin();

    let x = wa * lat1.cos() * lng1.cos() + wb * lat2.cos() * lng2.cos();
    let y = wa * lat1.cos() * lng1.sin() + wb * lat2.cos() * lng2.sin();
    let z = wa * lat1.sin() + wb * lat2.sin();

    Coordinate {
        lat: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        lng: y.atan2(x).to_degrees(),
    }
}

/// Normalise an angle to [-180, 180)
fn wrap_degrees(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}
