use serde::Serialize;

use crate::core::geo::{self, Coordinate, InterpolationMode};
use crate::core::{Path, PathNode};

/// Where the model sits and which way it faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub location: Coordinate,
    pub heading: f64,
}

/// Position `fraction` of the way along the segment `a -> b`.
///
/// The heading is the bearing between the two segment endpoints, so it is
/// the same for every fraction within one segment.
pub fn interpolate(a: &PathNode, b: &PathNode, fraction: f64, mode: InterpolationMode) -> Pose {
    let fraction = fraction.clamp(0.0, 1.0);
    Pose {
        location: geo::interpolate(&a.location, &b.location, fraction, mode),
        heading: geo::heading(&a.location, &b.location),
    }
}

/// Heading the model faces before any motion happens
pub fn initial_heading(path: &Path) -> f64 {
    match path.segment(0) {
        Some((a, b)) => geo::heading(&a.location, &b.location),
        None => 0.0,
    }
}
