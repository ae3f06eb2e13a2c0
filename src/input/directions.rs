//! Directions results as returned by a routing service, and conversion of
//! them into a playback [`Path`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::geo::{self, Coordinate};
use crate::core::{Path, PathNode};
use crate::error::RouteError;

/// A distance or duration annotation (`value` in metres or seconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsStep {
    pub distance: Measure,
    pub duration: Measure,
    /// Coordinates of the step's rendered line
    pub path: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsLeg {
    #[serde(default)]
    pub distance: Measure,
    #[serde(default)]
    pub duration: Measure,
    pub steps: Vec<DirectionsStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRoute {
    pub legs: Vec<DirectionsLeg>,
}

impl DirectionsRoute {
    /// Travel time the directions service quoted for the whole route
    pub fn required_travel_time(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResult {
    pub routes: Vec<DirectionsRoute>,
}

/// Build the playback path from the first route of a directions result
///
/// Every coordinate of every step becomes a node. Its segment distance is
/// the distance to the next coordinate in the same step (0 for the step's
/// last coordinate, which the next step repeats as its first), and its
/// duration is that distance's share of the step's duration.
pub fn build_path(directions: &DirectionsResult) -> Result<Path, RouteError> {
    let route = directions.routes.first().ok_or(RouteError::NoRoutes)?;
    let mut nodes = Vec::new();

    for (leg_index, leg) in route.legs.iter().enumerate() {
        for (step_index, step) in leg.steps.iter().enumerate() {
            if step.path.is_empty() {
                return Err(RouteError::EmptyStep {
                    leg: leg_index,
                    step: step_index,
                });
            }

            for (k, coord) in step.path.iter().enumerate() {
                let distance = step.path.get(k + 1).map(|next| geo::distance(coord, next)).unwrap_or(0.0);
                let duration = if step.distance.value > 0.0 {
                    step.duration.value * distance / step.distance.value
                } else {
                    0.0
                };

                nodes.push(PathNode {
                    location: *coord,
                    step: step_index,
                    segment_distance: distance,
                    segment_duration: duration,
                });
            }
        }
    }

    let path = Path::new(nodes)?;
    debug!(
        "Built path of {} nodes from {} legs: {:.0}s of segments, {:.0}s quoted",
        path.len(),
        route.legs.len(),
        path.total_duration(),
        route.required_travel_time()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(distance: f64, duration: f64, path: Vec<Coordinate>) -> DirectionsStep {
        DirectionsStep {
            distance: Measure { value: distance },
            duration: Measure { value: duration },
            path,
        }
    }

    #[test]
    fn test_build_path_proportional_durations() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.001);
        let c = Coordinate::new(0.0, 0.003);
        let d_ab = geo::distance(&a, &b);
        let d_bc = geo::distance(&b, &c);
        let step_distance = d_ab + d_bc;

        let directions = DirectionsResult {
            routes: vec![DirectionsRoute {
                legs: vec![DirectionsLeg {
                    distance: Measure { value: step_distance },
                    duration: Measure { value: 30.0 },
                    steps: vec![step(step_distance, 30.0, vec![a, b, c])],
                }],
            }],
        };

        let path = build_path(&directions).unwrap();
        assert_eq!(path.len(), 3);
        assert!((path.nodes()[0].segment_duration - 10.0).abs() < 1e-6);
        assert!((path.nodes()[1].segment_duration - 20.0).abs() < 1e-6);
        assert_eq!(path.nodes()[2].segment_distance, 0.0);
        assert_eq!(path.nodes()[2].segment_duration, 0.0);
        assert!((path.total_duration() - 30.0).abs() < 1e-6);
        assert_eq!(directions.routes[0].required_travel_time(), 30.0);
    }

    #[test]
    fn test_step_joins_have_zero_duration() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.001);
        let c = Coordinate::new(0.001, 0.001);
        let directions = DirectionsResult {
            routes: vec![DirectionsRoute {
                legs: vec![DirectionsLeg {
                    distance: Measure::default(),
                    duration: Measure::default(),
                    steps: vec![
                        step(geo::distance(&a, &b), 5.0, vec![a, b]),
                        step(geo::distance(&b, &c), 7.0, vec![b, c]),
                    ],
                }],
            }],
        };

        let path = build_path(&directions).unwrap();
        let steps: Vec<usize> = path.nodes().iter().map(|n| n.step).collect();
        assert_eq!(steps, vec![0, 0, 1, 1]);
        // b is repeated: the join segment is free
        assert_eq!(path.nodes()[1].segment_duration, 0.0);
        assert!((path.total_duration() - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_distance_step() {
        let a = Coordinate::new(1.0, 1.0);
        let directions = DirectionsResult {
            routes: vec![DirectionsRoute {
                legs: vec![DirectionsLeg {
                    distance: Measure::default(),
                    duration: Measure::default(),
                    steps: vec![step(0.0, 12.0, vec![a, a])],
                }],
            }],
        };
        let path = build_path(&directions).unwrap();
        assert_eq!(path.total_duration(), 0.0);
    }

    #[test]
    fn test_errors() {
        let empty = DirectionsResult { routes: vec![] };
        assert!(matches!(build_path(&empty), Err(RouteError::NoRoutes)));

        let hollow = DirectionsResult {
            routes: vec![DirectionsRoute {
                legs: vec![DirectionsLeg {
                    distance: Measure::default(),
                    duration: Measure::default(),
                    steps: vec![step(1.0, 1.0, vec![])],
                }],
            }],
        };
        assert!(matches!(build_path(&hollow), Err(RouteError::EmptyStep { leg: 0, step: 0 })));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "routes": [{
                "legs": [{
                    "duration": {"value": 60},
                    "steps": [{
                        "distance": {"value": 100},
                        "duration": {"value": 60},
                        "path": [{"lat": 51.5, "lng": -0.12}, {"lat": 51.501, "lng": -0.12}]
                    }]
                }]
            }]
        }"#;
        let directions: DirectionsResult = serde_json::from_str(json).unwrap();
        assert_eq!(directions.routes[0].required_travel_time(), 60.0);
        assert_eq!(build_path(&directions).unwrap().len(), 2);
    }
}
