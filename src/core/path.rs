use serde::{Deserialize, Serialize};

use crate::core::geo::Coordinate;
use crate::error::PathError;

/// One waypoint of a route, annotated with the segment that leaves it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    /// Waypoint position
    pub location: Coordinate,

    /// Index of the directions step this waypoint came from
    #[serde(default)]
    pub step: usize,

    /// Metres to the next waypoint (unused on the last node)
    pub segment_distance: f64,

    /// Seconds to the next waypoint (unused on the last node)
    pub segment_duration: f64,
}

impl PathNode {
    pub fn new(location: Coordinate, segment_distance: f64, segment_duration: f64) -> Self {
        Self {
            location,
            step: 0,
            segment_distance,
            segment_duration,
        }
    }
}

/// An immutable, validated sequence of waypoints to play back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PathNode>", into = "Vec<PathNode>")]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    /// Validate and wrap a node list
    pub fn new(nodes: Vec<PathNode>) -> Result<Self, PathError> {
        for (index, node) in nodes.iter().enumerate() {
            if !node.location.is_finite() {
                return Err(PathError::InvalidCoordinate { index });
            }
            check_segment_value(index, "distance", node.segment_distance)?;
            check_segment_value(index, "duration", node.segment_duration)?;
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    pub fn first(&self) -> Option<&PathNode> {
        self.nodes.first()
    }

    pub fn last(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// Fewer than two nodes: nothing to traverse
    pub fn is_degenerate(&self) -> bool {
        self.nodes.len() < 2
    }

    /// Number of traversable segments
    pub fn segment_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Index of the node that starts the final segment
    pub fn last_traversable_index(&self) -> Option<usize> {
        self.nodes.len().checked_sub(2)
    }

    /// Start and end node of segment `index`
    pub fn segment(&self, index: usize) -> Option<(&PathNode, &PathNode)> {
        Some((self.nodes.get(index)?, self.nodes.get(index + 1)?))
    }

    /// Sum of traversable segment durations, in seconds
    pub fn total_duration(&self) -> f64 {
        self.traversable().map(|n| n.segment_duration).sum()
    }

    /// Sum of traversable segment distances, in metres
    pub fn total_distance(&self) -> f64 {
        self.traversable().map(|n| n.segment_distance).sum()
    }

    fn traversable(&self) -> impl Iterator<Item = &PathNode> {
        self.nodes.iter().take(self.segment_count())
    }
}

fn check_segment_value(index: usize, field: &'static str, value: f64) -> Result<(), PathError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PathError::InvalidSegment { index, field, value })
    }
}

impl TryFrom<Vec<PathNode>> for Path {
    type Error = PathError;

    fn try_from(nodes: Vec<PathNode>) -> Result<Self, Self::Error> {
        Path::new(nodes)
    }
}

impl From<Path> for Vec<PathNode> {
    fn from(path: Path) -> Self {
        path.nodes
    }
}
