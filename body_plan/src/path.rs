//! # Path
//!
//! This module defines the body path produced by the planner: an ordered
//! sequence of waypoints at cell centres, from the query start to the query
//! target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::map::{PlaneGrid, Vertex};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path defining the desired trajectory of the robot's body.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct BodyPath {
    pub points_m: Vec<Point2<f64>>,
}

/// A segment between two path points
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub struct PathSegment {
    /// The start point of the segment
    pub start_m: Point2<f64>,

    /// The target of the segment
    pub target_m: Point2<f64>,

    /// The length of the segment
    pub length_m: f64,

    /// The heading (angle to the +ve x axis) of the segment
    pub heading_rad: f64,

    /// Unit vector pointing in the direction of the segment
    pub direction: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BodyPath {
    /// Create a new empty path
    pub fn new_empty() -> Self {
        Self {
            points_m: Vec::new(),
        }
    }

    /// Build a path from a sequence of grid vertices, placing each waypoint at its cell
    /// centre.
    pub fn from_vertices(grid: &PlaneGrid, vertices: &[Vertex]) -> Self {
        Self {
            points_m: vertices.iter().map(|v| grid.vertex_to_coord(*v)).collect(),
        }
    }

    /// Returns the path segment connecting the target point and the previous point.
    ///
    /// If no segment exists (the target is the first point in the sequence or is beyond the
    /// end of the sequence) then `None` will be returned
    pub fn get_segment_to_target(&self, target_index: usize) -> Option<PathSegment> {
        // If the path is invalid (not enough points)
        if self.points_m.len() < 2 {
            return None;
        }

        // Catch invalid targets
        if target_index == 0 || target_index >= self.points_m.len() {
            return None;
        }

        let start_m = self.points_m[target_index - 1];
        let target_m = self.points_m[target_index];

        let diff = target_m - start_m;
        let length_m = diff.norm();

        Some(PathSegment {
            start_m,
            target_m,
            length_m,
            heading_rad: diff.y.atan2(diff.x),
            direction: diff / length_m,
        })
    }

    /// Return the length of the path in meters.
    ///
    /// If the path is empty (not enough points) then `None` is returned.
    pub fn get_length(&self) -> Option<f64> {
        // If the path is invalid (not enough points)
        if self.points_m.len() < 2 {
            return None;
        }

        let mut length_m = 0f64;

        for i in 1..self.points_m.len() {
            length_m += (self.points_m[i] - self.points_m[i - 1]).norm();
        }

        Some(length_m)
    }

    /// Get the number of points in the path
    pub fn get_num_points(&self) -> usize {
        self.points_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
