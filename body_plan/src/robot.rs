//! # Robot Stance Model
//!
//! Describes the robot's support footprint as a fixed ordered set of
//! rectangular stance areas, one per foot workspace, defined in the body
//! frame. The areas are orientation-independent; rotation is applied at
//! stance-cost evaluation time.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Rectangular stance area in the body frame, relative to a candidate body position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StanceArea {
    pub min_x_m: f64,
    pub min_y_m: f64,
    pub max_x_m: f64,
    pub max_y_m: f64,

    /// Sampling resolution used when evaluating terrain inside this area.
    pub resolution_m: f64,
}

/// The robot's fixed collection of stance areas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StanceModel {
    pub stance_areas: Vec<StanceArea>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StanceArea {
    /// Create a new stance area from its body-frame bounds.
    pub fn new(min_x_m: f64, min_y_m: f64, max_x_m: f64, max_y_m: f64, resolution_m: f64) -> Self {
        Self {
            min_x_m,
            min_y_m,
            max_x_m,
            max_y_m,
            resolution_m,
        }
    }
}

impl StanceModel {
    /// Number of stance areas in the model.
    pub fn num_areas(&self) -> usize {
        self.stance_areas.len()
    }

    /// True if the model has no stance areas.
    pub fn is_empty(&self) -> bool {
        self.stance_areas.is_empty()
    }
}

impl Default for StanceModel {
    /// Symmetric quadruped footprint: one foot workspace per corner of the body.
    fn default() -> Self {
        const RES_M: f64 = 0.04;

        Self {
            stance_areas: vec![
                // Front left
                StanceArea::new(0.30, 0.15, 0.50, 0.35, RES_M),
                // Front right
                StanceArea::new(0.30, -0.35, 0.50, -0.15, RES_M),
                // Hind left
                StanceArea::new(-0.50, 0.15, -0.30, 0.35, RES_M),
                // Hind right
                StanceArea::new(-0.50, -0.35, -0.30, -0.15, RES_M),
            ],
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
