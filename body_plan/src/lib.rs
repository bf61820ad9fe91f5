//! # Body Path Planner
//!
//! This library plans minimum cost 2D body paths for a legged robot over
//! sparsely sensed terrain. A terrain source fills a sparse per-cell cost
//! map once per planning cycle; the planner builds a directed weighted
//! adjacency graph over the mapped cells (weighting edges either by raw
//! terrain cost or by the robot's full rotated-footprint stance cost),
//! searches it with A*, and extracts the waypoint sequence.
//!
//! Dynamics, model loading, messaging and frame transforms are the
//! surrounding system's concern; this crate is consumed as a library and
//! only ever borrows the terrain snapshot it plans over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Adjacency graph construction - turns a terrain cost map into the searched graph
pub mod adjacency;

/// Map module - grid geometry and the sparse terrain cost map
pub mod map;

/// Defines the body path type produced by the planner
pub mod path;

/// Planner module - the full validate/build/search/extract pipeline
pub mod planner;

/// Robot stance model - the footprint the stance cost model evaluates
pub mod robot;

/// Solver module - A* search over the adjacency graph
pub mod solver;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use planner::{BodyPlanner, BodyPlannerParams, PlanError, PlanQuery, PlannedPath};
