//! # Map
//!
//! This module implements the planning grid geometry and the sparse
//! [`TerrainCostMap`] the planner searches over. The grid follows the
//! plane-grid convention of a fixed cell resolution with cells addressed
//! either by integer key or by flat vertex identifier.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Grid geometry: coordinates, keys and vertices
mod grid;

/// Implements the [`TerrainCostMap`] type
mod terrain_cost_map;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use grid::{Key, PlaneGrid, Vertex};
pub use terrain_cost_map::TerrainCostMap;
