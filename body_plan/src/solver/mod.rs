//! # Solver
//!
//! Best-first graph search over an
//! [`AdjacencyGraph`](crate::adjacency::AdjacencyGraph), plus extraction of
//! the waypoint sequence from the search's predecessor map.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`AStarSolver`]
mod a_star;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use a_star::{extract_vertex_path, AStarSolver, Heuristic, Search, SolverParams};
