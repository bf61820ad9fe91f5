//! # Adjacency
//!
//! This module turns a [`TerrainCostMap`](crate::map::TerrainCostMap) into
//! the directed weighted graph the solver searches. The graph is rebuilt
//! for every query since edge weights depend on the query orientation.
//!
//! Alternative cost models are interchangeable behind the
//! [`AdjacencyModel`] trait, so the solver never knows whether weights came
//! from raw terrain costs or from full stance evaluation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::map::{TerrainCostMap, Vertex};
use crate::planner::PlanError;

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`GridBodyAdjacency`] builder
mod grid_body;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use grid_body::{AdjacencyParams, CostModel, GridBodyAdjacency};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A weighted directed connection to a target vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub target: Vertex,
    pub weight: f64,
}

/// Directed weighted graph over terrain vertices, built fresh per query.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    edges: HashMap<Vertex, Vec<Edge>>,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capability interface of an adjacency builder.
///
/// Implementations must keep [`AdjacencyModel::successors`] consistent with
/// [`AdjacencyModel::build_graph`]: an edge reported for a vertex by one must be producible by
/// the other.
pub trait AdjacencyModel {
    /// Build the full adjacency graph for a query between `source` and `target` at the given
    /// body orientation, bridging unmapped endpoints onto the nearest mapped vertices.
    fn build_graph(
        &self,
        map: &TerrainCostMap,
        source: Vertex,
        target: Vertex,
        yaw_rad: f64,
    ) -> Result<AdjacencyGraph, PlanError>;

    /// On-demand expansion of a single vertex, for callers that don't want a whole-map build.
    fn successors(
        &self,
        map: &TerrainCostMap,
        vertex: Vertex,
        yaw_rad: f64,
    ) -> Result<Vec<Edge>, PlanError>;

    /// The gap-tolerant neighbours of a vertex, at most one per compass direction.
    fn search_neighbours(&self, map: &TerrainCostMap, vertex: Vertex) -> Vec<Vertex>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AdjacencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directed edge leaving `from`.
    pub fn insert_edge(&mut self, from: Vertex, edge: Edge) {
        self.edges.entry(from).or_insert_with(Vec::new).push(edge);
    }

    /// The edges leaving the given vertex, empty if it has none.
    pub fn successors(&self, vertex: Vertex) -> &[Edge] {
        self.edges.get(&vertex).map(|e| e.as_slice()).unwrap_or(&[])
    }

    /// True if an edge `from -> to` exists.
    pub fn contains_edge(&self, from: Vertex, to: Vertex) -> bool {
        self.successors(from).iter().any(|e| e.target == to)
    }

    /// Number of vertices with at least one outgoing edge.
    pub fn num_vertices(&self) -> usize {
        self.edges.len()
    }

    /// Total number of edges in the graph.
    pub fn num_edges(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
