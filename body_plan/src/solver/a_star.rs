//! # A* Solver
//!
//! Minimum-cost search over the adjacency graph with the open/closed set
//! discipline: a priority frontier keyed by `f = g + h` with ties broken on
//! vertex identifier, and a closed set that is never re-expanded.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use nalgebra::distance;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyGraph;
use crate::map::{PlaneGrid, Vertex};
use crate::planner::PlanError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A* graph search solver.
#[derive(Clone, Debug)]
pub struct AStarSolver {
    params: SolverParams,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SolverParams {
    /// Heuristic estimate used to order the frontier.
    pub heuristic: Heuristic,

    /// Cell resolution of the grid on which heuristic distances are evaluated.
    pub reference_resolution_m: f64,
}

/// The product of one search: everything needed to reconstruct and report the path.
///
/// All of this state is owned by one planning call and dropped at its end.
#[derive(Clone, Debug)]
pub struct Search {
    /// Back-pointers for every relaxed vertex. Absence of a key means the vertex was never
    /// reached.
    pub predecessors: HashMap<Vertex, Vertex>,

    /// Best known cost-from-source for every seen vertex.
    pub g_costs: HashMap<Vertex, f64>,

    /// Vertices in the order they were expanded (moved to the closed set).
    pub expanded: Vec<Vertex>,

    /// Cost of the found path, `g(target)`.
    pub total_cost: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Selects the heuristic cost estimate.
///
/// `LegacySquared` is the estimate this planner has historically used. It is based on the
/// squared Euclidean distance and therefore can overestimate: the search stays complete but
/// loses its optimality guarantee. `Euclidean` is the admissible replacement when true
/// shortest paths matter more than drop-in behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// `0.5 * (0.8 * d^2 + 0.2 * |dy|)` over reference-grid coordinates.
    LegacySquared,

    /// Plain Euclidean distance over reference-grid coordinates.
    Euclidean,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::LegacySquared,
            reference_resolution_m: 0.04,
        }
    }
}

impl AStarSolver {
    /// Create a new solver.
    pub fn new(params: SolverParams) -> Self {
        Self { params }
    }

    /// The solver's parameters.
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Search the graph for a minimum-cost path from `source` to `target`.
    ///
    /// Fails with [`PlanError::Unreachable`] if the frontier drains before the target is
    /// popped.
    pub fn compute(
        &self,
        graph: &AdjacencyGraph,
        source: Vertex,
        target: Vertex,
    ) -> Result<Search, PlanError> {
        let reference_grid = PlaneGrid::new(self.params.reference_resolution_m);

        // Frontier ordered by (f, vertex) ascending; stale entries are skipped on pop via the
        // closed set rather than re-keyed in place.
        let mut open: BinaryHeap<Reverse<(NotNan<f64>, Vertex)>> = BinaryHeap::new();
        let mut closed: HashSet<Vertex> = HashSet::new();

        let mut g_costs: HashMap<Vertex, f64> = HashMap::new();
        let mut predecessors: HashMap<Vertex, Vertex> = HashMap::new();
        let mut expanded: Vec<Vertex> = Vec::new();

        g_costs.insert(source, 0.0);

        let f_source = self.heuristic(&reference_grid, source, target);
        match NotNan::new(f_source) {
            Ok(f) => open.push(Reverse((f, source))),
            Err(_) => {
                return Err(PlanError::InvalidInput(
                    "heuristic produced a non-finite estimate for the source".into(),
                ))
            }
        }

        let mut total_cost = None;

        while let Some(Reverse((_, current))) = open.pop() {
            if current == target {
                total_cost = g_costs.get(&target).copied();
                break;
            }

            // A vertex may sit in the frontier once per relaxation; only its first (cheapest)
            // pop expands it
            if !closed.insert(current) {
                continue;
            }
            expanded.push(current);

            let g_current = match g_costs.get(&current) {
                Some(g) => *g,
                None => continue,
            };

            for edge in graph.successors(current) {
                if closed.contains(&edge.target) {
                    continue;
                }

                let tentative_g = g_current + edge.weight;

                let improves = match g_costs.get(&edge.target) {
                    None => true,
                    Some(g) => tentative_g < *g,
                };

                if improves {
                    predecessors.insert(edge.target, current);
                    g_costs.insert(edge.target, tentative_g);

                    let f = tentative_g + self.heuristic(&reference_grid, edge.target, target);
                    if let Ok(f) = NotNan::new(f) {
                        open.push(Reverse((f, edge.target)));
                    }
                }
            }
        }

        match total_cost {
            Some(total_cost) => Ok(Search {
                predecessors,
                g_costs,
                expanded,
                total_cost,
            }),
            None => Err(PlanError::Unreachable),
        }
    }

    /// Heuristic estimate of the cost between two vertices, evaluated over real-world
    /// coordinates on the reference grid.
    fn heuristic(&self, reference_grid: &PlaneGrid, from: Vertex, to: Vertex) -> f64 {
        let from_coord = reference_grid.vertex_to_coord(from);
        let to_coord = reference_grid.vertex_to_coord(to);

        match self.params.heuristic {
            Heuristic::LegacySquared => {
                let diff = to_coord - from_coord;
                0.5 * (0.8 * diff.norm_squared() + 0.2 * diff.y.abs())
            }
            Heuristic::Euclidean => distance(&from_coord, &to_coord),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Walk the predecessor map back from the target to produce the vertex sequence from source
/// to target.
///
/// Fails with [`PlanError::Unreachable`] if the chain from the target does not reach the
/// source.
pub fn extract_vertex_path(
    search: &Search,
    source: Vertex,
    target: Vertex,
) -> Result<Vec<Vertex>, PlanError> {
    let mut path = vec![target];

    let mut current = target;
    while current != source {
        match search.predecessors.get(&current) {
            Some(&previous) => {
                path.push(previous);
                current = previous;
            }
            None => return Err(PlanError::Unreachable),
        }

        // The chain cannot be longer than the predecessor map itself
        if path.len() > search.predecessors.len() + 1 {
            return Err(PlanError::Unreachable);
        }
    }

    path.reverse();

    Ok(path)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
