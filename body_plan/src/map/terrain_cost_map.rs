//! # Terrain Cost Map
//!
//! Sparse mapping from grid vertices to traversal cost, produced once per
//! planning cycle from an external reward/elevation source. Costs are
//! non-negative with lower values marking more traversable terrain; a
//! missing entry means the cell is unknown, not impassable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use log::warn;
use nalgebra::{distance_squared, Point2};
use noise::{NoiseFn, Perlin};

use super::{PlaneGrid, Vertex};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sparse per-cell traversal cost over a [`PlaneGrid`].
///
/// The map is filled by the terrain source before a planning call and is read-only for the
/// duration of that call.
#[derive(Clone, Debug)]
pub struct TerrainCostMap {
    grid: PlaneGrid,

    costs: HashMap<Vertex, f64>,

    /// Running sum of all stored costs, kept so the global average is available without a
    /// second pass when stance evaluation hits fully unknown terrain.
    cost_sum: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TerrainCostMap {
    /// Create a new empty map over the given grid.
    pub fn new(grid: PlaneGrid) -> Self {
        Self {
            grid,
            costs: HashMap::new(),
            cost_sum: 0.0,
        }
    }

    /// Build a map from `(coordinate, cost)` samples, the shape terrain data arrives in from
    /// the external reward source.
    ///
    /// Samples with a non-finite or negative cost are skipped with a warning, leaving their
    /// cells unknown. Later samples for the same cell replace earlier ones.
    pub fn from_samples(grid: PlaneGrid, samples: &[(Point2<f64>, f64)]) -> Self {
        let mut map = Self::new(grid);

        let mut num_skipped = 0;
        for (coord, cost) in samples.iter() {
            if !cost.is_finite() || *cost < 0.0 || !coord.x.is_finite() || !coord.y.is_finite() {
                num_skipped += 1;
                continue;
            }

            map.insert(grid.coord_to_vertex(coord), *cost);
        }

        if num_skipped > 0 {
            warn!(
                "Skipped {} invalid terrain samples out of {}",
                num_skipped,
                samples.len()
            );
        }

        map
    }

    /// Generate a random cost map over a rectangle of cells using Perlin noise, for tests and
    /// benchmarks. Costs fall in the [0, 1] range.
    pub fn generate_random(
        grid: PlaneGrid,
        num_cells: (usize, usize),
        centre: Point2<f64>,
        perlin_scale: f64,
        perlin_offset: f64,
    ) -> Self {
        let perlin = Perlin::new();
        let mut map = Self::new(grid);

        let centre_key = grid.coord_to_key(&centre);
        let half_x = (num_cells.0 / 2) as i32;
        let half_y = (num_cells.1 / 2) as i32;

        for dy in -half_y..(num_cells.1 as i32 - half_y) {
            for dx in -half_x..(num_cells.0 as i32 - half_x) {
                let key = centre_key.offset(dx, dy);
                let pos = grid.key_to_coord(key);

                let noise_val = perlin.get([
                    pos.x * perlin_scale + perlin_offset,
                    pos.y * perlin_scale + perlin_offset,
                ]);

                // Perlin output can overshoot [-1, 1] slightly, so clamp after mapping
                let cost = util::maths::lin_map((-1.0, 1.0), (0.0, 1.0), noise_val)
                    .min(1.0)
                    .max(0.0);

                map.insert(key.to_vertex(), cost);
            }
        }

        map
    }

    /// The grid this map is discretised on.
    pub fn grid(&self) -> &PlaneGrid {
        &self.grid
    }

    /// Insert the cost for a vertex, replacing any previous value.
    pub fn insert(&mut self, vertex: Vertex, cost: f64) {
        if let Some(old) = self.costs.insert(vertex, cost) {
            self.cost_sum -= old;
        }
        self.cost_sum += cost;
    }

    /// Get the cost stored for a vertex, or `None` if the cell is unknown.
    pub fn cost(&self, vertex: Vertex) -> Option<f64> {
        self.costs.get(&vertex).copied()
    }

    /// True if the vertex has a stored cost.
    pub fn contains(&self, vertex: Vertex) -> bool {
        self.costs.contains_key(&vertex)
    }

    /// Number of mapped cells.
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// True if no cell is mapped.
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Iterate over all `(vertex, cost)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Vertex, f64)> + '_ {
        self.costs.iter().map(|(v, c)| (*v, *c))
    }

    /// The average cost over all mapped cells, or zero if the map is empty.
    pub fn average_cost(&self) -> f64 {
        if self.costs.is_empty() {
            0.0
        } else {
            self.cost_sum / self.costs.len() as f64
        }
    }

    /// Find the mapped vertex whose cell centre is closest (Euclidean) to the given vertex's
    /// cell centre, or `None` if the map is empty.
    ///
    /// If the vertex itself is mapped it is its own closest vertex. Exact ties are broken by
    /// the lower vertex identifier so the result does not depend on iteration order.
    pub fn closest_vertex(&self, to: Vertex) -> Option<Vertex> {
        if self.contains(to) {
            return Some(to);
        }

        let to_coord = self.grid.vertex_to_coord(to);

        let mut closest: Option<(f64, Vertex)> = None;
        for &vertex in self.costs.keys() {
            let dist_sq = distance_squared(&self.grid.vertex_to_coord(vertex), &to_coord);

            let better = match closest {
                None => true,
                Some((best_sq, best_vertex)) => {
                    dist_sq < best_sq || (dist_sq == best_sq && vertex < best_vertex)
                }
            };

            if better {
                closest = Some((dist_sq, vertex));
            }
        }

        closest.map(|(_, v)| v)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
