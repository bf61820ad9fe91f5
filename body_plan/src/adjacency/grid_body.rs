//! # Grid Body Adjacency
//!
//! Builds the adjacency graph over a sparse terrain cost map for a legged
//! body. Neighbour discovery tolerates sensing holes by ring-expansion, and
//! in stance mode edge weights aggregate terrain cost over the robot's full
//! rotated footprint rather than the single cell.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeSet;

use log::{debug, warn};
use ordered_float::NotNan;
use serde::Deserialize;

use crate::map::{Key, TerrainCostMap, Vertex};
use crate::planner::PlanError;
use crate::robot::StanceModel;

use super::{AdjacencyGraph, AdjacencyModel, Edge};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The eight compass directions searched for neighbours, in cells per ring.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Grid-based adjacency builder for a legged body.
#[derive(Clone, Debug)]
pub struct GridBodyAdjacency {
    params: AdjacencyParams,
    stance_model: StanceModel,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AdjacencyParams {
    /// Which cost model weights the graph's edges.
    pub cost_model: CostModel,

    /// Maximum neighbour search ring radius, in cells. Sensing holes up to this radius are
    /// bridged.
    pub neighbouring_radius: u32,

    /// Number of lowest-cost samples averaged per stance area.
    pub top_sample_count: usize,

    /// Penalty factor applied to the map's average cost when a stance area covers no mapped
    /// terrain at all.
    pub uncertainty_factor: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Selects how edge weights are computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Weight edges by the terrain cost of the entered cell alone.
    Terrain,

    /// Weight edges by the full rotated-footprint stance cost of the entered cell.
    Stance,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AdjacencyParams {
    fn default() -> Self {
        Self {
            cost_model: CostModel::Stance,
            neighbouring_radius: 3,
            top_sample_count: 5,
            uncertainty_factor: 1.15,
        }
    }
}

impl GridBodyAdjacency {
    /// Create a new builder for the given stance model.
    pub fn new(params: AdjacencyParams, stance_model: StanceModel) -> Self {
        Self {
            params,
            stance_model,
        }
    }

    /// The builder's parameters.
    pub fn params(&self) -> &AdjacencyParams {
        &self.params
    }

    /// Aggregate traversability cost of the robot's full footprint at the given vertex and
    /// body orientation.
    ///
    /// Each stance area is translated to the vertex's cell centre and sampled on its own
    /// regular grid, with every sample rotated about the centre by the orientation. The
    /// per-area cost is the mean of the `top_sample_count` lowest-cost mapped samples; an
    /// area covering no mapped terrain falls back to a penalty proportional to the map's
    /// average cost, discouraging but not forbidding unknown ground.
    pub fn stance_cost(&self, map: &TerrainCostMap, vertex: Vertex, orientation_rad: f64) -> f64 {
        let centre = map.grid().vertex_to_coord(vertex);
        let (sin_o, cos_o) = orientation_rad.sin_cos();

        let mut body_cost = 0.0;
        for area in self.stance_model.stance_areas.iter() {
            let min_x = area.min_x_m + centre.x;
            let min_y = area.min_y_m + centre.y;
            let max_x = area.max_x_m + centre.x;
            let max_y = area.max_y_m + centre.y;

            // Ordered so the lowest-cost samples come first. Samples landing in the same cell
            // with the same cost collapse to one entry.
            let mut samples: BTreeSet<(NotNan<f64>, Vertex)> = BTreeSet::new();

            let mut y = min_y;
            while y < max_y {
                let mut x = min_x;
                while x < max_x {
                    // Rotate the sample point about the candidate body position
                    let point = nalgebra::Point2::new(
                        (x - centre.x) * cos_o - (y - centre.y) * sin_o + centre.x,
                        (x - centre.x) * sin_o + (y - centre.y) * cos_o + centre.y,
                    );

                    let sample = map.grid().coord_to_vertex(&point);

                    if let Some(cost) = map.cost(sample) {
                        if let Ok(cost) = NotNan::new(cost) {
                            samples.insert((cost, sample));
                        }
                    }

                    x += area.resolution_m;
                }
                y += area.resolution_m;
            }

            let stance_cost = if samples.is_empty() {
                debug!(
                    "No mapped terrain under stance area at vertex {}, applying uncertainty \
                     penalty",
                    vertex
                );
                self.params.uncertainty_factor * map.average_cost()
            } else {
                let top: Vec<f64> = samples
                    .iter()
                    .take(self.params.top_sample_count)
                    .map(|(cost, _)| cost.into_inner())
                    .collect();

                top.iter().sum::<f64>() / top.len() as f64
            };

            body_cost += stance_cost;
        }

        body_cost / self.stance_model.num_areas() as f64
    }

    /// The edge weight of entering `vertex` under the configured cost model, or `None` if the
    /// vertex is unknown to the map in terrain mode.
    fn entry_cost(&self, map: &TerrainCostMap, vertex: Vertex, yaw_rad: f64) -> Option<f64> {
        match self.params.cost_model {
            CostModel::Terrain => map.cost(vertex),
            CostModel::Stance => Some(self.stance_cost(map, vertex, yaw_rad)),
        }
    }

    /// Fail with [`PlanError::InvalidInput`] if stance mode is selected with no stance areas.
    fn check_stance_model(&self) -> Result<(), PlanError> {
        if self.params.cost_model == CostModel::Stance && self.stance_model.is_empty() {
            return Err(PlanError::InvalidInput(
                "stance cost model requires at least one stance area".into(),
            ));
        }

        Ok(())
    }
}

impl AdjacencyModel for GridBodyAdjacency {
    fn build_graph(
        &self,
        map: &TerrainCostMap,
        source: Vertex,
        target: Vertex,
        yaw_rad: f64,
    ) -> Result<AdjacencyGraph, PlanError> {
        if map.is_empty() {
            warn!("Couldn't build the adjacency graph because there is no terrain information");
            return Err(PlanError::NoTerrainData);
        }

        self.check_stance_model()?;

        let mut graph = AdjacencyGraph::new();

        // Bridge the source and target onto the map if they fall outside the mapped area. The
        // closest_vertex calls cannot fail here since the map is non-empty.
        if let Some(closest_source) = map.closest_vertex(source) {
            if closest_source != source {
                warn!(
                    "Source vertex {} is outside the mapped terrain, bridging to {}",
                    source, closest_source
                );
                graph.insert_edge(
                    source,
                    Edge {
                        target: closest_source,
                        weight: 0.0,
                    },
                );
            }
        }
        if let Some(closest_target) = map.closest_vertex(target) {
            if closest_target != target {
                warn!(
                    "Target vertex {} is outside the mapped terrain, bridging from {}",
                    target, closest_target
                );
                graph.insert_edge(
                    closest_target,
                    Edge {
                        target,
                        weight: 0.0,
                    },
                );
            }
        }

        // Weight every mapped vertex's incoming edges by its entry cost. Note the edge
        // direction: edges run neighbour -> vertex, so the weight of entering a vertex is
        // attached to the edges arriving at it.
        for (vertex, terrain_cost) in map.iter() {
            let weight = match self.params.cost_model {
                CostModel::Terrain => terrain_cost,
                CostModel::Stance => self.stance_cost(map, vertex, yaw_rad),
            };

            for neighbour in self.search_neighbours(map, vertex) {
                graph.insert_edge(
                    neighbour,
                    Edge {
                        target: vertex,
                        weight,
                    },
                );
            }
        }

        Ok(graph)
    }

    fn successors(
        &self,
        map: &TerrainCostMap,
        vertex: Vertex,
        yaw_rad: f64,
    ) -> Result<Vec<Edge>, PlanError> {
        if map.is_empty() {
            warn!("Couldn't compute successors because there is no terrain information");
            return Err(PlanError::NoTerrainData);
        }

        self.check_stance_model()?;

        let mut edges = Vec::new();
        for neighbour in self.search_neighbours(map, vertex) {
            // Neighbours are mapped by construction, so terrain mode always finds a cost
            if let Some(weight) = self.entry_cost(map, neighbour, yaw_rad) {
                edges.push(Edge {
                    target: neighbour,
                    weight,
                });
            }
        }

        Ok(edges)
    }

    /// Search outward in concentric rings along the eight compass directions, latching each
    /// direction at the first mapped cell it hits. Sensing holes narrower than the
    /// neighbouring radius are bridged; each direction contributes at most one neighbour.
    fn search_neighbours(&self, map: &TerrainCostMap, vertex: Vertex) -> Vec<Vertex> {
        let key = Key::from_vertex(vertex);

        let mut neighbours = Vec::with_capacity(DIRECTIONS.len());
        let mut found = [false; 8];

        for r in 1..=(self.params.neighbouring_radius as i32) {
            for (i, (dx, dy)) in DIRECTIONS.iter().enumerate() {
                if found[i] {
                    continue;
                }

                let candidate = key.offset(dx * r, dy * r).to_vertex();
                if map.contains(candidate) {
                    neighbours.push(candidate);
                    found[i] = true;
                }
            }
        }

        neighbours
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use crate::map::PlaneGrid;

    use super::*;

    const RES_M: f64 = 0.1;

    /// Build a map with unit cost at each of the given cell keys.
    fn map_from_keys(keys: &[(i32, i32)]) -> TerrainCostMap {
        let grid = PlaneGrid::new(RES_M);
        let mut map = TerrainCostMap::new(grid);
        for &(x, y) in keys.iter() {
            map.insert(Key { x, y }.to_vertex(), 1.0);
        }
        map
    }

    fn terrain_builder() -> GridBodyAdjacency {
        GridBodyAdjacency::new(
            AdjacencyParams {
                cost_model: CostModel::Terrain,
                ..Default::default()
            },
            StanceModel::default(),
        )
    }

    #[test]
    fn test_default_params() {
        let builder = terrain_builder();

        assert_eq!(builder.params().neighbouring_radius, 3);
        assert_eq!(builder.params().top_sample_count, 5);
        assert!((builder.params().uncertainty_factor - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_neighbours_bounded_and_mapped() {
        // Fully mapped 5x5 block
        let mut keys = Vec::new();
        for x in 0..5 {
            for y in 0..5 {
                keys.push((x, y));
            }
        }
        let map = map_from_keys(&keys);
        let builder = terrain_builder();

        let centre = Key { x: 2, y: 2 }.to_vertex();
        let neighbours = builder.search_neighbours(&map, centre);

        assert_eq!(neighbours.len(), 8);
        for n in neighbours.iter() {
            assert!(map.contains(*n));
        }
    }

    #[test]
    fn test_neighbours_bridge_gaps() {
        // A hole at r=1 in +x with a mapped cell at r=2, nothing else
        let map = map_from_keys(&[(0, 0), (2, 0)]);
        let builder = terrain_builder();

        let neighbours = builder.search_neighbours(&map, Key { x: 0, y: 0 }.to_vertex());

        assert_eq!(neighbours, vec![Key { x: 2, y: 0 }.to_vertex()]);
    }

    #[test]
    fn test_neighbours_latch_per_direction() {
        // Mapped cells at r=1 and r=2 in the same direction: only the closer one counts
        let map = map_from_keys(&[(0, 0), (1, 0), (2, 0)]);
        let builder = terrain_builder();

        let neighbours = builder.search_neighbours(&map, Key { x: 0, y: 0 }.to_vertex());

        assert_eq!(neighbours, vec![Key { x: 1, y: 0 }.to_vertex()]);
    }

    #[test]
    fn test_neighbours_beyond_radius_ignored() {
        // Nearest mapped cell in any direction is at r=4, past the default radius of 3
        let map = map_from_keys(&[(0, 0), (4, 0)]);
        let builder = terrain_builder();

        let neighbours = builder.search_neighbours(&map, Key { x: 0, y: 0 }.to_vertex());

        assert!(neighbours.is_empty());
    }

    #[test]
    fn test_build_graph_empty_map_fails() {
        let map = TerrainCostMap::new(PlaneGrid::new(RES_M));
        let builder = terrain_builder();

        let result = builder.build_graph(&map, 0, 1, 0.0);
        assert!(matches!(result, Err(PlanError::NoTerrainData)));
    }

    #[test]
    fn test_build_graph_bridges_unmapped_source() {
        // One mapped vertex two cells from the unmapped source
        let map = map_from_keys(&[(2, 0)]);
        let builder = terrain_builder();

        let source = Key { x: 0, y: 0 }.to_vertex();
        let mapped = Key { x: 2, y: 0 }.to_vertex();

        let graph = builder.build_graph(&map, source, mapped, 0.0).unwrap();

        let bridges = graph.successors(source);
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].target, mapped);
        assert_eq!(bridges[0].weight, 0.0);
    }

    #[test]
    fn test_build_graph_edge_direction() {
        // Two adjacent cells with distinct costs: the edge into a vertex carries that
        // vertex's cost
        let grid = PlaneGrid::new(RES_M);
        let mut map = TerrainCostMap::new(grid);
        let a = Key { x: 0, y: 0 }.to_vertex();
        let b = Key { x: 1, y: 0 }.to_vertex();
        map.insert(a, 0.25);
        map.insert(b, 0.75);

        let builder = terrain_builder();
        let graph = builder.build_graph(&map, a, b, 0.0).unwrap();

        let a_to_b = graph.successors(a).iter().find(|e| e.target == b).unwrap();
        assert_eq!(a_to_b.weight, 0.75);

        let b_to_a = graph.successors(b).iter().find(|e| e.target == a).unwrap();
        assert_eq!(b_to_a.weight, 0.25);
    }

    #[test]
    fn test_successors_consistent_with_build() {
        let mut keys = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                keys.push((x, y));
            }
        }
        let map = map_from_keys(&keys);
        let builder = terrain_builder();

        let vertex = Key { x: 1, y: 1 }.to_vertex();
        let graph = builder
            .build_graph(&map, vertex, Key { x: 3, y: 3 }.to_vertex(), 0.0)
            .unwrap();

        // Every on-demand successor must appear in the built graph with the same weight
        for edge in builder.successors(&map, vertex, 0.0).unwrap() {
            let built = graph
                .successors(vertex)
                .iter()
                .find(|e| e.target == edge.target)
                .unwrap();
            assert_eq!(built.weight, edge.weight);
        }
    }

    #[test]
    fn test_cost_models_share_topology() {
        // Switching cost model changes weights only, never which edges exist
        let mut keys = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                keys.push((x, y));
            }
        }
        let map = map_from_keys(&keys);

        let source = Key { x: 0, y: 0 }.to_vertex();
        let target = Key { x: 3, y: 3 }.to_vertex();

        let terrain_graph = terrain_builder()
            .build_graph(&map, source, target, 0.0)
            .unwrap();
        let stance_graph =
            GridBodyAdjacency::new(AdjacencyParams::default(), StanceModel::default())
                .build_graph(&map, source, target, 0.0)
                .unwrap();

        assert_eq!(terrain_graph.num_vertices(), stance_graph.num_vertices());
        assert_eq!(terrain_graph.num_edges(), stance_graph.num_edges());

        for &(x, y) in keys.iter() {
            let v = Key { x, y }.to_vertex();
            let terrain_targets: Vec<Vertex> =
                terrain_graph.successors(v).iter().map(|e| e.target).collect();
            let stance_targets: Vec<Vertex> =
                stance_graph.successors(v).iter().map(|e| e.target).collect();
            assert_eq!(terrain_targets, stance_targets);
        }
    }

    #[test]
    fn test_stance_cost_rotation_invariant() {
        let mut keys = Vec::new();
        for x in -8..8 {
            for y in -8..8 {
                keys.push((x, y));
            }
        }
        let grid = PlaneGrid::new(RES_M);
        let mut map = TerrainCostMap::new(grid);
        for (i, &(x, y)) in keys.iter().enumerate() {
            // Uneven but deterministic costs
            map.insert(Key { x, y }.to_vertex(), 0.1 + 0.01 * (i % 7) as f64);
        }

        let builder = GridBodyAdjacency::new(
            AdjacencyParams::default(),
            StanceModel::default(),
        );

        let vertex = Key { x: 0, y: 0 }.to_vertex();
        for &theta in [0.37, 1.3, 2.9, 4.81].iter() {
            let cost = builder.stance_cost(&map, vertex, theta);
            let wrapped = builder.stance_cost(&map, vertex, theta + std::f64::consts::TAU);
            assert!(
                (cost - wrapped).abs() < 1e-9,
                "stance cost changed under full rotation at theta = {}",
                theta
            );
        }
    }

    #[test]
    fn test_stance_cost_unknown_terrain_penalty() {
        // Map has terrain far away from the evaluated vertex, so every stance area is over
        // unknown ground
        let map = map_from_keys(&[(100, 100)]);
        let builder = GridBodyAdjacency::new(
            AdjacencyParams::default(),
            StanceModel::default(),
        );

        let cost = builder.stance_cost(&map, Key { x: 0, y: 0 }.to_vertex(), 0.0);

        // Penalty is uncertainty_factor x average cost (average is 1.0 here)
        assert!((cost - 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_stance_mode_requires_areas() {
        let map = map_from_keys(&[(0, 0)]);
        let builder = GridBodyAdjacency::new(
            AdjacencyParams::default(),
            StanceModel {
                stance_areas: vec![],
            },
        );

        let result = builder.build_graph(&map, 0, 1, 0.0);
        assert!(matches!(result, Err(PlanError::InvalidInput(_))));
    }
}
