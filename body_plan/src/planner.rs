//! # Body Planner
//!
//! Ties the pipeline together for one planning call: validate the query,
//! build the adjacency graph, run the search, and extract the waypoint
//! path. Every call builds its graph and search state from scratch and
//! drops them on return; the terrain map is only borrowed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::adjacency::{AdjacencyModel, AdjacencyParams, GridBodyAdjacency};
use crate::map::TerrainCostMap;
use crate::path::BodyPath;
use crate::robot::StanceModel;
use crate::solver::{extract_vertex_path, AStarSolver, SolverParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Plans minimum cost body paths over a [`TerrainCostMap`].
#[derive(Clone, Debug)]
pub struct BodyPlanner {
    adjacency: GridBodyAdjacency,
    solver: AStarSolver,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BodyPlannerParams {
    pub adjacency: AdjacencyParams,
    pub solver: SolverParams,
}

/// One planning query: where the body starts, where it should get to, and its heading.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlanQuery {
    pub start_m: Point2<f64>,
    pub target_m: Point2<f64>,
    pub yaw_rad: f64,
}

/// A successfully planned path and its total traversal cost.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannedPath {
    pub path: BodyPath,
    pub total_cost: f64,
}

/// Report saved at the end of each successful planning call.
#[derive(Clone, Debug, Serialize)]
pub struct PlannerReport {
    pub query: PlanQuery,
    pub num_mapped_cells: usize,
    pub num_expanded: usize,
    pub num_waypoints: usize,
    pub total_cost: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Failures a planning call can report.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The query itself is malformed. Not retryable.
    #[error("Invalid planning input: {0}")]
    InvalidInput(String),

    /// There is no terrain information to plan over. Retry once fresher terrain arrives.
    #[error("No terrain information available to plan over")]
    NoTerrainData,

    /// The search exhausted its frontier without reaching the target.
    #[error("No path exists between the start and target")]
    Unreachable,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for BodyPlannerParams {
    fn default() -> Self {
        Self {
            adjacency: AdjacencyParams::default(),
            solver: SolverParams::default(),
        }
    }
}

impl BodyPlanner {
    /// Create a new planner for the given robot stance model.
    pub fn new(params: BodyPlannerParams, stance_model: StanceModel) -> Self {
        Self {
            adjacency: GridBodyAdjacency::new(params.adjacency, stance_model),
            solver: AStarSolver::new(params.solver),
        }
    }

    /// Plan a minimum cost body path across the terrain map.
    ///
    /// The map is treated as an immutable snapshot: a call runs to completion against the
    /// data it was given, and callers wanting fresher terrain must issue a new call.
    pub fn plan(&self, map: &TerrainCostMap, query: &PlanQuery) -> Result<PlannedPath, PlanError> {
        Self::validate(query)?;

        let yaw_rad = util::maths::wrap_to_2pi(query.yaw_rad);

        let source = map.grid().coord_to_vertex(&query.start_m);
        let target = map.grid().coord_to_vertex(&query.target_m);

        let graph = self.adjacency.build_graph(map, source, target, yaw_rad)?;

        let search = self.solver.compute(&graph, source, target)?;

        let vertices = extract_vertex_path(&search, source, target)?;
        let path = BodyPath::from_vertices(map.grid(), &vertices);

        info!(
            "Planned body path with {} waypoints, total cost {:.3} ({} vertices expanded)",
            path.get_num_points(),
            search.total_cost,
            search.expanded.len()
        );

        util::session::save_with_timestamp(
            "body_plan/report.json",
            PlannerReport {
                query: *query,
                num_mapped_cells: map.len(),
                num_expanded: search.expanded.len(),
                num_waypoints: path.get_num_points(),
                total_cost: search.total_cost,
            },
        );

        Ok(PlannedPath {
            path,
            total_cost: search.total_cost,
        })
    }

    /// Reject malformed queries before any graph work starts.
    fn validate(query: &PlanQuery) -> Result<(), PlanError> {
        let finite = query.start_m.x.is_finite()
            && query.start_m.y.is_finite()
            && query.target_m.x.is_finite()
            && query.target_m.y.is_finite()
            && query.yaw_rad.is_finite();

        if !finite {
            warn!("Rejecting planning query with non-finite coordinates: {:?}", query);
            return Err(PlanError::InvalidInput(
                "query coordinates and yaw must be finite".into(),
            ));
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use crate::adjacency::CostModel;
    use crate::map::{Key, PlaneGrid};

    use super::*;

    const RES_M: f64 = 0.1;

    fn uniform_map(side: i32) -> TerrainCostMap {
        let mut map = TerrainCostMap::new(PlaneGrid::new(RES_M));
        for x in 0..side {
            for y in 0..side {
                map.insert(Key { x, y }.to_vertex(), 1.0);
            }
        }
        map
    }

    fn terrain_planner() -> BodyPlanner {
        BodyPlanner::new(
            BodyPlannerParams {
                adjacency: AdjacencyParams {
                    cost_model: CostModel::Terrain,
                    ..Default::default()
                },
                ..Default::default()
            },
            StanceModel::default(),
        )
    }

    #[test]
    fn test_plan_across_uniform_grid() {
        let map = uniform_map(5);
        let planner = terrain_planner();

        let planned = planner
            .plan(
                &map,
                &PlanQuery {
                    start_m: Point2::new(0.0, 0.0),
                    target_m: Point2::new(0.4, 0.4),
                    yaw_rad: 0.0,
                },
            )
            .unwrap();

        // Corner to corner over 8-connected cells: 4 hops of unit cost
        assert_eq!(planned.path.get_num_points(), 5);
        assert!((planned.total_cost - 4.0).abs() < 1e-9);

        // Waypoints start and end at the query cells
        assert_eq!(planned.path.points_m[0], Point2::new(0.0, 0.0));
        let last = planned.path.points_m[planned.path.get_num_points() - 1];
        assert!((last - Point2::new(0.4, 0.4)).norm() < 1e-9);
    }

    #[test]
    fn test_plan_stance_mode() {
        let map = uniform_map(20);
        let planner = BodyPlanner::new(
            BodyPlannerParams::default(),
            StanceModel::default(),
        );

        let planned = planner
            .plan(
                &map,
                &PlanQuery {
                    start_m: Point2::new(0.3, 0.3),
                    target_m: Point2::new(1.6, 1.6),
                    yaw_rad: 0.5,
                },
            )
            .unwrap();

        assert!(planned.path.get_num_points() >= 2);
        assert!(planned.total_cost > 0.0);
    }

    #[test]
    fn test_plan_bridges_outside_start() {
        let map = uniform_map(3);
        let planner = terrain_planner();

        // Start well outside the mapped 3x3 block
        let planned = planner
            .plan(
                &map,
                &PlanQuery {
                    start_m: Point2::new(-1.0, 0.0),
                    target_m: Point2::new(0.2, 0.2),
                    yaw_rad: 0.0,
                },
            )
            .unwrap();

        // First waypoint is the unmapped start cell, second is the bridged entry
        assert_eq!(planned.path.points_m[0], Point2::new(-1.0, 0.0));
        assert_eq!(planned.path.points_m[1], Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_empty_map_rejected() {
        let map = TerrainCostMap::new(PlaneGrid::new(RES_M));
        let planner = terrain_planner();

        let result = planner.plan(
            &map,
            &PlanQuery {
                start_m: Point2::new(0.0, 0.0),
                target_m: Point2::new(1.0, 1.0),
                yaw_rad: 0.0,
            },
        );

        assert!(matches!(result, Err(PlanError::NoTerrainData)));
    }

    #[test]
    fn test_non_finite_query_rejected() {
        let map = uniform_map(3);
        let planner = terrain_planner();

        let result = planner.plan(
            &map,
            &PlanQuery {
                start_m: Point2::new(f64::NAN, 0.0),
                target_m: Point2::new(1.0, 1.0),
                yaw_rad: 0.0,
            },
        );
        assert!(matches!(result, Err(PlanError::InvalidInput(_))));

        let result = planner.plan(
            &map,
            &PlanQuery {
                start_m: Point2::new(0.0, 0.0),
                target_m: Point2::new(1.0, 1.0),
                yaw_rad: f64::INFINITY,
            },
        );
        assert!(matches!(result, Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_stance_model_rejected() {
        let map = uniform_map(3);
        let planner = BodyPlanner::new(
            BodyPlannerParams::default(),
            StanceModel {
                stance_areas: vec![],
            },
        );

        let result = planner.plan(
            &map,
            &PlanQuery {
                start_m: Point2::new(0.0, 0.0),
                target_m: Point2::new(0.2, 0.2),
                yaw_rad: 0.0,
            },
        );

        assert!(matches!(result, Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn test_params_from_toml() {
        let params: BodyPlannerParams = toml::from_str(
            r#"
            [adjacency]
            cost_model = "terrain"
            neighbouring_radius = 2
            top_sample_count = 3
            uncertainty_factor = 1.5

            [solver]
            heuristic = "euclidean"
            reference_resolution_m = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(params.adjacency.cost_model, CostModel::Terrain);
        assert_eq!(params.adjacency.neighbouring_radius, 2);
        assert_eq!(params.adjacency.top_sample_count, 3);
        assert_eq!(params.solver.heuristic, crate::solver::Heuristic::Euclidean);
        assert_eq!(params.solver.reference_resolution_m, 0.1);
    }

    #[test]
    fn test_disconnected_target_unreachable() {
        let mut map = uniform_map(2);
        map.insert(Key { x: 30, y: 30 }.to_vertex(), 1.0);

        let planner = terrain_planner();

        let result = planner.plan(
            &map,
            &PlanQuery {
                start_m: Point2::new(0.0, 0.0),
                target_m: Point2::new(3.0, 3.0),
                yaw_rad: 0.0,
            },
        );

        assert!(matches!(result, Err(PlanError::Unreachable)));
    }
}
