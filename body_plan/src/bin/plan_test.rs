//! # Simple Planning Test
//!
//! Generates a random terrain cost map and plans a body path across it,
//! without requiring the rest of the robot software or any real terrain
//! data.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use nalgebra::Point2;

use body_plan::{
    map::{PlaneGrid, TerrainCostMap},
    robot::StanceModel,
    BodyPlanner, BodyPlannerParams, PlanQuery,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // Initialise session
    let session = Session::new("plan_test", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Planning Test\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: BodyPlannerParams = match util::params::load("body_plan.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load body_plan.toml ({}), using defaults", e);
            BodyPlannerParams::default()
        }
    };

    // ---- BUILD TERRAIN ----

    // Generate a random terrain cost map
    let terrain_map = TerrainCostMap::generate_random(
        PlaneGrid::new(0.04),
        (200, 200),
        Point2::new(0.0, 0.0),
        0.8,
        0.3,
    );

    info!("Generated random terrain with {} mapped cells", terrain_map.len());
    info!("Average terrain cost: {:.3}", terrain_map.average_cost());

    // ---- PLAN ----

    let planner = BodyPlanner::new(params, StanceModel::default());

    let query = PlanQuery {
        start_m: Point2::new(-3.0, -3.0),
        target_m: Point2::new(3.0, 3.0),
        yaw_rad: std::f64::consts::FRAC_PI_4,
    };

    info!(
        "Planning from ({:.2}, {:.2}) to ({:.2}, {:.2})",
        query.start_m.x, query.start_m.y, query.target_m.x, query.target_m.y
    );

    let planned = planner
        .plan(&terrain_map, &query)
        .wrap_err("Planning failed")?;

    info!(
        "Found path: {} waypoints, {:.2} m long, total cost {:.3}",
        planned.path.get_num_points(),
        planned.path.get_length().unwrap_or(0.0),
        planned.total_cost
    );

    // Save the path for plotting
    util::session::save("plan_test/path.json", planned);

    session.exit();

    Ok(())
}
