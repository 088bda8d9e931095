use anyhow::{bail, Result};
use driving_common::{
    Crate, Obstacle, Lot, Road, SceneConfig, SimulatorState, Trajectory, Vec2, Vehicle,
};
use driving_visualizer::{generate_color_palette, parse_color};
use log::{debug, info};
use rand::prelude::*;

// Sizes used for randomly scattered clutter
const SCATTER_CRATE_SIZE: f32 = 1.5;
const SCATTER_OBSTACLE_RADIUS: f32 = 1.0;

/// Builds the simulation state described by `config`.
///
/// The same config always yields the same state: palette colors and scattered
/// clutter come from an RNG seeded with `scatter.seed`. Fails when an entity is
/// placed at a non-finite coordinate or angle.
pub fn build_state(config: &SceneConfig) -> Result<SimulatorState> {
    check_placements(config)?;
    let world = &config.world;
    let mut state = SimulatorState::new(world.horizon, world.x_bound, world.y_bound);
    let mut rng = StdRng::seed_from_u64(config.scatter.seed);

    for road in &config.roads {
        state.add_road(Road::new(
            road.id,
            Vec2::new(road.x, road.y),
            road.length,
            road.width,
            road.angle_deg.to_radians(),
            road.lanes,
        ));
    }

    for lot in &config.lots {
        state.add_lot(Lot::new(
            lot.id,
            Vec2::new(lot.x, lot.y),
            lot.width,
            lot.height,
            lot.angle_deg.to_radians(),
            lot.stalls,
        ));
    }

    // External vehicles without an explicit color get distinct palette colors
    let unnamed = config.vehicles.iter().filter(|v| !v.is_user && v.color.is_none()).count();
    let mut palette = generate_color_palette(unnamed, &mut rng).into_iter();

    for (id, vehicle) in config.vehicles.iter().enumerate() {
        let waypoints: Vec<Vec2> = vehicle.waypoints.iter().map(|&p| Vec2::from(p)).collect();
        let trajectory = Trajectory::from_waypoints(&waypoints, world.horizon, vehicle.heading_deg.to_radians());
        let mut built = Vehicle::new(id as u32, vehicle.length, vehicle.width, vehicle.is_user, trajectory);

        if let Some(name) = &vehicle.color {
            built = built.with_color(parse_color(name));
        } else if !vehicle.is_user {
            if let Some(color) = palette.next() {
                built = built.with_color(color);
            }
        }
        debug!("Vehicle {} ({} waypoint(s), user: {})", id, waypoints.len(), vehicle.is_user);
        state.add_vehicle(built);
    }

    for c in &config.crates {
        let mut built = Crate::new(Vec2::new(c.x, c.y), c.size);
        if let Some(name) = &c.color {
            built.color = parse_color(name);
        }
        state.add_crate(built);
    }

    for o in &config.obstacles {
        let mut built = Obstacle::new(Vec2::new(o.x, o.y), o.radius);
        if let Some(name) = &o.color {
            built.color = parse_color(name);
        }
        state.add_obstacle(built);
    }

    scatter(&mut state, config, &mut rng);

    info!(
        "Scene built: {} road(s), {} lot(s), {} vehicle(s), {} crate(s), {} obstacle(s)",
        state.roads.len(),
        state.lots.len(),
        state.vehicle_count(),
        state.crates.len(),
        state.obstacles.len()
    );
    Ok(state)
}

fn check_placements(config: &SceneConfig) -> Result<()> {
    let finite = |values: &[f32]| values.iter().all(|v| v.is_finite());

    for road in &config.roads {
        if !finite(&[road.x, road.y, road.angle_deg]) {
            bail!("road {} has a non-finite position or angle.", road.id);
        }
    }
    for lot in &config.lots {
        if !finite(&[lot.x, lot.y, lot.angle_deg]) {
            bail!("lot {} has a non-finite position or angle.", lot.id);
        }
    }
    for (i, vehicle) in config.vehicles.iter().enumerate() {
        if !finite(&[vehicle.heading_deg]) || !vehicle.waypoints.iter().all(|w| finite(w)) {
            bail!("vehicle #{} has a non-finite waypoint or heading.", i);
        }
    }
    if !config.crates.iter().all(|c| finite(&[c.x, c.y])) {
        bail!("crate positions must be finite.");
    }
    if !config.obstacles.iter().all(|o| finite(&[o.x, o.y])) {
        bail!("obstacle positions must be finite.");
    }
    Ok(())
}

/// Places the configured number of extra crates and obstacles uniformly inside the bounds.
fn scatter(state: &mut SimulatorState, config: &SceneConfig, rng: &mut StdRng) {
    let scatter = &config.scatter;
    if scatter.crates == 0 && scatter.obstacles == 0 {
        return;
    }
    info!(
        "Scattering {} crate(s) and {} obstacle(s) with seed {}",
        scatter.crates, scatter.obstacles, scatter.seed
    );

    for _ in 0..scatter.crates {
        let position = random_point(rng, state.x_bound, state.y_bound, SCATTER_CRATE_SIZE / 2.0);
        state.add_crate(Crate::new(position, SCATTER_CRATE_SIZE));
    }
    for _ in 0..scatter.obstacles {
        let position = random_point(rng, state.x_bound, state.y_bound, SCATTER_OBSTACLE_RADIUS);
        state.add_obstacle(Obstacle::new(position, SCATTER_OBSTACLE_RADIUS));
    }
}

/// Uniform point at least `margin` away from the world edges (or the center line
/// when the world is too small for the margin).
fn random_point(rng: &mut StdRng, x_bound: f32, y_bound: f32, margin: f32) -> Vec2 {
    let axis = |rng: &mut StdRng, bound: f32| {
        if bound > 2.0 * margin {
            rng.random_range(margin..bound - margin)
        } else {
            bound / 2.0
        }
    };
    let x = axis(rng, x_bound);
    let y = axis(rng, y_bound);
    Vec2::new(x, y)
}
