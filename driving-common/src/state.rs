use crate::objects::{Crate, Obstacle, Vehicle};
use crate::surfaces::{Lot, Road};
use log::warn;
use std::collections::BTreeMap;

/// Everything the viewer needs to know about a simulation run.
///
/// Roads and lots are keyed by id; the ordered maps keep drawing deterministic.
#[derive(Debug, Clone)]
pub struct SimulatorState {
    pub horizon: u32,
    pub x_bound: f32,
    pub y_bound: f32,
    pub external_vehicles: Vec<Vehicle>,
    pub user_vehicles: Vec<Vehicle>,
    pub crates: Vec<Crate>,
    pub obstacles: Vec<Obstacle>,
    pub roads: BTreeMap<u32, Road>,
    pub lots: BTreeMap<u32, Lot>,
}

impl SimulatorState {
    pub fn new(horizon: u32, x_bound: f32, y_bound: f32) -> Self {
        SimulatorState {
            horizon,
            x_bound,
            y_bound,
            external_vehicles: Vec::new(),
            user_vehicles: Vec::new(),
            crates: Vec::new(),
            obstacles: Vec::new(),
            roads: BTreeMap::new(),
            lots: BTreeMap::new(),
        }
    }

    /// Files the vehicle under user or external vehicles according to `is_user`.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        if vehicle.is_user {
            self.user_vehicles.push(vehicle);
        } else {
            self.external_vehicles.push(vehicle);
        }
    }

    pub fn add_crate(&mut self, c: Crate) {
        self.crates.push(c);
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Inserts a road, replacing any road already stored under the same id.
    pub fn add_road(&mut self, road: Road) {
        let id = road.id;
        if self.roads.insert(id, road).is_some() {
            warn!("Road {} was already defined; replacing it.", id);
        }
    }

    /// Inserts a lot, replacing any lot already stored under the same id.
    pub fn add_lot(&mut self, lot: Lot) {
        let id = lot.id;
        if self.lots.insert(id, lot).is_some() {
            warn!("Lot {} was already defined; replacing it.", id);
        }
    }

    pub fn vehicle_count(&self) -> usize {
        self.external_vehicles.len() + self.user_vehicles.len()
    }
}
