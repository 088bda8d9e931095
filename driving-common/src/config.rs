use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Extent of the simulated world and how long it runs
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WorldConfig {
    pub x_bound: f32,
    pub y_bound: f32,
    pub horizon: u32,
}

// Size of the drawing surface, expressed like a plotting figure
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FigureConfig {
    #[serde(default = "default_width_in")]
    pub width_in: f32,
    #[serde(default = "default_height_in")]
    pub height_in: f32,
    #[serde(default = "default_dpi")]
    pub dpi: f32,
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            width_in: default_width_in(),
            height_in: default_height_in(),
            dpi: default_dpi(),
            background: default_background(),
        }
    }
}

impl FigureConfig {
    /// Pixel dimensions of the surface (inches times dpi, rounded).
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round() as u32,
            (self.height_in * self.dpi).round() as u32,
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RoadConfig {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub length: f32,
    #[serde(default = "default_road_width")]
    pub width: f32,
    #[serde(default)]
    pub angle_deg: f32,
    #[serde(default = "default_lanes")]
    pub lanes: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LotConfig {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub angle_deg: f32,
    #[serde(default)]
    pub stalls: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VehicleConfig {
    #[serde(default)]
    pub is_user: bool,
    #[serde(default = "default_vehicle_length")]
    pub length: f32,
    #[serde(default = "default_vehicle_width")]
    pub width: f32,
    /// Heading used when the vehicle has a single waypoint (parked).
    #[serde(default)]
    pub heading_deg: f32,
    pub waypoints: Vec<[f32; 2]>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CrateConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_crate_size")]
    pub size: f32,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ObstacleConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_obstacle_radius")]
    pub radius: f32,
    #[serde(default)]
    pub color: Option<String>,
}

// Extra clutter placed at random inside the world bounds
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ScatterConfig {
    #[serde(default)]
    pub crates: u32,
    #[serde(default)]
    pub obstacles: u32,
    #[serde(default)]
    pub seed: u64,
}

/// Scene description loaded from scene.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SceneConfig {
    pub world: WorldConfig,
    #[serde(default)]
    pub figure: FigureConfig,
    #[serde(default)]
    pub roads: Vec<RoadConfig>,
    #[serde(default)]
    pub lots: Vec<LotConfig>,
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
    #[serde(default)]
    pub crates: Vec<CrateConfig>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    #[serde(default)]
    pub scatter: ScatterConfig,
}

impl SceneConfig {
    /// Loads the scene configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read scene file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid scene file '{}': {}", path_ref.display(), e))
    }

    /// Parses and validates a scene from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !positive(self.world.x_bound) || !positive(self.world.y_bound) {
            anyhow::bail!("world bounds must be positive and finite.");
        }
        if self.world.horizon == 0 {
            anyhow::bail!("horizon must be greater than 0.");
        }

        let figure = &self.figure;
        if !positive(figure.width_in) || !positive(figure.height_in) || !positive(figure.dpi) {
            anyhow::bail!("figure size and dpi must be positive and finite.");
        }
        let (width_px, height_px) = figure.pixel_size();
        if width_px == 0 || height_px == 0 {
            anyhow::bail!("figure must be at least one pixel in each dimension.");
        }
        // The H.264 encoder works on 4:2:0 chroma blocks
        if width_px % 2 != 0 || height_px % 2 != 0 {
            anyhow::bail!("figure pixel size {}x{} must be even in both dimensions.", width_px, height_px);
        }

        for road in &self.roads {
            if !positive(road.length) || !positive(road.width) {
                anyhow::bail!("road {} must have positive length and width.", road.id);
            }
            if road.lanes == 0 {
                anyhow::bail!("road {} must have at least one lane.", road.id);
            }
        }
        for lot in &self.lots {
            if !positive(lot.width) || !positive(lot.height) {
                anyhow::bail!("lot {} must have positive width and height.", lot.id);
            }
        }
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if vehicle.waypoints.is_empty() {
                anyhow::bail!("vehicle #{} needs at least one waypoint.", i);
            }
            if !positive(vehicle.length) || !positive(vehicle.width) {
                anyhow::bail!("vehicle #{} must have positive length and width.", i);
            }
        }
        if self.crates.iter().any(|c| !positive(c.size)) {
            anyhow::bail!("crate size must be positive.");
        }
        if self.obstacles.iter().any(|o| !positive(o.radius)) {
            anyhow::bail!("obstacle radius must be positive.");
        }

        Ok(())
    }
}

/// Finite and strictly greater than zero (NaN fails).
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

// 8x6 inches at 100 dpi
fn default_width_in() -> f32 {
    8.0
}

fn default_height_in() -> f32 {
    6.0
}

fn default_dpi() -> f32 {
    100.0
}

fn default_background() -> String {
    "white".to_string()
}

fn default_road_width() -> f32 {
    8.0
}

fn default_lanes() -> u32 {
    2
}

fn default_vehicle_length() -> f32 {
    4.5
}

fn default_vehicle_width() -> f32 {
    2.0
}

fn default_crate_size() -> f32 {
    1.5
}

fn default_obstacle_radius() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [world]
        x_bound = 100.0
        y_bound = 80.0
        horizon = 30
    "#;

    #[test]
    fn minimal_scene_uses_defaults() {
        let config = SceneConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.figure.pixel_size(), (800, 600));
        assert_eq!(config.figure.background, "white");
        assert!(config.roads.is_empty());
        assert_eq!(config.scatter.crates, 0);
    }

    #[test]
    fn full_scene_parses() {
        let text = r#"
            [world]
            x_bound = 100.0
            y_bound = 80.0
            horizon = 30

            [[roads]]
            id = 0
            x = 0.0
            y = 50.0
            length = 100.0

            [[lots]]
            id = 3
            x = 10.0
            y = 5.0
            width = 30.0
            height = 20.0
            stalls = 6

            [[vehicles]]
            is_user = true
            waypoints = [[2.0, 50.0], [98.0, 50.0]]

            [[obstacles]]
            x = 40.0
            y = 30.0

            [scatter]
            crates = 4
            seed = 7
        "#;
        let config = SceneConfig::from_toml_str(text).unwrap();
        assert_eq!(config.roads[0].lanes, 2);
        assert_eq!(config.lots[0].stalls, 6);
        assert!(config.vehicles[0].is_user);
        assert_eq!(config.vehicles[0].length, 4.5);
        assert_eq!(config.obstacles[0].radius, 1.0);
        assert_eq!(config.scatter.seed, 7);
    }

    #[test]
    fn rejects_zero_horizon() {
        let text = MINIMAL.replace("horizon = 30", "horizon = 0");
        assert!(SceneConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn rejects_odd_pixel_size() {
        let text = format!("{}\n[figure]\nwidth_in = 8.01\n", MINIMAL);
        assert!(SceneConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn rejects_vehicle_without_waypoints() {
        let text = format!("{}\n[[vehicles]]\nwaypoints = []\n", MINIMAL);
        assert!(SceneConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn rejects_non_finite_bounds() {
        for (from, to) in [
            ("x_bound = 100.0", "x_bound = nan"),
            ("y_bound = 80.0", "y_bound = inf"),
            ("x_bound = 100.0", "x_bound = -5.0"),
        ] {
            let text = MINIMAL.replace(from, to);
            assert!(SceneConfig::from_toml_str(&text).is_err(), "accepted {}", to);
        }
        let text = format!("{}\n[figure]\ndpi = nan\n", MINIMAL);
        assert!(SceneConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn rejects_non_finite_extents() {
        let road = format!("{}\n[[roads]]\nid = 0\nx = 0.0\ny = 0.0\nlength = inf\n", MINIMAL);
        assert!(SceneConfig::from_toml_str(&road).is_err());
        let obstacle = format!("{}\n[[obstacles]]\nx = 1.0\ny = 1.0\nradius = nan\n", MINIMAL);
        assert!(SceneConfig::from_toml_str(&obstacle).is_err());
    }
}
