//! Configuration for the petri simulation.
//!
//! Supports YAML configuration files with sensible defaults. Out-of-range
//! values are clamped at this boundary with a warning; the engine itself
//! never sees an invalid setting.

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// World/environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in units
    pub width: f32,
    /// World height in units
    pub height: f32,
    /// Light sources available to photosynthetic cells
    pub lights: Vec<LightConfig>,
    /// Wandering cells in the starting population
    pub initial_wandering: usize,
    /// Photosynthetic cells in the starting population
    pub initial_photosynthetic: usize,
    /// Predator cells in the starting population
    pub initial_predators: usize,
    /// Plants seeded on the ground band
    pub initial_plants: usize,
    /// Trees seeded on the ground band
    pub initial_trees: usize,
}

/// A configured light source
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightConfig {
    pub x: f32,
    pub y: f32,
    /// Radius within which cells gain energy
    pub intensity: f32,
}

/// Simulation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Multiplier applied to every incoming dt (0 freezes the world)
    pub simulation_speed: f32,
    /// Shared probability for merge and attach draws (0.0 - 1.0)
    pub combination_chance: f32,
    /// Whether snapshots carry energy-bar data for rendering
    pub show_energy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            lights: vec![LightConfig {
                x: 400.0,
                y: 50.0,
                intensity: 100.0,
            }],
            initial_wandering: 5,
            initial_photosynthetic: 3,
            initial_predators: 2,
            initial_plants: 3,
            initial_trees: 2,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulation_speed: 1.0,
            combination_chance: 0.1,
            show_energy: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, clamping out-of-range values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.sanitize();
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Clamp out-of-range values in place, warning for each correction.
    /// The comparisons are written so NaN also falls to the safe value.
    pub fn sanitize(&mut self) {
        if !(self.world.width >= 100.0) {
            warn!("world width {} raised to 100", self.world.width);
            self.world.width = 100.0;
        }
        if !(self.world.height >= 100.0) {
            warn!("world height {} raised to 100", self.world.height);
            self.world.height = 100.0;
        }
        for light in &mut self.world.lights {
            if !(light.intensity >= 0.0) {
                warn!("light intensity {} clamped to 0", light.intensity);
                light.intensity = 0.0;
            }
        }
        if !(self.simulation.simulation_speed >= 0.0) {
            warn!(
                "simulation_speed {} clamped to 0",
                self.simulation.simulation_speed
            );
            self.simulation.simulation_speed = 0.0;
        }
        if !(0.0..=1.0).contains(&self.simulation.combination_chance) {
            let clamped = self.simulation.combination_chance.max(0.0).min(1.0);
            warn!(
                "combination_chance {} clamped to {}",
                self.simulation.combination_chance, clamped
            );
            self.simulation.combination_chance = clamped;
        }
    }
}
