//! # PETRI
//!
//! A small artificial-life sandbox: free cells wander, bask in light, and
//! hunt each other; colliding cells of a kind merge into spring-bound
//! multicell organisms; flora grows along the ground.
//!
//! ## Features
//!
//! - **Deterministic**: seeded random number generation end to end
//! - **Inspectable**: render-ready JSON snapshots of the whole world
//! - **Configurable**: YAML configuration files
//! - **Instrumented**: per-tick stats with recorded history
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use petri::{Config, World};
//!
//! // Create world with default config
//! let config = Config::default();
//! let mut world = World::new(config);
//!
//! // Sixty ticks of a sixtieth of a second each: one simulated second
//! world.run(60, 1.0 / 60.0);
//!
//! // Check results
//! println!("Population: {}", world.population());
//! println!("{}", world.stats.summary());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use petri::Config;
//!
//! let mut config = Config::default();
//! config.world.initial_predators = 10;
//! config.simulation.combination_chance = 0.25;
//! ```
//!
//! ## Snapshots
//!
//! ```rust
//! use petri::{Config, World, WorldSnapshot};
//!
//! let world = World::new_with_seed(Config::default(), 7);
//! let snapshot = WorldSnapshot::from_world(&world);
//! let json = serde_json::to_string(&snapshot).unwrap();
//! assert!(json.contains("cells"));
//! ```

pub mod cell;
pub mod collision;
pub mod config;
pub mod flora;
pub mod organism;
pub mod particle;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use cell::{Cell, CellKind};
pub use config::Config;
pub use organism::Organism;
pub use snapshot::WorldSnapshot;
pub use stats::Stats;
pub use world::{EntityKind, LightSource, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(ticks: u64, cells: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    // Seed the population in a 5:3:2 kind ratio.
    config.world.initial_wandering = cells * 5 / 10;
    config.world.initial_photosynthetic = cells * 3 / 10;
    config.world.initial_predators =
        cells - config.world.initial_wandering - config.world.initial_photosynthetic;

    let mut world = World::new(config);

    let start = Instant::now();
    world.run(ticks, 1.0 / 60.0);
    let elapsed = start.elapsed();

    BenchmarkResult {
        ticks,
        initial_population: cells,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(
            f,
            "Population: {} -> {}",
            self.initial_population, self.final_population
        )?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}
