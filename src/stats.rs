//! Statistics tracking for the simulation.

use crate::cell::Cell;
use crate::flora::{Plant, Tree};
use crate::organism::Organism;
use crate::particle::Particle;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Accumulated simulated seconds
    pub time: f32,
    /// Free cells alive
    pub cells: usize,
    /// Living organisms
    pub organisms: usize,
    /// Members across all organisms
    pub organism_members: usize,
    /// Plants alive
    pub plants: usize,
    /// Trees alive
    pub trees: usize,
    /// Live feedback particles
    pub particles: usize,
    /// Mean energy across free cells
    pub cell_energy_mean: f32,
    /// Births this tick (cell offspring and budded organisms)
    pub births: usize,
    /// Deaths this tick (reaped cells and organisms)
    pub deaths: usize,
    /// Merges this tick
    pub merges: usize,
    /// Attaches this tick
    pub attaches: usize,
    /// Executed ticks per wall-clock second
    pub fps: f32,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the derived figures from the current collections. The
    /// per-tick event counters (births, deaths, merges, attaches) and the
    /// fps figure are maintained by the world, not recomputed here.
    pub fn update(
        &mut self,
        time: f32,
        cells: &[Cell],
        organisms: &[Organism],
        plants: &[Plant],
        trees: &[Tree],
        particles: &[Particle],
    ) {
        self.time = time;
        self.cells = cells.len();
        self.organisms = organisms.len();
        self.organism_members = organisms.iter().map(|o| o.member_count()).sum();
        self.plants = plants.len();
        self.trees = trees.len();
        self.particles = particles.len();
        self.cell_energy_mean = if cells.is_empty() {
            0.0
        } else {
            cells.iter().map(|c| c.energy).sum::<f32>() / cells.len() as f32
        };
    }

    /// Save stats to JSON file
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:7.1} | Cells:{:4} | Orgs:{:3} ({:4} members) | Flora:{:3} | Energy:{:5.1} | FPS:{:.0}",
            self.time,
            self.cells,
            self.organisms,
            self.organism_members,
            self.plants + self.trees,
            self.cell_energy_mean,
            self.fps,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Ticks between recordings
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get free-cell count over time
    pub fn cell_series(&self) -> Vec<(f32, usize)> {
        self.snapshots.iter().map(|s| (s.time, s.cells)).collect()
    }

    /// Get organism count over time
    pub fn organism_series(&self) -> Vec<(f32, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.organisms))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
