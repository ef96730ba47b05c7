//! World state and the main simulation loop.

use crate::cell::{Cell, CellKind, Sighting};
use crate::collision::{self, CollisionOutcome};
use crate::config::Config;
use crate::flora::{Plant, Tree};
use crate::organism::{FeedEvent, Organism, PreyRef, PreySighting};
use crate::particle::Particle;
use crate::stats::{Stats, StatsHistory};
use glam::Vec2;
use log::debug;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Ticks between stats history recordings.
const STATS_INTERVAL: u64 = 60;
/// Depth of the strip along the bottom edge that accepts flora.
const GROUND_BAND: f32 = 100.0;
/// Flora roots this far above the bottom edge.
const PLANTING_DEPTH: f32 = 50.0;

/// A fixed light that photosynthetic life steers toward and feeds from.
/// `intensity` doubles as the feeding radius.
#[derive(Clone, Copy, Debug)]
pub struct LightSource {
    pub pos: Vec2,
    pub intensity: f32,
}

/// Kinds of entity the world can spawn on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Wandering,
    Photosynthetic,
    Predator,
    Plant,
    Tree,
}

/// The simulation world
pub struct World {
    // Population
    pub cells: Vec<Cell>,
    pub organisms: Vec<Organism>,

    // Flora
    pub plants: Vec<Plant>,
    pub trees: Vec<Tree>,

    // Effects
    pub particles: Vec<Particle>,

    // Environment
    pub lights: Vec<LightSource>,

    // State
    pub time: f32,
    pub paused: bool,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,

    // Performance tracking
    births_this_tick: usize,
    deaths_this_tick: usize,
    tick: u64,
    frames_this_second: u32,
    fps_clock: Instant,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(mut config: Config, seed: u64) -> Self {
        config.sanitize();

        let lights = config
            .world
            .lights
            .iter()
            .map(|light| LightSource {
                pos: Vec2::new(light.x, light.y),
                intensity: light.intensity,
            })
            .collect();

        let mut world = Self {
            cells: Vec::new(),
            organisms: Vec::new(),
            plants: Vec::new(),
            trees: Vec::new(),
            particles: Vec::new(),
            lights,
            time: 0.0,
            paused: false,
            config,
            stats: Stats::new(),
            stats_history: StatsHistory::new(STATS_INTERVAL),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            births_this_tick: 0,
            deaths_this_tick: 0,
            tick: 0,
            frames_this_second: 0,
            fps_clock: Instant::now(),
        };

        world.populate();
        world
    }

    /// Seed the initial population from the configured counts.
    fn populate(&mut self) {
        self.add_entities(EntityKind::Wandering, self.config.world.initial_wandering);
        self.add_entities(
            EntityKind::Photosynthetic,
            self.config.world.initial_photosynthetic,
        );
        self.add_entities(EntityKind::Predator, self.config.world.initial_predators);
        self.add_entities(EntityKind::Plant, self.config.world.initial_plants);
        self.add_entities(EntityKind::Tree, self.config.world.initial_trees);
    }

    /// Advance the simulation by one tick of `dt` seconds (before the
    /// speed multiplier). A paused world only refreshes its fps figure.
    pub fn update(&mut self, dt: f32) {
        self.refresh_fps();
        if self.paused {
            return;
        }
        self.frames_this_second += 1;

        let dt = dt * self.config.simulation.simulation_speed;
        self.time += dt;
        self.births_this_tick = 0;
        self.deaths_this_tick = 0;

        // Phase 1: free cells (behavior, reaping, reproduction)
        self.update_cells(dt);

        // Phase 2: collisions (merging, bouncing, predation, attachment)
        let outcome = collision::resolve(
            &mut self.cells,
            &mut self.organisms,
            &mut self.particles,
            self.config.simulation.combination_chance,
            &mut self.rng,
        );

        // Phase 3: organisms (springs, behavior, feeding, budding)
        self.update_organisms(dt);

        // Phase 4: flora
        self.update_flora(dt);

        // Phase 5: particles
        self.update_particles(dt);

        // Phase 6: statistics
        self.update_stats(outcome);
    }

    /// Update free cells, reap the starved, then add offspring. Offspring
    /// join after the full pass so they never act in their birth tick.
    fn update_cells(&mut self, dt: f32) {
        let bounds = self.bounds();
        let sightings: Vec<Sighting> = self.cells.iter().map(Cell::sighting).collect();

        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.update(dt, index, &sightings, &self.lights, &mut self.rng);
            cell.clamp_to_bounds(bounds);
        }

        let before = self.cells.len();
        self.cells.retain(Cell::is_alive);
        self.deaths_this_tick += before - self.cells.len();

        let mut offspring = Vec::new();
        for cell in &mut self.cells {
            if cell.can_reproduce() {
                offspring.push(cell.reproduce(&mut self.rng));
            }
        }
        self.births_this_tick += offspring.len();
        self.cells.extend(offspring);
    }

    /// Update organisms against a prey table frozen at phase start, then
    /// settle feed events, bud offspring, and reap dissolved organisms.
    fn update_organisms(&mut self, dt: f32) {
        let bounds = self.bounds();
        let prey = self.prey_table();

        let mut feed_events = Vec::new();
        for (index, organism) in self.organisms.iter_mut().enumerate() {
            organism.update(
                dt,
                index,
                &prey,
                &self.lights,
                bounds,
                &mut feed_events,
                &mut self.rng,
            );
        }

        // Transfers resolve while every index in the table is still live.
        self.apply_feed_events(&feed_events);

        // Budding sees post-feed energy.
        let mut offspring = Vec::new();
        for organism in &mut self.organisms {
            if organism.can_reproduce() {
                offspring.push(organism.reproduce(&mut self.rng));
            }
        }

        let before = self.organisms.len();
        self.organisms.retain(Organism::is_alive);
        let dissolved = before - self.organisms.len();
        if dissolved > 0 {
            debug!("{dissolved} organism(s) dissolved");
        }
        self.deaths_this_tick += dissolved;

        if !offspring.is_empty() {
            debug!("{} organism(s) budded", offspring.len());
        }
        self.births_this_tick += offspring.len();
        self.organisms.extend(offspring);
    }

    /// Everything a hunting organism may chase this tick: live non-predator
    /// cells first, then live non-predator organisms, addressed by index.
    fn prey_table(&self) -> Vec<PreySighting> {
        let mut prey: Vec<PreySighting> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_alive() && !cell.kind.is_predator())
            .map(|(i, cell)| PreySighting {
                prey: PreyRef::Cell(i),
                pos: cell.pos,
                radius: cell.radius(),
                member_count: 1,
            })
            .collect();

        prey.extend(
            self.organisms
                .iter()
                .enumerate()
                .filter(|(_, organism)| organism.is_alive() && !organism.kind.is_predator())
                .map(|(i, organism)| PreySighting {
                    prey: PreyRef::Organism(i),
                    pos: organism.centroid(),
                    radius: organism.bounding_radius(),
                    member_count: organism.member_count(),
                }),
        );

        prey
    }

    /// Settle the tick's feed events in filing order. Organism prey loses
    /// the energy from whichever live member sits closest to the feeder.
    fn apply_feed_events(&mut self, events: &[FeedEvent]) {
        for event in events {
            match event.prey {
                PreyRef::Cell(prey_index) => {
                    let Some(organism) = self.organisms.get_mut(event.organism) else {
                        continue;
                    };
                    let Some(member) = organism.members.get_mut(event.member) else {
                        continue;
                    };
                    let Some(prey) = self.cells.get_mut(prey_index) else {
                        continue;
                    };
                    member.feed_on(prey);
                }
                PreyRef::Organism(prey_index) => {
                    let Some([organism, prey]) =
                        pair_mut(&mut self.organisms, event.organism, prey_index)
                    else {
                        continue;
                    };
                    let Some(member) = organism.members.get_mut(event.member) else {
                        continue;
                    };
                    let Some(prey_key) = prey.nearest_member(member.pos) else {
                        continue;
                    };
                    let Some(prey_member) = prey.members.get_mut(prey_key) else {
                        continue;
                    };
                    member.feed_on(prey_member);
                }
            }
        }
    }

    fn update_flora(&mut self, dt: f32) {
        for plant in &mut self.plants {
            plant.update(dt, &mut self.rng);
        }
        self.plants.retain(Plant::is_alive);

        for tree in &mut self.trees {
            tree.update(dt, &mut self.rng);
        }
        self.trees.retain(Tree::is_alive);
    }

    fn update_particles(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Refresh derived stats and the per-tick event counters.
    fn update_stats(&mut self, outcome: CollisionOutcome) {
        self.stats.births = self.births_this_tick;
        self.stats.deaths = self.deaths_this_tick;
        self.stats.merges = outcome.merges;
        self.stats.attaches = outcome.attaches;
        self.stats.update(
            self.time,
            &self.cells,
            &self.organisms,
            &self.plants,
            &self.trees,
            &self.particles,
        );

        self.tick += 1;
        if self.tick % self.stats_history.interval == 0 {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Close the current fps window once a wall-clock second has passed.
    /// Runs on every call, paused or not, so only executed ticks count.
    fn refresh_fps(&mut self) {
        let elapsed = self.fps_clock.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.stats.fps = self.frames_this_second as f32 / elapsed;
            self.frames_this_second = 0;
            self.fps_clock = Instant::now();
        }
    }

    /// Advance the simulation by `ticks` fixed steps.
    pub fn run(&mut self, ticks: u64, dt: f32) {
        for _ in 0..ticks {
            self.update(dt);
        }
    }

    /// Advance by `ticks` fixed steps, invoking `callback` after each one.
    pub fn run_with_callback<F>(&mut self, ticks: u64, dt: f32, mut callback: F)
    where
        F: FnMut(&World, u64),
    {
        for i in 0..ticks {
            self.update(dt);
            callback(self, i);
        }
    }

    /// Spawn `count` entities of the given kind at random positions.
    /// Flora lands in the ground band; everything else lands anywhere.
    pub fn add_entities(&mut self, kind: EntityKind, count: usize) {
        for _ in 0..count {
            let pos = match kind {
                EntityKind::Plant | EntityKind::Tree => {
                    let x = self.rng.gen::<f32>() * self.config.world.width;
                    self.planting_spot(x)
                }
                _ => self.random_position(),
            };
            self.add_entity_at(kind, pos);
        }
    }

    /// Place one entity at `pos`. Flora only takes root in the ground
    /// band along the bottom edge; a rejected placement returns false.
    pub fn add_entity_at(&mut self, kind: EntityKind, pos: Vec2) -> bool {
        match kind {
            EntityKind::Wandering => self.cells.push(Cell::new(CellKind::Wandering, pos)),
            EntityKind::Photosynthetic => {
                self.cells.push(Cell::new(CellKind::Photosynthetic, pos))
            }
            EntityKind::Predator => self.cells.push(Cell::new(CellKind::Predator, pos)),
            EntityKind::Plant => {
                if !self.in_ground_band(pos) {
                    return false;
                }
                let spot = self.planting_spot(pos.x);
                self.plants.push(Plant::new(spot, &mut self.rng));
            }
            EntityKind::Tree => {
                if !self.in_ground_band(pos) {
                    return false;
                }
                let spot = self.planting_spot(pos.x);
                self.trees.push(Tree::new(spot, &mut self.rng));
            }
        }
        true
    }

    fn in_ground_band(&self, pos: Vec2) -> bool {
        pos.y > self.config.world.height - GROUND_BAND
    }

    /// Flora roots at a fixed depth above the bottom edge.
    fn planting_spot(&self, x: f32) -> Vec2 {
        Vec2::new(x, self.config.world.height - PLANTING_DEPTH)
    }

    /// Uniform position inside the world rectangle.
    fn random_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen::<f32>() * self.config.world.width,
            self.rng.gen::<f32>() * self.config.world.height,
        )
    }

    /// Empty every population collection. The clock keeps its value.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.organisms.clear();
        self.plants.clear();
        self.trees.clear();
        self.particles.clear();
    }

    /// Rewind to a freshly seeded world under the current configuration.
    /// The original seed is reused, so a reset world replays exactly.
    pub fn reset(&mut self) {
        self.clear();
        self.time = 0.0;
        self.tick = 0;
        self.stats = Stats::new();
        self.stats_history = StatsHistory::new(self.stats_history.interval);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.populate();
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the simulation speed multiplier. Invalid values fall to zero.
    pub fn set_speed(&mut self, speed: f32) {
        self.config.simulation.simulation_speed = if speed >= 0.0 { speed } else { 0.0 };
    }

    /// Set the merge probability, clamped into [0, 1].
    pub fn set_combination_chance(&mut self, chance: f32) {
        self.config.simulation.combination_chance = chance.max(0.0).min(1.0);
    }

    /// World rectangle as a (width, height) vector.
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.config.world.width, self.config.world.height)
    }

    /// Free cells plus living organisms.
    pub fn population(&self) -> usize {
        self.cells.len() + self.organisms.len()
    }

    pub fn is_extinct(&self) -> bool {
        self.population() == 0
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Disjoint mutable references into one slice. `None` when the indices
/// collide or fall out of range.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<[&mut T; 2]> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (left, right) = items.split_at_mut(b);
        Some([&mut left[a], &mut right[0]])
    } else {
        let (left, right) = items.split_at_mut(a);
        Some([&mut right[0], &mut left[b]])
    }
}
