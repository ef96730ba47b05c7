//! Free cell kinds and per-tick behavior.
//!
//! A cell is the smallest agent in the simulation. Free cells live in the
//! world's flat collection; merged cells move into an organism's member
//! arena and from then on update only through the organism.

use crate::world::LightSource;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Energy ceiling shared by every cell kind.
pub const MAX_ENERGY: f32 = 100.0;

/// Passive energy drain per simulated second, paid by every cell.
pub(crate) const BASE_METABOLISM: f32 = 0.05;
/// Velocity retained per tick (applied once per tick, not scaled by dt).
pub(crate) const FRICTION: f32 = 0.98;

// Wandering
pub(crate) const PASSIVE_GAIN: f32 = 0.02;

// Photosynthetic
pub(crate) const LIGHT_COMFORT_DISTANCE: f32 = 50.0;
pub(crate) const LIGHT_STEER_FACTOR: f32 = 0.1;
pub(crate) const PHOTO_GAIN: f32 = 0.2;

// Predator
pub(crate) const HUNTING_RANGE: f32 = 150.0;
pub(crate) const PURSUIT_STEER_FACTOR: f32 = 0.15;
pub(crate) const PREDATOR_EXTRA_METABOLISM: f32 = 0.05;
pub(crate) const IDLE_WANDER_CHANCE: f32 = 0.02;
pub(crate) const IDLE_WANDER_FACTOR: f32 = 0.1;

// Reproduction (solitary cells)
pub(crate) const REPRODUCTION_ENERGY_FRACTION: f32 = 0.8;
pub(crate) const REPRODUCTION_COST_FRACTION: f32 = 0.4;
const CELL_REPRODUCTION_MIN_AGE: f32 = 5.0;
const CELL_REPRODUCTION_COOLDOWN: f32 = 10.0;
const OFFSPRING_JITTER: f32 = 10.0;

/// The three cell kinds. Closed set; all dispatch is by match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wandering,
    Photosynthetic,
    Predator,
}

impl CellKind {
    /// Body radius, used for collision and rendering.
    pub fn radius(self) -> f32 {
        match self {
            CellKind::Wandering => 8.0,
            CellKind::Photosynthetic => 10.0,
            CellKind::Predator => 12.0,
        }
    }

    /// Base locomotion speed.
    pub fn speed(self) -> f32 {
        match self {
            CellKind::Wandering => 1.5,
            CellKind::Photosynthetic => 1.0,
            CellKind::Predator => 2.0,
        }
    }

    /// Display color (RGB), also used for feedback particles.
    pub fn color(self) -> [u8; 3] {
        match self {
            CellKind::Wandering => [76, 175, 80],
            CellKind::Photosynthetic => [33, 150, 243],
            CellKind::Predator => [244, 67, 54],
        }
    }

    pub fn is_predator(self) -> bool {
        self == CellKind::Predator
    }
}

/// Position and kind of a cell as seen at the start of the tick.
///
/// Predators hunt against this frame-start view so that scan results do
/// not depend on update order within the tick.
#[derive(Clone, Copy, Debug)]
pub struct Sighting {
    pub kind: CellKind,
    pub pos: Vec2,
}

/// A single cell agent.
#[derive(Clone, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub energy: f32,
    pub age: f32,
    pub reproduction_cooldown: f32,
    /// Seconds until a wandering cell picks a new heading.
    pub direction_timer: f32,
}

impl Cell {
    /// Create a cell of the given kind at full energy.
    pub fn new(kind: CellKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::ZERO,
            energy: MAX_ENERGY,
            age: 0.0,
            reproduction_cooldown: 0.0,
            direction_timer: 0.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.kind.radius()
    }

    pub fn max_energy(&self) -> f32 {
        MAX_ENERGY
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    pub fn sighting(&self) -> Sighting {
        Sighting {
            kind: self.kind,
            pos: self.pos,
        }
    }

    /// Advance this cell by one tick: metabolism, kind behavior, then
    /// integration and friction. `index` identifies this cell within
    /// `sightings` so it never hunts itself.
    pub fn update(
        &mut self,
        dt: f32,
        index: usize,
        sightings: &[Sighting],
        lights: &[LightSource],
        rng: &mut impl Rng,
    ) {
        self.age += dt;
        self.energy -= BASE_METABOLISM * dt;
        self.reproduction_cooldown = (self.reproduction_cooldown - dt).max(0.0);

        match self.kind {
            CellKind::Wandering => self.update_wandering(dt, rng),
            CellKind::Photosynthetic => self.update_photosynthetic(dt, lights),
            CellKind::Predator => self.update_predator(dt, index, sightings, rng),
        }

        self.pos += self.vel * dt;
        self.vel *= FRICTION;
    }

    fn update_wandering(&mut self, dt: f32, rng: &mut impl Rng) {
        self.direction_timer -= dt;
        if self.direction_timer <= 0.0 {
            self.vel = random_heading(rng) * self.kind.speed();
            self.direction_timer = rng.gen_range(2.0..5.0);
        }

        self.energy = (self.energy + PASSIVE_GAIN * dt).min(MAX_ENERGY);
    }

    fn update_photosynthetic(&mut self, dt: f32, lights: &[LightSource]) {
        let light = match lights.first() {
            Some(light) => light,
            None => return,
        };

        let delta = light.pos - self.pos;
        let distance = delta.length();

        if distance > LIGHT_COMFORT_DISTANCE {
            self.vel += (delta / distance) * (self.kind.speed() * LIGHT_STEER_FACTOR);
        }

        if distance < light.intensity {
            let rate = (1.0 - distance / light.intensity) * PHOTO_GAIN;
            self.energy = (self.energy + rate * dt).min(MAX_ENERGY);
        }
    }

    fn update_predator(
        &mut self,
        dt: f32,
        index: usize,
        sightings: &[Sighting],
        rng: &mut impl Rng,
    ) {
        let mut nearest: Option<Vec2> = None;
        let mut nearest_distance = HUNTING_RANGE;

        for (i, other) in sightings.iter().enumerate() {
            if i == index || other.kind.is_predator() {
                continue;
            }
            let distance = self.pos.distance(other.pos);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = Some(other.pos);
            }
        }

        if let Some(target) = nearest {
            if nearest_distance > 0.0 {
                let direction = (target - self.pos) / nearest_distance;
                self.vel += direction * (self.kind.speed() * PURSUIT_STEER_FACTOR);
            }
        } else if rng.gen::<f32>() < IDLE_WANDER_CHANCE {
            self.vel += random_heading(rng) * (self.kind.speed() * IDLE_WANDER_FACTOR);
        }

        // Hunting burns energy on top of the base rate.
        self.energy -= PREDATOR_EXTRA_METABOLISM * dt;
    }

    /// Transfer energy from `prey` to this cell. Feeding is lossy: prey
    /// loses exactly twice what the predator keeps, and the gain is
    /// clamped first so the 1:2 ratio holds even near the energy cap.
    /// Returns the predator's gain.
    pub fn feed_on(&mut self, prey: &mut Cell) -> f32 {
        let gain = (prey.energy * 0.5)
            .min(self.max_energy() - self.energy)
            .max(0.0);
        self.energy += gain;
        prey.energy -= 2.0 * gain;
        gain
    }

    pub fn can_reproduce(&self) -> bool {
        self.energy > REPRODUCTION_ENERGY_FRACTION * self.max_energy()
            && self.age > CELL_REPRODUCTION_MIN_AGE
            && self.reproduction_cooldown <= 0.0
    }

    /// Split off one offspring of the same kind near the parent.
    /// Caller is responsible for checking `can_reproduce` first.
    pub fn reproduce(&mut self, rng: &mut impl Rng) -> Cell {
        self.energy -= REPRODUCTION_COST_FRACTION * self.max_energy();
        self.reproduction_cooldown = CELL_REPRODUCTION_COOLDOWN;

        let jitter = Vec2::new(
            rng.gen_range(-OFFSPRING_JITTER..OFFSPRING_JITTER),
            rng.gen_range(-OFFSPRING_JITTER..OFFSPRING_JITTER),
        );
        Cell::new(self.kind, self.pos + jitter)
    }

    /// Keep the whole body inside the world rectangle.
    pub fn clamp_to_bounds(&mut self, bounds: Vec2) {
        let r = self.radius();
        self.pos = self.pos.clamp(Vec2::splat(r), bounds - Vec2::splat(r));
    }
}

/// Uniformly random unit vector.
pub(crate) fn random_heading(rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_feed_transfer_is_one_to_two() {
        let mut predator = Cell::new(CellKind::Predator, Vec2::ZERO);
        let mut prey = Cell::new(CellKind::Wandering, Vec2::ZERO);
        predator.energy = 50.0;

        let gain = predator.feed_on(&mut prey);

        assert_eq!(gain, 50.0);
        assert_eq!(predator.energy, 100.0);
        assert_eq!(prey.energy, 0.0);
    }

    #[test]
    fn test_feed_gain_clamped_by_headroom() {
        let mut predator = Cell::new(CellKind::Predator, Vec2::ZERO);
        let mut prey = Cell::new(CellKind::Wandering, Vec2::ZERO);
        predator.energy = 90.0;

        let gain = predator.feed_on(&mut prey);

        // Gain is capped at 10 by the cap, so the prey loses 20, not 100.
        assert_eq!(gain, 10.0);
        assert_eq!(predator.energy, 100.0);
        assert_eq!(prey.energy, 80.0);
    }

    #[test]
    fn test_feed_noop_when_predator_full() {
        let mut predator = Cell::new(CellKind::Predator, Vec2::ZERO);
        let mut prey = Cell::new(CellKind::Wandering, Vec2::ZERO);

        let gain = predator.feed_on(&mut prey);

        assert_eq!(gain, 0.0);
        assert_eq!(prey.energy, 100.0);
    }

    #[test]
    fn test_reproduction_requires_age() {
        let mut cell = Cell::new(CellKind::Wandering, Vec2::ZERO);
        cell.energy = 100.0;
        cell.age = 4.9;
        assert!(!cell.can_reproduce());

        cell.age = 5.1;
        assert!(cell.can_reproduce());
    }

    #[test]
    fn test_reproduction_requires_energy_and_cooldown() {
        let mut cell = Cell::new(CellKind::Predator, Vec2::ZERO);
        cell.age = 10.0;

        cell.energy = 80.0; // threshold is strict
        assert!(!cell.can_reproduce());

        cell.energy = 90.0;
        cell.reproduction_cooldown = 1.0;
        assert!(!cell.can_reproduce());

        cell.reproduction_cooldown = 0.0;
        assert!(cell.can_reproduce());
    }

    #[test]
    fn test_reproduce_deducts_energy_and_arms_cooldown() {
        let mut rng = rng();
        let mut cell = Cell::new(CellKind::Photosynthetic, Vec2::new(100.0, 100.0));
        cell.age = 6.0;

        let offspring = cell.reproduce(&mut rng);

        assert_eq!(cell.energy, 60.0);
        assert_eq!(cell.reproduction_cooldown, 10.0);
        assert_eq!(offspring.kind, CellKind::Photosynthetic);
        assert_eq!(offspring.energy, MAX_ENERGY);
        assert_eq!(offspring.age, 0.0);
        assert!((offspring.pos.x - 100.0).abs() <= 10.0);
        assert!((offspring.pos.y - 100.0).abs() <= 10.0);
    }

    #[test]
    fn test_wandering_sets_heading_at_speed() {
        let mut rng = rng();
        let mut cell = Cell::new(CellKind::Wandering, Vec2::new(50.0, 50.0));

        cell.update(0.1, 0, &[], &[], &mut rng);

        // Velocity was set to speed, then one friction pass applied.
        let speed = cell.vel.length() / FRICTION;
        assert!((speed - 1.5).abs() < 1e-4, "speed was {}", speed);
        assert!(cell.direction_timer >= 2.0 - 0.1 && cell.direction_timer < 5.0);
    }

    #[test]
    fn test_photosynthetic_gains_inside_light() {
        let mut rng = rng();
        let light = LightSource {
            pos: Vec2::new(100.0, 100.0),
            intensity: 100.0,
        };
        let mut cell = Cell::new(CellKind::Photosynthetic, Vec2::new(100.0, 100.0));
        cell.energy = 50.0;

        cell.update(1.0, 0, &[], &[light], &mut rng);

        // Full gain at distance zero, minus base metabolism.
        let expected = 50.0 + PHOTO_GAIN - BASE_METABOLISM;
        assert!((cell.energy - expected).abs() < 1e-4);
        // Inside the comfort distance there is no steering.
        assert_eq!(cell.vel, Vec2::ZERO);
    }

    #[test]
    fn test_photosynthetic_steers_toward_far_light() {
        let mut rng = rng();
        let light = LightSource {
            pos: Vec2::new(400.0, 50.0),
            intensity: 100.0,
        };
        let mut cell = Cell::new(CellKind::Photosynthetic, Vec2::new(100.0, 300.0));

        cell.update(0.016, 0, &[], &[light], &mut rng);

        assert!(cell.vel.x > 0.0);
        assert!(cell.vel.y < 0.0);
    }

    #[test]
    fn test_predator_steers_toward_nearest_prey() {
        // High StepRng output keeps the idle-wander draw from firing.
        let mut rng = StepRng::new(u64::MAX, 0);
        let mut cell = Cell::new(CellKind::Predator, Vec2::new(100.0, 100.0));
        let sightings = [
            cell.sighting(),
            Sighting {
                kind: CellKind::Wandering,
                pos: Vec2::new(200.0, 100.0),
            },
            Sighting {
                kind: CellKind::Photosynthetic,
                pos: Vec2::new(120.0, 100.0),
            },
        ];

        cell.update(0.016, 0, &sightings, &[], &mut rng);

        // Steered toward the photosynthetic cell at x=120, the nearer prey.
        assert!(cell.vel.x > 0.0);
        assert_eq!(cell.vel.y, 0.0);
        let steer = cell.vel.x / FRICTION;
        assert!((steer - 2.0 * PURSUIT_STEER_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_predator_ignores_prey_beyond_range() {
        let mut rng = StepRng::new(u64::MAX, 0);
        let mut cell = Cell::new(CellKind::Predator, Vec2::new(100.0, 100.0));
        let sightings = [
            cell.sighting(),
            Sighting {
                kind: CellKind::Wandering,
                pos: Vec2::new(300.0, 100.0),
            },
        ];

        cell.update(0.016, 0, &sightings, &[], &mut rng);

        assert_eq!(cell.vel, Vec2::ZERO);
    }

    #[test]
    fn test_predator_pays_extra_metabolism() {
        let mut rng = StepRng::new(u64::MAX, 0);
        let mut cell = Cell::new(CellKind::Predator, Vec2::new(100.0, 100.0));

        cell.update(1.0, 0, &[], &[], &mut rng);

        let expected = MAX_ENERGY - BASE_METABOLISM - PREDATOR_EXTRA_METABOLISM;
        assert!((cell.energy - expected).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let mut cell = Cell::new(CellKind::Wandering, Vec2::new(-5.0, 700.0));
        cell.clamp_to_bounds(Vec2::new(800.0, 600.0));

        assert_eq!(cell.pos, Vec2::new(8.0, 592.0));
    }
}
