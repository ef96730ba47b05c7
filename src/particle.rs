//! Feedback particles emitted on merge, attach, and predation events.
//!
//! Particles are cosmetic: they drift, fall, and fade, but never touch
//! the simulation state of any other entity.

use glam::Vec2;
use rand::Rng;

const INITIAL_LIFE: f32 = 1.0;
const SCATTER_SPEED: f32 = 4.0;
const GRAVITY: f32 = 0.2;

/// A short-lived visual token.
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: [u8; 3],
}

impl Particle {
    /// Spawn a particle at `pos` with a random scatter velocity, carrying
    /// the color of the entity that emitted it.
    pub fn new(pos: Vec2, color: [u8; 3], rng: &mut impl Rng) -> Self {
        Self {
            pos,
            vel: Vec2::new(
                (rng.gen::<f32>() - 0.5) * SCATTER_SPEED,
                (rng.gen::<f32>() - 0.5) * SCATTER_SPEED,
            ),
            life: INITIAL_LIFE,
            max_life: INITIAL_LIFE,
            size: 2.0 + rng.gen::<f32>() * 3.0,
            color,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += GRAVITY * dt;
        self.life -= dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life as a 0..1 fraction, used by renderers for fading.
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Push `count` particles at `pos` in the given color.
pub fn emit_burst(
    particles: &mut Vec<Particle>,
    pos: Vec2,
    color: [u8; 3],
    count: usize,
    rng: &mut impl Rng,
) {
    for _ in 0..count {
        particles.push(Particle::new(pos, color, rng));
    }
}
