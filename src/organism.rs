//! Composite organisms: spring-connected graphs of member cells.
//!
//! An organism owns its members outright; a merged cell's struct moves
//! into the member arena and from then on updates only here. Members live
//! in a slotmap so pruning never leaves dangling indices, and connections
//! are key pairs whose dead endpoints are dropped before forces run.
//! Aggregate quantities (centroid, energy, bounding radius) are derived
//! from the member list on every call, never cached.

use crate::cell::{
    random_heading, Cell, CellKind, BASE_METABOLISM, HUNTING_RANGE, IDLE_WANDER_CHANCE,
    IDLE_WANDER_FACTOR, LIGHT_COMFORT_DISTANCE, LIGHT_STEER_FACTOR, MAX_ENERGY, PASSIVE_GAIN,
    PHOTO_GAIN, PREDATOR_EXTRA_METABOLISM, PURSUIT_STEER_FACTOR, REPRODUCTION_ENERGY_FRACTION,
};
use crate::world::LightSource;
use glam::Vec2;
use rand::Rng;
use slotmap::SlotMap;

/// Rest length of a member connection.
pub(crate) const SPRING_REST_LENGTH: f32 = 16.0;
/// Proportional gain on the connection length error.
pub(crate) const SPRING_STIFFNESS: f32 = 0.5;
/// Velocity retained by every member after the spring pass, once per tick.
pub(crate) const SPRING_DAMPING: f32 = 0.9;

const REPRODUCTION_MIN_AGE: f32 = 8.0;
const REPRODUCTION_COOLDOWN: f32 = 15.0;
/// Flat energy price each member pays when the organism reproduces.
pub(crate) const MEMBER_REPRODUCTION_COST: f32 = 40.0;
const OFFSPRING_JITTER: f32 = 20.0;

slotmap::new_key_type! {
    /// Stable handle to an organism member. Keys survive pruning of other
    /// members; a key whose member died simply stops resolving.
    pub struct MemberKey;
}

/// What a hunting organism may feed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreyRef {
    /// Index into the world's free-cell collection.
    Cell(usize),
    /// Index into the world's organism collection.
    Organism(usize),
}

/// A huntable target, captured at the start of the organism phase so scan
/// results do not depend on update order within the tick. Only
/// non-predator entities are tabled.
#[derive(Clone, Copy, Debug)]
pub struct PreySighting {
    pub prey: PreyRef,
    pub pos: Vec2,
    pub radius: f32,
    /// 1 for free cells; hunting organisms only chase strictly smaller ones.
    pub member_count: usize,
}

/// A pending energy transfer from a prey entity to one organism member.
///
/// Feed events are queued during the organism pass and applied by the
/// world afterwards, so no organism mutates another mid-iteration. Each
/// application re-clamps against the prey's remaining energy.
#[derive(Clone, Copy, Debug)]
pub struct FeedEvent {
    pub organism: usize,
    pub member: MemberKey,
    pub prey: PreyRef,
}

/// A connected group of cells held together by spring connections.
#[derive(Clone, Debug)]
pub struct Organism {
    /// Common kind of every member, fixed at formation.
    pub kind: CellKind,
    pub members: SlotMap<MemberKey, Cell>,
    /// Undirected spring edges between members. Built incrementally, so
    /// the graph is usually a tree but is not required to stay connected.
    pub connections: Vec<(MemberKey, MemberKey)>,
    pub age: f32,
    pub reproduction_cooldown: f32,
    /// Seconds until a wandering organism picks a new shared heading.
    pub direction_timer: f32,
}

impl Organism {
    /// Form a new organism from two founding cells, joined by one
    /// connection. Founders keep their position, velocity and energy;
    /// they are expected to share a kind and the first one's is taken.
    pub fn from_pair(a: Cell, b: Cell) -> Self {
        let kind = a.kind;
        let mut members = SlotMap::with_key();
        let key_a = members.insert(a);
        let key_b = members.insert(b);

        Self {
            kind,
            members,
            connections: vec![(key_a, key_b)],
            age: 0.0,
            reproduction_cooldown: 0.0,
            direction_timer: 0.0,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_alive(&self) -> bool {
        !self.members.is_empty()
    }

    /// Mean member position. Zero for an emptied organism.
    pub fn centroid(&self) -> Vec2 {
        if self.members.is_empty() {
            return Vec2::ZERO;
        }
        let sum: Vec2 = self.members.values().map(|m| m.pos).sum();
        sum / self.members.len() as f32
    }

    /// Total energy across members.
    pub fn energy(&self) -> f32 {
        self.members.values().map(|m| m.energy).sum()
    }

    /// Energy ceiling, 100 per member.
    pub fn max_energy(&self) -> f32 {
        self.members.len() as f32 * MAX_ENERGY
    }

    /// Radius of the smallest centroid-centered circle covering every
    /// member body.
    pub fn bounding_radius(&self) -> f32 {
        let centroid = self.centroid();
        self.members
            .values()
            .map(|m| m.pos.distance(centroid) + m.radius())
            .fold(0.0, f32::max)
    }

    /// Key of the member closest to `pos`.
    pub fn nearest_member(&self, pos: Vec2) -> Option<MemberKey> {
        self.members
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .distance_squared(pos)
                    .total_cmp(&b.pos.distance_squared(pos))
            })
            .map(|(key, _)| key)
    }

    /// Whether a body at `pos` with `radius` overlaps any current member.
    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        self.members
            .values()
            .any(|member| member.pos.distance(pos) < member.radius() + radius)
    }

    /// Absorb a free cell, connecting it to the nearest existing member.
    pub fn attach(&mut self, cell: Cell) {
        let anchor = self.nearest_member(cell.pos);
        let key = self.members.insert(cell);
        if let Some(anchor) = anchor {
            self.connections.push((key, anchor));
        }
    }

    /// Advance this organism by one tick: metabolism and pruning, spring
    /// relaxation, one damping pass, shared kind behavior, then member
    /// integration. `index` is this organism's position in the world's
    /// collection, recorded on any feed events it files.
    pub fn update(
        &mut self,
        dt: f32,
        index: usize,
        prey: &[PreySighting],
        lights: &[LightSource],
        bounds: Vec2,
        feed_events: &mut Vec<FeedEvent>,
        rng: &mut impl Rng,
    ) {
        self.age += dt;
        self.reproduction_cooldown = (self.reproduction_cooldown - dt).max(0.0);

        for member in self.members.values_mut() {
            member.energy -= BASE_METABOLISM * dt;
        }

        // Prune starved members, then every connection that lost an
        // endpoint, before any force is applied.
        self.members.retain(|_, member| member.energy > 0.0);
        let members = &self.members;
        self.connections
            .retain(|&(a, b)| members.contains_key(a) && members.contains_key(b));
        if self.members.is_empty() {
            return;
        }

        self.relax_springs();
        for member in self.members.values_mut() {
            member.vel *= SPRING_DAMPING;
        }

        match self.kind {
            CellKind::Wandering => self.update_wandering(dt, rng),
            CellKind::Photosynthetic => self.update_photosynthetic(dt, lights),
            CellKind::Predator => self.update_predator(dt, index, prey, feed_events, rng),
        }

        for member in self.members.values_mut() {
            member.pos += member.vel * dt;
            member.clamp_to_bounds(bounds);
        }
    }

    /// Pull stretched connections together and push compressed ones
    /// apart, splitting the corrective impulse between both endpoints.
    fn relax_springs(&mut self) {
        for &(a, b) in &self.connections {
            let Some([member_a, member_b]) = self.members.get_disjoint_mut([a, b]) else {
                continue;
            };
            let separation = member_b.pos - member_a.pos;
            let distance = separation.length();
            if distance <= f32::EPSILON {
                continue;
            }
            let error = distance - SPRING_REST_LENGTH;
            let impulse = (separation / distance) * (SPRING_STIFFNESS * error * 0.5);
            member_a.vel += impulse;
            member_b.vel -= impulse;
        }
    }

    fn update_wandering(&mut self, dt: f32, rng: &mut impl Rng) {
        self.direction_timer -= dt;
        if self.direction_timer <= 0.0 {
            let heading = random_heading(rng) * self.kind.speed();
            for member in self.members.values_mut() {
                member.vel = heading;
            }
            self.direction_timer = rng.gen_range(2.0..5.0);
        }

        for member in self.members.values_mut() {
            member.energy = (member.energy + PASSIVE_GAIN * dt).min(MAX_ENERGY);
        }
    }

    fn update_photosynthetic(&mut self, dt: f32, lights: &[LightSource]) {
        let light = match lights.first() {
            Some(light) => light,
            None => return,
        };

        let centroid = self.centroid();
        let delta = light.pos - centroid;
        let distance = delta.length();

        if distance > LIGHT_COMFORT_DISTANCE {
            let impulse = (delta / distance) * (self.kind.speed() * LIGHT_STEER_FACTOR);
            for member in self.members.values_mut() {
                member.vel += impulse;
            }
        }

        if distance < light.intensity {
            let rate = (1.0 - distance / light.intensity) * PHOTO_GAIN;
            for member in self.members.values_mut() {
                member.energy = (member.energy + rate * dt).min(MAX_ENERGY);
            }
        }
    }

    /// Hunt the nearest tabled prey from the centroid. The steering
    /// impulse is shared by every member; contact is checked per member,
    /// so several members may each file a feed event against the same
    /// prey in one tick.
    fn update_predator(
        &mut self,
        dt: f32,
        index: usize,
        prey: &[PreySighting],
        feed_events: &mut Vec<FeedEvent>,
        rng: &mut impl Rng,
    ) {
        let centroid = self.centroid();
        let member_count = self.members.len();

        let mut nearest: Option<&PreySighting> = None;
        let mut nearest_distance = HUNTING_RANGE;

        for sighting in prey {
            let eligible = match sighting.prey {
                PreyRef::Cell(_) => true,
                PreyRef::Organism(i) => i != index && sighting.member_count < member_count,
            };
            if !eligible {
                continue;
            }
            let distance = centroid.distance(sighting.pos);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = Some(sighting);
            }
        }

        if let Some(target) = nearest {
            if nearest_distance > 0.0 {
                let impulse = ((target.pos - centroid) / nearest_distance)
                    * (self.kind.speed() * PURSUIT_STEER_FACTOR);
                for member in self.members.values_mut() {
                    member.vel += impulse;
                }
            }

            for (key, member) in &self.members {
                if member.pos.distance(target.pos) < member.radius() + target.radius {
                    feed_events.push(FeedEvent {
                        organism: index,
                        member: key,
                        prey: target.prey,
                    });
                }
            }
        } else if rng.gen::<f32>() < IDLE_WANDER_CHANCE {
            let impulse = random_heading(rng) * (self.kind.speed() * IDLE_WANDER_FACTOR);
            for member in self.members.values_mut() {
                member.vel += impulse;
            }
        }

        // Hunting burns energy on top of the base rate.
        for member in self.members.values_mut() {
            member.energy -= PREDATOR_EXTRA_METABOLISM * dt;
        }
    }

    pub fn can_reproduce(&self) -> bool {
        self.energy() > REPRODUCTION_ENERGY_FRACTION * self.max_energy()
            && self.age > REPRODUCTION_MIN_AGE
            && self.reproduction_cooldown <= 0.0
    }

    /// Bud off a fresh 2-member organism near the centroid. Every member
    /// pays a flat cost, which can push a low member below zero; such
    /// members are pruned on the next tick. Caller is responsible for
    /// checking `can_reproduce` first.
    pub fn reproduce(&mut self, rng: &mut impl Rng) -> Organism {
        for member in self.members.values_mut() {
            member.energy -= MEMBER_REPRODUCTION_COST;
        }
        self.reproduction_cooldown = REPRODUCTION_COOLDOWN;

        let centroid = self.centroid();
        let a = Cell::new(self.kind, centroid + offspring_jitter(rng));
        let b = Cell::new(self.kind, centroid + offspring_jitter(rng));
        Organism::from_pair(a, b)
    }
}

fn offspring_jitter(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(-OFFSPRING_JITTER..OFFSPRING_JITTER),
        rng.gen_range(-OFFSPRING_JITTER..OFFSPRING_JITTER),
    )
}
