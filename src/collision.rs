//! Pairwise collision resolution over free cells.
//!
//! Two passes per tick: an unordered-pair sweep resolving overlap into
//! merge, bounce, or predation, then an attach sweep that lets surviving
//! cells join organisms of their kind. Structural removals are deferred:
//! cells are flag-marked during the sweeps and filtered at the end, so
//! indices stay valid throughout.

use crate::cell::Cell;
use crate::organism::Organism;
use crate::particle::{self, Particle};
use log::debug;
use rand::Rng;

/// Impulse magnitude each cell of a bouncing pair receives.
const PUSH_FORCE: f32 = 2.0;
/// Feedback particles at the centroid of a fresh merge.
const MERGE_BURST: usize = 10;
/// Feedback particles at the prey on a feed event.
const PREDATION_BURST: usize = 5;
/// Feedback particles where a cell joins an organism.
const ATTACH_BURST: usize = 5;

/// Structural changes produced by one collision pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub merges: usize,
    pub attaches: usize,
}

/// Run both collision passes over the free cells. Merged and attached
/// cells leave the free collection before this returns; cells drained by
/// predation stay in place and are reaped by the next tick's update.
pub fn resolve(
    cells: &mut Vec<Cell>,
    organisms: &mut Vec<Organism>,
    particles: &mut Vec<Particle>,
    combination_chance: f32,
    rng: &mut impl Rng,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let mut consumed = vec![false; cells.len()];

    // Pass 1: unordered pairs in ascending index order. A merged cell is
    // skipped in every later pairing this frame; first match wins.
    for i in 0..cells.len() {
        if consumed[i] {
            continue;
        }
        for j in (i + 1)..cells.len() {
            if consumed[j] {
                continue;
            }

            let distance = cells[i].pos.distance(cells[j].pos);
            if distance >= cells[i].radius() + cells[j].radius() {
                continue;
            }

            let mergeable = cells[i].kind == cells[j].kind && !cells[i].kind.is_predator();
            if mergeable && rng.gen::<f32>() < combination_chance {
                let organism = Organism::from_pair(cells[i].clone(), cells[j].clone());
                let centroid = organism.centroid();
                particle::emit_burst(particles, centroid, cells[i].kind.color(), MERGE_BURST, rng);
                debug!(
                    "merge: two {:?} cells formed an organism at ({:.1}, {:.1})",
                    cells[i].kind, centroid.x, centroid.y
                );
                organisms.push(organism);
                consumed[i] = true;
                consumed[j] = true;
                outcome.merges += 1;
                break;
            }

            bounce_pair(cells, i, j, distance, particles, rng);
        }
    }

    // Pass 2: surviving cells may join an organism of their kind that
    // they touch; one independent draw per candidate organism, scanned in
    // index order, first success wins.
    for (i, cell) in cells.iter().enumerate() {
        if consumed[i] || cell.kind.is_predator() {
            continue;
        }
        for organism in organisms.iter_mut() {
            if organism.kind != cell.kind || !organism.touches(cell.pos, cell.radius()) {
                continue;
            }
            if rng.gen::<f32>() < combination_chance {
                particle::emit_burst(particles, cell.pos, cell.kind.color(), ATTACH_BURST, rng);
                debug!(
                    "attach: {:?} cell joined a {}-member organism",
                    cell.kind,
                    organism.member_count()
                );
                organism.attach(cell.clone());
                consumed[i] = true;
                outcome.attaches += 1;
                break;
            }
        }
    }

    let mut index = 0;
    cells.retain(|_| {
        let keep = !consumed[index];
        index += 1;
        keep
    });

    outcome
}

/// Equal-and-opposite shove along the pair's separation. When exactly one
/// side is a predator it also feeds on the other, win or lose the shove.
fn bounce_pair(
    cells: &mut [Cell],
    i: usize,
    j: usize,
    distance: f32,
    particles: &mut Vec<Particle>,
    rng: &mut impl Rng,
) {
    let (left, right) = cells.split_at_mut(j);
    let a = &mut left[i];
    let b = &mut right[0];

    if distance > 0.0 {
        let normal = (b.pos - a.pos) / distance;
        a.vel -= normal * PUSH_FORCE;
        b.vel += normal * PUSH_FORCE;
    }

    if a.kind.is_predator() != b.kind.is_predator() {
        let (predator, prey) = if a.kind.is_predator() { (a, b) } else { (b, a) };
        predator.feed_on(prey);
        particle::emit_burst(particles, prey.pos, prey.kind.color(), PREDATION_BURST, rng);
    }
}
