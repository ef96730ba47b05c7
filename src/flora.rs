//! Ground flora: plants and trees.
//!
//! Flora grows toward a randomized height cap and sprouts decorative
//! sub-structure (leaves, branches) by per-tick probability draws. It
//! never interacts with cells or organisms; the world only anchors it
//! to the ground band and reaps it when health runs out.

use glam::Vec2;
use rand::Rng;

const PLANT_GROWTH_RATE: f32 = 0.5;
const PLANT_MAX_LEAVES: usize = 10;
const LEAF_CHANCE: f32 = 0.01;
/// Leaves only sprout on the stem above this height.
const LEAF_MIN_HEIGHT: f32 = 20.0;

const TREE_GROWTH_RATE: f32 = 0.3;
const TREE_MAX_BRANCHES: usize = 15;
const BRANCH_CHANCE: f32 = 0.005;
const BRANCH_MIN_HEIGHT: f32 = 40.0;
const FOLIAGE_GROWTH_RATE: f32 = 0.2;

/// A leaf on a plant stem. `y` is in world coordinates; `angle` is the
/// current sway, recomputed every tick.
#[derive(Clone, Debug)]
pub struct Leaf {
    pub y: f32,
    pub side: f32,
    pub size: f32,
    pub angle: f32,
}

/// A flowering plant anchored to the ground.
#[derive(Clone, Debug)]
pub struct Plant {
    pub pos: Vec2,
    pub height: f32,
    pub max_height: f32,
    pub width: f32,
    pub age: f32,
    pub leaves: Vec<Leaf>,
    pub health: f32,
}

impl Plant {
    pub fn new(pos: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            height: 5.0,
            max_height: 80.0 + rng.gen::<f32>() * 40.0,
            width: 3.0,
            age: 0.0,
            leaves: Vec::new(),
            health: 100.0,
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) {
        self.age += dt;

        if self.height < self.max_height {
            self.height += PLANT_GROWTH_RATE * dt;
            self.width = 3.0 + (self.height / self.max_height) * 2.0;
        }

        if self.height > LEAF_MIN_HEIGHT
            && self.leaves.len() < PLANT_MAX_LEAVES
            && rng.gen::<f32>() < LEAF_CHANCE
        {
            let leaf_height = rng.gen_range(LEAF_MIN_HEIGHT..self.height);
            self.leaves.push(Leaf {
                y: self.pos.y - leaf_height,
                side: if rng.gen::<bool>() { 1.0 } else { -1.0 },
                size: 5.0 + rng.gen::<f32>() * 5.0,
                angle: rng.gen::<f32>() * 0.5,
            });
        }

        // Sway in the wind.
        for leaf in &mut self.leaves {
            leaf.angle = (self.age + leaf.y).sin() * 0.3;
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// A branch on a tree trunk. `y` is in world coordinates.
#[derive(Clone, Debug)]
pub struct Branch {
    pub y: f32,
    pub side: f32,
    pub length: f32,
    pub angle: f32,
    pub width: f32,
}

/// A tree anchored to the ground, with a growing canopy.
#[derive(Clone, Debug)]
pub struct Tree {
    pub pos: Vec2,
    pub height: f32,
    pub max_height: f32,
    pub trunk_width: f32,
    pub foliage_radius: f32,
    pub age: f32,
    pub branches: Vec<Branch>,
    pub health: f32,
}

impl Tree {
    pub fn new(pos: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            height: 10.0,
            max_height: 150.0 + rng.gen::<f32>() * 100.0,
            trunk_width: 8.0,
            foliage_radius: 0.0,
            age: 0.0,
            branches: Vec::new(),
            health: 100.0,
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) {
        self.age += dt;

        if self.height < self.max_height {
            self.height += TREE_GROWTH_RATE * dt;
            self.trunk_width = 8.0 + (self.height / self.max_height) * 12.0;
        }

        // The canopy trails the trunk, filling out toward 40% of height.
        if self.foliage_radius < self.height * 0.4 {
            self.foliage_radius += FOLIAGE_GROWTH_RATE * dt;
        }

        if self.height > BRANCH_MIN_HEIGHT
            && self.branches.len() < TREE_MAX_BRANCHES
            && rng.gen::<f32>() < BRANCH_CHANCE
        {
            let branch_height = rng.gen_range(BRANCH_MIN_HEIGHT..self.height);
            self.branches.push(Branch {
                y: self.pos.y - branch_height,
                side: if rng.gen::<bool>() { 1.0 } else { -1.0 },
                length: rng.gen_range(20.0..50.0),
                angle: rng.gen_range(0.3..0.8),
                width: rng.gen_range(3.0..6.0),
            });
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn test_plant_grows_toward_cap() {
        let mut rng = rng();
        let mut plant = Plant::new(Vec2::new(100.0, 550.0), &mut rng);
        let cap = plant.max_height;
        assert!((80.0..120.0).contains(&cap));

        for _ in 0..4000 {
            plant.update(0.1, &mut rng);
        }

        assert!(plant.height >= cap);
        assert!(plant.height <= cap + PLANT_GROWTH_RATE * 0.1 + 1e-3);
        assert!(plant.width > 3.0 && plant.width <= 5.01);
    }

    #[test]
    fn test_plant_leaf_cap_and_placement() {
        let mut rng = rng();
        let mut plant = Plant::new(Vec2::new(100.0, 550.0), &mut rng);

        for _ in 0..20_000 {
            plant.update(0.05, &mut rng);
        }

        assert!(plant.leaves.len() <= PLANT_MAX_LEAVES);
        assert!(!plant.leaves.is_empty());
        for leaf in &plant.leaves {
            // Leaves sit on the stem, above the minimum sprout height.
            assert!(leaf.y <= plant.pos.y - LEAF_MIN_HEIGHT);
            assert!(leaf.y >= plant.pos.y - plant.height);
            assert!(leaf.angle.abs() <= 0.3 + 1e-6);
        }
    }

    #[test]
    fn test_tree_branches_only_above_min_height() {
        let mut rng = rng();
        let mut tree = Tree::new(Vec2::new(200.0, 550.0), &mut rng);

        // Below the branch threshold nothing can sprout.
        for _ in 0..50 {
            tree.update(0.1, &mut rng);
        }
        assert!(tree.height < BRANCH_MIN_HEIGHT);
        assert!(tree.branches.is_empty());

        for _ in 0..40_000 {
            tree.update(0.05, &mut rng);
        }
        assert!(tree.branches.len() <= TREE_MAX_BRANCHES);
        assert!(!tree.branches.is_empty());
        for branch in &tree.branches {
            assert!(branch.y <= tree.pos.y - BRANCH_MIN_HEIGHT);
            assert!((20.0..50.0).contains(&branch.length));
            assert!((0.3..0.8).contains(&branch.angle));
        }
    }

    #[test]
    fn test_tree_foliage_trails_height() {
        let mut rng = rng();
        let mut tree = Tree::new(Vec2::new(200.0, 550.0), &mut rng);

        for _ in 0..1000 {
            tree.update(0.1, &mut rng);
        }

        assert!(tree.foliage_radius > 0.0);
        assert!(tree.foliage_radius <= tree.height * 0.4 + FOLIAGE_GROWTH_RATE * 0.1);
    }
}
