//! Read-only snapshot structures for rendering collaborators.
//!
//! These are lightweight serializable copies of simulation state. A
//! renderer consumes positions, geometry and colors from here and never
//! touches the live world.

use crate::cell::CellKind;
use crate::organism::{MemberKey, Organism};
use crate::stats::Stats;
use crate::world::World;
use serde::Serialize;
use std::collections::HashMap;

/// Lightweight view of a free cell
#[derive(Clone, Debug, Serialize)]
pub struct CellView {
    pub x: f32,
    pub y: f32,
    pub kind: CellKind,
    pub radius: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub color: [u8; 3],
}

/// One organism member, positioned absolutely
#[derive(Clone, Debug, Serialize)]
pub struct MemberView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub energy: f32,
}

/// Lightweight view of an organism with its member graph
#[derive(Clone, Debug, Serialize)]
pub struct OrganismView {
    /// Centroid position
    pub x: f32,
    pub y: f32,
    pub kind: CellKind,
    /// Bounding radius around the centroid
    pub radius: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub color: [u8; 3],
    pub members: Vec<MemberView>,
    /// Spring edges as index pairs into `members`
    pub connections: Vec<(usize, usize)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LeafView {
    pub y: f32,
    pub side: f32,
    pub size: f32,
    pub angle: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlantView {
    pub x: f32,
    pub y: f32,
    pub height: f32,
    pub width: f32,
    pub health: f32,
    pub leaves: Vec<LeafView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BranchView {
    pub y: f32,
    pub side: f32,
    pub length: f32,
    pub angle: f32,
    pub width: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TreeView {
    pub x: f32,
    pub y: f32,
    pub height: f32,
    pub trunk_width: f32,
    pub foliage_radius: f32,
    pub health: f32,
    pub branches: Vec<BranchView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [u8; 3],
    /// Remaining life fraction, 1.0 at emission down to 0.0
    pub alpha: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct LightView {
    pub x: f32,
    pub y: f32,
    pub intensity: f32,
}

/// Complete world snapshot for rendering
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    /// Accumulated simulated seconds
    pub time: f32,
    pub width: f32,
    pub height: f32,
    /// Whether the renderer should draw energy bars
    pub show_energy: bool,
    pub cells: Vec<CellView>,
    pub organisms: Vec<OrganismView>,
    pub plants: Vec<PlantView>,
    pub trees: Vec<TreeView>,
    pub particles: Vec<ParticleView>,
    pub lights: Vec<LightView>,
    pub stats: Stats,
}

impl WorldSnapshot {
    /// Create a snapshot from the current world state
    pub fn from_world(world: &World) -> Self {
        let cells = world
            .cells
            .iter()
            .map(|cell| CellView {
                x: cell.pos.x,
                y: cell.pos.y,
                kind: cell.kind,
                radius: cell.radius(),
                energy: cell.energy,
                max_energy: cell.max_energy(),
                color: cell.kind.color(),
            })
            .collect();

        let organisms = world
            .organisms
            .iter()
            .filter(|o| o.is_alive())
            .map(organism_view)
            .collect();

        let plants = world
            .plants
            .iter()
            .map(|plant| PlantView {
                x: plant.pos.x,
                y: plant.pos.y,
                height: plant.height,
                width: plant.width,
                health: plant.health,
                leaves: plant
                    .leaves
                    .iter()
                    .map(|leaf| LeafView {
                        y: leaf.y,
                        side: leaf.side,
                        size: leaf.size,
                        angle: leaf.angle,
                    })
                    .collect(),
            })
            .collect();

        let trees = world
            .trees
            .iter()
            .map(|tree| TreeView {
                x: tree.pos.x,
                y: tree.pos.y,
                height: tree.height,
                trunk_width: tree.trunk_width,
                foliage_radius: tree.foliage_radius,
                health: tree.health,
                branches: tree
                    .branches
                    .iter()
                    .map(|branch| BranchView {
                        y: branch.y,
                        side: branch.side,
                        length: branch.length,
                        angle: branch.angle,
                        width: branch.width,
                    })
                    .collect(),
            })
            .collect();

        let particles = world
            .particles
            .iter()
            .map(|particle| ParticleView {
                x: particle.pos.x,
                y: particle.pos.y,
                size: particle.size,
                color: particle.color,
                alpha: particle.alpha(),
            })
            .collect();

        let lights = world
            .lights
            .iter()
            .map(|light| LightView {
                x: light.pos.x,
                y: light.pos.y,
                intensity: light.intensity,
            })
            .collect();

        Self {
            time: world.time,
            width: world.config.world.width,
            height: world.config.world.height,
            show_energy: world.config.simulation.show_energy,
            cells,
            organisms,
            plants,
            trees,
            particles,
            lights,
            stats: world.stats.clone(),
        }
    }
}

/// Flatten one organism into a view, remapping connection keys to
/// positions in the member list. Edges whose endpoint is missing from the
/// arena are dropped rather than rendered dangling.
fn organism_view(organism: &Organism) -> OrganismView {
    let centroid = organism.centroid();

    let index_of: HashMap<MemberKey, usize> = organism
        .members
        .keys()
        .enumerate()
        .map(|(index, key)| (key, index))
        .collect();

    let members = organism
        .members
        .values()
        .map(|member| MemberView {
            x: member.pos.x,
            y: member.pos.y,
            radius: member.radius(),
            energy: member.energy,
        })
        .collect();

    let connections = organism
        .connections
        .iter()
        .filter_map(|&(a, b)| Some((*index_of.get(&a)?, *index_of.get(&b)?)))
        .collect();

    OrganismView {
        x: centroid.x,
        y: centroid.y,
        kind: organism.kind,
        radius: organism.bounding_radius(),
        energy: organism.energy(),
        max_energy: organism.max_energy(),
        color: organism.kind.color(),
        members,
        connections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::config::Config;
    use glam::Vec2;

    #[test]
    fn test_snapshot_mirrors_collections() {
        let world = World::new_with_seed(Config::default(), 42);
        let snapshot = WorldSnapshot::from_world(&world);

        assert_eq!(snapshot.cells.len(), world.cells.len());
        assert_eq!(snapshot.plants.len(), 3);
        assert_eq!(snapshot.trees.len(), 2);
        assert_eq!(snapshot.lights.len(), 1);
        assert!(snapshot.organisms.is_empty());
        assert!(snapshot.show_energy);
        assert_eq!(snapshot.width, 800.0);
        assert_eq!(snapshot.height, 600.0);
    }

    #[test]
    fn test_organism_view_remaps_connections() {
        let mut world = World::new_with_seed(Config::default(), 42);
        let mut organism = Organism::from_pair(
            Cell::new(CellKind::Wandering, Vec2::new(100.0, 100.0)),
            Cell::new(CellKind::Wandering, Vec2::new(116.0, 100.0)),
        );
        organism.attach(Cell::new(CellKind::Wandering, Vec2::new(130.0, 100.0)));
        world.organisms.push(organism);

        let snapshot = WorldSnapshot::from_world(&world);

        assert_eq!(snapshot.organisms.len(), 1);
        let view = &snapshot.organisms[0];
        assert_eq!(view.members.len(), 3);
        assert_eq!(view.connections.len(), 2);
        for &(a, b) in &view.connections {
            assert!(a < view.members.len());
            assert!(b < view.members.len());
            assert_ne!(a, b);
        }
        assert_eq!(view.max_energy, 300.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = World::new_with_seed(Config::default(), 42);
        let snapshot = WorldSnapshot::from_world(&world);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"cells\""));
        assert!(json.contains("\"lights\""));
    }
}
