//! Board cells and terrain kinds.

use hecs::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Field,
    Settlement,
    Infested,
    Lake,
    River,
    Forest,
    Mine,
}

impl Terrain {
    /// Single-character map symbol
    pub fn symbol(self) -> char {
        match self {
            Terrain::Settlement => 'C',
            Terrain::Field => 'F',
            Terrain::Infested => 'Z',
            Terrain::Lake => 'L',
            Terrain::River => 'R',
            Terrain::Forest => 'B',
            Terrain::Mine => 'M',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Field => "Open field",
            Terrain::Settlement => "Settlement",
            Terrain::Infested => "Infested zone",
            Terrain::Lake => "Lake",
            Terrain::River => "River",
            Terrain::Forest => "Forest",
            Terrain::Mine => "Mine",
        }
    }
}

/// One board square. Holds handles only; the grid's world owns the entities.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub terrain: Terrain,
    /// Arrival order, which is also the scan order for first-match rules
    pub entities: Vec<Entity>,
}

impl Cell {
    /// Drop the first occurrence of `entity`; returns whether it was present
    pub fn detach(&mut self, entity: Entity) -> bool {
        match self.entities.iter().position(|e| *e == entity) {
            Some(idx) => {
                self.entities.remove(idx);
                true
            }
            None => false,
        }
    }
}
