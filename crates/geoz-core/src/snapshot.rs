//! Read-only views of the board for drivers and renderers.
//!
//! A snapshot copies everything a display needs out of the `hecs` world, so
//! callers never hold borrows into the simulation between turns.

use std::fmt;

use hecs::Entity;
use serde::Serialize;

use crate::components::*;
use crate::grid::{Grid, Terrain};

/// One thing standing in a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntityView {
    Character {
        role: Role,
        /// Clamped to zero for display
        health: i32,
        afflicted: bool,
    },
    Resource {
        kind: ResourceKind,
        quantity: u32,
    },
}

impl EntityView {
    fn capture(grid: &Grid, entity: Entity) -> Option<Self> {
        if let Ok(resource) = grid.world.get::<&Resource>(entity) {
            return Some(EntityView::Resource {
                kind: resource.kind,
                quantity: resource.quantity,
            });
        }
        let role = grid.role(entity)?;
        let character = grid.world.get::<&Character>(entity).ok()?;
        Some(EntityView::Character {
            role,
            health: character.display_health(),
            afflicted: character.afflicted,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub terrain: Terrain,
    /// Arrival order
    pub entities: Vec<EntityView>,
}

/// Player status panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatus {
    pub health: i32,
    pub energy: i32,
    pub alive: bool,
    pub infected: bool,
    /// Turns left before the infection kills
    pub infection_turns: Option<i32>,
    pub position: Position,
    pub inventory: Vec<Item>,
    pub effects: Vec<(StatusEffect, i32)>,
    /// Outcome of the most recent save, `false` before any save
    pub last_save_ok: bool,
}

impl PlayerStatus {
    pub fn capture(grid: &Grid, player: Entity, last_save_ok: bool) -> Option<Self> {
        let position = grid.position(player)?;
        let character = grid.world.get::<&Character>(player).ok()?;
        let civilian = *grid.world.get::<&Civilian>(player).ok()?;
        let inventory = grid
            .world
            .get::<&Inventory>(player)
            .map(|inv| inv.items.clone())
            .unwrap_or_default();
        let effects = grid
            .world
            .get::<&StatusEffects>(player)
            .map(|fx| fx.effects.iter().map(|(e, t)| (*e, *t)).collect())
            .unwrap_or_default();

        Some(Self {
            health: character.display_health(),
            energy: civilian.energy,
            alive: character.alive,
            infected: character.afflicted && civilian.infection.is_some(),
            infection_turns: civilian.infection,
            position,
            inventory,
            effects,
            last_save_ok,
        })
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    pub turn: u64,
    /// Row-major: index = y * width + x
    pub cells: Vec<CellSnapshot>,
    pub player: Option<PlayerStatus>,
    pub game_over: bool,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid, turn: u64, player: Option<PlayerStatus>, game_over: bool) -> Self {
        let mut cells = Vec::with_capacity(grid.width() as usize * grid.height() as usize);
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let pos = Position::new(x, y);
                cells.push(CellSnapshot {
                    terrain: grid.terrain_at(pos).unwrap_or_default(),
                    entities: grid
                        .entities_at(pos)
                        .iter()
                        .filter_map(|e| EntityView::capture(grid, *e))
                        .collect(),
                });
            }
        }
        Self {
            width: grid.width(),
            height: grid.height(),
            turn,
            cells,
            player,
            game_over,
        }
    }

    pub fn cell(&self, pos: Position) -> Option<&CellSnapshot> {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= self.width || pos.y as u32 >= self.height {
            return None;
        }
        self.cells.get(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn count_characters(&self, pred: impl Fn(Role) -> bool) -> usize {
        self.cells
            .iter()
            .flat_map(|c| c.entities.iter())
            .filter(|v| matches!(v, EntityView::Character { role, .. } if pred(*role)))
            .count()
    }
}

/// Terrain symbols, one row per line
impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1) as usize) {
            let symbols: Vec<String> = row.iter().map(|c| c.terrain.symbol().to_string()).collect();
            writeln!(f, "{}", symbols.join(" "))?;
        }
        Ok(())
    }
}
