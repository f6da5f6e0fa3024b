//! Save/Load functionality for persisting a game
//!
//! Uses bincode for compact binary serialization. Entity handles are not
//! stable across worlds, so every component set is written out as a
//! `SerializableEntity` and cells and rosters refer to them by index.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use hecs::{Entity, EntityBuilder, World};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::*;
use crate::grid::{Cell, Grid, Terrain};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Default save file name used by drivers
pub const DEFAULT_SAVE_FILE: &str = "geoz_save.bin";

/// Serializable snapshot of a game
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub turn: u64,
    pub width: u32,
    pub height: u32,
    /// Column-major, like the board
    pub terrain: Vec<Terrain>,
    /// Every on-board entity plus the player
    pub entities: Vec<SerializableEntity>,
    /// Per cell, indices into `entities` in arrival order
    pub cells: Vec<Vec<u32>>,
    pub roster: Vec<u32>,
    pub resources: Vec<u32>,
    pub player: Option<u32>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub position: Option<Position>,
    pub character: Option<Character>,
    pub role: Option<Role>,
    pub civilian: Option<Civilian>,
    pub status_effects: Option<StatusEffects>,
    pub inventory: Option<Inventory>,
    pub resource: Option<Resource>,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Encode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupt save: {0}")]
    Corrupt(String),
}

/// Result of loading a game
pub struct LoadedSimulation {
    pub grid: Grid,
    pub player: Option<Entity>,
    pub turn: u64,
}

fn serialize_entity(world: &World, entity: Entity) -> Result<SerializableEntity, SaveError> {
    let entity_ref = world.entity(entity).map_err(|_| {
        SaveError::Corrupt(format!("{:?} is referenced but not in the world", entity))
    })?;

    let mut se = SerializableEntity::default();
    if let Some(c) = entity_ref.get::<&Position>() {
        se.position = Some(*c);
    }
    if let Some(c) = entity_ref.get::<&Character>() {
        se.character = Some((*c).clone());
    }
    if let Some(c) = entity_ref.get::<&Role>() {
        se.role = Some(*c);
    }
    if let Some(c) = entity_ref.get::<&Civilian>() {
        se.civilian = Some(*c);
    }
    if let Some(c) = entity_ref.get::<&StatusEffects>() {
        se.status_effects = Some((*c).clone());
    }
    if let Some(c) = entity_ref.get::<&Inventory>() {
        se.inventory = Some((*c).clone());
    }
    if let Some(c) = entity_ref.get::<&Resource>() {
        se.resource = Some(*c);
    }
    Ok(se)
}

/// Spawn an entity with all its components
fn spawn_entity(world: &mut World, se: SerializableEntity) -> Entity {
    let mut builder = EntityBuilder::new();
    if let Some(c) = se.position {
        builder.add(c);
    }
    if let Some(c) = se.character {
        builder.add(c);
    }
    if let Some(c) = se.role {
        builder.add(c);
    }
    if let Some(c) = se.civilian {
        builder.add(c);
    }
    if let Some(c) = se.status_effects {
        builder.add(c);
    }
    if let Some(c) = se.inventory {
        builder.add(c);
    }
    if let Some(c) = se.resource {
        builder.add(c);
    }
    world.spawn(builder.build())
}

/// Build the save payload. Entities that have left the board are dropped,
/// except the player.
pub fn to_save_data(
    grid: &Grid,
    player: Option<Entity>,
    turn: u64,
) -> Result<SaveData, SaveError> {
    let mut order: Vec<Entity> =
        Vec::with_capacity(grid.roster().len() + grid.resources().len() + 1);
    order.extend_from_slice(grid.roster());
    order.extend_from_slice(grid.resources());
    if let Some(p) = player {
        if !order.contains(&p) {
            order.push(p);
        }
    }
    let index: HashMap<Entity, u32> = order
        .iter()
        .enumerate()
        .map(|(i, e)| (*e, i as u32))
        .collect();
    let lookup = |e: &Entity| -> Result<u32, SaveError> {
        index
            .get(e)
            .copied()
            .ok_or_else(|| SaveError::Corrupt(format!("{:?} is in a cell but on no roster", e)))
    };

    let entities = order
        .iter()
        .map(|e| serialize_entity(&grid.world, *e))
        .collect::<Result<Vec<_>, _>>()?;
    let cells = grid
        .cells()
        .iter()
        .map(|cell| cell.entities.iter().map(lookup).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SaveData {
        version: SAVE_VERSION,
        turn,
        width: grid.width(),
        height: grid.height(),
        terrain: grid.cells().iter().map(|c| c.terrain).collect(),
        entities,
        cells,
        roster: grid.roster().iter().map(lookup).collect::<Result<_, _>>()?,
        resources: grid.resources().iter().map(lookup).collect::<Result<_, _>>()?,
        player: player.map(|p| lookup(&p)).transpose()?,
    })
}

/// Rebuild a board from a save payload
pub fn from_save_data(save_data: SaveData) -> Result<LoadedSimulation, SaveError> {
    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    let cell_count = save_data.width as usize * save_data.height as usize;
    if save_data.terrain.len() != cell_count || save_data.cells.len() != cell_count {
        return Err(SaveError::Corrupt(format!(
            "expected {} cells for a {}x{} board, found {} terrain and {} cell entries",
            cell_count,
            save_data.width,
            save_data.height,
            save_data.terrain.len(),
            save_data.cells.len()
        )));
    }

    let mut world = World::new();
    let spawned: Vec<Entity> = save_data
        .entities
        .into_iter()
        .map(|se| spawn_entity(&mut world, se))
        .collect();
    let resolve = |i: &u32| -> Result<Entity, SaveError> {
        spawned
            .get(*i as usize)
            .copied()
            .ok_or_else(|| SaveError::Corrupt(format!("entity index {} out of range", i)))
    };

    let cells = save_data
        .terrain
        .into_iter()
        .zip(save_data.cells.iter())
        .map(|(terrain, indices)| -> Result<Cell, SaveError> {
            Ok(Cell {
                terrain,
                entities: indices.iter().map(resolve).collect::<Result<_, _>>()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let roster = save_data.roster.iter().map(resolve).collect::<Result<_, _>>()?;
    let resources = save_data.resources.iter().map(resolve).collect::<Result<_, _>>()?;
    let player = save_data.player.as_ref().map(resolve).transpose()?;

    let grid = Grid::from_parts(world, save_data.width, save_data.height, cells, roster, resources);
    let problems = grid.audit();
    if !problems.is_empty() {
        warn!("loaded board has {} inconsistencies: {}", problems.len(), problems.join("; "));
    }

    Ok(LoadedSimulation {
        grid,
        player,
        turn: save_data.turn,
    })
}

/// Save a game to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    grid: &Grid,
    player: Option<Entity>,
    turn: u64,
) -> Result<(), SaveError> {
    let save_data = to_save_data(grid, player, turn)?;
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a game from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    from_save_data(save_data)
}

/// Save a game to a file, replacing any previous save
pub fn save_game(
    path: impl AsRef<Path>,
    grid: &Grid,
    player: Option<Entity>,
    turn: u64,
) -> Result<(), SaveError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    save_simulation(&mut writer, grid, player, turn)?;
    writer.flush()?;
    info!("saved turn {} to {}", turn, path.display());
    Ok(())
}

/// Load a game from a file. A missing file is `Ok(None)`.
pub fn load_game(path: impl AsRef<Path>) -> Result<Option<LoadedSimulation>, SaveError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("no save at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let loaded = load_simulation(BufReader::new(file))?;
    info!("loaded turn {} from {}", loaded.turn, path.display());
    Ok(Some(loaded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::build_default_scenario;
    use crate::systems::advance_turn;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_save_load_roundtrip() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut grid = build_default_scenario(&mut rng);
        let player = grid.spawn_civilian(CivilianRole::Player, Position::new(24, 24));
        for _ in 0..5 {
            advance_turn(&mut grid, &mut rng);
        }

        let mut save_buffer = Vec::new();
        save_simulation(&mut save_buffer, &grid, player, 5).expect("Save failed");
        let loaded = load_simulation(&save_buffer[..]).expect("Load failed");

        assert_eq!(loaded.turn, 5);
        assert_eq!(loaded.grid.roster().len(), grid.roster().len());
        assert_eq!(loaded.grid.resources().len(), grid.resources().len());
        assert_eq!(loaded.grid.render_ascii(), grid.render_ascii());
        assert!(loaded.grid.audit().is_empty());

        // Roster order and per-entity state survive
        for (a, b) in grid.roster().iter().zip(loaded.grid.roster()) {
            assert_eq!(grid.position(*a), loaded.grid.position(*b));
            assert_eq!(grid.role(*a), loaded.grid.role(*b));
            assert_eq!(
                *grid.world.get::<&Character>(*a).unwrap(),
                *loaded.grid.world.get::<&Character>(*b).unwrap()
            );
        }
        let loaded_player = loaded.player.unwrap();
        assert!(loaded.grid.role(loaded_player).unwrap().is_player());
    }

    #[test]
    fn test_cell_order_survives() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 1);
        grid.spawn_resource(ResourceKind::Ore, 7, pos);
        let sick = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();
        grid.spawn_undead(UndeadVariant::Fast, pos);
        {
            let (c, civ) = grid
                .world
                .query_one_mut::<(&mut Character, &mut Civilian)>(sick)
                .unwrap();
            c.afflicted = true;
            civ.infection = Some(2);
        }

        let mut buf = Vec::new();
        save_simulation(&mut buf, &grid, None, 0).unwrap();
        let loaded = load_simulation(buf.as_slice()).unwrap();

        let here = loaded.grid.entities_at(pos);
        assert_eq!(here.len(), 3);
        assert_eq!(loaded.grid.world.get::<&Resource>(here[0]).unwrap().quantity, 7);
        assert_eq!(loaded.grid.world.get::<&Civilian>(here[1]).unwrap().infection, Some(2));
        assert_eq!(loaded.grid.role(here[2]), Some(Role::Undead(UndeadVariant::Fast)));
        assert!(loaded.player.is_none());
    }

    #[test]
    fn test_version_mismatch() {
        let grid = Grid::new(2, 2);
        let mut data = to_save_data(&grid, None, 0).unwrap();
        data.version = SAVE_VERSION + 1;
        let buf = bincode::serialize(&data).unwrap();
        match load_simulation(buf.as_slice()) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_corrupt_indices_rejected() {
        let mut grid = Grid::new(2, 2);
        grid.spawn_civilian(CivilianRole::Ordinary, Position::new(0, 0));
        let mut data = to_save_data(&grid, None, 0).unwrap();
        data.roster = vec![9];
        assert!(matches!(from_save_data(data), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn test_garbage_is_an_error() {
        let garbage = [0xffu8; 6];
        assert!(load_simulation(&garbage[..]).is_err());
    }
}
