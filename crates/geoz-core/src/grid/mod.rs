//! The board: a 2-D array of cells plus the authoritative rosters.
//!
//! Characters and resources live in the `hecs` world owned by the grid.
//! A character is on the board when it sits in exactly one cell's entity list
//! and in the character roster. Removing an entity from the board leaves its
//! components in the world so callers can still inspect what happened to it.

mod cell;
mod terrain;

pub use cell::*;
pub use terrain::*;

use hecs::{Entity, World};
use log::warn;
use rand::Rng;

use crate::components::*;

pub struct Grid {
    /// ECS world containing every character and resource ever placed
    pub world: World,
    width: u32,
    height: u32,
    /// Column-major: index = x * height + y
    cells: Vec<Cell>,
    roster: Vec<Entity>,
    resources: Vec<Entity>,
}

impl Grid {
    /// Create an all-field board
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            world: World::new(),
            width,
            height,
            cells: vec![Cell::default(); (width as usize) * (height as usize)],
            roster: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Reassemble a board from saved parts. `cells` must hold `width * height`
    /// entries in column-major order.
    pub(crate) fn from_parts(
        world: World,
        width: u32,
        height: u32,
        cells: Vec<Cell>,
        roster: Vec<Entity>,
        resources: Vec<Entity>,
    ) -> Self {
        Self {
            world,
            width,
            height,
            cells,
            roster,
            resources,
        }
    }

    /// All cells, column-major
    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.x as usize * self.height as usize + pos.y as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index(pos).map(move |idx| &mut self.cells[idx])
    }

    /// Entities in a cell, in arrival order. Empty for out-of-bounds positions.
    pub fn entities_at(&self, pos: Position) -> &[Entity] {
        self.cell(pos).map(|c| c.entities.as_slice()).unwrap_or(&[])
    }

    pub fn terrain_at(&self, pos: Position) -> Option<Terrain> {
        self.cell(pos).map(|c| c.terrain)
    }

    /// Characters currently on the board, in insertion order
    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    /// Resources currently on the board, in insertion order
    pub fn resources(&self) -> &[Entity] {
        &self.resources
    }

    pub fn is_on_board(&self, entity: Entity) -> bool {
        self.roster.contains(&entity) || self.resources.contains(&entity)
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.world.get::<&Position>(entity).ok().map(|p| *p)
    }

    pub fn role(&self, entity: Entity) -> Option<Role> {
        self.world.get::<&Role>(entity).ok().map(|r| *r)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world
            .get::<&Character>(entity)
            .map(|c| c.alive)
            .unwrap_or(false)
    }

    pub fn is_afflicted(&self, entity: Entity) -> bool {
        self.world
            .get::<&Character>(entity)
            .map(|c| c.afflicted)
            .unwrap_or(false)
    }

    /// Place an existing entity at `pos`. Out-of-bounds placement is logged and ignored.
    pub fn place(&mut self, entity: Entity, pos: Position) -> bool {
        let Some(idx) = self.index(pos) else {
            warn!("position outside the board: {}", pos);
            return false;
        };
        match self.world.get::<&mut Position>(entity) {
            Ok(mut p) => *p = pos,
            Err(_) => {
                warn!("cannot place {:?}: no such entity", entity);
                return false;
            }
        }
        self.cells[idx].entities.push(entity);
        if self.world.get::<&Resource>(entity).is_ok() {
            self.resources.push(entity);
        } else {
            self.roster.push(entity);
        }
        true
    }

    fn spawn_at(&mut self, components: impl hecs::DynamicBundle, pos: Position) -> Option<Entity> {
        if !self.contains(pos) {
            warn!("position outside the board: {}", pos);
            return None;
        }
        let entity = self.world.spawn(components);
        self.place(entity, pos);
        Some(entity)
    }

    /// Spawn a civilian of `role` with its default profile
    pub fn spawn_civilian(&mut self, role: CivilianRole, pos: Position) -> Option<Entity> {
        self.spawn_civilian_with(role, &StatProfile::civilian(role), pos)
    }

    /// Spawn a civilian with an overridden stat profile
    pub fn spawn_civilian_with(
        &mut self,
        role: CivilianRole,
        profile: &StatProfile,
        pos: Position,
    ) -> Option<Entity> {
        let gear: &[Gear] = match role {
            CivilianRole::Ordinary => &[],
            CivilianRole::Attacker => &[Gear::Sword],
            CivilianRole::Defender => &[Gear::Shield],
            CivilianRole::Producer => &[Gear::Sack],
            CivilianRole::Scientist => &[Gear::ScienceKit],
            CivilianRole::Medic => &[Gear::Bandages],
            CivilianRole::Player => &[Gear::FirstAidKit, Gear::Map],
        };
        self.spawn_at(
            (
                pos,
                Character::from_profile(profile, false),
                Role::Civilian(role),
                Civilian::new(profile.energy),
                StatusEffects::new(),
                Inventory::with_gear(gear),
            ),
            pos,
        )
    }

    pub fn spawn_undead(&mut self, variant: UndeadVariant, pos: Position) -> Option<Entity> {
        self.spawn_at(
            (
                pos,
                Character::from_profile(&variant.profile(), true),
                Role::Undead(variant),
                StatusEffects::new(),
                Inventory::default(),
            ),
            pos,
        )
    }

    pub fn spawn_random_undead(&mut self, pos: Position, rng: &mut impl Rng) -> Option<Entity> {
        let variant = UndeadVariant::ALL[rng.gen_range(0..UndeadVariant::ALL.len())];
        self.spawn_undead(variant, pos)
    }

    pub fn spawn_resource(
        &mut self,
        kind: ResourceKind,
        quantity: u32,
        pos: Position,
    ) -> Option<Entity> {
        self.spawn_at((pos, Resource::new(kind, quantity)), pos)
    }

    /// Step an entity by a delta. Leaving the board is a silent no-op.
    pub fn move_entity(&mut self, entity: Entity, dx: i32, dy: i32) -> bool {
        let Some(from) = self.position(entity) else {
            return false;
        };
        let to = from.offset(dx, dy);
        let Some(to_idx) = self.index(to) else {
            return false;
        };
        if let Some(cell) = self.cell_mut(from) {
            cell.detach(entity);
        }
        if let Ok(mut p) = self.world.get::<&mut Position>(entity) {
            *p = to;
        }
        self.cells[to_idx].entities.push(entity);
        true
    }

    /// Move by a delta drawn independently per axis from {-1, 0, +1}
    pub fn random_walk(&mut self, entity: Entity, rng: &mut impl Rng) -> bool {
        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        self.move_entity(entity, dx, dy)
    }

    /// Take an entity off the board. Missing entities are tolerated.
    pub fn remove(&mut self, entity: Entity) {
        self.roster.retain(|e| *e != entity);
        self.resources.retain(|e| *e != entity);
        if let Some(pos) = self.position(entity) {
            if let Some(cell) = self.cell_mut(pos) {
                cell.detach(entity);
            }
        }
    }

    /// Count roster entities matching a role predicate
    pub fn count_roles(&self, pred: impl Fn(Role) -> bool) -> usize {
        self.roster
            .iter()
            .filter_map(|e| self.role(*e))
            .filter(|r| pred(*r))
            .count()
    }

    /// Report roster/cell inconsistencies; empty when the board is sound
    pub fn audit(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for &entity in self.roster.iter().chain(self.resources.iter()) {
            let Some(pos) = self.position(entity) else {
                problems.push(format!("{:?} on roster without a position", entity));
                continue;
            };
            let occurrences: usize = self
                .cells
                .iter()
                .map(|c| c.entities.iter().filter(|e| **e == entity).count())
                .sum();
            let here = self.entities_at(pos).iter().filter(|e| **e == entity).count();
            if occurrences != 1 || here != 1 {
                problems.push(format!(
                    "{:?} at {} appears {} time(s) on the board, {} in its own cell",
                    entity, pos, occurrences, here
                ));
            }
            if self.world.get::<&Character>(entity).is_ok() && !self.is_alive(entity) {
                problems.push(format!("dead {:?} still on the roster at {}", entity, pos));
            }
        }

        for cell in &self.cells {
            for entity in &cell.entities {
                if !self.is_on_board(*entity) {
                    problems.push(format!("{:?} in a cell but on no roster", entity));
                }
            }
        }

        problems
    }
}
