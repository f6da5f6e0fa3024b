//! Status system - infection countdowns and status-effect timers

use hecs::Entity;

use super::events::{EventCategory, SimEvent};
use super::interaction;
use crate::components::{Character, Civilian, StatusEffects};
use crate::grid::Grid;

/// Advance one entity's timers. Civilians whose infection runs out die here,
/// are taken off the board, and produce a death event.
pub fn tick_entity(grid: &mut Grid, entity: Entity) -> Option<SimEvent> {
    let role = grid.role(entity)?;
    if !role.is_civilian() {
        return None;
    }
    let (character, civilian, effects) = grid
        .world
        .query_one_mut::<(&mut Character, &mut Civilian, &mut StatusEffects)>(entity)
        .ok()?;
    if !character.alive {
        return None;
    }
    if !interaction::tick_civilian(character, civilian, effects) {
        return None;
    }

    let at = grid.position(entity)?;
    grid.remove(entity);
    Some(SimEvent::new(
        EventCategory::General,
        format!("{} died of infection at {}.", role.name(), at),
    ))
}

/// Status phase: tick every civilian (player included) in roster order
pub fn status_phase(grid: &mut Grid) -> Vec<SimEvent> {
    let roster: Vec<Entity> = grid.roster().to_vec();
    roster
        .into_iter()
        .filter_map(|entity| tick_entity(grid, entity))
        .collect()
}
