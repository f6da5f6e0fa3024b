//! Turn orchestration - status phase, then one action per living entity.

use hecs::Entity;
use log::debug;
use rand::Rng;

use super::behavior::area_action;
use super::events::SimEvent;
use super::status::status_phase;
use crate::grid::Grid;

/// Action phase: every living non-player entity, in roster order, takes one
/// random step and then runs its role's area action at the new position.
pub fn action_phase(grid: &mut Grid, rng: &mut impl Rng) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let roster: Vec<Entity> = grid.roster().to_vec();

    for entity in roster {
        // Earlier actors may have killed this one
        if !grid.is_alive(entity) {
            continue;
        }
        let Some(role) = grid.role(entity) else {
            continue;
        };
        if role.is_player() {
            continue;
        }

        grid.random_walk(entity, rng);
        events.extend(area_action(grid, entity));
    }

    events
}

/// Advance the simulation by one turn and return what happened, in order
pub fn advance_turn(grid: &mut Grid, rng: &mut impl Rng) -> Vec<SimEvent> {
    let mut events = status_phase(grid);
    let deaths = events.len();
    events.extend(action_phase(grid, rng));
    debug!(
        "turn resolved: {} infection death(s), {} event(s), {} on roster",
        deaths,
        events.len(),
        grid.roster().len()
    );
    events
}
