//! Player commands - movement and the interact action

use hecs::Entity;

use super::behavior::{cure_entity, has_stock, is_infected_civilian, is_living_undead, strike};
use super::interaction::{self, Pickup};
use crate::components::{Character, Civilian, Direction, Inventory, Resource};
use crate::grid::Grid;

pub const NOTHING_TO_DO: &str = "Nothing to do here.";
pub const TOO_TIRED: &str = "You are too tired to collect";

/// Step the player one cell. Same bounds rules as any other move.
pub fn move_player(grid: &mut Grid, player: Entity, direction: Direction) -> bool {
    if !grid.is_alive(player) {
        return false;
    }
    let (dx, dy) = direction.delta();
    grid.move_entity(player, dx, dy)
}

/// Resolve everything the player can do in their cell, in order:
/// attack every living undead, cure every infected civilian, then collect
/// from the first resource with stock left.
pub fn interact(grid: &mut Grid, player: Entity) -> String {
    if !grid.is_alive(player) {
        return NOTHING_TO_DO.to_string();
    }
    let Some(at) = grid.position(player) else {
        return NOTHING_TO_DO.to_string();
    };
    let Ok(attack) = grid.world.get::<&Character>(player).map(|c| c.attack) else {
        return NOTHING_TO_DO.to_string();
    };

    let here: Vec<Entity> = grid.entities_at(at).to_vec();
    let mut actions: Vec<String> = Vec::new();

    for &target in &here {
        if !is_living_undead(grid, target) {
            continue;
        }
        if let Some((variant, _, killed)) = strike(grid, target, attack) {
            if killed {
                actions.push(format!("You destroyed a {} zombie", variant.color()));
            } else {
                actions.push(format!("You attacked a {} zombie", variant.color()));
            }
        }
    }

    for &patient in &here {
        if is_infected_civilian(grid, patient) && cure_entity(grid, patient) {
            actions.push("You cured an infected civilian".to_string());
        }
    }

    if let Some(deposit) = here.iter().copied().find(|e| has_stock(grid, *e)) {
        if let Some(message) = collect(grid, player, deposit) {
            actions.push(message);
        }
    }

    if actions.is_empty() {
        NOTHING_TO_DO.to_string()
    } else {
        actions.join(", ")
    }
}

/// Player pickup. A deposit the player empties is taken off the board.
fn collect(grid: &mut Grid, player: Entity, deposit: Entity) -> Option<String> {
    let mut resource = *grid.world.get::<&Resource>(deposit).ok()?;
    let (civilian, inventory) = grid
        .world
        .query_one_mut::<(&mut Civilian, &mut Inventory)>(player)
        .ok()?;

    match interaction::pickup(&mut resource, civilian, inventory) {
        Pickup::Collected(kind) => {
            if let Ok(mut stored) = grid.world.get::<&mut Resource>(deposit) {
                *stored = resource;
            }
            if resource.is_depleted() {
                grid.remove(deposit);
            }
            Some(format!("You collected {}", kind.name()))
        }
        Pickup::TooTired => Some(TOO_TIRED.to_string()),
        Pickup::Empty => None,
    }
}
