//! Population generation - scatter characters uniformly inside a region

use hecs::Entity;
use log::warn;
use rand::Rng;

use crate::components::*;
use crate::grid::Grid;

/// Pick a uniform position inside `region` after clamping it to the board.
/// `None` when the clamped region is empty.
fn random_position_in(grid: &Grid, region: Region, rng: &mut impl Rng) -> Option<Position> {
    if region.width == 0
        || region.height == 0
        || region.x >= grid.width()
        || region.y >= grid.height()
    {
        return None;
    }
    let x_max = region.x.saturating_add(region.width).min(grid.width()) - 1;
    let y_max = region.y.saturating_add(region.height).min(grid.height()) - 1;
    let x = rng.gen_range(region.x..=x_max);
    let y = rng.gen_range(region.y..=y_max);
    Some(Position::new(x as i32, y as i32))
}

/// Spawn `count` civilians of `role` at random cells of `region`
pub fn populate(
    grid: &mut Grid,
    role: CivilianRole,
    count: u32,
    region: Region,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let Some(pos) = random_position_in(grid, region, rng) else {
            warn!(
                "cannot populate {} x{}: region {:?} is off the board",
                role.name(),
                count,
                region
            );
            break;
        };
        if let Some(entity) = grid.spawn_civilian(role, pos) {
            spawned.push(entity);
        }
    }
    spawned
}

/// Spawn `count` undead of random variants at random cells of `region`
pub fn populate_undead(
    grid: &mut Grid,
    count: u32,
    region: Region,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let Some(pos) = random_position_in(grid, region, rng) else {
            warn!("cannot populate {} undead: region {:?} is off the board", count, region);
            break;
        };
        if let Some(entity) = grid.spawn_random_undead(pos, rng) {
            spawned.push(entity);
        }
    }
    spawned
}
