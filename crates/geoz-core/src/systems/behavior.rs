//! Role policies - what each kind of character does with its turn.
//!
//! Dispatch is a single `match` over [`Role`]. Each role has an "area action"
//! that looks at its own cell (or, for spitters, the neighboring cells) and
//! applies the interaction rules to the first matching entities in arrival
//! order. The turn orchestrator walks every entity first and then runs the
//! area action; [`act`] runs the full standalone policy for one entity.

use hecs::Entity;
use rand::Rng;

use super::events::{EventCategory, SimEvent};
use super::interaction::{self, SCIENTIST_EXTENSION};
use super::status::tick_entity;
use crate::components::*;
use crate::grid::Grid;

/// Most civilians a fast zombie infects per turn
pub const FAST_INFECTIONS_PER_TURN: usize = 2;

/// Neighbor scan order used by spitters
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Outcome of an attacker's strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    pub target: UndeadVariant,
    pub damage: i32,
    pub killed: bool,
    pub at: Position,
}

fn first_in_cell(
    grid: &Grid,
    pos: Position,
    mut pred: impl FnMut(&Grid, Entity) -> bool,
) -> Option<Entity> {
    grid.entities_at(pos).iter().copied().find(|e| pred(grid, *e))
}

fn is_living_civilian(grid: &Grid, entity: Entity) -> bool {
    grid.role(entity).is_some_and(Role::is_civilian) && grid.is_alive(entity)
}

pub(crate) fn is_living_undead(grid: &Grid, entity: Entity) -> bool {
    grid.role(entity).is_some_and(Role::is_undead) && grid.is_alive(entity)
}

pub(crate) fn is_susceptible_civilian(grid: &Grid, entity: Entity) -> bool {
    grid.role(entity).is_some_and(Role::is_civilian)
        && grid
            .world
            .get::<&Character>(entity)
            .map(|c| interaction::is_susceptible(&c))
            .unwrap_or(false)
}

pub(crate) fn is_infected_civilian(grid: &Grid, entity: Entity) -> bool {
    let Ok(character) = grid.world.get::<&Character>(entity) else {
        return false;
    };
    let Ok(civilian) = grid.world.get::<&Civilian>(entity) else {
        return false;
    };
    interaction::is_infected(&character, &civilian)
}

pub(crate) fn has_stock(grid: &Grid, entity: Entity) -> bool {
    grid.world
        .get::<&Resource>(entity)
        .map(|r| !r.is_depleted())
        .unwrap_or(false)
}

fn role_name(grid: &Grid, entity: Entity) -> &'static str {
    grid.role(entity).map(Role::name).unwrap_or("someone")
}

fn infect_entity(grid: &mut Grid, entity: Entity) -> bool {
    grid.world
        .query_one_mut::<(&mut Character, &mut Civilian)>(entity)
        .map(|(character, civilian)| interaction::infect(character, civilian))
        .unwrap_or(false)
}

pub(crate) fn cure_entity(grid: &mut Grid, entity: Entity) -> bool {
    grid.world
        .query_one_mut::<(&mut Character, &mut Civilian)>(entity)
        .map(|(character, civilian)| interaction::cure(character, civilian))
        .unwrap_or(false)
}

/// Strike the first living undead in the attacker's cell.
/// A lethal hit takes the target off the board immediately.
pub fn attack_in_cell(grid: &mut Grid, attacker: Entity) -> Option<AttackReport> {
    let at = grid.position(attacker)?;
    let attack = grid.world.get::<&Character>(attacker).ok()?.attack;
    let target = first_in_cell(grid, at, is_living_undead)?;
    let (variant, dealt, killed) = strike(grid, target, attack)?;
    Some(AttackReport {
        target: variant,
        damage: dealt,
        killed,
        at,
    })
}

/// Hit one undead with `attack` power; the dead are taken off the board.
/// Returns `(variant, damage dealt, killed)`.
pub(crate) fn strike(
    grid: &mut Grid,
    target: Entity,
    attack: i32,
) -> Option<(UndeadVariant, i32, bool)> {
    let Some(Role::Undead(variant)) = grid.role(target) else {
        return None;
    };
    let (dealt, killed) = {
        let mut character = grid.world.get::<&mut Character>(target).ok()?;
        let dealt = interaction::damage(attack, character.defense);
        (dealt, interaction::apply_damage(&mut character, dealt))
    };
    if killed {
        grid.remove(target);
    }
    Some((variant, dealt, killed))
}

/// Protect the first other living civilian in the defender's cell
pub fn protect_in_cell(grid: &mut Grid, defender: Entity) -> Option<Entity> {
    let at = grid.position(defender)?;
    let target = first_in_cell(grid, at, |g, e| e != defender && is_living_civilian(g, e))?;
    let (character, effects) = grid
        .world
        .query_one_mut::<(&Character, &mut StatusEffects)>(target)
        .ok()?;
    interaction::protect(character, effects).then_some(target)
}

/// Harvest from the first stocked resource in the producer's cell
pub fn harvest_in_cell(grid: &mut Grid, producer: Entity) -> Option<(ResourceKind, u32)> {
    let at = grid.position(producer)?;
    let deposit = first_in_cell(grid, at, has_stock)?;
    let mut resource = *grid.world.get::<&Resource>(deposit).ok()?;

    let (effects, inventory) = grid
        .world
        .query_one_mut::<(&StatusEffects, &mut Inventory)>(producer)
        .ok()?;
    let outcome = interaction::harvest(&mut resource, effects, inventory);

    if let Ok(mut stored) = grid.world.get::<&mut Resource>(deposit) {
        *stored = resource;
    }
    outcome
}

/// Extend the countdown of every infected civilian in the scientist's cell.
/// Returns how many were affected.
pub fn extend_in_cell(grid: &mut Grid, scientist: Entity) -> usize {
    let Some(at) = grid.position(scientist) else {
        return 0;
    };
    let infected: Vec<Entity> = grid
        .entities_at(at)
        .iter()
        .copied()
        .filter(|e| is_infected_civilian(grid, *e))
        .collect();

    for &entity in &infected {
        if let Ok((character, civilian)) = grid
            .world
            .query_one_mut::<(&Character, &mut Civilian)>(entity)
        {
            interaction::extend_infection(character, civilian, SCIENTIST_EXTENSION);
        }
    }
    infected.len()
}

/// Cure the first infected civilian in the medic's cell
pub fn cure_in_cell(grid: &mut Grid, medic: Entity) -> Option<Entity> {
    let at = grid.position(medic)?;
    let patient = first_in_cell(grid, at, is_infected_civilian)?;
    cure_entity(grid, patient).then_some(patient)
}

/// Infect the first susceptible civilian found among the eight neighbors
pub fn spit(grid: &mut Grid, spitter: Entity) -> Option<(Entity, Position)> {
    let at = grid.position(spitter)?;
    let (victim, pos) = NEIGHBOR_OFFSETS.iter().find_map(|&(dx, dy)| {
        let pos = at.offset(dx, dy);
        first_in_cell(grid, pos, is_susceptible_civilian).map(|e| (e, pos))
    })?;
    infect_entity(grid, victim).then_some((victim, pos))
}

/// Kill the first living civilian in the crusher's cell and clear the corpse
pub fn crush(grid: &mut Grid, crusher: Entity) -> Option<Entity> {
    let at = grid.position(crusher)?;
    let victim = first_in_cell(grid, at, is_living_civilian)?;
    let (character, civilian) = grid
        .world
        .query_one_mut::<(&mut Character, &mut Civilian)>(victim)
        .ok()?;
    interaction::kill(character, civilian);
    grid.remove(victim);
    Some(victim)
}

/// Infect up to two susceptible civilians in the fast zombie's cell
pub fn double_attack(grid: &mut Grid, fast: Entity) -> Vec<Entity> {
    let Some(at) = grid.position(fast) else {
        return Vec::new();
    };
    let targets: Vec<Entity> = grid
        .entities_at(at)
        .iter()
        .copied()
        .filter(|e| is_susceptible_civilian(grid, *e))
        .take(FAST_INFECTIONS_PER_TURN)
        .collect();

    targets
        .into_iter()
        .filter(|e| infect_entity(grid, *e))
        .collect()
}

/// Run the role's area action at the entity's current position.
/// Dead entities and the player do nothing.
pub fn area_action(grid: &mut Grid, entity: Entity) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if !grid.is_alive(entity) {
        return events;
    }
    let (Some(role), Some(at)) = (grid.role(entity), grid.position(entity)) else {
        return events;
    };

    match role {
        Role::Civilian(CivilianRole::Ordinary) | Role::Civilian(CivilianRole::Player) => {}
        Role::Civilian(CivilianRole::Medic) => {
            if let Some(patient) = cure_in_cell(grid, entity) {
                events.push(SimEvent::new(
                    EventCategory::Medics,
                    format!("Medic cures {} at {}.", role_name(grid, patient), at),
                ));
            }
        }
        Role::Civilian(CivilianRole::Scientist) => {
            let helped = extend_in_cell(grid, entity);
            if helped > 0 {
                events.push(SimEvent::new(
                    EventCategory::Scientists,
                    format!("Scientist helps {} infected at {}.", helped, at),
                ));
            }
        }
        Role::Civilian(CivilianRole::Producer) => {
            if let Some((kind, amount)) = harvest_in_cell(grid, entity) {
                events.push(SimEvent::new(
                    EventCategory::Producers,
                    format!("Producer at {} collects {}x {}.", at, amount, kind.name()),
                ));
            }
        }
        Role::Civilian(CivilianRole::Attacker) => {
            if let Some(report) = attack_in_cell(grid, entity) {
                events.push(SimEvent::new(
                    EventCategory::Attackers,
                    format!(
                        "Attacker at {} hits {} (-{} health).",
                        report.at,
                        report.target.name(),
                        report.damage
                    ),
                ));
                if report.killed {
                    events.push(SimEvent::new(
                        EventCategory::Attackers,
                        format!("Attacker kills {} at {}.", report.target.name(), report.at),
                    ));
                }
            }
        }
        Role::Civilian(CivilianRole::Defender) => {
            if let Some(ward) = protect_in_cell(grid, entity) {
                events.push(SimEvent::new(
                    EventCategory::Defenders,
                    format!("Defender protects {} at {}.", role_name(grid, ward), at),
                ));
            }
        }
        Role::Undead(UndeadVariant::Spitter) => {
            if let Some((victim, pos)) = spit(grid, entity) {
                events.push(SimEvent::new(
                    EventCategory::Spitter,
                    format!("Spitter zombie infects {} at {}.", role_name(grid, victim), pos),
                ));
            }
        }
        Role::Undead(UndeadVariant::Crusher) => {
            if let Some(victim) = crush(grid, entity) {
                events.push(SimEvent::new(
                    EventCategory::Crusher,
                    format!("Crusher zombie crushes {} at {}.", role_name(grid, victim), at),
                ));
            }
        }
        Role::Undead(UndeadVariant::Fast) => {
            let infected = double_attack(grid, entity);
            if !infected.is_empty() {
                events.push(SimEvent::new(
                    EventCategory::Fast,
                    format!("Fast zombie infects {} civilian(s) at {}.", infected.len(), at),
                ));
            }
        }
    }

    events
}

/// Full standalone policy for one entity: area action, walk and timers in
/// the order each role uses. Undead act in place.
pub fn act(grid: &mut Grid, entity: Entity, rng: &mut impl Rng) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if !grid.is_alive(entity) {
        return events;
    }
    let Some(role) = grid.role(entity) else {
        return events;
    };

    match role {
        Role::Civilian(CivilianRole::Player) => return events,
        Role::Civilian(CivilianRole::Ordinary) => {
            grid.random_walk(entity, rng);
        }
        Role::Civilian(CivilianRole::Defender) => {
            grid.random_walk(entity, rng);
            events.extend(area_action(grid, entity));
        }
        Role::Civilian(_) => {
            events.extend(area_action(grid, entity));
            grid.random_walk(entity, rng);
        }
        Role::Undead(_) => {
            events.extend(area_action(grid, entity));
            return events;
        }
    }

    events.extend(tick_entity(grid, entity));
    events
}

/// Activate a role's self-buff. Returns the effect applied, if the role has one.
pub fn activate_ability(grid: &mut Grid, entity: Entity) -> Option<StatusEffect> {
    if !grid.is_alive(entity) {
        return None;
    }
    let effect = match grid.role(entity)? {
        Role::Civilian(CivilianRole::Attacker) => StatusEffect::Dodging,
        Role::Civilian(CivilianRole::Defender) => StatusEffect::Blocking,
        Role::Civilian(CivilianRole::Producer) => StatusEffect::DoubleHarvest,
        _ => return None,
    };
    let mut effects = grid.world.get::<&mut StatusEffects>(entity).ok()?;
    effects.apply(effect);
    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn infect_now(grid: &mut Grid, entity: Entity) {
        assert!(infect_entity(grid, entity));
    }

    #[test]
    fn test_attacker_kills_weak_undead() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 1);
        let attacker = grid.spawn_civilian(CivilianRole::Attacker, pos).unwrap();
        let zombie = grid.spawn_undead(UndeadVariant::Spitter, pos).unwrap();
        grid.world.get::<&mut Character>(zombie).unwrap().health = 15;

        let report = attack_in_cell(&mut grid, attacker).unwrap();
        assert_eq!(report.damage, 20);
        assert!(report.killed);
        assert!(!grid.is_alive(zombie));
        assert!(!grid.roster().contains(&zombie));
        assert!(!grid.entities_at(pos).contains(&zombie));
    }

    #[test]
    fn test_attacker_cannot_hurt_crusher_armor() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(0, 0);
        let attacker = grid.spawn_civilian(CivilianRole::Attacker, pos).unwrap();
        let crusher = grid.spawn_undead(UndeadVariant::Crusher, pos).unwrap();

        let report = attack_in_cell(&mut grid, attacker).unwrap();
        assert_eq!(report.damage, 0);
        assert!(!report.killed);
        assert_eq!(grid.world.get::<&Character>(crusher).unwrap().health, 150);
    }

    #[test]
    fn test_defender_skips_self_and_protects_first_other() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 1);
        let defender = grid.spawn_civilian(CivilianRole::Defender, pos).unwrap();
        let first = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();
        let second = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();

        assert_eq!(protect_in_cell(&mut grid, defender), Some(first));
        let protected = |e: Entity| {
            grid.world
                .get::<&StatusEffects>(e)
                .unwrap()
                .is_active(StatusEffect::Protected)
        };
        assert!(protected(first));
        assert!(!protected(second));
        assert!(!protected(defender));
    }

    #[test]
    fn test_medic_cures_first_infected_only() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(2, 2);
        let medic = grid.spawn_civilian(CivilianRole::Medic, pos).unwrap();
        let a = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();
        let b = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();
        infect_now(&mut grid, a);
        infect_now(&mut grid, b);

        assert_eq!(cure_in_cell(&mut grid, medic), Some(a));
        assert!(!grid.is_afflicted(a));
        assert!(grid.is_afflicted(b));
    }

    #[test]
    fn test_scientist_extends_every_infected() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(0, 1);
        let scientist = grid.spawn_civilian(CivilianRole::Scientist, pos).unwrap();
        let a = grid.spawn_civilian(CivilianRole::Producer, pos).unwrap();
        let b = grid.spawn_civilian(CivilianRole::Medic, pos).unwrap();
        infect_now(&mut grid, a);
        infect_now(&mut grid, b);

        assert_eq!(extend_in_cell(&mut grid, scientist), 2);
        for e in [a, b] {
            assert_eq!(grid.world.get::<&Civilian>(e).unwrap().infection, Some(5));
        }
    }

    #[test]
    fn test_spitter_infects_one_neighbor() {
        let mut grid = Grid::new(4, 4);
        let spitter = grid.spawn_undead(UndeadVariant::Spitter, Position::new(1, 1)).unwrap();
        let same_cell = grid.spawn_civilian(CivilianRole::Ordinary, Position::new(1, 1)).unwrap();
        let later = grid.spawn_civilian(CivilianRole::Ordinary, Position::new(2, 2)).unwrap();
        let first = grid.spawn_civilian(CivilianRole::Ordinary, Position::new(0, 2)).unwrap();

        assert_eq!(spit(&mut grid, spitter), Some((first, Position::new(0, 2))));
        assert!(grid.is_afflicted(first));
        assert!(!grid.is_afflicted(later));
        assert!(!grid.is_afflicted(same_cell));
    }

    #[test]
    fn test_crusher_kills_and_clears_corpse() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 0);
        let crusher = grid.spawn_undead(UndeadVariant::Crusher, pos).unwrap();
        let victim = grid.spawn_civilian(CivilianRole::Defender, pos).unwrap();
        let bystander = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();

        assert_eq!(crush(&mut grid, crusher), Some(victim));
        assert!(!grid.is_alive(victim));
        assert!(!grid.entities_at(pos).contains(&victim));
        assert!(grid.is_alive(bystander));
        assert!(grid.audit().is_empty());
    }

    #[test]
    fn test_producer_depletes_but_keeps_resource() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 1);
        let producer = grid.spawn_civilian(CivilianRole::Producer, pos).unwrap();
        let ore = grid.spawn_resource(ResourceKind::Ore, 1, pos).unwrap();

        assert_eq!(harvest_in_cell(&mut grid, producer), Some((ResourceKind::Ore, 1)));
        assert_eq!(harvest_in_cell(&mut grid, producer), None);
        assert_eq!(grid.world.get::<&Resource>(ore).unwrap().quantity, 0);
        assert!(grid.resources().contains(&ore));
    }

    #[test]
    fn test_dead_entities_do_nothing() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 1);
        let medic = grid.spawn_civilian(CivilianRole::Medic, pos).unwrap();
        let patient = grid.spawn_civilian(CivilianRole::Ordinary, pos).unwrap();
        infect_now(&mut grid, patient);
        grid.world.get::<&mut Character>(medic).unwrap().alive = false;

        let mut rng = StdRng::seed_from_u64(1);
        assert!(area_action(&mut grid, medic).is_empty());
        assert!(act(&mut grid, medic, &mut rng).is_empty());
        assert!(grid.is_afflicted(patient));
    }

    #[test]
    fn test_act_advances_timers() {
        let mut grid = Grid::new(3, 3);
        let mut rng = StdRng::seed_from_u64(9);
        let civ = grid.spawn_civilian(CivilianRole::Ordinary, Position::new(1, 1)).unwrap();
        infect_now(&mut grid, civ);

        act(&mut grid, civ, &mut rng);
        assert_eq!(grid.world.get::<&Civilian>(civ).unwrap().infection, Some(2));
    }

    #[test]
    fn test_activate_ability() {
        let mut grid = Grid::new(3, 3);
        let producer = grid.spawn_civilian(CivilianRole::Producer, Position::new(0, 0)).unwrap();
        let medic = grid.spawn_civilian(CivilianRole::Medic, Position::new(0, 0)).unwrap();

        assert_eq!(activate_ability(&mut grid, producer), Some(StatusEffect::DoubleHarvest));
        assert_eq!(activate_ability(&mut grid, medic), None);
        assert_eq!(
            grid.world
                .get::<&StatusEffects>(producer)
                .unwrap()
                .remaining(StatusEffect::DoubleHarvest),
            3
        );
    }
}
