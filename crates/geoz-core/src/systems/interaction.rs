//! Pure interaction rules - damage, infection, healing, protection, harvesting.
//!
//! Everything here works on component values only; callers fetch the
//! components from the grid and decide what to do with the outcome
//! (logging, removing the dead from the board).

use crate::components::{
    Character, Civilian, Inventory, Item, Resource, ResourceKind, StatusEffect, StatusEffects,
    INFECTION_TURNS,
};

/// Infection turns a scientist adds to each infected civilian they visit
pub const SCIENTIST_EXTENSION: i32 = 2;

/// Damage an attack deals against a defense value. Never negative.
pub fn damage(attack: i32, defense: f32) -> i32 {
    ((attack as f32 - defense) as i32).max(0)
}

/// Apply damage; returns true if this hit killed the target
pub fn apply_damage(target: &mut Character, amount: i32) -> bool {
    if !target.alive {
        return false;
    }
    target.health -= amount.max(0);
    if target.health <= 0 {
        target.alive = false;
        return true;
    }
    false
}

/// Kill a civilian outright, clearing infection
pub fn kill(character: &mut Character, civilian: &mut Civilian) {
    character.alive = false;
    character.afflicted = false;
    civilian.infection = None;
}

/// Whether a civilian can be newly infected
pub fn is_susceptible(character: &Character) -> bool {
    character.alive && !character.afflicted
}

/// Whether a civilian is infected and still alive
pub fn is_infected(character: &Character, civilian: &Civilian) -> bool {
    character.alive && character.afflicted && civilian.infection.is_some()
}

/// Infect a susceptible civilian; returns false if nothing changed
pub fn infect(character: &mut Character, civilian: &mut Civilian) -> bool {
    if !is_susceptible(character) {
        return false;
    }
    character.afflicted = true;
    civilian.infection = Some(INFECTION_TURNS);
    true
}

/// Clear an infection; returns false if the civilian was not infected
pub fn cure(character: &mut Character, civilian: &mut Civilian) -> bool {
    if !(character.alive && character.afflicted) {
        return false;
    }
    character.afflicted = false;
    civilian.infection = None;
    true
}

/// Add turns to a running infection countdown.
///
/// This lengthens the time until death rather than curing; kept as the game
/// has always behaved.
pub fn extend_infection(character: &Character, civilian: &mut Civilian, turns: i32) -> bool {
    match civilian.infection.as_mut() {
        Some(left) if character.alive && character.afflicted => {
            *left += turns;
            true
        }
        _ => false,
    }
}

/// Grant temporary protection to a living civilian
pub fn protect(character: &Character, effects: &mut StatusEffects) -> bool {
    if !character.alive {
        return false;
    }
    effects.apply(StatusEffect::Protected);
    true
}

/// Producer harvest: 1 unit, 2 with double harvest, capped by what is left.
/// Returns `(kind, amount)` or `None` when the deposit is already empty.
pub fn harvest(
    resource: &mut Resource,
    effects: &StatusEffects,
    inventory: &mut Inventory,
) -> Option<(ResourceKind, u32)> {
    if resource.is_depleted() {
        return None;
    }
    let wanted = if effects.is_active(StatusEffect::DoubleHarvest) { 2 } else { 1 };
    let taken = resource.take(wanted);
    inventory.push(Item::Haul {
        kind: resource.kind,
        amount: taken,
    });
    Some((resource.kind, taken))
}

/// Result of a player pickup attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pickup {
    Collected(ResourceKind),
    TooTired,
    Empty,
}

/// Player pickup: one unit, paid for with one point of energy
pub fn pickup(
    resource: &mut Resource,
    civilian: &mut Civilian,
    inventory: &mut Inventory,
) -> Pickup {
    if resource.is_depleted() {
        return Pickup::Empty;
    }
    if civilian.energy <= 0 {
        return Pickup::TooTired;
    }
    let taken = resource.take(1);
    inventory.push(Item::Haul {
        kind: resource.kind,
        amount: taken,
    });
    civilian.energy -= 1;
    Pickup::Collected(resource.kind)
}

/// Advance one status tick for a civilian.
/// Returns true exactly on the tick the infection kills them.
pub fn tick_civilian(
    character: &mut Character,
    civilian: &mut Civilian,
    effects: &mut StatusEffects,
) -> bool {
    let mut died = false;
    if character.alive && character.afflicted {
        if let Some(left) = civilian.infection.as_mut() {
            *left -= 1;
            if *left <= 0 {
                kill(character, civilian);
                died = true;
            }
        }
    }
    effects.tick();
    died
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CivilianRole, StatProfile, UndeadVariant};

    fn civilian() -> (Character, Civilian) {
        let profile = StatProfile::civilian(CivilianRole::Ordinary);
        (Character::from_profile(&profile, false), Civilian::new(profile.energy))
    }

    #[test]
    fn test_damage_never_negative() {
        assert_eq!(damage(40, 20.0), 20);
        assert_eq!(damage(5, 75.0), 0);
        assert_eq!(damage(25, 7.5), 17);
    }

    #[test]
    fn test_lethal_damage_marks_dead_once() {
        let mut fast = Character::from_profile(&UndeadVariant::Fast.profile(), true);
        assert!(!apply_damage(&mut fast, 42));
        assert_eq!(fast.health, 38);
        assert!(apply_damage(&mut fast, 42));
        assert!(!fast.alive);
        assert!(!apply_damage(&mut fast, 42));
    }

    #[test]
    fn test_infect_and_cure() {
        let (mut c, mut civ) = civilian();
        assert!(infect(&mut c, &mut civ));
        assert_eq!(civ.infection, Some(INFECTION_TURNS));
        assert!(!infect(&mut c, &mut civ));
        assert!(cure(&mut c, &mut civ));
        assert!(!c.afflicted);
        assert_eq!(civ.infection, None);
    }

    #[test]
    fn test_infection_countdown_kills_on_zero() {
        let (mut c, mut civ) = civilian();
        let mut effects = StatusEffects::new();
        infect(&mut c, &mut civ);

        assert!(!tick_civilian(&mut c, &mut civ, &mut effects));
        assert_eq!(civ.infection, Some(2));
        assert!(!tick_civilian(&mut c, &mut civ, &mut effects));
        assert!(tick_civilian(&mut c, &mut civ, &mut effects));
        assert!(!c.alive);
        assert!(!c.afflicted);
        assert_eq!(civ.infection, None);
        // Already dead: never dies twice
        assert!(!tick_civilian(&mut c, &mut civ, &mut effects));
    }

    // Documented as-is, not necessarily correct: "helping" prolongs the infection.
    #[test]
    fn test_scientist_extension_lengthens_countdown() {
        let (mut c, mut civ) = civilian();
        infect(&mut c, &mut civ);
        assert!(extend_infection(&c, &mut civ, SCIENTIST_EXTENSION));
        assert_eq!(civ.infection, Some(INFECTION_TURNS + SCIENTIST_EXTENSION));
    }

    #[test]
    fn test_harvest_respects_double_and_remaining() {
        let mut res = Resource::new(ResourceKind::Wood, 3);
        let mut effects = StatusEffects::new();
        let mut inv = Inventory::default();

        assert_eq!(harvest(&mut res, &effects, &mut inv), Some((ResourceKind::Wood, 1)));
        effects.apply(StatusEffect::DoubleHarvest);
        assert_eq!(harvest(&mut res, &effects, &mut inv), Some((ResourceKind::Wood, 2)));
        assert_eq!(res.quantity, 0);
        assert_eq!(harvest(&mut res, &effects, &mut inv), None);
        assert_eq!(inv.total(ResourceKind::Wood), 3);
    }

    #[test]
    fn test_pickup_refuses_when_tired() {
        let (_, mut civ) = civilian();
        civ.energy = 0;
        let mut res = Resource::new(ResourceKind::Water, 5);
        let mut inv = Inventory::default();
        assert_eq!(pickup(&mut res, &mut civ, &mut inv), Pickup::TooTired);
        assert_eq!(res.quantity, 5);
        assert!(inv.items.is_empty());
    }

    #[test]
    fn test_protect_requires_living_target() {
        let (mut c, _) = civilian();
        let mut effects = StatusEffects::new();
        assert!(protect(&c, &mut effects));
        assert_eq!(effects.remaining(StatusEffect::Protected), 3);
        c.alive = false;
        let mut other = StatusEffects::new();
        assert!(!protect(&c, &mut other));
    }
}
