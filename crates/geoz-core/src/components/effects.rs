//! Status effects and inventories.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ResourceKind;

/// Temporary effects; each counts down once per status phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Granted by a defender; not consulted by damage
    Protected,
    /// Attacker self-buff
    Dodging,
    /// Defender self-buff
    Blocking,
    /// Producer self-buff: collect two units per harvest
    DoubleHarvest,
}

impl StatusEffect {
    pub fn duration(self) -> i32 {
        match self {
            StatusEffect::Protected => 3,
            StatusEffect::Dodging => 5,
            StatusEffect::Blocking => 8,
            StatusEffect::DoubleHarvest => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusEffect::Protected => "protected",
            StatusEffect::Dodging => "dodging",
            StatusEffect::Blocking => "blocking",
            StatusEffect::DoubleHarvest => "double harvest",
        }
    }
}

/// Effect -> remaining turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub effects: BTreeMap<StatusEffect, i32>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect for its standard duration, refreshing any running timer
    pub fn apply(&mut self, effect: StatusEffect) {
        self.effects.insert(effect, effect.duration());
    }

    pub fn is_active(&self, effect: StatusEffect) -> bool {
        self.remaining(effect) > 0
    }

    pub fn remaining(&self, effect: StatusEffect) -> i32 {
        self.effects.get(&effect).copied().unwrap_or(0)
    }

    /// Decrement every counter, dropping the ones that run out
    pub fn tick(&mut self) {
        self.effects.retain(|_, turns| {
            *turns -= 1;
            *turns > 0
        });
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Equipment civilians start with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gear {
    Sword,
    Shield,
    Sack,
    ScienceKit,
    Bandages,
    FirstAidKit,
    Map,
}

impl Gear {
    pub fn name(self) -> &'static str {
        match self {
            Gear::Sword => "Sword",
            Gear::Shield => "Shield",
            Gear::Sack => "Sack",
            Gear::ScienceKit => "Science kit",
            Gear::Bandages => "Bandages",
            Gear::FirstAidKit => "First-aid kit",
            Gear::Map => "Map",
        }
    }
}

/// A single inventory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Gear(Gear),
    /// Collected resource units, one entry per harvest
    Haul { kind: ResourceKind, amount: u32 },
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Gear(gear) => write!(f, "{}", gear.name()),
            Item::Haul { kind, amount } => write!(f, "{} x{}", kind.name(), amount),
        }
    }
}

/// Ordered inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn with_gear(gear: &[Gear]) -> Self {
        Self {
            items: gear.iter().map(|g| Item::Gear(*g)).collect(),
        }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Total units of a resource kind collected so far
    pub fn total(&self, kind: ResourceKind) -> u32 {
        self.items
            .iter()
            .map(|item| match item {
                Item::Haul { kind: k, amount } if *k == kind => *amount,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_expire() {
        let mut effects = StatusEffects::new();
        effects.apply(StatusEffect::Protected);
        assert_eq!(effects.remaining(StatusEffect::Protected), 3);

        effects.tick();
        effects.tick();
        assert!(effects.is_active(StatusEffect::Protected));

        effects.tick();
        assert!(!effects.is_active(StatusEffect::Protected));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_inventory_totals() {
        let mut inv = Inventory::with_gear(&[Gear::Sack]);
        inv.push(Item::Haul { kind: ResourceKind::Wood, amount: 2 });
        inv.push(Item::Haul { kind: ResourceKind::Wood, amount: 1 });
        inv.push(Item::Haul { kind: ResourceKind::Water, amount: 1 });
        assert_eq!(inv.total(ResourceKind::Wood), 3);
        assert_eq!(inv.total(ResourceKind::Ore), 0);
        assert_eq!(inv.items[0].to_string(), "Sack");
    }

    #[test]
    fn test_effect_labels() {
        let mut effects = StatusEffects::default();
        effects.apply(StatusEffect::DoubleHarvest);
        let labels: Vec<&str> = effects.effects.keys().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["double harvest"]);
    }
}
