//! Character components: Character, Role, Civilian, and the default stat profiles.

use serde::{Deserialize, Serialize};

/// Turns an infected civilian has left when first infected
pub const INFECTION_TURNS: i32 = 3;

/// Shared attributes of every character (civilians, undead, the player)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub health: i32,
    pub attack: i32,
    /// Flat reduction applied to incoming damage
    pub defense: f32,
    /// Flavor only; turn order never depends on it
    pub speed: f32,
    pub ability: String,
    /// Infected for civilians, always set for undead
    pub afflicted: bool,
    pub alive: bool,
}

impl Character {
    pub fn from_profile(profile: &StatProfile, afflicted: bool) -> Self {
        Self {
            health: profile.health,
            attack: profile.attack,
            defense: profile.resolved_defense(),
            speed: profile.speed,
            ability: profile.ability.clone(),
            afflicted,
            alive: true,
        }
    }

    /// Health as shown to players; never negative
    pub fn display_health(&self) -> i32 {
        self.health.max(0)
    }
}

/// Civilian-only state: energy and the infection countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Civilian {
    pub energy: i32,
    /// Present only while afflicted
    pub infection: Option<i32>,
}

impl Civilian {
    pub fn new(energy: i32) -> Self {
        Self {
            energy,
            infection: None,
        }
    }
}

/// Civilian roles, including the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CivilianRole {
    Ordinary,
    Attacker,
    Defender,
    Producer,
    Scientist,
    Medic,
    /// Acts only on explicit external commands
    Player,
}

impl CivilianRole {
    pub const NPC_ROLES: [CivilianRole; 6] = [
        CivilianRole::Ordinary,
        CivilianRole::Attacker,
        CivilianRole::Defender,
        CivilianRole::Producer,
        CivilianRole::Scientist,
        CivilianRole::Medic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CivilianRole::Ordinary => "Civilian",
            CivilianRole::Attacker => "Attacker",
            CivilianRole::Defender => "Defender",
            CivilianRole::Producer => "Producer",
            CivilianRole::Scientist => "Scientist",
            CivilianRole::Medic => "Medic",
            CivilianRole::Player => "Player",
        }
    }
}

/// Zombie variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UndeadVariant {
    /// Green: infects one civilian in a neighboring cell
    Spitter,
    /// Purple: kills one civilian in its own cell outright
    Crusher,
    /// Yellow: infects up to two civilians in its own cell
    Fast,
}

impl UndeadVariant {
    pub const ALL: [UndeadVariant; 3] = [
        UndeadVariant::Spitter,
        UndeadVariant::Crusher,
        UndeadVariant::Fast,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UndeadVariant::Spitter => "Spitter",
            UndeadVariant::Crusher => "Crusher",
            UndeadVariant::Fast => "Fast",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            UndeadVariant::Spitter => "green",
            UndeadVariant::Crusher => "purple",
            UndeadVariant::Fast => "yellow",
        }
    }

    pub fn profile(self) -> StatProfile {
        match self {
            UndeadVariant::Spitter => StatProfile::new(100, 40, 3.5, "Spit").with_defense(20.0),
            UndeadVariant::Crusher => StatProfile::new(150, 30, 2.0, "Crush").with_defense(75.0),
            UndeadVariant::Fast => StatProfile::new(80, 50, 5.5, "Double attack").with_defense(8.0),
        }
    }
}

/// Role tag - the single discriminant that drives turn dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Civilian(CivilianRole),
    Undead(UndeadVariant),
}

impl Role {
    pub fn is_civilian(self) -> bool {
        matches!(self, Role::Civilian(_))
    }

    pub fn is_undead(self) -> bool {
        matches!(self, Role::Undead(_))
    }

    pub fn is_player(self) -> bool {
        matches!(self, Role::Civilian(CivilianRole::Player))
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Civilian(role) => role.name(),
            Role::Undead(variant) => variant.name(),
        }
    }
}

/// Starting stats for a character; any field may be overridden before spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatProfile {
    pub health: i32,
    pub attack: i32,
    /// Explicit defense; derived from health when `None`
    pub defense: Option<f32>,
    /// Fraction of health used when `defense` is `None`
    pub defense_ratio: f32,
    pub speed: f32,
    pub ability: String,
    pub energy: i32,
}

impl StatProfile {
    pub fn new(health: i32, attack: i32, speed: f32, ability: impl Into<String>) -> Self {
        Self {
            health,
            attack,
            defense: None,
            defense_ratio: 0.1,
            speed,
            ability: ability.into(),
            energy: 0,
        }
    }

    pub fn with_defense(mut self, defense: f32) -> Self {
        self.defense = Some(defense);
        self
    }

    pub fn with_defense_ratio(mut self, ratio: f32) -> Self {
        self.defense_ratio = ratio;
        self
    }

    pub fn with_energy(mut self, energy: i32) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    pub fn resolved_defense(&self) -> f32 {
        self.defense
            .unwrap_or(self.health as f32 * self.defense_ratio)
    }

    /// Default profile for a civilian role
    pub fn civilian(role: CivilianRole) -> Self {
        match role {
            CivilianRole::Ordinary => Self::new(100, 5, 2.5, "Survive").with_energy(50),
            CivilianRole::Attacker => Self::new(100, 40, 5.0, "Dodge")
                .with_defense_ratio(0.2)
                .with_energy(100),
            CivilianRole::Defender => Self::new(100, 20, 3.5, "Block")
                .with_defense_ratio(0.5)
                .with_energy(100),
            CivilianRole::Producer => Self::new(100, 5, 4.0, "Double harvest").with_energy(150),
            CivilianRole::Scientist => Self::new(100, 5, 4.0, "Slow infection").with_energy(100),
            CivilianRole::Medic => Self::new(100, 5, 3.0, "Heal").with_energy(150),
            CivilianRole::Player => Self::new(100, 25, 4.0, "Interact")
                .with_defense_ratio(0.3)
                .with_energy(100),
        }
    }
}
