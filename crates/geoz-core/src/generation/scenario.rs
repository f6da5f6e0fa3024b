//! Scenario generation - board layout, terrain and starting population

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::population::{populate, populate_undead};
use crate::components::*;
use crate::grid::Grid;

/// How many civilians of each NPC role to scatter, and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub region: Region,
    pub ordinary: u32,
    pub attackers: u32,
    pub defenders: u32,
    pub producers: u32,
    pub scientists: u32,
    pub medics: u32,
}

impl PopulationConfig {
    /// Role counts in spawn order
    /// Requested head count for one NPC role
    pub fn count_for(&self, role: CivilianRole) -> u32 {
        match role {
            CivilianRole::Ordinary => self.ordinary,
            CivilianRole::Attacker => self.attackers,
            CivilianRole::Defender => self.defenders,
            CivilianRole::Producer => self.producers,
            CivilianRole::Scientist => self.scientists,
            CivilianRole::Medic => self.medics,
            CivilianRole::Player => 0,
        }
    }

    /// Counts in spawn order
    pub fn counts(&self) -> [(CivilianRole, u32); 6] {
        CivilianRole::NPC_ROLES.map(|role| (role, self.count_for(role)))
    }

    pub fn total(&self) -> u32 {
        self.counts().iter().map(|(_, n)| n).sum()
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            region: Region::new(17, 17, 16, 16),
            ordinary: 10,
            attackers: 5,
            defenders: 3,
            producers: 4,
            scientists: 2,
            medics: 3,
        }
    }
}

/// Extra roaming undead scattered over a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndeadPatch {
    pub region: Region,
    pub count: u32,
}

/// Configuration for scenario generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub width: u32,
    pub height: u32,
    pub fields: Vec<Region>,
    pub settlements: Vec<Region>,
    pub infested: Vec<Region>,
    pub lakes: Vec<Region>,
    pub rivers: Vec<Region>,
    pub forests: Vec<Region>,
    pub mines: Vec<Region>,
    pub population: PopulationConfig,
    pub undead: Vec<UndeadPatch>,
    pub player_start: Position,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            fields: Vec::new(),
            settlements: vec![Region::new(17, 17, 16, 16)],
            infested: vec![
                Region::new(0, 0, 5, 5),
                Region::new(45, 0, 5, 5),
                Region::new(0, 45, 5, 5),
                Region::new(45, 45, 5, 5),
            ],
            lakes: vec![
                Region::new(20, 40, 5, 5),
                Region::new(5, 5, 6, 6),
                Region::new(44, 15, 4, 4),
            ],
            rivers: vec![Region::new(7, 14, 30, 2), Region::new(33, 33, 2, 10)],
            forests: vec![Region::new(5, 20, 8, 8), Region::new(35, 5, 10, 10)],
            mines: Vec::new(),
            population: PopulationConfig::default(),
            undead: Vec::new(),
            player_start: Position::new(24, 24),
        }
    }
}

impl ScenarioConfig {
    /// Parse a scenario from JSON; missing fields fall back to the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Build a board from a scenario. The player is not spawned here.
pub fn build_scenario(config: &ScenarioConfig, rng: &mut impl Rng) -> Grid {
    let mut grid = Grid::new(config.width, config.height);

    for &region in &config.fields {
        grid.mark_field_region(region);
    }
    for &region in &config.settlements {
        grid.mark_settlement_region(region);
    }
    for &region in &config.infested {
        grid.mark_infested_region(region, rng);
    }
    for &region in &config.lakes {
        grid.mark_lake_region(region);
    }
    for &region in &config.rivers {
        grid.mark_river_region(region);
    }
    for &region in &config.forests {
        grid.mark_forest_region(region);
    }
    for &region in &config.mines {
        grid.mark_mine_region(region);
    }

    for (role, count) in config.population.counts() {
        populate(&mut grid, role, count, config.population.region, rng);
    }
    for patch in &config.undead {
        populate_undead(&mut grid, patch.count, patch.region, rng);
    }

    grid
}

/// The stock 50x50 map: a central settlement, four infested corners,
/// lakes, rivers and forests
pub fn build_default_scenario(rng: &mut impl Rng) -> Grid {
    build_scenario(&ScenarioConfig::default(), rng)
}
