//! Simulation engine - main entry point for running a game

use std::io::{Read, Write};
use std::path::Path;

use hecs::Entity;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::generation::{build_scenario, ScenarioConfig};
use crate::grid::Grid;
use crate::persistence::{self, LoadedSimulation, SaveError};
use crate::snapshot::{GridSnapshot, PlayerStatus};
use crate::systems::{self, EventCategory, EventLog, SimEvent, DEFAULT_LOG_CAPACITY};

pub const PLAYER_DIED: &str = "The player has died";

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for every random draw the simulation makes
    pub seed: u64,
    /// Frames between turns when driven through [`SimulationEngine::tick`]
    pub frames_per_turn: u32,
    pub event_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            frames_per_turn: 12,
            event_log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Main simulation engine
pub struct SimulationEngine {
    /// The board and every entity on it
    pub grid: Grid,
    /// Bounded message log shown to the player
    pub log: EventLog,
    player: Option<Entity>,
    player_start: Position,
    rng: StdRng,
    config: EngineConfig,
    turn: u64,
    frames_since_turn: u32,
    last_save_ok: bool,
    game_over_reported: bool,
}

impl SimulationEngine {
    /// Create an engine with an empty board
    pub fn new(config: EngineConfig) -> Self {
        Self {
            grid: Grid::new(0, 0),
            log: EventLog::new(config.event_log_capacity),
            player: None,
            player_start: ScenarioConfig::default().player_start,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            turn: 0,
            frames_since_turn: 0,
            last_save_ok: false,
            game_over_reported: false,
        }
    }

    /// Build the board from a scenario and place the player at its start
    pub fn generate(&mut self, scenario: &ScenarioConfig) {
        self.grid = build_scenario(scenario, &mut self.rng);
        self.player_start = scenario.player_start;
        self.player = None;
        self.turn = 0;
        self.frames_since_turn = 0;
        self.game_over_reported = false;
        self.spawn_player(scenario.player_start);
        info!(
            "generated {}x{} board: {} characters, {} resources",
            self.grid.width(),
            self.grid.height(),
            self.grid.roster().len(),
            self.grid.resources().len()
        );
    }

    /// Place a fresh player, replacing any previous one
    pub fn spawn_player(&mut self, pos: Position) -> Option<Entity> {
        if let Some(old) = self.player.take() {
            self.grid.remove(old);
        }
        self.player = self.grid.spawn_civilian(CivilianRole::Player, pos);
        self.player
    }

    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve one turn. Events are returned and also appended to the log.
    pub fn advance_turn(&mut self) -> Vec<SimEvent> {
        let mut events = systems::advance_turn(&mut self.grid, &mut self.rng);
        self.turn += 1;

        if self.is_game_over() && !self.game_over_reported {
            self.game_over_reported = true;
            events.push(SimEvent::new(EventCategory::General, PLAYER_DIED));
            info!("player died on turn {}", self.turn);
        }

        self.log.extend(events.iter().cloned());
        events
    }

    /// Count one rendered frame; runs a turn every `frames_per_turn` frames.
    /// Stops advancing once the game is over.
    pub fn tick(&mut self) -> Option<Vec<SimEvent>> {
        if self.is_game_over() {
            return None;
        }
        self.frames_since_turn += 1;
        if self.frames_since_turn < self.config.frames_per_turn.max(1) {
            return None;
        }
        self.frames_since_turn = 0;
        Some(self.advance_turn())
    }

    pub fn move_player(&mut self, direction: Direction) -> bool {
        match self.player {
            Some(player) => systems::move_player(&mut self.grid, player, direction),
            None => false,
        }
    }

    /// Run the interact command; the result is also logged
    pub fn interact(&mut self) -> String {
        let result = match self.player {
            Some(player) => systems::interact(&mut self.grid, player),
            None => systems::NOTHING_TO_DO.to_string(),
        };
        self.log.push(SimEvent::new(EventCategory::Player, result.clone()));
        result
    }

    pub fn activate_ability(&mut self, entity: Entity) -> Option<StatusEffect> {
        systems::activate_ability(&mut self.grid, entity)
    }

    /// True once the player has died
    pub fn is_game_over(&self) -> bool {
        self.player.is_some_and(|p| !self.grid.is_alive(p))
    }

    pub fn player_status(&self) -> Option<PlayerStatus> {
        PlayerStatus::capture(&self.grid, self.player?, self.last_save_ok)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(&self.grid, self.turn, self.player_status(), self.is_game_over())
    }

    /// Count living civilians on the board, player included
    pub fn civilian_count(&self) -> usize {
        self.grid.count_roles(Role::is_civilian)
    }

    pub fn undead_count(&self) -> usize {
        self.grid.count_roles(Role::is_undead)
    }

    pub fn resource_count(&self) -> usize {
        self.grid.resources().len()
    }

    /// Save game state to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_simulation(writer, &self.grid, self.player, self.turn)
    }

    /// Load game state from a reader
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = persistence::load_simulation(reader)?;
        self.install(loaded);
        Ok(())
    }

    /// Save to a file and record the outcome in the log and status panel
    pub fn save_to_path(&mut self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let result = persistence::save_game(path, &self.grid, self.player, self.turn);
        self.last_save_ok = result.is_ok();
        let message = match &result {
            Ok(()) => "Game saved".to_string(),
            Err(e) => {
                warn!("save failed: {}", e);
                format!("Save failed: {}", e)
            }
        };
        self.log.push(SimEvent::new(EventCategory::Player, message));
        result
    }

    /// Load from a file. `Ok(false)` when there is no save, leaving the
    /// current game untouched.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<bool, SaveError> {
        match persistence::load_game(path)? {
            Some(loaded) => {
                self.install(loaded);
                self.log.push(SimEvent::new(EventCategory::Player, "Game loaded"));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Swap in a loaded game and make sure a living player is on the board
    fn install(&mut self, loaded: LoadedSimulation) {
        self.grid = loaded.grid;
        self.turn = loaded.turn;
        self.player = loaded.player;
        self.frames_since_turn = 0;
        self.rng = StdRng::seed_from_u64(self.config.seed ^ self.turn);

        let player = self.player;
        match player {
            None => {
                warn!("save has no player; placing a new one at {}", self.player_start);
                self.spawn_player(self.player_start);
            }
            Some(player) if self.grid.is_alive(player) && !self.grid.roster().contains(&player) => {
                let pos = self.grid.position(player).unwrap_or(self.player_start);
                warn!("player was off the board; placing at {}", pos);
                if !self.grid.place(player, pos) {
                    self.grid.place(player, self.player_start);
                }
            }
            Some(_) => {}
        }
        self.game_over_reported = self.is_game_over();
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scenario() -> ScenarioConfig {
        ScenarioConfig {
            width: 10,
            height: 10,
            settlements: vec![Region::new(2, 2, 6, 6)],
            infested: vec![Region::new(0, 0, 1, 1)],
            lakes: vec![Region::new(9, 9, 1, 1)],
            rivers: Vec::new(),
            forests: Vec::new(),
            population: crate::generation::PopulationConfig {
                region: Region::new(2, 2, 6, 6),
                ..Default::default()
            },
            player_start: Position::new(5, 5),
            ..Default::default()
        }
    }

    fn kill_player_next_turn(engine: &mut SimulationEngine) {
        let player = engine.player().unwrap();
        let (c, civ) = engine
            .grid
            .world
            .query_one_mut::<(&mut Character, &mut Civilian)>(player)
            .unwrap();
        systems::infect(c, civ);
        civ.infection = Some(1);
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::default();
        assert_eq!(engine.turn(), 0);
        assert!(engine.player().is_none());
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_engine_generation() {
        let mut engine = SimulationEngine::default();
        engine.generate(&ScenarioConfig::default());

        // 27 NPCs plus the player
        assert_eq!(engine.civilian_count(), 28);
        assert_eq!(engine.undead_count(), 400);
        let status = engine.player_status().unwrap();
        assert_eq!(status.position, Position::new(24, 24));
        assert!(!status.last_save_ok);
    }

    #[test]
    fn test_tick_cadence() {
        let mut engine = SimulationEngine::new(EngineConfig {
            frames_per_turn: 3,
            ..Default::default()
        });
        engine.generate(&small_scenario());

        assert!(engine.tick().is_none());
        assert!(engine.tick().is_none());
        assert!(engine.tick().is_some());
        assert_eq!(engine.turn(), 1);
    }

    #[test]
    fn test_game_over_reported_once() {
        let mut engine = SimulationEngine::default();
        engine.generate(&small_scenario());
        kill_player_next_turn(&mut engine);

        let events = engine.advance_turn();
        assert!(engine.is_game_over());
        assert_eq!(events.iter().filter(|e| e.message == PLAYER_DIED).count(), 1);

        engine.advance_turn();
        assert_eq!(engine.log.iter().filter(|e| e.message == PLAYER_DIED).count(), 1);
        assert!(engine.tick().is_none());
        assert!(!engine.move_player(Direction::Up));
    }

    #[test]
    fn test_interact_is_logged() {
        let mut engine = SimulationEngine::default();
        engine.generate(&small_scenario());
        let player = engine.player().unwrap();
        let at = engine.grid.position(player).unwrap();
        engine.grid.spawn_resource(ResourceKind::Wood, 3, at);

        let message = engine.interact();
        assert_eq!(message, "You collected wood");
        assert_eq!(engine.log.recent(1).next().unwrap().category, EventCategory::Player);
    }

    #[test]
    fn test_same_seed_same_game() {
        let run = || {
            let mut engine = SimulationEngine::new(EngineConfig {
                seed: 99,
                ..Default::default()
            });
            engine.generate(&ScenarioConfig::default());
            let mut all = Vec::new();
            for _ in 0..10 {
                all.extend(engine.advance_turn());
            }
            (all, engine.snapshot())
        };
        let (events_a, snap_a) = run();
        let (events_b, snap_b) = run();
        assert_eq!(events_a, events_b);
        assert_eq!(snap_a, snap_b);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut engine = SimulationEngine::default();
        engine.generate(&small_scenario());
        for _ in 0..3 {
            engine.advance_turn();
        }
        let before = engine.snapshot();

        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).expect("Save failed");

        let mut loaded = SimulationEngine::default();
        loaded.load(&save_buffer[..]).expect("Load failed");
        assert_eq!(loaded.turn(), 3);
        assert_eq!(loaded.snapshot(), before);
    }

    #[test]
    fn test_load_without_player_places_one() {
        let mut grid = Grid::new(30, 30);
        grid.spawn_civilian(CivilianRole::Medic, Position::new(1, 1));
        let mut buf = Vec::new();
        persistence::save_simulation(&mut buf, &grid, None, 4).unwrap();

        let mut engine = SimulationEngine::default();
        engine.load(buf.as_slice()).unwrap();
        let player = engine.player().unwrap();
        assert_eq!(engine.grid.position(player), Some(Position::new(24, 24)));
        assert!(engine.grid.roster().contains(&player));
    }
}
