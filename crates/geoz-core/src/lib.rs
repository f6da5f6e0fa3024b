//! GeoZ Core - Zombie Survival Grid Simulation Engine
//!
//! A turn-based simulation of a settlement surrounded by the undead. Civilians
//! of several roles, three zombie variants and one player-controlled survivor
//! share a board of terrain cells and resource deposits.
//!
//! # Architecture
//!
//! Characters and resources are entities in a `hecs` world owned by the [`grid::Grid`]:
//! - **Grid**: cells with a terrain tag and an arrival-ordered entity list, plus the rosters
//! - **Components**: pure data attached to entities (Position, Character, Role, Civilian, ...)
//! - **Systems**: interaction rules, role policies and the turn orchestrator
//!
//! A turn is a status phase (infection countdowns, effect timers) followed by an
//! action phase in roster order. The player acts between turns.
//!
//! # Example
//!
//! ```rust,no_run
//! use geoz_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(EngineConfig::default());
//! engine.generate(&ScenarioConfig::default());
//!
//! loop {
//!     engine.move_player(Direction::Up);
//!     println!("{}", engine.interact());
//!     for event in engine.advance_turn() {
//!         println!("{}", event.message);
//!     }
//!     if engine.is_game_over() {
//!         break;
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod grid;
pub mod persistence;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{EngineConfig, SimulationEngine};
    pub use crate::generation::ScenarioConfig;
    pub use crate::grid::{Grid, Terrain};
    pub use crate::systems::{EventCategory, SimEvent};
}
