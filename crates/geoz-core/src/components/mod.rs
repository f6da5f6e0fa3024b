//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod characters;
mod common;
mod effects;
mod resources;

pub use characters::*;
pub use common::*;
pub use effects::*;
pub use resources::*;
