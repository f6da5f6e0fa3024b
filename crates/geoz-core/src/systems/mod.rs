//! Systems - logic that operates on components

mod behavior;
mod events;
mod interaction;
mod player;
mod status;
mod turn;

pub use behavior::*;
pub use events::*;
pub use interaction::*;
pub use player::*;
pub use status::*;
pub use turn::*;
