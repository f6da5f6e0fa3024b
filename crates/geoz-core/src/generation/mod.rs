//! Generation - scenario layout and population

mod population;
mod scenario;

pub use population::*;
pub use scenario::*;
