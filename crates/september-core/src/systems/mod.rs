//! Systems - the owners that mutate component data every tick

mod behavior;
mod buildings;
mod population;
mod strike;

pub use buildings::*;
pub use population::*;
pub use strike::*;
