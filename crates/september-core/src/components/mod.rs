//! Component definitions for the town simulation.
//!
//! Components are plain data. The behavior that mutates them lives in
//! `systems` (building damage, pedestrian state machine, population
//! bookkeeping, strike animation).

mod building;
mod common;
mod pedestrian;
mod strike;

pub use building::*;
pub use common::*;
pub use pedestrian::*;
pub use strike::*;
