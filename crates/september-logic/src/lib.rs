//! Pure simulation logic for SeptemberWeb.
//!
//! Everything in this crate is independent of the running simulation: plain
//! data in, plain data out. The engine crate (`september-core`) owns all
//! mutable state and calls into these functions every tick, which keeps the
//! math unit-testable on its own.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`blast`] | Square-ring blast damage kernel |
//! | [`buildings`] | Building archetype catalog, damage and regrowth sprite stages |
//! | [`clips`] | Pedestrian archetypes, facings, animation frame tables |
//! | [`constants`] | Map size, timings, population and strike tuning defaults |
//! | [`iso`] | 2:1 isometric projection and its exact inverse |
//! | [`tile`] | Integer tile coordinates and grid distances |

pub mod blast;
pub mod buildings;
pub mod clips;
pub mod constants;
pub mod iso;
pub mod tile;

pub use tile::TilePos;
