//! SeptemberWeb Core - Isometric Town Simulation Engine
//!
//! A real-time simulation of pedestrians, buildings and missile strikes on a
//! 120×120 isometric tile map, advanced by a fixed-timestep loop.
//!
//! # Architecture
//!
//! - **Components**: plain data (buildings, pedestrians, strikes, scars)
//! - **Systems**: the owners that mutate that data every tick
//!   (building registry, pedestrian behavior, population, strike controller)
//! - **Engine**: drains wall-clock time into fixed steps and orders the systems
//!
//! Rendering, audio and asset loading live outside this crate. The engine
//! exposes read-only [`render::RenderFrame`] snapshots, queues
//! [`audio::AudioCue`]s, and asks a [`assets::SpriteAtlas`] for sprite bounds.
//!
//! # Example
//!
//! ```rust,no_run
//! use september_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(SimConfig::default());
//! engine.place_buildings(&[Placement::new(0, 40, 40)]);
//! engine.populate();
//!
//! let atlas = StaticAtlas::with_defaults(engine.map.projection());
//! loop {
//!     engine.advance(1.0 / 60.0);
//!     let _frame = engine.frame(&atlas);
//! }
//! ```

pub mod assets;
pub mod audio;
pub mod components;
pub mod config;
pub mod engine;
pub mod map;
pub mod persistence;
pub mod render;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::assets::{SpriteAtlas, SpriteInfo, StaticAtlas};
    pub use crate::audio::AudioCue;
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::{SimStats, SimulationEngine};
    pub use crate::map::IsoMap;
    pub use september_logic::TilePos;
}
