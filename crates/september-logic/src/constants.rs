//! Tuning defaults for the town simulation.
//!
//! The engine's `SimConfig` starts from these values; a JSON config can
//! override any of them.

pub mod map {
    /// Tiles per side of the square grid.
    pub const MAP_SIZE: i32 = 120;
    /// Screen pixels per tile step along the x axis.
    pub const TILE_STEP_X: f64 = 32.0;
    /// Screen pixels per tile step along the y axis.
    pub const TILE_STEP_Y: f64 = 32.0;
    pub const SCREEN_WIDTH: f64 = 1024.0;
    pub const SCREEN_HEIGHT: f64 = 768.0;
    /// Attempts before a random tile search falls back to the map center.
    pub const RANDOM_TILE_ATTEMPTS: u32 = 200;
}

pub mod timing {
    /// Fixed simulation step (48 Hz).
    pub const FIXED_STEP: f64 = 1.0 / 48.0;
    /// Longest wall-clock slice a single `advance` call will simulate.
    pub const MAX_FRAME_TIME: f64 = 0.25;
}

pub mod buildings {
    /// Seconds between regrowth pulses.
    pub const REGROWTH_INTERVAL: f64 = 30.0;
    /// Health restored to each regrowing building per pulse.
    pub const REGROWTH_INCREMENT: i32 = 5;
    /// Health of a fully destroyed building.
    pub const DESTROYED_HEALTH: i32 = -1;
    pub const BLAST_RADIUS: i32 = 3;
    pub const BLAST_CENTER_DAMAGE: i32 = 30;
    pub const BLAST_RING_DECREMENT: i32 = 10;
}

pub mod pedestrians {
    /// Sub-steps a single tile move is divided into.
    pub const PARTS_PER_TILE: u32 = 8;
    /// Seconds per sub-step (a tile takes a third of a second).
    pub const PART_TIME: f64 = 1.0 / 24.0;
    /// Seconds per frame of mourning, conversion and walking clips.
    pub const ANIM_FRAME_TIME: f64 = 1.0 / 12.0;
    pub const MOURN_DURATION: f64 = 3.0;
    pub const DEATH_DURATION: f64 = 30.0;
    /// Maximum +/- jitter applied to the death timer.
    pub const DEATH_JITTER: f64 = 2.0;
    /// Final seconds of the death timer over which a body fades out.
    pub const FADE_DURATION: f64 = 3.0;
}

pub mod population {
    pub const TARGET: usize = 100;
    pub const HOSTILE_FLOOR: usize = 10;
    pub const SPAWN_INTERVAL: f64 = 2.0;
    pub const SPAWN_JITTER: f64 = 1.0;
    pub const MOURNERS_PER_DEATH: usize = 2;
    /// Tiles between a casualty and the spot a mourner walks to.
    pub const MOURN_OFFSET: i32 = 2;
    pub const HOSTILE_RESPAWN_CHANCE: f64 = 0.5;
    pub const DE_ESCALATION_PERIOD: f64 = 90.0;
    pub const REVERSION_QUOTA_START: usize = 1;
    pub const REVERSION_QUOTA_STEP: usize = 1;
    pub const ANIMAL_CHANCE: f64 = 0.05;
    /// Relative draw weights for men, women and kids.
    pub const CIVILIAN_WEIGHTS: [u32; 3] = [4, 4, 2];
}

pub mod strike {
    /// Playback rate of the missile clip, independent of the tick rate.
    pub const FRAME_RATE: f64 = 24.0;
    /// Frame at which the explosion becomes visible.
    pub const EXPLODE_FRAME: u32 = 14;
    /// Frame at which damage is applied.
    pub const DESTRUCT_FRAME: u32 = 18;
    pub const FRAME_COUNT: u32 = 40;
    /// Seconds for a ground scar to fade from opaque to gone.
    pub const SCAR_FADE_TIME: f64 = 20.0;
}
