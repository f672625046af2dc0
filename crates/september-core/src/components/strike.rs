//! Strike components: the in-flight missile and the scars it leaves behind.

use serde::{Deserialize, Serialize};

use september_logic::TilePos;

use super::ScreenOffset;
use crate::config::StrikeConfig;

/// Animation phase of a strike, derived from its current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikePhase {
    Flying,
    Exploding,
    Destructing,
    Finished,
}

/// The single active missile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    pub target: TilePos,
    /// Pixel offset of the tapped point from the target tile's center.
    pub offset: ScreenOffset,
    /// Seconds since launch.
    pub elapsed: f64,
    pub frame: u32,
    /// Explosion visuals have started.
    pub exploded: bool,
    /// Damage has been dealt. Set exactly once.
    pub destruction_applied: bool,
}

impl Strike {
    pub fn new(target: TilePos, offset: ScreenOffset) -> Self {
        Self {
            target,
            offset,
            elapsed: 0.0,
            frame: 0,
            exploded: false,
            destruction_applied: false,
        }
    }

    pub fn phase(&self, cfg: &StrikeConfig) -> StrikePhase {
        if self.frame >= cfg.frame_count {
            StrikePhase::Finished
        } else if self.frame >= cfg.destruct_frame {
            StrikePhase::Destructing
        } else if self.frame >= cfg.explode_frame {
            StrikePhase::Exploding
        } else {
            StrikePhase::Flying
        }
    }

    /// Sprite identifier for the current animation frame.
    pub fn sprite_id(&self) -> String {
        format!("missile_{:03}", self.frame)
    }
}

/// Decaying mark left at an impact point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundScar {
    pub tile: TilePos,
    pub offset: ScreenOffset,
    pub opacity: f32,
}

impl GroundScar {
    pub fn new(tile: TilePos, offset: ScreenOffset) -> Self {
        Self {
            tile,
            offset,
            opacity: 1.0,
        }
    }

    pub const SPRITE: &'static str = "scar";

    /// Fade linearly; returns false once fully transparent.
    pub fn fade(&mut self, dt: f64, fade_time: f64) -> bool {
        if fade_time <= 0.0 {
            self.opacity = 0.0;
        } else {
            self.opacity = (f64::from(self.opacity) - dt / fade_time).max(0.0) as f32;
        }
        self.opacity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_follows_frame() {
        let cfg = StrikeConfig::default();
        let mut strike = Strike::new(TilePos::new(3, 3), ScreenOffset::ZERO);
        assert_eq!(strike.phase(&cfg), StrikePhase::Flying);
        strike.frame = cfg.explode_frame;
        assert_eq!(strike.phase(&cfg), StrikePhase::Exploding);
        strike.frame = cfg.destruct_frame;
        assert_eq!(strike.phase(&cfg), StrikePhase::Destructing);
        strike.frame = cfg.frame_count;
        assert_eq!(strike.phase(&cfg), StrikePhase::Finished);
    }

    #[test]
    fn test_scar_fades_out() {
        let mut scar = GroundScar::new(TilePos::new(0, 0), ScreenOffset::ZERO);
        assert!(scar.fade(5.0, 20.0));
        assert!((scar.opacity - 0.75).abs() < 1e-6);
        assert!(!scar.fade(20.0, 20.0));
        assert_eq!(scar.opacity, 0.0);
    }
}
