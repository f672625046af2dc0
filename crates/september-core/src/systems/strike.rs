//! Strike controller - single in-flight missile and its ground scars

use log::debug;
use serde::{Deserialize, Serialize};

use september_logic::TilePos;

use crate::components::{GroundScar, ScreenOffset, Strike};
use crate::config::StrikeConfig;

/// Notifications from one strike update, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrikeEvent {
    /// Explosion visuals begin.
    Exploded,
    /// Damage should be applied now. Emitted once per strike.
    Impact { target: TilePos, offset: ScreenOffset },
    /// The animation ran out; a new strike may launch.
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeController {
    active: Option<Strike>,
    scars: Vec<GroundScar>,
    config: StrikeConfig,
    pub launched: u64,
}

impl StrikeController {
    pub fn new(config: &StrikeConfig) -> Self {
        Self {
            active: None,
            scars: Vec::new(),
            config: config.clone(),
            launched: 0,
        }
    }

    pub fn is_launched(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Strike> {
        self.active.as_ref()
    }

    pub fn scars(&self) -> &[GroundScar] {
        &self.scars
    }

    /// Start a strike on `target`. `offset` is the tapped point relative to
    /// the target's tile center. Ignored while another strike is in flight.
    pub fn launch(&mut self, target: TilePos, offset: ScreenOffset) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(Strike::new(target, offset));
        self.launched += 1;
        debug!("Strike launched at {:?}", target);
        true
    }

    pub fn update(&mut self, dt: f64) -> Vec<StrikeEvent> {
        let fade_time = self.config.scar_fade_time;
        self.scars.retain_mut(|scar| scar.fade(dt, fade_time));

        let mut events = Vec::new();
        let Some(strike) = self.active.as_mut() else {
            return events;
        };

        strike.elapsed += dt;
        strike.frame = (strike.elapsed * self.config.frame_rate).floor() as u32;

        if !strike.exploded && strike.frame >= self.config.explode_frame {
            strike.exploded = true;
            events.push(StrikeEvent::Exploded);
        }
        if !strike.destruction_applied && strike.frame >= self.config.destruct_frame {
            strike.destruction_applied = true;
            self.scars.push(GroundScar::new(strike.target, strike.offset));
            events.push(StrikeEvent::Impact {
                target: strike.target,
                offset: strike.offset,
            });
        }
        if strike.frame >= self.config.frame_count {
            self.active = None;
            events.push(StrikeEvent::Finished);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_launch_is_ignored() {
        let mut strikes = StrikeController::new(&StrikeConfig::default());
        assert!(strikes.launch(TilePos::new(5, 5), ScreenOffset::ZERO));
        let before = strikes.active().cloned();
        assert!(!strikes.launch(TilePos::new(9, 9), ScreenOffset::new(3.0, 1.0)));
        assert_eq!(strikes.active().cloned(), before);
        assert_eq!(strikes.launched, 1);
    }

    #[test]
    fn test_full_animation_sequence() {
        let cfg = StrikeConfig::default();
        let mut strikes = StrikeController::new(&cfg);
        strikes.launch(TilePos::new(5, 5), ScreenOffset::new(4.0, -2.0));

        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(strikes.update(1.0 / 48.0));
        }
        assert_eq!(
            events,
            vec![
                StrikeEvent::Exploded,
                StrikeEvent::Impact {
                    target: TilePos::new(5, 5),
                    offset: ScreenOffset::new(4.0, -2.0),
                },
                StrikeEvent::Finished,
            ]
        );
        assert!(!strikes.is_launched());
        assert!(strikes.launch(TilePos::new(1, 1), ScreenOffset::ZERO));
    }

    #[test]
    fn test_large_step_still_emits_everything_once() {
        let mut strikes = StrikeController::new(&StrikeConfig::default());
        strikes.launch(TilePos::new(5, 5), ScreenOffset::ZERO);
        let events = strikes.update(10.0);
        assert_eq!(events.len(), 3);
        assert_eq!(strikes.scars().len(), 1);
    }

    #[test]
    fn test_scars_fade_and_disappear() {
        let cfg = StrikeConfig::default();
        let mut strikes = StrikeController::new(&cfg);
        strikes.launch(TilePos::new(5, 5), ScreenOffset::ZERO);
        strikes.update(f64::from(cfg.destruct_frame) / cfg.frame_rate + 0.01);
        assert_eq!(strikes.scars().len(), 1);
        strikes.update(cfg.scar_fade_time + 1.0);
        assert!(strikes.scars().is_empty());
    }
}
