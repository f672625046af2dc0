//! Fire-and-forget audio cues.
//!
//! The engine never plays sound itself. It queues cues that the host drains
//! once per frame and forwards to its audio backend.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AudioCue {
    Click = 1,
    MissileLaunch = 2,
    MissileStop = 3,
    Explosion = 4,
    CryStart = 5,
    CryStop = 6,
}

/// Pending cues plus the mourner count behind the crying loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioQueue {
    pending: Vec<AudioCue>,
    criers: u32,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cue: AudioCue) {
        self.pending.push(cue);
    }

    /// A mourner started crying. Only the first one starts the loop.
    pub fn start_cry(&mut self) {
        self.criers += 1;
        if self.criers == 1 {
            self.pending.push(AudioCue::CryStart);
        }
    }

    /// A mourner stopped. The loop stops with the last one.
    pub fn stop_cry(&mut self) {
        if self.criers == 0 {
            return;
        }
        self.criers -= 1;
        if self.criers == 0 {
            self.pending.push(AudioCue::CryStop);
        }
    }

    pub fn criers(&self) -> u32 {
        self.criers
    }

    pub fn drain(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cry_is_reference_counted() {
        let mut audio = AudioQueue::new();
        audio.start_cry();
        audio.start_cry();
        audio.stop_cry();
        assert_eq!(audio.drain(), vec![AudioCue::CryStart]);
        audio.stop_cry();
        audio.stop_cry();
        assert_eq!(audio.drain(), vec![AudioCue::CryStop]);
        assert_eq!(audio.criers(), 0);
    }
}
