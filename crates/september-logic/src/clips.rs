//! Pedestrian archetypes and animation frame tables.
//!
//! Every archetype shares one frame numbering scheme:
//!
//! ```text
//! [0, 32)                 walk: 8 frames x 4 facings
//! [32, 32 + 4*mourn)      mourn: per-facing clip
//! [.., .. + 4*convert)    conversion: per-facing clip
//! [.., .. + deaths)       death poses
//! ```
//!
//! Clip lengths differ per archetype (a kid mourns briefly, an adult longer),
//! so they live in [`ClipTable`] data instead of code.

use serde::{Deserialize, Serialize};

use crate::tile::TilePos;

pub const WALK_FRAMES: u32 = 8;
pub const FACINGS: u32 = 4;

/// Screen-space facing of a pedestrian on the isometric grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing y (up-right on screen).
    NorthEast,
    /// Toward increasing x (down-right on screen).
    #[default]
    SouthEast,
    /// Toward increasing y (down-left on screen).
    SouthWest,
    /// Toward decreasing x (up-left on screen).
    NorthWest,
}

impl Facing {
    pub fn index(self) -> u32 {
        match self {
            Self::NorthEast => 0,
            Self::SouthEast => 1,
            Self::SouthWest => 2,
            Self::NorthWest => 3,
        }
    }

    /// Facing for a single-axis step. Diagonal or zero steps prefer the x axis.
    pub fn from_step(dx: i32, dy: i32) -> Self {
        if dx > 0 {
            Self::SouthEast
        } else if dx < 0 {
            Self::NorthWest
        } else if dy > 0 {
            Self::SouthWest
        } else {
            Self::NorthEast
        }
    }

    /// Facing from `from` toward `to`, along whichever axis differs most.
    pub fn toward(from: TilePos, to: TilePos) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx.abs() >= dy.abs() && dx != 0 {
            Self::from_step(dx.signum(), 0)
        } else {
            Self::from_step(0, dy.signum())
        }
    }
}

/// Visual archetypes. Civilians come in three kinds; animals never mourn or
/// convert; hostiles revert by playing their former kind's clip backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PedestrianArchetype {
    Man,
    Woman,
    Kid,
    Dog,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipTable {
    pub sprite_prefix: &'static str,
    pub mourn_frames: u32,
    pub convert_frames: u32,
    pub death_frames: u32,
    pub can_mourn: bool,
}

const MAN: ClipTable = ClipTable {
    sprite_prefix: "man",
    mourn_frames: 10,
    convert_frames: 12,
    death_frames: 3,
    can_mourn: true,
};

const WOMAN: ClipTable = ClipTable {
    sprite_prefix: "woman",
    mourn_frames: 12,
    convert_frames: 12,
    death_frames: 3,
    can_mourn: true,
};

const KID: ClipTable = ClipTable {
    sprite_prefix: "kid",
    mourn_frames: 6,
    convert_frames: 10,
    death_frames: 2,
    can_mourn: true,
};

const DOG: ClipTable = ClipTable {
    sprite_prefix: "dog",
    mourn_frames: 0,
    convert_frames: 0,
    death_frames: 2,
    can_mourn: false,
};

const HOSTILE: ClipTable = ClipTable {
    sprite_prefix: "hostile",
    mourn_frames: 0,
    convert_frames: 0,
    death_frames: 3,
    can_mourn: false,
};

impl PedestrianArchetype {
    pub const ALL: [Self; 5] = [Self::Man, Self::Woman, Self::Kid, Self::Dog, Self::Hostile];

    pub fn clips(self) -> &'static ClipTable {
        match self {
            Self::Man => &MAN,
            Self::Woman => &WOMAN,
            Self::Kid => &KID,
            Self::Dog => &DOG,
            Self::Hostile => &HOSTILE,
        }
    }
}

impl ClipTable {
    fn mourn_start(&self) -> u32 {
        WALK_FRAMES * FACINGS
    }

    fn convert_start(&self) -> u32 {
        self.mourn_start() + self.mourn_frames * FACINGS
    }

    fn death_start(&self) -> u32 {
        self.convert_start() + self.convert_frames * FACINGS
    }

    /// Total frames in this archetype's sheet.
    pub fn frame_count(&self) -> u32 {
        self.death_start() + self.death_frames
    }

    /// Walking frame; `step` cycles through the eight-frame loop.
    pub fn walk_frame(&self, facing: Facing, step: u32) -> u32 {
        facing.index() * WALK_FRAMES + step % WALK_FRAMES
    }

    /// Mourning frame; loops over the clip.
    pub fn mourn_frame(&self, facing: Facing, step: u32) -> u32 {
        if self.mourn_frames == 0 {
            return self.walk_frame(facing, 0);
        }
        self.mourn_start() + facing.index() * self.mourn_frames + step % self.mourn_frames
    }

    /// Conversion frame; holds the last frame once the clip is over.
    pub fn convert_frame(&self, facing: Facing, step: u32) -> u32 {
        if self.convert_frames == 0 {
            return self.walk_frame(facing, 0);
        }
        self.convert_start()
            + facing.index() * self.convert_frames
            + step.min(self.convert_frames - 1)
    }

    pub fn death_frame(&self, variant: u32) -> u32 {
        self.death_start() + variant % self.death_frames.max(1)
    }

    /// Sprite identifier for a frame of this sheet.
    pub fn sprite_id(&self, frame: u32) -> String {
        format!("{}_{:03}", self.sprite_prefix, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_step() {
        assert_eq!(Facing::from_step(1, 0), Facing::SouthEast);
        assert_eq!(Facing::from_step(-1, 0), Facing::NorthWest);
        assert_eq!(Facing::from_step(0, 1), Facing::SouthWest);
        assert_eq!(Facing::from_step(0, -1), Facing::NorthEast);
    }

    #[test]
    fn test_facing_toward_prefers_larger_axis() {
        let from = TilePos::new(5, 5);
        assert_eq!(Facing::toward(from, TilePos::new(5, 9)), Facing::SouthWest);
        assert_eq!(Facing::toward(from, TilePos::new(2, 4)), Facing::NorthWest);
    }

    #[test]
    fn test_frame_ranges_do_not_overlap() {
        for archetype in PedestrianArchetype::ALL {
            let clips = archetype.clips();
            let last_walk = clips.walk_frame(Facing::NorthWest, 7);
            let first_death = clips.death_frame(0);
            assert!(last_walk < first_death);
            if clips.mourn_frames > 0 {
                let last_mourn = clips.mourn_frame(Facing::NorthWest, clips.mourn_frames - 1);
                let first_convert = clips.convert_frame(Facing::NorthEast, 0);
                assert!(last_walk < clips.mourn_frame(Facing::NorthEast, 0));
                assert!(last_mourn < first_convert);
            }
            assert!(clips.death_frame(clips.death_frames - 1) < clips.frame_count());
        }
    }

    #[test]
    fn test_clip_lengths_are_per_archetype() {
        let kid = PedestrianArchetype::Kid.clips();
        let woman = PedestrianArchetype::Woman.clips();
        assert!(kid.mourn_frames < woman.mourn_frames);
        assert!(!PedestrianArchetype::Dog.clips().can_mourn);
    }

    #[test]
    fn test_sprite_id_format() {
        assert_eq!(PedestrianArchetype::Kid.clips().sprite_id(7), "kid_007");
    }
}
