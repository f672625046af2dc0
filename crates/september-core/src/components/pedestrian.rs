//! Pedestrian components: kinds, movement states, and the per-character data
//! the behavior system advances every tick.

use serde::{Deserialize, Serialize};

use september_logic::clips::{ClipTable, Facing, PedestrianArchetype};
use september_logic::TilePos;

use super::ScreenOffset;

/// The three civilian variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CivilianKind {
    Man,
    Woman,
    Kid,
}

impl CivilianKind {
    pub const ALL: [Self; 3] = [Self::Man, Self::Woman, Self::Kid];

    pub fn archetype(self) -> PedestrianArchetype {
        match self {
            Self::Man => PedestrianArchetype::Man,
            Self::Woman => PedestrianArchetype::Woman,
            Self::Kid => PedestrianArchetype::Kid,
        }
    }
}

/// What a pedestrian is. Conversion never mutates this in place; the
/// population replaces the whole pedestrian with one of the other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PedestrianKind {
    Civilian(CivilianKind),
    Animal,
    Hostile {
        /// Civilian kind restored on reversion.
        former: CivilianKind,
    },
}

impl PedestrianKind {
    pub fn archetype(self) -> PedestrianArchetype {
        match self {
            Self::Civilian(kind) => kind.archetype(),
            Self::Animal => PedestrianArchetype::Dog,
            Self::Hostile { .. } => PedestrianArchetype::Hostile,
        }
    }

    pub fn clips(self) -> &'static ClipTable {
        self.archetype().clips()
    }

    pub fn is_hostile(self) -> bool {
        matches!(self, Self::Hostile { .. })
    }

    pub fn is_civilian(self) -> bool {
        matches!(self, Self::Civilian(_))
    }

    /// Whether this kind can ever be sent to mourn (and therefore convert).
    pub fn can_mourn(self) -> bool {
        self.is_civilian() && self.clips().can_mourn
    }
}

/// Movement / behavior state shared by every archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveState {
    Idle,
    Moving,
    /// Side-stepping along x because the y step is blocked.
    AvoidingHorizontal,
    /// Side-stepping along y because the x step is blocked.
    AvoidingVertical,
    Mourning,
    Dead,
    Converting,
}

impl MoveState {
    pub fn is_walking(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Moving | Self::AvoidingHorizontal | Self::AvoidingVertical
        )
    }
}

/// One-shot notifications returned from a pedestrian update, handled by the
/// population in the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityEvent {
    MourningStarted,
    MourningEnded,
    /// Civilian finished turning hostile; replace with a hostile.
    ConversionComplete,
    /// Hostile finished turning back; replace with its former civilian kind.
    ReversionComplete,
}

/// An in-flight move between two adjacent tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileStep {
    pub from: TilePos,
    pub to: TilePos,
    /// Sub-steps completed so far.
    pub part: u32,
}

/// A pedestrian, animal or hostile on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pedestrian {
    pub kind: PedestrianKind,
    /// Logical tile. Switches to the target tile as soon as a step begins.
    pub tile: TilePos,
    /// Pixel offset from the tile center, shrinking to zero as a step ends.
    pub offset: ScreenOffset,
    pub state: MoveState,
    pub facing: Facing,
    pub destination: TilePos,
    /// Deferred destination, adopted at the next tile boundary.
    pub future_destination: Option<TilePos>,
    /// Current sprite frame in the shared numbering scheme.
    pub frame: u32,
    /// Set while walking to mourn; the pedestrian converts afterwards.
    pub pending_conversion: bool,
    /// Set when the de-escalation timer picks this hostile for reversion.
    pub de_escalating: bool,
    /// 1.0 while alive, fading to 0.0 before a body is removed.
    pub opacity: f32,

    pub(crate) step: Option<TileStep>,
    pub(crate) step_clock: f64,
    pub(crate) walk_cycle: u32,
    pub(crate) anim_clock: f64,
    pub(crate) anim_step: u32,
    /// Tile used for paint order; lags `tile` on backward moves.
    pub(crate) depth_tile: TilePos,
    pub(crate) casualty: Option<TilePos>,
    /// Step that was blocked when avoidance began.
    pub(crate) blocked_step: (i32, i32),
    /// Lateral side-step direction while avoiding.
    pub(crate) lateral_step: (i32, i32),
    pub(crate) timer: f64,
    pub(crate) event_sent: bool,
    pub(crate) removed: bool,
}

impl Pedestrian {
    /// A new idle pedestrian standing on `tile`.
    pub fn new(kind: PedestrianKind, tile: TilePos) -> Self {
        Self {
            kind,
            tile,
            offset: ScreenOffset::ZERO,
            state: MoveState::Idle,
            facing: Facing::default(),
            destination: tile,
            future_destination: None,
            frame: 0,
            pending_conversion: false,
            de_escalating: false,
            opacity: 1.0,
            step: None,
            step_clock: 0.0,
            walk_cycle: 0,
            anim_clock: 0.0,
            anim_step: 0,
            depth_tile: tile,
            casualty: None,
            blocked_step: (0, 0),
            lateral_step: (0, 0),
            timer: 0.0,
            event_sent: false,
            removed: false,
        }
    }

    /// The hostile that replaces this civilian once conversion completes.
    pub fn converted(&self) -> Self {
        let former = match self.kind {
            PedestrianKind::Civilian(kind) => kind,
            PedestrianKind::Hostile { former } => former,
            PedestrianKind::Animal => CivilianKind::Man,
        };
        self.replaced_by(PedestrianKind::Hostile { former })
    }

    /// The civilian that replaces this hostile once reversion completes.
    pub fn reverted(&self) -> Self {
        let kind = match self.kind {
            PedestrianKind::Hostile { former } => PedestrianKind::Civilian(former),
            other => other,
        };
        self.replaced_by(kind)
    }

    fn replaced_by(&self, kind: PedestrianKind) -> Self {
        let mut next = Self::new(kind, self.tile);
        next.facing = self.facing;
        next.frame = kind.clips().walk_frame(self.facing, 0);
        next
    }

    pub fn is_alive(&self) -> bool {
        self.state != MoveState::Dead
    }

    /// A living hostile not already picked for reversion.
    pub fn is_effective_hostile(&self) -> bool {
        self.is_alive() && self.kind.is_hostile() && !self.de_escalating
    }

    /// Marked for removal; purged at the next population sweep.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn depth_tile(&self) -> TilePos {
        self.depth_tile
    }

    /// The casualty this pedestrian is walking to or mourning over.
    pub fn casualty(&self) -> Option<TilePos> {
        self.casualty
    }

    /// Whether the population may assign this pedestrian as a mourner.
    pub fn is_available_mourner(&self) -> bool {
        self.kind.can_mourn()
            && self.state.is_walking()
            && !self.pending_conversion
            && !self.de_escalating
    }

    /// Clip table used for the current animation. Reverting hostiles play
    /// their former kind's conversion clip backwards.
    pub fn animation_clips(&self) -> &'static ClipTable {
        self.sheet().clips()
    }

    /// Archetype whose sprite sheet is on screen. A reverting hostile plays
    /// its former kind's frames.
    pub fn sheet(&self) -> PedestrianArchetype {
        match (self.kind, self.state) {
            (PedestrianKind::Hostile { former }, MoveState::Converting) => former.archetype(),
            (kind, _) => kind.archetype(),
        }
    }

    /// Sprite identifier for the current frame.
    pub fn sprite_id(&self) -> String {
        self.animation_clips().sprite_id(self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_replaces_kind() {
        let mut civilian = Pedestrian::new(
            PedestrianKind::Civilian(CivilianKind::Kid),
            TilePos::new(4, 5),
        );
        civilian.state = MoveState::Converting;
        civilian.pending_conversion = true;

        let hostile = civilian.converted();
        assert_eq!(
            hostile.kind,
            PedestrianKind::Hostile {
                former: CivilianKind::Kid
            }
        );
        assert_eq!(hostile.tile, civilian.tile);
        assert_eq!(hostile.state, MoveState::Idle);
        assert!(!hostile.pending_conversion);

        let back = hostile.reverted();
        assert_eq!(back.kind, PedestrianKind::Civilian(CivilianKind::Kid));
    }

    #[test]
    fn test_mourning_eligibility() {
        let tile = TilePos::new(1, 1);
        assert!(Pedestrian::new(PedestrianKind::Civilian(CivilianKind::Woman), tile)
            .is_available_mourner());
        assert!(!Pedestrian::new(PedestrianKind::Animal, tile).is_available_mourner());
        assert!(!Pedestrian::new(
            PedestrianKind::Hostile {
                former: CivilianKind::Man
            },
            tile
        )
        .is_available_mourner());
    }

    #[test]
    fn test_reverting_hostile_uses_former_sheet() {
        let mut hostile = Pedestrian::new(
            PedestrianKind::Hostile {
                former: CivilianKind::Woman,
            },
            TilePos::new(2, 2),
        );
        assert_eq!(hostile.sheet(), PedestrianArchetype::Hostile);
        hostile.state = MoveState::Converting;
        assert_eq!(hostile.sheet(), PedestrianArchetype::Woman);
        assert!(hostile.sprite_id().starts_with("woman"));

        let dog = Pedestrian::new(PedestrianKind::Animal, TilePos::new(2, 2));
        assert_eq!(dog.sheet(), PedestrianArchetype::Dog);
    }
}
