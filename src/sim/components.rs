use hecs::Entity;

use crate::defs::{MobjFlags, MobjInfo, MobjKind};
use crate::math::{Angle, Fixed};
use crate::world::SubsectorId;

/// Intrusive list membership.  Only `sim::spacial` writes these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobjLinks {
    pub subsector: SubsectorId,
    /// Next actor in the same sector thing list.
    pub snext: Option<Entity>,
    /// Next actor in the same blocklink bucket.
    pub bnext: Option<Entity>,
    /// Cell the actor was linked into; `None` when off the grid or
    /// unlinked.  Bucket scans compare against this.
    pub block: Option<usize>,
}

/// One simulated actor.  Position is 16.16, `z` is the feet.
#[derive(Debug, Clone, Copy)]
pub struct Mobj {
    pub kind: MobjKind,
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    pub angle: Angle,
    pub momx: Fixed,
    pub momy: Fixed,
    pub momz: Fixed,
    pub radius: Fixed,
    pub height: Fixed,
    pub flags: MobjFlags,
    /// Highest floor / lowest ceiling the footprint touches.
    pub floorz: Fixed,
    pub ceilingz: Fixed,
    pub health: i32,
    /// Impact damage multiplier (missiles, charging skulls).
    pub damage: i32,
    /// Missile owner, or what a monster is chasing.
    pub target: Option<Entity>,
    pub links: MobjLinks,
}

impl Mobj {
    pub fn from_info(info: &MobjInfo, x: Fixed, y: Fixed) -> Mobj {
        Mobj {
            kind: info.kind,
            x,
            y,
            z: 0,
            angle: 0,
            momx: 0,
            momy: 0,
            momz: 0,
            radius: info.radius,
            height: info.height,
            flags: info.flags,
            floorz: 0,
            ceilingz: 0,
            health: info.spawnhealth,
            damage: info.damage,
            target: None,
            links: MobjLinks::default(),
        }
    }
}

/// Movement intent for this tic; only "is anything held" matters here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerCmd {
    pub forward: i8,
    pub side: i8,
}

/// Extra state for actors driven by a player.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub cmd: PlayerCmd,
    pub viewheight: Fixed,
    pub deltaviewheight: Fixed,
    /// Debug cheat: kill all momentum after each move.
    pub no_momentum: bool,
}

impl Player {
    pub fn new(viewheight: Fixed) -> Player {
        Player {
            cmd: PlayerCmd::default(),
            viewheight,
            deltaviewheight: 0,
            no_momentum: false,
        }
    }
}
