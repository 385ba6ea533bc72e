//! Spawn-time physical properties for the actor kinds the core spawns or
//! treats specially.  Everything else is handed in by the caller.

use super::{MobjFlags, MobjKind};
use crate::math::{Fixed, to_fixed};

#[derive(Debug, Clone, Copy)]
pub struct MobjInfo {
    pub kind: MobjKind,
    pub doomednum: i32,
    pub spawnhealth: i32,
    pub speed: Fixed,
    pub radius: Fixed,
    pub height: Fixed,
    /// Multiplier for missile / skull impact damage.
    pub damage: i32,
    pub flags: MobjFlags,
}

const MONSTER: MobjFlags = MobjFlags::SOLID
    .union(MobjFlags::SHOOTABLE)
    .union(MobjFlags::COUNTKILL);

pub const PLAYER: MobjInfo = MobjInfo {
    kind: MobjKind::Player,
    doomednum: -1,
    spawnhealth: 100,
    speed: 0,
    radius: to_fixed(16),
    height: to_fixed(56),
    damage: 0,
    flags: MobjFlags::SOLID
        .union(MobjFlags::SHOOTABLE)
        .union(MobjFlags::DROPOFF)
        .union(MobjFlags::PICKUP)
        .union(MobjFlags::NOTDMATCH),
};

pub const SKULL: MobjInfo = MobjInfo {
    kind: MobjKind::Skull,
    doomednum: 3006,
    spawnhealth: 100,
    speed: to_fixed(8),
    radius: to_fixed(16),
    height: to_fixed(56),
    damage: 3,
    flags: MobjFlags::SOLID
        .union(MobjFlags::SHOOTABLE)
        .union(MobjFlags::FLOAT)
        .union(MobjFlags::NOGRAVITY),
};

pub const KNIGHT: MobjInfo = MobjInfo {
    kind: MobjKind::Knight,
    doomednum: 69,
    spawnhealth: 500,
    speed: to_fixed(8),
    radius: to_fixed(24),
    height: to_fixed(64),
    damage: 0,
    flags: MONSTER,
};

pub const BRUISER: MobjInfo = MobjInfo {
    kind: MobjKind::Bruiser,
    doomednum: 3003,
    spawnhealth: 1000,
    speed: to_fixed(8),
    radius: to_fixed(24),
    height: to_fixed(64),
    damage: 0,
    flags: MONSTER,
};

pub const CYBORG: MobjInfo = MobjInfo {
    kind: MobjKind::Cyborg,
    doomednum: 16,
    spawnhealth: 4000,
    speed: to_fixed(16),
    radius: to_fixed(40),
    height: to_fixed(110),
    damage: 0,
    flags: MONSTER,
};

// Wider than MAXRADIUS; other movers can clip into it from two blocks away.
pub const SPIDER: MobjInfo = MobjInfo {
    kind: MobjKind::Spider,
    doomednum: 7,
    spawnhealth: 3000,
    speed: to_fixed(12),
    radius: to_fixed(128),
    height: to_fixed(100),
    damage: 0,
    flags: MONSTER,
};

pub const PUFF: MobjInfo = MobjInfo {
    kind: MobjKind::Puff,
    doomednum: -1,
    spawnhealth: 1000,
    speed: 0,
    radius: to_fixed(20),
    height: to_fixed(16),
    damage: 0,
    flags: MobjFlags::NOBLOCKMAP.union(MobjFlags::NOGRAVITY),
};

pub const BLOOD: MobjInfo = MobjInfo {
    kind: MobjKind::Blood,
    doomednum: -1,
    spawnhealth: 1000,
    speed: 0,
    radius: to_fixed(20),
    height: to_fixed(16),
    damage: 0,
    flags: MobjFlags::NOBLOCKMAP,
};

/// Look up one of the built-in kinds by editor number.
pub fn by_doomednum(num: i32) -> Option<&'static MobjInfo> {
    [&SKULL, &KNIGHT, &BRUISER, &CYBORG, &SPIDER]
        .into_iter()
        .find(|info| info.doomednum == num)
}
