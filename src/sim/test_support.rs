//! Fixtures shared by the sim unit tests: small hand-built levels, a few
//! extra actor kinds and a hooks implementation that records every call.

use hecs::{Entity, World};

use super::{Effect, Hooks, Mobj, PhysicsConfig, Sim, Touch};
use crate::defs::{MobjFlags, MobjInfo, MobjKind, Sound, StateRequest};
use crate::math::to_fixed;
use crate::world::{Level, LevelBuilder, LineId, NodeChild, SectorId};

pub fn sim_with(level: Level, config: PhysicsConfig) -> Sim {
    Sim::new(level, config)
}

/*──────────────────────────── levels ─────────────────────────────*/

/// Four one-sided walls around the square `lo..hi` (map units), clockwise
/// so `sector` is on their front side.
pub fn room_walls(b: &mut LevelBuilder, sector: SectorId, lo: i32, hi: i32) {
    let (lo, hi) = (to_fixed(lo), to_fixed(hi));
    b.add_line(lo, lo, lo, hi, sector);
    b.add_line(lo, hi, hi, hi, sector);
    b.add_line(hi, hi, hi, lo, sector);
    b.add_line(hi, lo, lo, lo, sector);
}

/// 256×256 room, one sector.  `extra` runs after the sector and walls
/// exist.
pub fn open_room_with(floor: i32, ceil: i32, extra: impl FnOnce(&mut LevelBuilder)) -> Level {
    let mut b = LevelBuilder::new("ROOM");
    let s = b.add_sector(to_fixed(floor), to_fixed(ceil));
    b.add_subsector(s);
    room_walls(&mut b, s, 0, 256);
    extra(&mut b);
    b.build().expect("room fixture")
}

pub fn open_room(floor: i32, ceil: i32) -> Level {
    open_room_with(floor, ceil, |_| {})
}

/// Rooms A (x 0..256) and B (x 256..512) joined by a two-sided divider
/// at x = 256, front A, back B.
pub fn two_rooms_with(
    fa: i32,
    ca: i32,
    fb: i32,
    cb: i32,
    extra: impl FnOnce(&mut LevelBuilder),
) -> Level {
    let mut b = LevelBuilder::new("TWO");
    let a = b.add_sector(to_fixed(fa), to_fixed(ca));
    let c = b.add_sector(to_fixed(fb), to_fixed(cb));
    let ssa = b.add_subsector(a);
    let ssc = b.add_subsector(c);

    let (x0, x1, x2, top) = (0, to_fixed(256), to_fixed(512), to_fixed(256));
    b.add_line(x0, 0, x0, top, a);
    b.add_line(x0, top, x1, top, a);
    b.add_line(x1, 0, x0, 0, a);
    b.add_line(x1, top, x2, top, c);
    b.add_line(x2, top, x2, 0, c);
    b.add_line(x2, 0, x1, 0, c);
    b.add_two_sided(x1, top, x1, 0, a, c);

    b.add_node(x1, top, 0, -top, NodeChild::Subsector(ssa), NodeChild::Subsector(ssc));
    extra(&mut b);
    b.build().expect("two room fixture")
}

pub fn two_rooms(fa: i32, ca: i32, fb: i32, cb: i32) -> Level {
    two_rooms_with(fa, ca, fb, cb, |_| {})
}

/// The only two-sided line of `two_rooms`.
pub fn divider(sim: &Sim) -> LineId {
    sim.level()
        .lines
        .iter()
        .position(|l| l.is_two_sided())
        .expect("no divider") as LineId
}

/// The wall along y = 256.
pub fn north_wall(sim: &Sim) -> LineId {
    let top = to_fixed(256);
    sim.level()
        .lines
        .iter()
        .position(|l| l.v1.y == top && l.v2.y == top)
        .expect("no north wall") as LineId
}

/// Open room with `n` short two-sided special lines at x = 95, 96, ...
/// spanning y 90..118.
pub fn special_comb(n: i32) -> Level {
    open_room_with(0, 128, |b| {
        for i in 0..n {
            let x = to_fixed(95 + i);
            let l = b.add_two_sided(x, to_fixed(90), x, to_fixed(118), 0, 0);
            b.set_special(l, 1, 0);
        }
    })
}

/// Open room with `n` two-sided special lines laid on top of each other
/// at x = 100, spanning y 40..200.  Returns the level and the line ids in
/// the order a position test contacts them.
pub fn special_stack(n: usize) -> (Level, Vec<LineId>) {
    let mut ids = Vec::with_capacity(n);
    let lvl = open_room_with(0, 128, |b| {
        let x = to_fixed(100);
        for _ in 0..n {
            let l = b.add_two_sided(x, to_fixed(40), x, to_fixed(200), 0, 0);
            b.set_special(l, 1, 0);
            ids.push(l);
        }
    });
    (lvl, ids)
}

/*──────────────────────────── actors ─────────────────────────────*/

pub const BONUS: MobjInfo = MobjInfo {
    kind: MobjKind::Other(2014),
    doomednum: 2014,
    spawnhealth: 1000,
    speed: 0,
    radius: to_fixed(20),
    height: to_fixed(16),
    damage: 0,
    flags: MobjFlags::SPECIAL.union(MobjFlags::COUNTITEM),
};

pub const CLIP: MobjInfo = MobjInfo {
    kind: MobjKind::Other(2007),
    doomednum: 2007,
    spawnhealth: 1000,
    speed: 0,
    radius: to_fixed(20),
    height: to_fixed(16),
    damage: 0,
    flags: MobjFlags::SPECIAL.union(MobjFlags::DROPPED),
};

pub const FIREBALL: MobjInfo = MobjInfo {
    kind: MobjKind::Other(0xF1),
    doomednum: -1,
    spawnhealth: 1000,
    speed: to_fixed(10),
    radius: to_fixed(6),
    height: to_fixed(8),
    damage: 3,
    flags: MobjFlags::MISSILE
        .union(MobjFlags::NOBLOCKMAP)
        .union(MobjFlags::NOGRAVITY)
        .union(MobjFlags::DROPOFF),
};

/*──────────────────────────── hooks ──────────────────────────────*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRec {
    pub target: Entity,
    pub inflictor: Option<Entity>,
    pub source: Option<Entity>,
    pub amount: i32,
}

/// Records every hook call.  `random` counts up from 0; `check_sight`
/// answers `sight`.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub rng: u8,
    pub sight: bool,
    pub remove_touched: bool,
    pub damage: Vec<DamageRec>,
    pub touches: Vec<(Entity, Entity)>,
    pub crosses: Vec<(LineId, usize, Entity)>,
    pub uses: Vec<(Entity, LineId, usize)>,
    pub shots: Vec<(Entity, LineId)>,
    pub effects: Vec<(Entity, Effect)>,
    pub sounds: Vec<(Entity, Sound)>,
    pub states: Vec<(Entity, StateRequest)>,
}

impl Hooks for RecordingHooks {
    fn random(&mut self) -> u8 {
        let r = self.rng;
        self.rng = self.rng.wrapping_add(1);
        r
    }

    fn check_sight(&mut self, _sim: &Sim, _looker: Entity, _target: Entity) -> bool {
        self.sight
    }

    fn damage(
        &mut self,
        world: &mut World,
        target: Entity,
        inflictor: Option<Entity>,
        source: Option<Entity>,
        amount: i32,
    ) {
        self.damage.push(DamageRec { target, inflictor, source, amount });
        if let Ok(mut mo) = world.get::<&mut Mobj>(target) {
            mo.health -= amount;
        }
    }

    fn touch_special(&mut self, _world: &mut World, item: Entity, toucher: Entity) -> Touch {
        self.touches.push((item, toucher));
        if self.remove_touched { Touch::Remove } else { Touch::Keep }
    }

    fn cross_special_line(&mut self, _world: &mut World, line: LineId, side: usize, thing: Entity) {
        self.crosses.push((line, side, thing));
    }

    fn use_special_line(&mut self, _world: &mut World, thing: Entity, line: LineId, side: usize) {
        self.uses.push((thing, line, side));
    }

    fn shoot_special_line(&mut self, _world: &mut World, thing: Entity, line: LineId) {
        self.shots.push((thing, line));
    }

    fn start_sound(&mut self, _world: &mut World, origin: Entity, sound: Sound) {
        self.sounds.push((origin, sound));
    }

    fn set_state(&mut self, _world: &mut World, thing: Entity, state: StateRequest) {
        self.states.push((thing, state));
    }

    fn effect_spawned(&mut self, _world: &mut World, thing: Entity, effect: Effect) {
        self.effects.push((thing, effect));
    }
}
