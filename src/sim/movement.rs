//! Committed moves: try-move, teleport, height clipping and the sector
//! crush pass that runs after a floor or ceiling moves.

use hecs::Entity;
use log::debug;

use super::{Effect, Hooks, MAXRADIUS, MAXSTEP, Sim, SimError, SpawnZ};
use crate::defs::{MobjFlags, StateRequest, info};
use crate::math::Fixed;
use crate::world::{BBox, LineId, MAPBLOCKSHIFT, SectorId, point_on_line_side};

/// What `try_move` reports besides success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveResult {
    pub moved: bool,
    /// The opening was tall enough; only the step or ceiling was wrong.
    /// Floating monsters use it to adjust height instead of turning.
    pub float_ok: bool,
    pub floor_z: Fixed,
    pub ceiling_z: Fixed,
    /// Line that capped the ceiling at the destination.
    pub ceiling_line: Option<LineId>,
}

impl Sim {
    /// Move `e` to `(x, y)` if it fits, then fire the specials of every
    /// line it crossed (last contacted first).
    pub fn try_move(
        &mut self,
        e: Entity,
        x: Fixed,
        y: Fixed,
        hooks: &mut dyn Hooks,
    ) -> Result<MoveResult, SimError> {
        let check = self.check_position(e, x, y, hooks)?;
        let mut res = MoveResult {
            moved: false,
            float_ok: false,
            floor_z: check.floorz,
            ceiling_z: check.ceilingz,
            ceiling_line: check.ceilingline,
        };
        if !check.passable {
            return Ok(res);
        }

        let mo = self.mobj(e)?;
        if !mo.flags.contains(MobjFlags::NOCLIP) {
            if check.ceilingz - check.floorz < mo.height {
                // doesn't fit
                return Ok(res);
            }
            res.float_ok = true;

            let teleporting = mo.flags.contains(MobjFlags::TELEPORT);
            if !teleporting && check.ceilingz - mo.z < mo.height {
                // mobj must lower itself to fit
                return Ok(res);
            }
            if !teleporting && check.floorz - mo.z > MAXSTEP {
                // too big a step up
                return Ok(res);
            }
            if !mo.flags.intersects(MobjFlags::DROPOFF | MobjFlags::FLOAT)
                && check.floorz - check.dropoffz > MAXSTEP
            {
                // don't stand over a dropoff
                return Ok(res);
            }
        }

        self.unset_thing_position(e)?;
        {
            let mut m = self.mobj_mut(e)?;
            m.floorz = check.floorz;
            m.ceilingz = check.ceilingz;
            m.x = x;
            m.y = y;
        }
        self.set_thing_position(e)?;
        res.moved = true;

        if !mo.flags.intersects(MobjFlags::TELEPORT | MobjFlags::NOCLIP) {
            for &id in check.spechit.iter().rev() {
                let line = self.level.line(id);
                let side = point_on_line_side(x, y, line);
                let oldside = point_on_line_side(mo.x, mo.y, line);
                if side != oldside && line.special != 0 {
                    hooks.cross_special_line(&mut self.world, id, oldside, e);
                }
            }
        }

        Ok(res)
    }

    /// Unconditional relocation.  Shootable things in the way are
    /// telefragged; only players may do that outside the boss level.
    pub fn teleport_move(
        &mut self,
        e: Entity,
        x: Fixed,
        y: Fixed,
        hooks: &mut dyn Hooks,
    ) -> Result<bool, SimError> {
        let mo = self.mobj(e)?;
        let sector = self.level.sector_at(x, y);
        let (floorz, ceilingz) = (sector.floor_h, sector.ceil_h);
        let bbox = BBox::around(x, y, mo.radius);

        self.new_validcount();

        let bm = &self.level.blockmap;
        let xl = (bbox.left - bm.origin_x - MAXRADIUS) >> MAPBLOCKSHIFT;
        let xh = (bbox.right - bm.origin_x + MAXRADIUS) >> MAPBLOCKSHIFT;
        let yl = (bbox.bottom - bm.origin_y - MAXRADIUS) >> MAPBLOCKSHIFT;
        let yh = (bbox.top - bm.origin_y + MAXRADIUS) >> MAPBLOCKSHIFT;

        for bx in xl..=xh {
            for by in yl..=yh {
                let ok = self.block_things_iter(bx, by, |sim, t| {
                    sim.pit_stomp_thing(e, x, y, mo.radius, t, hooks)
                })?;
                if !ok {
                    return Ok(false);
                }
            }
        }

        self.unset_thing_position(e)?;
        {
            let mut m = self.mobj_mut(e)?;
            m.floorz = floorz;
            m.ceilingz = ceilingz;
            m.x = x;
            m.y = y;
        }
        self.set_thing_position(e)?;
        Ok(true)
    }

    fn pit_stomp_thing(
        &mut self,
        mover: Entity,
        x: Fixed,
        y: Fixed,
        radius: Fixed,
        thing: Entity,
        hooks: &mut dyn Hooks,
    ) -> Result<bool, SimError> {
        let t = self.mobj(thing)?;
        if !t.flags.contains(MobjFlags::SHOOTABLE) {
            return Ok(true);
        }

        let blockdist = t.radius.wrapping_add(radius);
        if t.x.wrapping_sub(x).wrapping_abs() >= blockdist
            || t.y.wrapping_sub(y).wrapping_abs() >= blockdist
        {
            return Ok(true);
        }

        if thing == mover {
            return Ok(true);
        }

        if !self.is_player(mover) && !self.level.monster_telefrag {
            return Ok(false);
        }

        hooks.damage(&mut self.world, thing, Some(mover), Some(mover), 10000);
        Ok(true)
    }

    /// Re-fit `e` between floor and ceiling after sector heights changed.
    /// Things on the floor ride it; others are pushed under the ceiling.
    /// `false` when it no longer fits.
    pub fn thing_height_clip(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<bool, SimError> {
        let mo = self.mobj(e)?;
        let onfloor = mo.z == mo.floorz;

        let check = self.check_position(e, mo.x, mo.y, hooks)?;

        let mut m = self.mobj_mut(e)?;
        m.floorz = check.floorz;
        m.ceilingz = check.ceilingz;

        if onfloor {
            m.z = m.floorz;
        } else if m.z + m.height > m.ceilingz {
            m.z = m.ceilingz - m.height;
        }

        Ok(m.ceilingz - m.floorz >= m.height)
    }

    /// Height-clip everything near `sector`.  With `crunch`, things that
    /// no longer fit take damage every fourth tic.  Returns whether
    /// something didn't fit.
    pub fn change_sector(
        &mut self,
        sector: SectorId,
        crunch: bool,
        hooks: &mut dyn Hooks,
    ) -> Result<bool, SimError> {
        self.crush.nofit = 0;
        self.crush.crush_change = crunch as u32;

        let bb = self.level.sectors[sector as usize].blockbox;
        for x in bb.left..=bb.right {
            for y in bb.bottom..=bb.top {
                self.block_things_iter(x, y, |sim, t| sim.pit_change_sector(t, hooks))?;
            }
        }

        Ok(self.crush.nofit != 0)
    }

    fn pit_change_sector(&mut self, thing: Entity, hooks: &mut dyn Hooks) -> Result<bool, SimError> {
        if self.thing_height_clip(thing, hooks)? {
            return Ok(true);
        }

        let t = self.mobj(thing)?;

        // crunch bodies to giblets
        if t.health <= 0 {
            hooks.set_state(&mut self.world, thing, StateRequest::Gibs);
            let mut m = self.mobj_mut(thing)?;
            m.flags.remove(MobjFlags::SOLID);
            m.height = 0;
            m.radius = 0;
            return Ok(true);
        }

        // crunch dropped items
        if t.flags.contains(MobjFlags::DROPPED) {
            self.remove_mobj(thing)?;
            return Ok(true);
        }

        if !t.flags.contains(MobjFlags::SHOOTABLE) {
            return Ok(true);
        }

        self.crush.nofit = 1;

        if self.crush.crush_change != 0 && self.leveltime & 3 == 0 {
            hooks.damage(&mut self.world, thing, None, None, 10);

            let t = self.mobj(thing)?;
            let blood = self.spawn_mobj(&info::BLOOD, t.x, t.y, SpawnZ::At(t.z + t.height / 2))?;
            let momx = hooks.sub_random() << 12;
            let momy = hooks.sub_random() << 12;
            {
                let mut b = self.mobj_mut(blood)?;
                b.momx = momx;
                b.momy = momy;
            }
            hooks.effect_spawned(&mut self.world, blood, Effect::Blood { damage: 10 });
            debug!("crushed {thing:?} at tic {}", self.leveltime);
        }

        Ok(true)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::to_fixed;
    use crate::sim::test_support::*;
    use crate::sim::{Mobj, PhysicsConfig};

    #[test]
    fn short_step_moves_and_relinks() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let p = sim.spawn_player(to_fixed(120), to_fixed(64), 0).unwrap();

        let r = sim.try_move(p, to_fixed(124), to_fixed(64), &mut hooks).unwrap();
        assert!(r.moved && r.float_ok);
        let m = sim.mobj(p).unwrap();
        assert_eq!(m.x, to_fixed(124));
        assert_eq!((m.floorz, m.ceilingz), (0, to_fixed(128)));
        assert_eq!(sim.block_things(0, 0), vec![p]);

        // across a cell boundary
        let r = sim.try_move(p, to_fixed(140), to_fixed(64), &mut hooks).unwrap();
        assert!(r.moved);
        assert!(sim.block_things(0, 0).is_empty());
        assert_eq!(sim.block_things(1, 0), vec![p]);
    }

    #[test]
    fn narrow_opening_passes_check_but_not_move() {
        // 8 units between floor and ceiling on the far side
        let mut sim = sim_with(two_rooms(0, 128, 0, 8), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let p = sim.spawn_player(to_fixed(240), to_fixed(128), 0).unwrap();

        let check = sim.check_position(p, to_fixed(280), to_fixed(128), &mut hooks).unwrap();
        assert!(check.passable);
        let r = sim.try_move(p, to_fixed(280), to_fixed(128), &mut hooks).unwrap();
        assert!(!r.moved);
        assert!(!r.float_ok);
        assert_eq!(sim.mobj(p).unwrap().x, to_fixed(240));
    }

    #[test]
    fn step_limits() {
        // 24 is climbable, 25 isn't
        for (step, ok) in [(24, true), (25, false)] {
            let mut sim = sim_with(two_rooms(0, 128, step, 128), PhysicsConfig::default());
            let mut hooks = RecordingHooks::default();
            let p = sim.spawn_player(to_fixed(236), to_fixed(128), 0).unwrap();
            let r = sim.try_move(p, to_fixed(250), to_fixed(128), &mut hooks).unwrap();
            assert_eq!(r.moved, ok, "step {step}");
            assert!(r.float_ok);
        }
    }

    #[test]
    fn monsters_avoid_dropoffs_players_do_not() {
        let mut sim = sim_with(two_rooms(32, 160, 0, 160), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(64), SpawnZ::OnFloor).unwrap();
        let p = sim.spawn_player(to_fixed(200), to_fixed(192), 0).unwrap();

        assert!(!sim.try_move(k, to_fixed(240), to_fixed(64), &mut hooks).unwrap().moved);
        assert!(sim.try_move(p, to_fixed(248), to_fixed(192), &mut hooks).unwrap().moved);
    }

    #[test]
    fn crossing_a_special_line_fires_it_once() {
        let mut sim = sim_with(two_rooms(0, 128, 0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let line = divider(&sim);
        sim.level_mut().lines[line as usize].special = 97;
        let p = sim.spawn_player(to_fixed(240), to_fixed(128), 0).unwrap();

        // touching only
        sim.try_move(p, to_fixed(250), to_fixed(128), &mut hooks).unwrap();
        assert!(hooks.crosses.is_empty());

        sim.try_move(p, to_fixed(260), to_fixed(128), &mut hooks).unwrap();
        assert_eq!(hooks.crosses, vec![(line, 0, p)]);
    }

    #[test]
    fn teleport_stomps_only_for_players() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let p = sim.spawn_player(to_fixed(40), to_fixed(40), 0).unwrap();
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(200), SpawnZ::OnFloor).unwrap();
        let k2 = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(60), SpawnZ::OnFloor).unwrap();

        // monster onto monster: refused
        assert!(!sim.teleport_move(k2, to_fixed(200), to_fixed(190), &mut hooks).unwrap());
        assert!(hooks.damage.is_empty());
        assert_eq!(sim.mobj(k2).unwrap().y, to_fixed(60));

        // player onto monster: telefrag
        assert!(sim.teleport_move(p, to_fixed(200), to_fixed(190), &mut hooks).unwrap());
        assert_eq!(hooks.damage.len(), 1);
        assert_eq!((hooks.damage[0].target, hooks.damage[0].amount), (k, 10000));
        assert_eq!(sim.mobj(p).unwrap().y, to_fixed(190));
    }

    #[test]
    fn boss_level_lets_monsters_telefrag() {
        let mut sim = sim_with(open_room_with(0, 128, |b| { b.monster_telefrag(true); }), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(200), SpawnZ::OnFloor).unwrap();
        let k2 = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(60), SpawnZ::OnFloor).unwrap();
        assert!(sim.teleport_move(k2, to_fixed(200), to_fixed(190), &mut hooks).unwrap());
        assert_eq!(hooks.damage[0].target, k);
    }

    #[test]
    fn height_clip_rides_the_floor() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(64), to_fixed(64), SpawnZ::OnFloor).unwrap();
        let f = sim.spawn_mobj(&info::SKULL, to_fixed(192), to_fixed(192), SpawnZ::At(to_fixed(60))).unwrap();

        sim.level_mut().sectors[0].floor_h = to_fixed(16);
        sim.level_mut().sectors[0].ceil_h = to_fixed(100);
        assert!(sim.thing_height_clip(k, &mut hooks).unwrap());
        assert_eq!(sim.mobj(k).unwrap().z, to_fixed(16));

        // floater pushed under the ceiling
        assert!(sim.thing_height_clip(f, &mut hooks).unwrap());
        assert_eq!(sim.mobj(f).unwrap().z, to_fixed(100 - 56));
    }

    #[test]
    fn crushing_ceiling() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(64), to_fixed(64), SpawnZ::OnFloor).unwrap();
        let corpse = sim.spawn_mobj(&info::KNIGHT, to_fixed(192), to_fixed(64), SpawnZ::OnFloor).unwrap();
        sim.world_mut().get::<&mut Mobj>(corpse).unwrap().health = 0;
        let drop = sim.spawn_mobj(&CLIP, to_fixed(64), to_fixed(192), SpawnZ::OnFloor).unwrap();

        sim.level_mut().sectors[0].ceil_h = to_fixed(4);
        assert!(sim.change_sector(0, true, &mut hooks).unwrap());

        // leveltime 0: damage this tic
        assert_eq!(hooks.damage.len(), 1);
        assert_eq!((hooks.damage[0].target, hooks.damage[0].amount), (k, 10));
        assert!(hooks.effects.iter().any(|&(_, fx)| fx == Effect::Blood { damage: 10 }));

        let c = sim.mobj(corpse).unwrap();
        assert_eq!((c.height, c.radius), (0, 0));
        assert!(!c.flags.contains(MobjFlags::SOLID));
        assert!(hooks.states.contains(&(corpse, StateRequest::Gibs)));

        assert!(sim.mobj(drop).is_err());

        // no damage on a tic that isn't a multiple of four
        sim.leveltime = 1;
        hooks.damage.clear();
        assert!(sim.change_sector(0, true, &mut hooks).unwrap());
        assert!(hooks.damage.is_empty());
    }

    #[test]
    fn pickup_touched_during_height_clip_is_removed() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks { remove_touched: true, ..RecordingHooks::default() };
        let item = sim.spawn_mobj(&BONUS, to_fixed(64), to_fixed(64), SpawnZ::OnFloor).unwrap();
        let p = sim.spawn_player(to_fixed(64), to_fixed(64), 0).unwrap();
        // player first, the item right behind it
        assert_eq!(sim.block_things(0, 0), vec![p, item]);

        assert!(!sim.change_sector(0, false, &mut hooks).unwrap());
        assert_eq!(hooks.touches, vec![(item, p)]);
        assert!(!sim.world().contains(item));
        assert_eq!(sim.block_things(0, 0), vec![p]);
    }

    #[test]
    fn raising_floor_without_crunch_just_reports() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        sim.spawn_mobj(&info::KNIGHT, to_fixed(64), to_fixed(64), SpawnZ::OnFloor).unwrap();

        sim.level_mut().sectors[0].floor_h = to_fixed(32);
        assert!(!sim.change_sector(0, false, &mut hooks).unwrap());
        sim.level_mut().sectors[0].floor_h = to_fixed(100);
        assert!(sim.change_sector(0, false, &mut hooks).unwrap());
        assert!(hooks.damage.is_empty());
    }

    #[test]
    fn noclip_and_teleport_skip_line_specials() {
        let mut sim = sim_with(two_rooms(0, 128, 0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let line = divider(&sim);
        sim.level_mut().lines[line as usize].special = 97;
        let p = sim.spawn_player(to_fixed(240), to_fixed(128), 0).unwrap();
        sim.world_mut().get::<&mut Mobj>(p).unwrap().flags.insert(MobjFlags::NOCLIP);

        assert!(sim.try_move(p, to_fixed(270), to_fixed(128), &mut hooks).unwrap().moved);
        assert!(hooks.crosses.is_empty());
    }
}
