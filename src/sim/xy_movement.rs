//! Per-tic momentum: horizontal moves with friction, then vertical moves
//! with gravity.  Together they are the body of an actor's think.

use hecs::Entity;
use log::debug;

use super::{FLOATSPEED, GRAVITY, Hooks, MAXMOVE, Player, Sim, SimError, VIEWHEIGHT};
use crate::defs::{MobjFlags, Sound, StateRequest};
use crate::math::{FRACUNIT, Fixed, approx_distance, fixed_mul};

/* ----------------------------------------------------------------- */
/*  Physics constants (16.16)                                        */
/* ----------------------------------------------------------------- */
pub const STOPSPEED: Fixed = 0x1000;
pub const FRICTION: Fixed = 0xE800;

impl Sim {
    /// Run one tic of movement for `e`.  The actor may be gone
    /// afterwards (missile hit a sky wall).
    pub fn mobj_thinker(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let mo = self.mobj(e)?;
        if mo.momx != 0 || mo.momy != 0 || mo.flags.contains(MobjFlags::SKULLFLY) {
            self.xy_movement(e, hooks)?;
            if !self.world.contains(e) {
                return Ok(());
            }
        }

        let mo = self.mobj(e)?;
        if mo.z != mo.floorz || mo.momz != 0 {
            self.z_movement(e, hooks)?;
        }
        Ok(())
    }

    /* ================================================================= */
    /*  Horizontal                                                       */
    /* ================================================================= */

    pub fn xy_movement(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let mo = self.mobj(e)?;

        /* -- 0: zero momentum ------------------------------------------ */
        if mo.momx == 0 && mo.momy == 0 {
            if mo.flags.contains(MobjFlags::SKULLFLY) {
                // the skull slammed into something
                {
                    let mut m = self.mobj_mut(e)?;
                    m.flags.remove(MobjFlags::SKULLFLY);
                    m.momx = 0;
                    m.momy = 0;
                    m.momz = 0;
                }
                hooks.set_state(&mut self.world, e, StateRequest::Spawn);
            }
            return Ok(());
        }

        let player = self.world.get::<&Player>(e).ok().map(|p| *p);

        /* -- 1: clamp --------------------------------------------------- */
        let (mut xmove, mut ymove) = {
            let mut m = self.mobj_mut(e)?;
            m.momx = m.momx.clamp(-MAXMOVE, MAXMOVE);
            m.momy = m.momy.clamp(-MAXMOVE, MAXMOVE);
            (m.momx, m.momy)
        };

        /* -- 2: move, halving big steps --------------------------------- */
        // only positive components count as big
        loop {
            let mo = self.mobj(e)?;
            let (tryx, tryy) = if xmove > MAXMOVE / 2 || ymove > MAXMOVE / 2 {
                let t = (mo.x + xmove / 2, mo.y + ymove / 2);
                xmove >>= 1;
                ymove >>= 1;
                t
            } else {
                let t = (mo.x + xmove, mo.y + ymove);
                xmove = 0;
                ymove = 0;
                t
            };

            let res = self.try_move(e, tryx, tryy, hooks)?;
            if !res.moved {
                if player.is_some() {
                    // try to slide along it
                    self.slide_move(e, hooks)?;
                } else if mo.flags.contains(MobjFlags::MISSILE) {
                    // explode a missile, unless it flew into a sky hack wall
                    let into_sky = res
                        .ceiling_line
                        .and_then(|l| self.level.line(l).back)
                        .is_some_and(|b| self.level.sectors[b as usize].ceiling_is_sky);
                    if into_sky {
                        debug!("missile {e:?} vanished into the sky");
                        return self.remove_mobj(e);
                    }
                    self.explode_missile(e, hooks)?;
                } else {
                    let mut m = self.mobj_mut(e)?;
                    m.momx = 0;
                    m.momy = 0;
                }
            }

            if xmove == 0 && ymove == 0 {
                break;
            }
        }

        /* -- 3: friction / stop ---------------------------------------- */
        if player.is_some_and(|p| p.no_momentum) {
            let mut m = self.mobj_mut(e)?;
            m.momx = 0;
            m.momy = 0;
            return Ok(());
        }

        let mo = self.mobj(e)?;
        if mo.flags.intersects(MobjFlags::MISSILE | MobjFlags::SKULLFLY) {
            // no friction for missiles ever
            return Ok(());
        }
        if mo.z > mo.floorz {
            // no friction when airborne
            return Ok(());
        }

        if mo.flags.contains(MobjFlags::CORPSE) {
            // do not stop sliding if halfway off a step with some momentum
            let sliding = [mo.momx, mo.momy]
                .iter()
                .any(|&m| m > FRACUNIT / 4 || m < -FRACUNIT / 4);
            let sector = self.level.subsectors[mo.links.subsector as usize].sector;
            if sliding && mo.floorz != self.level.sectors[sector as usize].floor_h {
                return Ok(());
            }
        }

        let idle = player.is_none_or(|p| p.cmd.forward == 0 && p.cmd.side == 0);
        let slow = [mo.momx, mo.momy]
            .iter()
            .all(|&m| m > -STOPSPEED && m < STOPSPEED);

        if slow && idle {
            // if in a walking frame, stop moving
            if player.is_some() {
                hooks.set_state(&mut self.world, e, StateRequest::StopWalking);
            }
            let mut m = self.mobj_mut(e)?;
            m.momx = 0;
            m.momy = 0;
        } else {
            let mut m = self.mobj_mut(e)?;
            m.momx = fixed_mul(m.momx, FRICTION);
            m.momy = fixed_mul(m.momy, FRICTION);
        }
        Ok(())
    }

    /* ================================================================= */
    /*  Vertical                                                         */
    /* ================================================================= */

    pub fn z_movement(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let mo = self.mobj(e)?;

        // check for smooth step up
        if mo.z < mo.floorz {
            if let Ok(mut p) = self.world.get::<&mut Player>(e) {
                p.viewheight -= mo.floorz - mo.z;
                p.deltaviewheight = (VIEWHEIGHT - p.viewheight) >> 3;
            }
        }

        let mut z = mo.z + mo.momz;

        // float toward the target
        let floats = mo.flags.contains(MobjFlags::FLOAT)
            && !mo.flags.intersects(MobjFlags::SKULLFLY | MobjFlags::INFLOAT);
        if let Some(target) = mo.target.filter(|_| floats).and_then(|t| self.mobj(t).ok()) {
            let dist = approx_distance(mo.x - target.x, mo.y - target.y);
            let delta = target.z + (mo.height >> 1) - z;
            if delta < 0 && dist < -(delta * 3) {
                z -= FLOATSPEED;
            } else if delta > 0 && dist < delta * 3 {
                z += FLOATSPEED;
            }
        }

        let mut momz = mo.momz;
        let skullfly = mo.flags.contains(MobjFlags::SKULLFLY);
        let explodes = mo.flags.contains(MobjFlags::MISSILE) && !mo.flags.contains(MobjFlags::NOCLIP);

        /* -- floor ---------------------------------------------------- */
        if z <= mo.floorz {
            let correct_bounce = self.config.correct_lost_soul_bounce;
            if correct_bounce && skullfly {
                // the skull slammed into the floor
                momz = -momz;
            }

            if momz < 0 {
                if momz < -GRAVITY * 8 && self.is_player(e) {
                    // squat down; the view height recovers over the
                    // next few tics
                    if let Ok(mut p) = self.world.get::<&mut Player>(e) {
                        p.deltaviewheight = momz >> 3;
                    }
                    hooks.start_sound(&mut self.world, e, Sound::Oof);
                }
                momz = 0;
            }
            z = mo.floorz;

            if !correct_bounce && skullfly {
                momz = -momz;
            }

            self.store_z(e, z, momz)?;
            if explodes {
                return self.explode_missile(e, hooks);
            }
        } else if !mo.flags.contains(MobjFlags::NOGRAVITY) {
            momz = if momz == 0 { -GRAVITY * 2 } else { momz - GRAVITY };
            self.store_z(e, z, momz)?;
        } else {
            self.store_z(e, z, momz)?;
        }

        /* -- ceiling -------------------------------------------------- */
        if z + mo.height > mo.ceilingz {
            // hit the ceiling
            if momz > 0 {
                momz = 0;
            }
            z = mo.ceilingz - mo.height;
            if skullfly {
                // the skull slammed into the ceiling
                momz = -momz;
            }
            self.store_z(e, z, momz)?;
            if explodes {
                return self.explode_missile(e, hooks);
            }
        }
        Ok(())
    }

    fn store_z(&mut self, e: Entity, z: Fixed, momz: Fixed) -> Result<(), SimError> {
        let mut m = self.mobj_mut(e)?;
        m.z = z;
        m.momz = momz;
        Ok(())
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
