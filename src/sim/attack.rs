//! Hitscan, use and splash: everything that reaches out from an actor
//! instead of moving it.

use hecs::Entity;
use log::debug;

use super::trace::{Intercept, InterceptTarget};
use super::{Hooks, MAXRADIUS, Sim, SimError, SpawnZ};
use crate::defs::{MobjFlags, MobjInfo, PathFlags, Sound};
use crate::math::{
    ANGLETOFINESHIFT, Angle, FRACBITS, FRACUNIT, Fixed, approx_distance, finecosine, finesine,
    fixed_div, fixed_mul, point_to_angle2, to_fixed,
};
use crate::world::{DivLine, Line, MAPBLOCKSHIFT, line_opening, point_on_line_side};

pub const MELEERANGE: Fixed = to_fixed(64);
pub const MISSILERANGE: Fixed = to_fixed(32 * 64);
pub const USERANGE: Fixed = to_fixed(64);

/// Vertical half-window of autoaim, as a slope (100 / 160).
const AIM_SLOPE: Fixed = 100 * FRACUNIT / 160;
/// Player missiles look this far for something to aim at.
const MISSILE_AIM_RANGE: Fixed = to_fixed(16 * 64);
/// Missiles leave from this high above the shooter's feet.
const MISSILE_HEIGHT: Fixed = to_fixed(4 * 8);

/// Result of an autoaim trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aim {
    pub slope: Fixed,
    pub target: Option<Entity>,
}

/// One hitscan in flight.
struct Shot {
    shooter: Entity,
    shootz: Fixed,
    range: Fixed,
    slope: Fixed,
    damage: i32,
    hit: Option<Entity>,
}

/// Autoaim window while it narrows along the trace.
struct AimWindow {
    shooter: Entity,
    shootz: Fixed,
    range: Fixed,
    top: Fixed,
    bottom: Fixed,
    aim: Aim,
}

/// End point `distance` along `angle` from `(x, y)`, with the whole-unit
/// truncation of the distance.
fn reach(x: Fixed, y: Fixed, angle: Angle, distance: Fixed) -> (Fixed, Fixed) {
    let an = (angle >> ANGLETOFINESHIFT) as usize;
    let units = distance >> FRACBITS;
    (
        x.wrapping_add(units.wrapping_mul(finecosine(an))),
        y.wrapping_add(units.wrapping_mul(finesine(an))),
    )
}

/// Floor / ceiling steps across a line.  A missing back side counts as a
/// step on both.
fn height_steps(sim: &Sim, line: &Line) -> (bool, bool) {
    let front = &sim.level.sectors[line.front as usize];
    match line.back {
        Some(b) => {
            let back = &sim.level.sectors[b as usize];
            (front.floor_h != back.floor_h, front.ceil_h != back.ceil_h)
        }
        None => (true, true),
    }
}

impl Sim {
    /*──────────────────────────── aim ────────────────────────────*/

    /// Find the first shootable thing along `angle` within `distance`
    /// that is visible through the vertical window.  `slope` is 0 when
    /// nothing is found.
    pub fn aim_line_attack(&mut self, e: Entity, angle: Angle, distance: Fixed) -> Result<Aim, SimError> {
        let mo = self.mobj(e)?;
        let (x2, y2) = reach(mo.x, mo.y, angle, distance);

        let mut win = AimWindow {
            shooter: e,
            shootz: mo.z + (mo.height >> 1) + to_fixed(8),
            range: distance,
            top: AIM_SLOPE,
            bottom: -AIM_SLOPE,
            aim: Aim { slope: 0, target: None },
        };

        self.path_traverse(
            mo.x,
            mo.y,
            x2,
            y2,
            PathFlags::ADD_LINES | PathFlags::ADD_THINGS,
            |sim, _, ic| sim.ptr_aim_traverse(ic, &mut win),
        )?;

        if win.aim.target.is_none() {
            win.aim.slope = 0;
        }
        Ok(win.aim)
    }

    fn ptr_aim_traverse(&mut self, ic: &Intercept, win: &mut AimWindow) -> Result<bool, SimError> {
        match ic.target {
            InterceptTarget::Line(id) => {
                let line = *self.level.line(id);
                if !line.is_two_sided() {
                    // stop
                    return Ok(false);
                }

                // crosses a two sided line; may narrow the window
                line_opening(&self.level, &line, &mut self.scratch.opening);
                let open = self.scratch.opening;
                if open.bottom >= open.top {
                    return Ok(false);
                }

                let dist = fixed_mul(win.range, ic.frac);
                let (floor_step, ceil_step) = height_steps(self, &line);
                if floor_step {
                    let slope = fixed_div(open.bottom - win.shootz, dist);
                    if slope > win.bottom {
                        win.bottom = slope;
                    }
                }
                if ceil_step {
                    let slope = fixed_div(open.top - win.shootz, dist);
                    if slope < win.top {
                        win.top = slope;
                    }
                }

                Ok(win.top > win.bottom)
            }
            InterceptTarget::Thing(th) => {
                if th == win.shooter {
                    return Ok(true);
                }
                let t = self.mobj(th)?;
                if !t.flags.contains(MobjFlags::SHOOTABLE) {
                    return Ok(true);
                }

                let dist = fixed_mul(win.range, ic.frac);
                let mut top = fixed_div(t.z + t.height - win.shootz, dist);
                if top < win.bottom {
                    // shot over the thing
                    return Ok(true);
                }
                let mut bottom = fixed_div(t.z - win.shootz, dist);
                if bottom > win.top {
                    // shot under the thing
                    return Ok(true);
                }

                top = top.min(win.top);
                bottom = bottom.max(win.bottom);

                win.aim = Aim {
                    slope: (top + bottom) / 2,
                    target: Some(th),
                };
                Ok(false)
            }
        }
    }

    /*──────────────────────────── shoot ──────────────────────────*/

    /// Fire a hitscan along `angle` at `slope`.  Leaves a puff or blood
    /// at the impact point and returns the thing hit, if any.
    pub fn line_attack(
        &mut self,
        e: Entity,
        angle: Angle,
        distance: Fixed,
        slope: Fixed,
        damage: i32,
        hooks: &mut dyn Hooks,
    ) -> Result<Option<Entity>, SimError> {
        let mo = self.mobj(e)?;
        let (x2, y2) = reach(mo.x, mo.y, angle, distance);

        let mut shot = Shot {
            shooter: e,
            shootz: mo.z + (mo.height >> 1) + to_fixed(8),
            range: distance,
            slope,
            damage,
            hit: None,
        };

        self.path_traverse(
            mo.x,
            mo.y,
            x2,
            y2,
            PathFlags::ADD_LINES | PathFlags::ADD_THINGS,
            |sim, trace, ic| sim.ptr_shoot_traverse(trace, ic, &mut shot, hooks),
        )?;

        Ok(shot.hit)
    }

    fn ptr_shoot_traverse(
        &mut self,
        trace: &DivLine,
        ic: &Intercept,
        shot: &mut Shot,
        hooks: &mut dyn Hooks,
    ) -> Result<bool, SimError> {
        match ic.target {
            InterceptTarget::Line(id) => {
                let line = *self.level.line(id);
                if line.special != 0 {
                    hooks.shoot_special_line(&mut self.world, shot.shooter, id);
                }

                let blocked = if !line.is_two_sided() {
                    true
                } else {
                    // crosses a two sided line
                    line_opening(&self.level, &line, &mut self.scratch.opening);
                    let open = self.scratch.opening;
                    let dist = fixed_mul(shot.range, ic.frac);
                    let (floor_step, ceil_step) = height_steps(self, &line);

                    (floor_step && fixed_div(open.bottom - shot.shootz, dist) > shot.slope)
                        || (ceil_step && fixed_div(open.top - shot.shootz, dist) < shot.slope)
                };
                if !blocked {
                    // shot continues
                    return Ok(true);
                }

                // position a bit closer
                let frac = ic.frac - fixed_div(to_fixed(4), shot.range);
                let x = trace.x + fixed_mul(trace.dx, frac);
                let y = trace.y + fixed_mul(trace.dy, frac);
                let z = shot.shootz + fixed_mul(shot.slope, fixed_mul(frac, shot.range));

                let front = &self.level.sectors[line.front as usize];
                if front.ceiling_is_sky {
                    // don't shoot the sky
                    if z > front.ceil_h {
                        return Ok(false);
                    }
                    // it's a sky hack wall
                    if line.back.is_some_and(|b| self.level.sectors[b as usize].ceiling_is_sky) {
                        return Ok(false);
                    }
                }

                self.spawn_puff(x, y, z, shot.range == MELEERANGE, hooks)?;
                Ok(false)
            }
            InterceptTarget::Thing(th) => {
                if th == shot.shooter {
                    return Ok(true);
                }
                let t = self.mobj(th)?;
                if !t.flags.contains(MobjFlags::SHOOTABLE) {
                    return Ok(true);
                }

                let dist = fixed_mul(shot.range, ic.frac);
                if fixed_div(t.z + t.height - shot.shootz, dist) < shot.slope {
                    // shot over the thing
                    return Ok(true);
                }
                if fixed_div(t.z - shot.shootz, dist) > shot.slope {
                    // shot under the thing
                    return Ok(true);
                }

                // hit thing; position a bit closer
                let frac = ic.frac - fixed_div(to_fixed(10), shot.range);
                let x = trace.x + fixed_mul(trace.dx, frac);
                let y = trace.y + fixed_mul(trace.dy, frac);
                let z = shot.shootz + fixed_mul(shot.slope, fixed_mul(frac, shot.range));

                if t.flags.contains(MobjFlags::NOBLOOD) {
                    self.spawn_puff(x, y, z, shot.range == MELEERANGE, hooks)?;
                } else {
                    self.spawn_blood(x, y, z, shot.damage, hooks)?;
                }

                if shot.damage != 0 {
                    hooks.damage(&mut self.world, th, Some(shot.shooter), Some(shot.shooter), shot.damage);
                }
                shot.hit = Some(th);
                Ok(false)
            }
        }
    }

    /*───────────────────────────── use ───────────────────────────*/

    /// Press use: activate the first special line within reach, or grunt
    /// at a closed wall.
    pub fn use_lines(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let mo = self.mobj(e)?;
        let (x2, y2) = reach(mo.x, mo.y, mo.angle, USERANGE);

        self.path_traverse(mo.x, mo.y, x2, y2, PathFlags::ADD_LINES, |sim, _, ic| {
            let InterceptTarget::Line(id) = ic.target else {
                return Ok(true);
            };
            let line = *sim.level.line(id);

            if line.special == 0 {
                line_opening(&sim.level, &line, &mut sim.scratch.opening);
                if sim.scratch.opening.range <= 0 {
                    hooks.start_sound(&mut sim.world, e, Sound::NoWay);
                    // can't use through a wall
                    return Ok(false);
                }
                // not a special line, but keep checking
                return Ok(true);
            }

            let side = point_on_line_side(mo.x, mo.y, &line);
            hooks.use_special_line(&mut sim.world, e, id, side);
            // can't use more than one special line in a row
            Ok(false)
        })?;
        Ok(())
    }

    /*──────────────────────────── splash ─────────────────────────*/

    /// Damage every shootable thing near `spot` that can see it.  Damage
    /// falls off one point per unit of box distance past the radius.
    pub fn radius_attack(
        &mut self,
        spot: Entity,
        source: Option<Entity>,
        damage: i32,
        hooks: &mut dyn Hooks,
    ) -> Result<(), SimError> {
        let s = self.mobj(spot)?;

        // the radius pad is shifted out of the word; the box ends up
        // `damage` units wide
        let dist = damage.wrapping_add(MAXRADIUS).wrapping_shl(FRACBITS as u32);

        let bm = &self.level.blockmap;
        let yh = (s.y.wrapping_add(dist) - bm.origin_y) >> MAPBLOCKSHIFT;
        let yl = (s.y.wrapping_sub(dist) - bm.origin_y) >> MAPBLOCKSHIFT;
        let xh = (s.x.wrapping_add(dist) - bm.origin_x) >> MAPBLOCKSHIFT;
        let xl = (s.x.wrapping_sub(dist) - bm.origin_x) >> MAPBLOCKSHIFT;

        for y in yl..=yh {
            for x in xl..=xh {
                self.block_things_iter(x, y, |sim, th| {
                    sim.pit_radius_attack(spot, source, damage, th, hooks)
                })?;
            }
        }
        Ok(())
    }

    fn pit_radius_attack(
        &mut self,
        spot: Entity,
        source: Option<Entity>,
        damage: i32,
        thing: Entity,
        hooks: &mut dyn Hooks,
    ) -> Result<bool, SimError> {
        let t = self.mobj(thing)?;
        if !t.flags.contains(MobjFlags::SHOOTABLE) {
            return Ok(true);
        }
        // bosses take no damage from concussion
        if t.kind.ignores_splash() {
            return Ok(true);
        }

        let s = self.mobj(spot)?;
        let dx = (t.x - s.x).abs();
        let dy = (t.y - s.y).abs();
        let dist = ((dx.max(dy) - t.radius) >> FRACBITS).max(0);

        if dist >= damage {
            // out of range
            return Ok(true);
        }

        if hooks.check_sight(self, thing, spot) {
            hooks.damage(&mut self.world, thing, Some(spot), source, damage - dist);
        }
        Ok(true)
    }

    /*──────────────────────────── missiles ───────────────────────*/

    /// Autoaim for a player missile: straight ahead, then a little to
    /// the left, then to the right, else level along the facing.
    pub fn aim_player_missile(&mut self, e: Entity) -> Result<(Angle, Fixed), SimError> {
        let facing = self.mobj(e)?.angle;

        let mut an = facing;
        let mut aim = self.aim_line_attack(e, an, MISSILE_AIM_RANGE)?;
        if aim.target.is_none() {
            an = an.wrapping_add(1 << 26);
            aim = self.aim_line_attack(e, an, MISSILE_AIM_RANGE)?;
            if aim.target.is_none() {
                an = an.wrapping_sub(2 << 26);
                aim = self.aim_line_attack(e, an, MISSILE_AIM_RANGE)?;
            }
            if aim.target.is_none() {
                an = facing;
                aim.slope = 0;
            }
        }
        Ok((an, aim.slope))
    }

    /// Launch a player missile along the autoaimed direction.
    pub fn spawn_player_missile(
        &mut self,
        e: Entity,
        missile: &MobjInfo,
        hooks: &mut dyn Hooks,
    ) -> Result<Entity, SimError> {
        let (an, slope) = self.aim_player_missile(e)?;
        let src = self.mobj(e)?;

        let th = self.spawn_mobj(missile, src.x, src.y, SpawnZ::At(src.z + MISSILE_HEIGHT))?;
        let fine = (an >> ANGLETOFINESHIFT) as usize;
        {
            let mut m = self.mobj_mut(th)?;
            m.target = Some(e);
            m.angle = an;
            m.momx = fixed_mul(missile.speed, finecosine(fine));
            m.momy = fixed_mul(missile.speed, finesine(fine));
            m.momz = fixed_mul(missile.speed, slope);
        }

        self.check_missile_spawn(th, hooks)?;
        Ok(th)
    }

    /// Launch a monster missile at `dest`.  Shadowed targets throw the
    /// aim off a little.
    pub fn spawn_missile(
        &mut self,
        source: Entity,
        dest: Entity,
        missile: &MobjInfo,
        hooks: &mut dyn Hooks,
    ) -> Result<Entity, SimError> {
        let src = self.mobj(source)?;
        let dst = self.mobj(dest)?;

        let th = self.spawn_mobj(missile, src.x, src.y, SpawnZ::At(src.z + MISSILE_HEIGHT))?;

        let mut an = point_to_angle2(src.x, src.y, dst.x, dst.y);
        if dst.flags.contains(MobjFlags::SHADOW) {
            an = an.wrapping_add((hooks.sub_random() << 20) as Angle);
        }
        let fine = (an >> ANGLETOFINESHIFT) as usize;

        let dist = (approx_distance(dst.x - src.x, dst.y - src.y) / missile.speed.max(1)).max(1);
        {
            let mut m = self.mobj_mut(th)?;
            m.target = Some(source);
            m.angle = an;
            m.momx = fixed_mul(missile.speed, finecosine(fine));
            m.momy = fixed_mul(missile.speed, finesine(fine));
            m.momz = (dst.z - src.z) / dist;
        }

        self.check_missile_spawn(th, hooks)?;
        Ok(th)
    }

    /// Nudge a fresh missile half a tic forward so point-blank shots
    /// still collide; explode it if that spot is already blocked.
    /// Returns whether it survived.
    pub fn check_missile_spawn(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<bool, SimError> {
        hooks.jitter_tics(&mut self.world, e);

        let (x, y) = {
            let mut m = self.mobj_mut(e)?;
            m.x += m.momx >> 1;
            m.y += m.momy >> 1;
            m.z += m.momz >> 1;
            (m.x, m.y)
        };

        if !self.try_move(e, x, y, hooks)?.moved {
            debug!("missile {e:?} blocked at spawn");
            self.explode_missile(e, hooks)?;
            return Ok(false);
        }
        Ok(true)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
