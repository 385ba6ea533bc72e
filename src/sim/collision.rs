//! Position test: can an actor stand at `(x, y)`, and what floor /
//! ceiling does its footprint see there.
//!
//! Things are scanned first over the bbox padded by `MAXRADIUS` (actors
//! are bucketed by origin), lines second over the bare bbox.  Contact
//! with things runs the side effects straight away: charging skulls and
//! missiles deal damage, pickups get touched.

use hecs::Entity;
use log::trace;
use smallvec::SmallVec;

use super::overrun::{OverrunEffect, spechit_overrun};
use super::{Hooks, MAXRADIUS, MAXSPECIALCROSS, Mobj, Sim, SimError, Touch};
use crate::defs::{MobjFlags, StateRequest};
use crate::math::Fixed;
use crate::world::{BBox, LineId, LinedefFlags, MAPBLOCKSHIFT, box_on_line_side, line_opening};

/// Result of `check_position`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passable: bool,
    /// Highest floor the footprint touches.
    pub floorz: Fixed,
    /// Lowest ceiling the footprint touches.
    pub ceilingz: Fixed,
    /// Lowest floor the footprint touches.
    pub dropoffz: Fixed,
    /// Line that set `ceilingz`, if any.
    pub ceilingline: Option<LineId>,
    /// Special lines contacted, in contact order.
    pub spechit: SmallVec<[LineId; MAXSPECIALCROSS]>,
    /// Overrun writes that fired while collecting `spechit`.
    pub overruns: SmallVec<[OverrunEffect; 4]>,
}

/// State of one position test.
pub(crate) struct CheckCtx {
    pub thing: Entity,
    /// Mover snapshot taken at the start of the test.
    pub mo: Mobj,
    pub x: Fixed,
    pub y: Fixed,
    /// Movement bbox.  Overrun writes can corrupt it mid-scan.
    pub bbox: BBox,
    pub out: CheckOutcome,
}

impl Sim {
    /// Test `e` at `(x, y)` without moving it.
    pub fn check_position(
        &mut self,
        e: Entity,
        x: Fixed,
        y: Fixed,
        hooks: &mut dyn Hooks,
    ) -> Result<CheckOutcome, SimError> {
        let mo = self.mobj(e)?;
        let sector = self.level.sector_at(x, y);

        let mut ctx = CheckCtx {
            thing: e,
            mo,
            x,
            y,
            bbox: BBox::around(x, y, mo.radius),
            out: CheckOutcome {
                passable: false,
                floorz: sector.floor_h,
                ceilingz: sector.ceil_h,
                dropoffz: sector.floor_h,
                ..CheckOutcome::default()
            },
        };

        self.new_validcount();

        if mo.flags.contains(MobjFlags::NOCLIP) {
            ctx.out.passable = true;
            return Ok(ctx.out);
        }

        let (ox, oy) = (self.level.blockmap.origin_x, self.level.blockmap.origin_y);

        // things, padded
        let xl = (ctx.bbox.left - ox - MAXRADIUS) >> MAPBLOCKSHIFT;
        let xh = (ctx.bbox.right - ox + MAXRADIUS) >> MAPBLOCKSHIFT;
        let yl = (ctx.bbox.bottom - oy - MAXRADIUS) >> MAPBLOCKSHIFT;
        let yh = (ctx.bbox.top - oy + MAXRADIUS) >> MAPBLOCKSHIFT;

        for bx in xl..=xh {
            for by in yl..=yh {
                if !self.block_things_iter(bx, by, |sim, t| sim.pit_check_thing(&mut ctx, t, hooks))? {
                    return Ok(ctx.out);
                }
            }
        }

        // lines
        let xl = (ctx.bbox.left - ox) >> MAPBLOCKSHIFT;
        let xh = (ctx.bbox.right - ox) >> MAPBLOCKSHIFT;
        let yl = (ctx.bbox.bottom - oy) >> MAPBLOCKSHIFT;
        let yh = (ctx.bbox.top - oy) >> MAPBLOCKSHIFT;

        for bx in xl..=xh {
            for by in yl..=yh {
                if !self.block_lines_iter(bx, by, |sim, l| sim.pit_check_line(&mut ctx, l))? {
                    return Ok(ctx.out);
                }
            }
        }

        ctx.out.passable = true;
        Ok(ctx.out)
    }

    /// `true` keeps the scan going.
    fn pit_check_thing(
        &mut self,
        ctx: &mut CheckCtx,
        thing: Entity,
        hooks: &mut dyn Hooks,
    ) -> Result<bool, SimError> {
        let t = self.mobj(thing)?;

        if !t
            .flags
            .intersects(MobjFlags::SOLID | MobjFlags::SPECIAL | MobjFlags::SHOOTABLE)
        {
            return Ok(true);
        }

        let blockdist = t.radius.wrapping_add(ctx.mo.radius);
        if t.x.wrapping_sub(ctx.x).wrapping_abs() >= blockdist
            || t.y.wrapping_sub(ctx.y).wrapping_abs() >= blockdist
        {
            return Ok(true);
        }

        if thing == ctx.thing {
            return Ok(true);
        }

        if ctx.mo.flags.contains(MobjFlags::SKULLFLY) {
            let damage = (hooks.random() as i32 % 8 + 1) * ctx.mo.damage;
            hooks.damage(&mut self.world, thing, Some(ctx.thing), Some(ctx.thing), damage);

            {
                let mut me = self.mobj_mut(ctx.thing)?;
                me.flags.remove(MobjFlags::SKULLFLY);
                me.momx = 0;
                me.momy = 0;
                me.momz = 0;
            }
            ctx.mo.flags.remove(MobjFlags::SKULLFLY);
            hooks.set_state(&mut self.world, ctx.thing, StateRequest::Spawn);
            trace!("skull {:?} slammed into {:?} for {damage}", ctx.thing, thing);
            return Ok(false);
        }

        if ctx.mo.flags.contains(MobjFlags::MISSILE) {
            // over or under
            if ctx.mo.z > t.z + t.height || ctx.mo.z + ctx.mo.height < t.z {
                return Ok(true);
            }

            if let Some(src) = ctx.mo.target {
                let src_kind = self.mobj(src).ok().map(|m| m.kind);
                if src_kind.is_some_and(|k| k.same_species(t.kind)) {
                    if thing == src {
                        return Ok(true);
                    }
                    if !self.is_player(thing) && !self.config.species_infighting {
                        // explode, but no damage
                        return Ok(false);
                    }
                }
            }

            if !t.flags.contains(MobjFlags::SHOOTABLE) {
                return Ok(!t.flags.contains(MobjFlags::SOLID));
            }

            let damage = (hooks.random() as i32 % 8 + 1) * ctx.mo.damage;
            hooks.damage(&mut self.world, thing, Some(ctx.thing), ctx.mo.target, damage);
            return Ok(false);
        }

        let solid = t.flags.contains(MobjFlags::SOLID);
        if t.flags.contains(MobjFlags::SPECIAL) && ctx.mo.flags.contains(MobjFlags::PICKUP) {
            if hooks.touch_special(&mut self.world, thing, ctx.thing) == Touch::Remove {
                self.remove_mobj(thing)?;
            }
        }
        Ok(!solid)
    }

    fn pit_check_line(&mut self, ctx: &mut CheckCtx, id: LineId) -> Result<bool, SimError> {
        let line = *self.level.line(id);

        if ctx.bbox.right <= line.bbox.left
            || ctx.bbox.left >= line.bbox.right
            || ctx.bbox.top <= line.bbox.bottom
            || ctx.bbox.bottom >= line.bbox.top
        {
            return Ok(true);
        }

        if box_on_line_side(&ctx.bbox, &line).is_some() {
            return Ok(true);
        }

        // one-sided lines block everything, missiles included
        if line.back.is_none() {
            return Ok(false);
        }

        if !ctx.mo.flags.contains(MobjFlags::MISSILE) {
            if line.flags.contains(LinedefFlags::IMPASSABLE) {
                return Ok(false);
            }
            if !self.is_player(ctx.thing) && line.flags.contains(LinedefFlags::BLOCK_MONSTERS) {
                return Ok(false);
            }
        }

        line_opening(&self.level, &line, &mut self.scratch.opening);
        let open = self.scratch.opening;

        if open.top < ctx.out.ceilingz {
            ctx.out.ceilingz = open.top;
            ctx.out.ceilingline = Some(id);
        }
        if open.bottom > ctx.out.floorz {
            ctx.out.floorz = open.bottom;
        }
        if open.low_floor < ctx.out.dropoffz {
            ctx.out.dropoffz = open.low_floor;
        }

        if line.special != 0 {
            if ctx.out.spechit.len() >= MAXSPECIALCROSS {
                return Err(SimError::SpechitOverflow { line: id });
            }
            ctx.out.spechit.push(id);

            let base = self.config.spechit_magic.base();
            if let Some(effect) = spechit_overrun(base, ctx.out.spechit.len(), id) {
                self.apply_overrun(ctx, effect);
            }
        }

        Ok(true)
    }

    fn apply_overrun(&mut self, ctx: &mut CheckCtx, effect: OverrunEffect) {
        match effect {
            OverrunEffect::BBox { edge, value } => *ctx.bbox.edge_mut(edge) = value as Fixed,
            OverrunEffect::CrushChange(v) => self.crush.crush_change = v,
            OverrunEffect::NoFit(v) => self.crush.nofit = v,
            OverrunEffect::Unemulated { .. } => {}
        }
        ctx.out.overruns.push(effect);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
