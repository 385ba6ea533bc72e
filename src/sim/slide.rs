//! Wall sliding for players: find the nearest blocking line along the
//! momentum, move up to it, then redirect the rest of the momentum along
//! the wall.

use hecs::Entity;
use log::trace;

use super::trace::{Intercept, InterceptTarget};
use super::{Hooks, MAXSTEP, Mobj, Sim, SimError};
use crate::defs::PathFlags;
use crate::math::{
    ANG180, ANGLETOFINESHIFT, FRACUNIT, Fixed, approx_distance, finecosine, finesine, fixed_mul,
    point_to_angle2,
};
use crate::world::{DivLine, Line, LineId, SlopeType, line_opening, point_on_line_side};

/// Nearest blocking line found by the three corner traces.
struct SlideHit {
    frac: Fixed,
    line: Option<LineId>,
}

/// Project `(xmove, ymove)` onto `line` as seen from `(x, y)`.
/// Axis-aligned lines just drop the blocked component.
pub fn hit_slide_line(line: &Line, x: Fixed, y: Fixed, xmove: Fixed, ymove: Fixed) -> (Fixed, Fixed) {
    match line.slope {
        SlopeType::Horizontal => return (xmove, 0),
        SlopeType::Vertical => return (0, ymove),
        _ => {}
    }

    let side = point_on_line_side(x, y, line);

    let mut lineangle = point_to_angle2(0, 0, line.dx, line.dy);
    if side == 1 {
        lineangle = lineangle.wrapping_add(ANG180);
    }

    let moveangle = point_to_angle2(0, 0, xmove, ymove);
    let mut deltaangle = moveangle.wrapping_sub(lineangle);
    if deltaangle > ANG180 {
        deltaangle = deltaangle.wrapping_add(ANG180);
    }

    let lineangle = (lineangle >> ANGLETOFINESHIFT) as usize;
    let deltaangle = (deltaangle >> ANGLETOFINESHIFT) as usize;

    let movelen = approx_distance(xmove, ymove);
    let newlen = fixed_mul(movelen, finecosine(deltaangle));

    (
        fixed_mul(newlen, finecosine(lineangle)),
        fixed_mul(newlen, finesine(lineangle)),
    )
}

impl Sim {
    /// Move `e` by its momentum, sliding along whatever wall is in the
    /// way.  Momentum is rewritten to the slid direction.
    pub fn slide_move(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let mut hitcount = 0;

        loop {
            hitcount += 1;
            if hitcount == 3 {
                return self.stairstep(e, hooks);
            }

            let mo = self.mobj(e)?;

            // trace along the three leading corners
            let (leadx, trailx) = if mo.momx > 0 {
                (mo.x + mo.radius, mo.x - mo.radius)
            } else {
                (mo.x - mo.radius, mo.x + mo.radius)
            };
            let (leady, traily) = if mo.momy > 0 {
                (mo.y + mo.radius, mo.y - mo.radius)
            } else {
                (mo.y - mo.radius, mo.y + mo.radius)
            };

            let mut hit = SlideHit { frac: FRACUNIT + 1, line: None };
            for (sx, sy) in [(leadx, leady), (trailx, leady), (leadx, traily)] {
                self.path_traverse(
                    sx,
                    sy,
                    sx + mo.momx,
                    sy + mo.momy,
                    PathFlags::ADD_LINES,
                    |sim, _: &DivLine, ic| sim.ptr_slide_traverse(&mo, ic, &mut hit),
                )?;
            }

            // move to take the full momentum
            let Some(best_line) = hit.line else {
                return self.stairstep(e, hooks);
            };

            // fudge a bit to make sure it doesn't hit
            let mut frac = hit.frac - 0x800;
            if frac > 0 {
                let newx = fixed_mul(mo.momx, frac);
                let newy = fixed_mul(mo.momy, frac);
                if !self.try_move(e, mo.x + newx, mo.y + newy, hooks)?.moved {
                    return self.stairstep(e, hooks);
                }
            }

            // remainder of the move, along the wall
            frac = FRACUNIT - (frac + 0x800);
            if frac > FRACUNIT {
                frac = FRACUNIT;
            }
            if frac <= 0 {
                return Ok(());
            }

            let mo = self.mobj(e)?;
            let line = *self.level.line(best_line);
            let (xmove, ymove) = hit_slide_line(
                &line,
                mo.x,
                mo.y,
                fixed_mul(mo.momx, frac),
                fixed_mul(mo.momy, frac),
            );
            trace!("slide {e:?} along line {best_line}: ({xmove}, {ymove})");

            {
                let mut m = self.mobj_mut(e)?;
                m.momx = xmove;
                m.momy = ymove;
            }

            if self.try_move(e, mo.x + xmove, mo.y + ymove, hooks)?.moved {
                return Ok(());
            }
        }
    }

    /// Last resort: try the y part of the move alone, then the x part.
    fn stairstep(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let mo = self.mobj(e)?;
        if !self.try_move(e, mo.x, mo.y + mo.momy, hooks)?.moved {
            self.try_move(e, mo.x + mo.momx, mo.y, hooks)?;
        }
        Ok(())
    }

    fn ptr_slide_traverse(
        &mut self,
        mo: &Mobj,
        ic: &Intercept,
        hit: &mut SlideHit,
    ) -> Result<bool, SimError> {
        let InterceptTarget::Line(id) = ic.target else {
            return Err(SimError::SlideHitThing);
        };
        let line = *self.level.line(id);

        let blocking = if !line.is_two_sided() {
            // the back side of a one-sided line never blocks
            if point_on_line_side(mo.x, mo.y, &line) == 1 {
                return Ok(true);
            }
            true
        } else {
            line_opening(&self.level, &line, &mut self.scratch.opening);
            let open = self.scratch.opening;
            open.range < mo.height
                || open.top - mo.z < mo.height
                || open.bottom - mo.z > MAXSTEP
        };

        if !blocking {
            // this line doesn't block movement
            return Ok(true);
        }

        if ic.frac < hit.frac {
            hit.frac = ic.frac;
            hit.line = Some(id);
        }

        // stop
        Ok(false)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
