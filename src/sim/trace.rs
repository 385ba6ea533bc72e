//! Blockmap tracing: walk the cells a segment passes through, collect
//! the lines and things it crosses, then visit them nearest first.

use hecs::Entity;
use log::{trace, warn};

use super::{MAXINTERCEPTS, MAXINTERCEPTS_ORIGINAL, Sim, SimError};
use crate::defs::PathFlags;
use crate::math::{FRACBITS, FRACUNIT, Fixed, fixed_div, fixed_mul};
use crate::world::{
    DivLine, LineId, MAPBLOCKSHIFT, MAPBLOCKSIZE, MAPBTOFRAC, intercept_vector,
    point_on_divline_side, point_on_line_side,
};

/// Hard cap on cells visited by one traversal.
const MAX_CELLS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptTarget {
    Line(LineId),
    Thing(Entity),
}

/// One crossing, `frac` along the trace (`FRACUNIT` = the end point).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intercept {
    pub frac: Fixed,
    pub target: InterceptTarget,
}

impl Sim {
    /// Trace `(x1,y1) → (x2,y2)` and hand each collected intercept to `f`
    /// in order of distance.  `f` returns `false` to stop; the walk then
    /// returns `false` as well.
    pub fn path_traverse<F>(
        &mut self,
        x1: Fixed,
        y1: Fixed,
        x2: Fixed,
        y2: Fixed,
        flags: PathFlags,
        mut f: F,
    ) -> Result<bool, SimError>
    where
        F: FnMut(&mut Sim, &DivLine, &Intercept) -> Result<bool, SimError>,
    {
        let (ox, oy) = (self.level.blockmap.origin_x, self.level.blockmap.origin_y);
        let (mut x1, mut y1) = (x1, y1);

        self.new_validcount();
        self.scratch.intercepts.clear();

        // don't start exactly on a cell edge
        if x1.wrapping_sub(ox) & (MAPBLOCKSIZE - 1) == 0 {
            x1 = x1.wrapping_add(FRACUNIT);
        }
        if y1.wrapping_sub(oy) & (MAPBLOCKSIZE - 1) == 0 {
            y1 = y1.wrapping_add(FRACUNIT);
        }

        let trace = DivLine {
            x: x1,
            y: y1,
            dx: x2.wrapping_sub(x1),
            dy: y2.wrapping_sub(y1),
        };

        let (x1, y1) = (x1.wrapping_sub(ox), y1.wrapping_sub(oy));
        let (x2, y2) = (x2.wrapping_sub(ox), y2.wrapping_sub(oy));
        let (xt1, yt1) = (x1 >> MAPBLOCKSHIFT, y1 >> MAPBLOCKSHIFT);
        let (xt2, yt2) = (x2 >> MAPBLOCKSHIFT, y2 >> MAPBLOCKSHIFT);

        let (mapxstep, partial, ystep) = if xt2 > xt1 {
            (
                1,
                FRACUNIT - ((x1 >> MAPBTOFRAC) & (FRACUNIT - 1)),
                fixed_div(y2.wrapping_sub(y1), x2.wrapping_sub(x1).wrapping_abs()),
            )
        } else if xt2 < xt1 {
            (
                -1,
                (x1 >> MAPBTOFRAC) & (FRACUNIT - 1),
                fixed_div(y2.wrapping_sub(y1), x2.wrapping_sub(x1).wrapping_abs()),
            )
        } else {
            (0, FRACUNIT, 256 * FRACUNIT)
        };
        let mut yintercept = (y1 >> MAPBTOFRAC).wrapping_add(fixed_mul(partial, ystep));

        let (mapystep, partial, xstep) = if yt2 > yt1 {
            (
                1,
                FRACUNIT - ((y1 >> MAPBTOFRAC) & (FRACUNIT - 1)),
                fixed_div(x2.wrapping_sub(x1), y2.wrapping_sub(y1).wrapping_abs()),
            )
        } else if yt2 < yt1 {
            (
                -1,
                (y1 >> MAPBTOFRAC) & (FRACUNIT - 1),
                fixed_div(x2.wrapping_sub(x1), y2.wrapping_sub(y1).wrapping_abs()),
            )
        } else {
            (0, FRACUNIT, 256 * FRACUNIT)
        };
        let mut xintercept = (x1 >> MAPBTOFRAC).wrapping_add(fixed_mul(partial, xstep));

        let (mut mapx, mut mapy) = (xt1, yt1);
        let earlyout = flags.contains(PathFlags::EARLY_OUT);

        for _ in 0..MAX_CELLS {
            trace!("trace cell ({mapx},{mapy})");

            if flags.contains(PathFlags::ADD_LINES)
                && !self.block_lines_iter(mapx, mapy, |sim, l| {
                    sim.add_line_intercept(&trace, l, earlyout)
                })?
            {
                // early out
                return Ok(false);
            }

            if flags.contains(PathFlags::ADD_THINGS)
                && !self.block_things_iter(mapx, mapy, |sim, t| sim.add_thing_intercept(&trace, t))?
            {
                return Ok(false);
            }

            if mapx == xt2 && mapy == yt2 {
                break;
            }

            if yintercept >> FRACBITS == mapy {
                yintercept = yintercept.wrapping_add(ystep);
                mapx += mapxstep;
            } else if xintercept >> FRACBITS == mapx {
                xintercept = xintercept.wrapping_add(xstep);
                mapy += mapystep;
            }
        }

        self.traverse_intercepts(&trace, FRACUNIT, &mut f)
    }

    fn push_intercept(&mut self, ic: Intercept) -> Result<(), SimError> {
        let n = self.scratch.intercepts.len();
        if n >= MAXINTERCEPTS {
            return Err(SimError::InterceptOverflow);
        }
        if n == MAXINTERCEPTS_ORIGINAL {
            warn!("trace collected more than {MAXINTERCEPTS_ORIGINAL} intercepts");
        }
        self.scratch.intercepts.push(ic);
        Ok(())
    }

    fn add_line_intercept(
        &mut self,
        trace: &DivLine,
        id: LineId,
        earlyout: bool,
    ) -> Result<bool, SimError> {
        let line = self.level.line(id);

        // long traces use the cheaper, coarser divline test
        let long = trace.dx > FRACUNIT * 16
            || trace.dy > FRACUNIT * 16
            || trace.dx < -FRACUNIT * 16
            || trace.dy < -FRACUNIT * 16;
        let (s1, s2) = if long {
            (
                point_on_divline_side(line.v1.x, line.v1.y, trace),
                point_on_divline_side(line.v2.x, line.v2.y, trace),
            )
        } else {
            (
                point_on_line_side(trace.x, trace.y, line),
                point_on_line_side(trace.x.wrapping_add(trace.dx), trace.y.wrapping_add(trace.dy), line),
            )
        };
        if s1 == s2 {
            return Ok(true);
        }

        let frac = intercept_vector(trace, &DivLine::from_line(line));
        if frac < 0 {
            // behind source
            return Ok(true);
        }

        if earlyout && frac < FRACUNIT && line.back.is_none() {
            return Ok(false);
        }

        self.push_intercept(Intercept {
            frac,
            target: InterceptTarget::Line(id),
        })?;
        Ok(true)
    }

    fn add_thing_intercept(&mut self, trace: &DivLine, thing: Entity) -> Result<bool, SimError> {
        let t = self.mobj(thing)?;

        // the box diagonal that crosses the trace
        let tracepositive = (trace.dx ^ trace.dy) > 0;
        let (x1, y1, x2, y2) = if tracepositive {
            (
                t.x.wrapping_sub(t.radius),
                t.y.wrapping_add(t.radius),
                t.x.wrapping_add(t.radius),
                t.y.wrapping_sub(t.radius),
            )
        } else {
            (
                t.x.wrapping_sub(t.radius),
                t.y.wrapping_sub(t.radius),
                t.x.wrapping_add(t.radius),
                t.y.wrapping_add(t.radius),
            )
        };

        let s1 = point_on_divline_side(x1, y1, trace);
        let s2 = point_on_divline_side(x2, y2, trace);
        if s1 == s2 {
            return Ok(true);
        }

        let dl = DivLine { x: x1, y: y1, dx: x2.wrapping_sub(x1), dy: y2.wrapping_sub(y1) };
        let frac = intercept_vector(trace, &dl);
        if frac < 0 {
            return Ok(true);
        }

        self.push_intercept(Intercept {
            frac,
            target: InterceptTarget::Thing(thing),
        })?;
        Ok(true)
    }

    /// Repeatedly pick the nearest unvisited intercept (first one wins a
    /// tie) until past `maxfrac` or `f` says stop.
    fn traverse_intercepts<F>(
        &mut self,
        trace: &DivLine,
        maxfrac: Fixed,
        f: &mut F,
    ) -> Result<bool, SimError>
    where
        F: FnMut(&mut Sim, &DivLine, &Intercept) -> Result<bool, SimError>,
    {
        let mut list = std::mem::take(&mut self.scratch.intercepts);
        let res = self.visit_nearest(&mut list, trace, maxfrac, f);
        list.clear();
        self.scratch.intercepts = list;
        res
    }

    fn visit_nearest<F>(
        &mut self,
        list: &mut [Intercept],
        trace: &DivLine,
        maxfrac: Fixed,
        f: &mut F,
    ) -> Result<bool, SimError>
    where
        F: FnMut(&mut Sim, &DivLine, &Intercept) -> Result<bool, SimError>,
    {
        for _ in 0..list.len() {
            let mut dist = Fixed::MAX;
            let mut best = 0;
            for (i, ic) in list.iter().enumerate() {
                if ic.frac < dist {
                    dist = ic.frac;
                    best = i;
                }
            }

            if dist > maxfrac {
                // checked everything in range
                return Ok(true);
            }

            let ic = list[best];
            if !f(self, trace, &ic)? {
                return Ok(false);
            }
            list[best].frac = Fixed::MAX;
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
    use crate::defs::info;
    use crate::math::to_fixed;
    use crate::sim::test_support::*;
    use crate::sim::{PhysicsConfig, SpawnZ};

    fn collect(sim: &mut Sim, x1: i32, y1: i32, x2: i32, y2: i32, flags: PathFlags) -> Vec<Intercept> {
        let mut seen = Vec::new();
        sim.path_traverse(to_fixed(x1), to_fixed(y1), to_fixed(x2), to_fixed(y2), flags, |_, _, ic| {
            seen.push(*ic);
            Ok(true)
        })
        .unwrap();
        seen
    }

    #[test]
    fn intercepts_come_nearest_first_and_once() {
        let mut sim = sim_with(two_rooms(0, 128, 0, 128), PhysicsConfig::default());
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(128), to_fixed(100), SpawnZ::OnFloor).unwrap();

        let seen = collect(&mut sim, 20, 100, 400, 100, PathFlags::ADD_LINES | PathFlags::ADD_THINGS);
        let targets: Vec<_> = seen.iter().map(|ic| ic.target).collect();
        assert_eq!(
            targets,
            vec![InterceptTarget::Thing(k), InterceptTarget::Line(divider(&sim))]
        );
        assert!(seen.windows(2).all(|w| w[0].frac <= w[1].frac));
        assert!(seen.iter().all(|ic| (0..=FRACUNIT).contains(&ic.frac)));
    }

    #[test]
    fn stops_at_trace_end() {
        let mut sim = sim_with(two_rooms(0, 128, 0, 128), PhysicsConfig::default());
        // ends before the divider
        assert!(collect(&mut sim, 20, 100, 200, 100, PathFlags::ADD_LINES).is_empty());
    }

    #[test]
    fn early_out_on_solid_wall() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut called = false;
        let done = sim
            .path_traverse(
                to_fixed(64),
                to_fixed(64),
                to_fixed(400),
                to_fixed(64),
                PathFlags::ADD_LINES | PathFlags::EARLY_OUT,
                |_, _, _| {
                    called = true;
                    Ok(true)
                },
            )
            .unwrap();
        assert!(!done);
        assert!(!called);
    }

    #[test]
    fn visitor_can_stop_the_walk() {
        let mut sim = sim_with(two_rooms(0, 128, 0, 128), PhysicsConfig::default());
        let mut n = 0;
        let done = sim
            .path_traverse(
                to_fixed(20),
                to_fixed(100),
                to_fixed(600),
                to_fixed(100),
                PathFlags::ADD_LINES,
                |_, _, _| {
                    n += 1;
                    Ok(false)
                },
            )
            .unwrap();
        assert!(!done);
        assert_eq!(n, 1);
    }

    /// Open room crossed by `n` two-sided lines at x = 20, 21, ...,
    /// spanning y 100..140.
    fn line_fan(n: i32) -> Sim {
        let lvl = open_room_with(0, 128, |b| {
            for i in 0..n {
                let x = to_fixed(20 + i);
                b.add_two_sided(x, to_fixed(100), x, to_fixed(140), 0, 0);
            }
        });
        sim_with(lvl, PhysicsConfig::default())
    }

    #[test]
    fn past_128_intercepts_still_traverses() {
        let mut sim = line_fan(150);
        let seen = collect(&mut sim, 5, 120, 250, 120, PathFlags::ADD_LINES);
        assert_eq!(seen.len(), 150);
        assert!(seen.windows(2).all(|w| w[0].frac <= w[1].frac));
    }

    #[test]
    fn intercept_list_overflow_is_an_error() {
        let mut sim = line_fan(MAXINTERCEPTS as i32 + 1);
        let mut called = false;
        let res = sim.path_traverse(
            to_fixed(5),
            to_fixed(120),
            to_fixed(250),
            to_fixed(120),
            PathFlags::ADD_LINES,
            |_, _, _| {
                called = true;
                Ok(true)
            },
        );
        assert!(matches!(res, Err(SimError::InterceptOverflow)));
        assert!(!called);

        // exactly full is fine
        let mut sim = line_fan(MAXINTERCEPTS as i32);
        assert_eq!(collect(&mut sim, 5, 120, 250, 120, PathFlags::ADD_LINES).len(), MAXINTERCEPTS);
    }

    #[test]
    fn trace_spanning_the_whole_coordinate_range_wraps() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut n = 0;
        let done = sim
            .path_traverse(
                -0x7FFF_0000,
                to_fixed(64),
                0x7FFF_0000,
                to_fixed(64),
                PathFlags::ADD_LINES | PathFlags::ADD_THINGS,
                |_, _, _| {
                    n += 1;
                    Ok(true)
                },
            )
            .unwrap();
        assert!(done);
        assert_eq!(n, 0);
    }

    #[test]
    fn things_only_when_asked() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let k = sim.spawn_mobj(&info::KNIGHT, to_fixed(128), to_fixed(100), SpawnZ::OnFloor).unwrap();

        assert!(collect(&mut sim, 20, 100, 200, 100, PathFlags::ADD_LINES).is_empty());
        let seen = collect(&mut sim, 20, 100, 200, 100, PathFlags::ADD_THINGS);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].target, InterceptTarget::Thing(k));
    }
}
