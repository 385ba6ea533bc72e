//! Runtime thing links – the actor half of the blockmap plus the
//! per-sector thing lists.
//!
//! * Chains are intrusive: each `Mobj` carries its own `bnext` / `snext`,
//!   the grid only stores list heads.
//! * Blocklink heads are a fixed number of buckets; cell `n` lives in
//!   bucket `n % buckets`, so a scan must skip actors whose recorded
//!   `block` is some other cell.
//! * The grid is **write-through** from the movement code:
//!   `unset_thing_position` before a position changes,
//!   `set_thing_position` after.

use hecs::Entity;
use log::{debug, warn};

use super::{Mobj, Sim, SimError};
use crate::defs::MobjFlags;
use crate::world::{LineId, SectorId};

/// Bucket walks give up after this many links.
const CHAIN_GUARD: usize = 512;

/*──────────────────────── core types ────────────────────────*/

#[derive(Debug, Clone)]
pub struct ThingGrid {
    buckets: Vec<Option<Entity>>,
    sector_heads: Vec<Option<Entity>>,
}

impl ThingGrid {
    pub fn new(buckets: usize, sectors: usize) -> ThingGrid {
        ThingGrid {
            buckets: vec![None; buckets.max(1)],
            sector_heads: vec![None; sectors],
        }
    }

    #[inline]
    pub fn bucket_of(&self, block: usize) -> usize {
        block % self.buckets.len()
    }
}

/*───────────────────────── linking ──────────────────────────*/

impl Sim {
    /// Unlink from the sector list and the blocklink chain.  The actor
    /// must currently be linked.
    pub fn unset_thing_position(&mut self, e: Entity) -> Result<(), SimError> {
        let mo = self.mobj(e)?;

        if !mo.flags.contains(MobjFlags::NOSECTOR) {
            let sector = self.level.subsectors[mo.links.subsector as usize].sector;
            let head = self.grid.sector_heads[sector as usize];
            if head == Some(e) {
                self.grid.sector_heads[sector as usize] = mo.links.snext;
            } else {
                let mut prev = head.ok_or(SimError::NotInSectorList { thing: e, sector })?;
                loop {
                    let next = self.mobj(prev)?.links.snext;
                    if next == Some(e) {
                        self.mobj_mut(prev)?.links.snext = mo.links.snext;
                        break;
                    }
                    prev = next.ok_or(SimError::NotInSectorList { thing: e, sector })?;
                }
            }
        }

        if !mo.flags.contains(MobjFlags::NOBLOCKMAP) {
            if let Some(block) = mo.links.block {
                let bucket = self.grid.bucket_of(block);
                let head = self.grid.buckets[bucket];
                if head == Some(e) {
                    self.grid.buckets[bucket] = mo.links.bnext;
                } else {
                    let mut prev = head.ok_or(SimError::NotInBlockChain { thing: e, bucket })?;
                    loop {
                        let next = self.mobj(prev)?.links.bnext;
                        if next == Some(e) {
                            self.mobj_mut(prev)?.links.bnext = mo.links.bnext;
                            break;
                        }
                        prev = next.ok_or(SimError::NotInBlockChain { thing: e, bucket })?;
                    }
                }
            }
            self.mobj_mut(e)?.links.block = None;
        }

        Ok(())
    }

    /// Link at the current `x, y`: resolve the subsector, push onto the
    /// sector list and, if on the grid, onto the cell's bucket chain.
    pub fn set_thing_position(&mut self, e: Entity) -> Result<(), SimError> {
        let mo = self.mobj(e)?;
        let mut links = mo.links;

        links.subsector = self.level.point_in_subsector(mo.x, mo.y);

        if !mo.flags.contains(MobjFlags::NOSECTOR) {
            let sector = self.level.subsectors[links.subsector as usize].sector as usize;
            links.snext = self.grid.sector_heads[sector];
            self.grid.sector_heads[sector] = Some(e);
        }

        if !mo.flags.contains(MobjFlags::NOBLOCKMAP) {
            let bm = &self.level.blockmap;
            let (bx, by) = bm.block_coords(mo.x, mo.y);
            if bm.in_bounds(bx, by) {
                let block = bm.cell_index(bx, by);
                let bucket = self.grid.bucket_of(block);
                links.block = Some(block);
                links.bnext = self.grid.buckets[bucket];
                self.grid.buckets[bucket] = Some(e);
            } else {
                // off the map
                links.block = None;
                links.bnext = None;
            }
        }

        self.mobj_mut(e)?.links = links;
        Ok(())
    }

    /*──────────────────────── iterators ─────────────────────────*/

    /// Visit each line of cell `(bx, by)` not yet seen this validcount
    /// generation.  Stops with `false` as soon as `f` does.
    pub fn block_lines_iter<F>(&mut self, bx: i32, by: i32, mut f: F) -> Result<bool, SimError>
    where
        F: FnMut(&mut Sim, LineId) -> Result<bool, SimError>,
    {
        let count = self.level.blockmap.lines_in(bx, by).len();
        for i in 0..count {
            let line = self.level.blockmap.lines_in(bx, by)[i];
            if line as usize >= self.level.lines.len() {
                return Err(SimError::BlockmapLine {
                    bx,
                    by,
                    line,
                    count: self.level.lines.len(),
                });
            }
            if !self.mark_line(line) {
                continue;
            }
            if !f(self, line)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Visit each actor linked into cell `(bx, by)`.  The next link is
    /// read before `f` runs, so `f` may unlink or remove the actor.  If
    /// `f` removes the saved next actor instead, the walk resumes from
    /// the current actor's updated link.
    pub fn block_things_iter<F>(&mut self, bx: i32, by: i32, mut f: F) -> Result<bool, SimError>
    where
        F: FnMut(&mut Sim, Entity) -> Result<bool, SimError>,
    {
        let bm = &self.level.blockmap;
        if !bm.in_bounds(bx, by) {
            return Ok(true);
        }
        let block = bm.cell_index(bx, by);
        let mut cur = self.grid.buckets[self.grid.bucket_of(block)];

        let mut walked = 0;
        while let Some(e) = cur {
            let links = self.mobj(e)?.links;
            cur = links.bnext;
            if links.block == Some(block) && !f(self, e)? {
                return Ok(false);
            }
            if let Some(next) = cur {
                if !self.world.contains(next) {
                    cur = self.relink_after_removal(e, links.block);
                }
            }
            walked += 1;
            if walked > CHAIN_GUARD {
                warn!("blocklink chain for cell ({bx},{by}) longer than {CHAIN_GUARD}, giving up");
                break;
            }
        }
        Ok(true)
    }

    /// Next link after `e` once a visitor has removed the actor that
    /// followed it.  `None` ends the walk when `e` itself is gone or has
    /// left the cell it was linked into when the walk reached it.
    fn relink_after_removal(&self, e: Entity, block: Option<usize>) -> Option<Entity> {
        match self.world.get::<&Mobj>(e) {
            Ok(mo) if mo.links.block == block => mo.links.bnext,
            _ => {
                debug!("blocklink walk lost its place after {e:?}, stopping");
                None
            }
        }
    }

    /*──────────────────────── inspection ────────────────────────*/

    /// Actors currently linked into cell `(bx, by)`, chain order.
    pub fn block_things(&self, bx: i32, by: i32) -> Vec<Entity> {
        let bm = &self.level.blockmap;
        if !bm.in_bounds(bx, by) {
            return Vec::new();
        }
        let block = bm.cell_index(bx, by);
        let mut out = Vec::new();
        let mut cur = self.grid.buckets[self.grid.bucket_of(block)];
        while let Some(e) = cur {
            let Ok(mo) = self.mobj(e) else { break };
            if mo.links.block == Some(block) {
                out.push(e);
            }
            cur = mo.links.bnext;
        }
        out
    }

    /// Actors in a sector's thing list, list order.
    pub fn sector_things(&self, sector: SectorId) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut cur = self.grid.sector_heads.get(sector as usize).copied().flatten();
        while let Some(e) = cur {
            out.push(e);
            cur = self.mobj(e).ok().and_then(|m| m.links.snext);
        }
        out
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
    use crate::sim::test_support::{open_room, sim_with};
    use crate::sim::{PhysicsConfig, SpawnZ};

    fn sorted(mut v: Vec<Entity>) -> Vec<Entity> {
        v.sort_by_key(|e| e.to_bits());
        v
    }

    #[test]
    fn link_places_thing_in_its_cell_and_sector() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let a = sim.spawn_mobj(&info::KNIGHT, to_fixed(40), to_fixed(40), SpawnZ::OnFloor).unwrap();
        let b = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(40), SpawnZ::OnFloor).unwrap();

        assert_eq!(sim.block_things(0, 0), vec![a]);
        assert_eq!(sim.block_things(1, 0), vec![b]);
        assert_eq!(sorted(sim.sector_things(0)), sorted(vec![a, b]));
    }

    #[test]
    fn unlink_relink_round_trip() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let es: Vec<_> = (0..4)
            .map(|i| {
                sim.spawn_mobj(&info::KNIGHT, to_fixed(20 + 8 * i), to_fixed(30), SpawnZ::OnFloor)
                    .unwrap()
            })
            .collect();
        let before_cell = sorted(sim.block_things(0, 0));
        let before_sector = sorted(sim.sector_things(0));

        // unlink from the middle of both chains, then put it back
        sim.unset_thing_position(es[1]).unwrap();
        assert!(!sim.block_things(0, 0).contains(&es[1]));
        assert!(!sim.sector_things(0).contains(&es[1]));
        sim.set_thing_position(es[1]).unwrap();

        assert_eq!(sorted(sim.block_things(0, 0)), before_cell);
        assert_eq!(sorted(sim.sector_things(0)), before_sector);
    }

    #[test]
    fn aliased_buckets_filter_by_cell() {
        // one bucket: every cell shares a chain
        let cfg = PhysicsConfig { blocklink_buckets: 1, ..PhysicsConfig::default() };
        let mut sim = sim_with(open_room(0, 128), cfg);
        let a = sim.spawn_mobj(&info::KNIGHT, to_fixed(40), to_fixed(40), SpawnZ::OnFloor).unwrap();
        let b = sim.spawn_mobj(&info::KNIGHT, to_fixed(200), to_fixed(200), SpawnZ::OnFloor).unwrap();

        let mut seen = Vec::new();
        sim.block_things_iter(0, 0, |_, e| {
            seen.push(e);
            Ok(true)
        })
        .unwrap();
        assert_eq!(seen, vec![a]);
        assert_eq!(sim.block_things(1, 1), vec![b]);

        sim.unset_thing_position(a).unwrap();
        assert!(sim.block_things(0, 0).is_empty());
        assert_eq!(sim.block_things(1, 1), vec![b]);
    }

    #[test]
    fn lines_visited_once_per_generation() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        sim.new_validcount();
        let mut seen = Vec::new();
        for by in 0..sim.level().blockmap.height {
            for bx in 0..sim.level().blockmap.width {
                sim.block_lines_iter(bx, by, |_, l| {
                    seen.push(l);
                    Ok(true)
                })
                .unwrap();
            }
        }
        let mut dedup = seen.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(seen.len(), dedup.len());
        assert_eq!(seen.len(), sim.level().lines.len());
    }

    #[test]
    fn off_grid_cells_are_noops() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        assert!(sim.block_lines_iter(-1, 0, |_, _| Ok(false)).unwrap());
        assert!(sim.block_things_iter(0, 99, |_, _| Ok(false)).unwrap());
    }
}
