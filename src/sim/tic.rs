use hecs::Entity;
use log::trace;

use super::{Hooks, Sim, SimError};

/// Simulation rate; one `tick` is 1/35 s of game time.
pub const TICRATE: u32 = 35;

/// Owns the simulation and advances it one fixed tic at a time.
pub struct TicRunner {
    sim: Sim,
}

impl TicRunner {
    pub fn new(sim: Sim) -> Self {
        Self { sim }
    }

    #[inline]
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    #[inline]
    pub fn sim_mut(&mut self) -> &mut Sim {
        &mut self.sim
    }

    pub fn into_sim(self) -> Sim {
        self.sim
    }

    /// Run every actor's movement once, in spawn order, then advance
    /// `leveltime`.  Actors removed earlier in the same tic are skipped;
    /// actors spawned during it first think next tic.
    pub fn tick(&mut self, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        let order: Vec<Entity> = self.sim.thinkers.clone();
        for e in order {
            if !self.sim.world.contains(e) {
                continue;
            }
            self.sim.mobj_thinker(e, hooks)?;
        }
        self.sim.leveltime += 1;
        trace!("tic {} done, {} actors", self.sim.leveltime, self.sim.thinkers.len());
        Ok(())
    }

    /// Run `tics` tics back to back.
    pub fn run(&mut self, tics: u32, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        for _ in 0..tics {
            self.tick(hooks)?;
        }
        Ok(())
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
