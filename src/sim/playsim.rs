use hecs::{Entity, RefMut, World};

use super::spacial::ThingGrid;
use super::trace::Intercept;
use super::{MAXINTERCEPTS, Mobj, PhysicsConfig, Player, SimError};
use crate::world::{Level, LineId, Opening};

/// Sector-crush bookkeeping.  Plain words rather than bools: a spechit
/// overrun stores an address in here and later tests read it as truthy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrushState {
    pub crush_change: u32,
    pub nofit: u32,
}

/// Reused per-query buffers.  One query in flight at a time.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    validcount: u32,
    line_marks: Vec<u32>,
    pub(crate) intercepts: Vec<Intercept>,
    /// Last measured line opening; single-sided lines leave it stale.
    pub(crate) opening: Opening,
}

/// Level geometry, the actor arena and the blockmap links between them.
pub struct Sim {
    pub(crate) level: Level,
    pub(crate) world: World,
    pub(crate) grid: ThingGrid,
    pub(crate) config: PhysicsConfig,
    pub(crate) leveltime: u32,
    /// Actors in spawn order; the tic driver runs them in this order.
    pub(crate) thinkers: Vec<Entity>,
    pub(crate) crush: CrushState,
    pub(crate) scratch: Scratch,
}

impl Sim {
    pub fn new(level: Level, config: PhysicsConfig) -> Sim {
        let grid = ThingGrid::new(config.blocklink_buckets, level.sectors.len());
        let scratch = Scratch {
            line_marks: vec![0; level.lines.len()],
            intercepts: Vec::with_capacity(MAXINTERCEPTS),
            ..Scratch::default()
        };
        Sim {
            level,
            world: World::new(),
            grid,
            config,
            leveltime: 0,
            thinkers: Vec::new(),
            crush: CrushState::default(),
            scratch,
        }
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Sector heights may be changed through this; follow up with
    /// `change_sector`.  Lines and the blockmap must stay as loaded.
    #[inline]
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct arena access.  Moving an actor through here skips linking;
    /// use `try_move` / `teleport_move` for positions.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    #[inline]
    pub fn leveltime(&self) -> u32 {
        self.leveltime
    }

    #[inline]
    pub fn crush_state(&self) -> CrushState {
        self.crush
    }

    /// Actors in thinking order.
    pub fn thinkers(&self) -> &[Entity] {
        &self.thinkers
    }

    /// Copy of an actor's state.
    pub fn mobj(&self, e: Entity) -> Result<Mobj, SimError> {
        self.world
            .get::<&Mobj>(e)
            .map(|m| *m)
            .map_err(|_| SimError::NoSuchMobj(e))
    }

    pub(crate) fn mobj_mut(&mut self, e: Entity) -> Result<RefMut<'_, Mobj>, SimError> {
        self.world
            .get::<&mut Mobj>(e)
            .map_err(|_| SimError::NoSuchMobj(e))
    }

    #[inline]
    pub fn is_player(&self, e: Entity) -> bool {
        self.world.get::<&Player>(e).is_ok()
    }

    /// Start a new line-visit generation.
    pub fn new_validcount(&mut self) {
        self.scratch.validcount = self.scratch.validcount.wrapping_add(1);
        if self.scratch.validcount == 0 {
            self.scratch.line_marks.fill(0);
            self.scratch.validcount = 1;
        }
    }

    /// Mark `line` for this generation; false if it was already marked.
    #[inline]
    pub(crate) fn mark_line(&mut self, line: LineId) -> bool {
        let mark = &mut self.scratch.line_marks[line as usize];
        if *mark == self.scratch.validcount {
            return false;
        }
        *mark = self.scratch.validcount;
        true
    }
}
