//! The play simulation: actors, position linking and everything that
//! moves or traces through the blockmap.

mod attack;
mod collision;
mod components;
mod config;
mod error;
mod hooks;
mod mob;
mod movement;
mod overrun;
mod playsim;
mod slide;
mod spacial;
mod tic;
mod trace;
mod xy_movement;

#[cfg(test)]
pub(crate) mod test_support;

pub use attack::{Aim, MISSILERANGE, MELEERANGE, USERANGE};
pub use collision::CheckOutcome;
pub use components::{Mobj, MobjLinks, Player, PlayerCmd};
pub use config::{PhysicsConfig, SpechitMagic};
pub use error::SimError;
pub use hooks::{Effect, Hooks, Touch};
pub use mob::SpawnZ;
pub use movement::MoveResult;
pub use overrun::OverrunEffect;
pub use playsim::{CrushState, Sim};
pub use spacial::ThingGrid;
pub use tic::{TICRATE, TicRunner};
pub use trace::{Intercept, InterceptTarget};
pub use xy_movement::{FRICTION, STOPSPEED};

use crate::math::{FRACUNIT, Fixed, to_fixed};

/// Largest radius the blockmap scans assume; actors are bucketed by
/// origin so neighbours can reach this far into a cell.
pub const MAXRADIUS: Fixed = to_fixed(32);
/// Highest step an actor may climb in one move.
pub const MAXSTEP: Fixed = to_fixed(24);
/// Per-axis momentum clamp.
pub const MAXMOVE: Fixed = to_fixed(30);
pub const GRAVITY: Fixed = FRACUNIT;
pub const FLOATSPEED: Fixed = to_fixed(4);
pub const VIEWHEIGHT: Fixed = to_fixed(41);

/// Hard size of the deferred special-line list.
pub const MAXSPECIALCROSS: usize = 20;
/// Size the list had in the DOS executable; the overrun emulation kicks
/// in past this.
pub const MAXSPECIALCROSS_ORIGINAL: usize = 8;
/// Hard size of the intercept buffer.
pub const MAXINTERCEPTS: usize = 128 + 61;
pub const MAXINTERCEPTS_ORIGINAL: usize = 128;
