//! Everything the movement code triggers but does not own: damage,
//! pickups, line specials, sounds, state changes, randomness and sight.
//!
//! Hooks get the actor arena, not the `Sim`; anything that has to move,
//! spawn or unlink actors is queued by the implementor and applied once
//! the call returns.

use hecs::{Entity, World};

use super::{Mobj, Sim};
use crate::defs::{Sound, StateRequest};
use crate::world::LineId;

/// What to do with a touched pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    Keep,
    Remove,
}

/// Effect actor the core just spawned, so frames / tics can be set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Bullet puff; `melee` puffs skip the spark frames.
    Puff { melee: bool },
    Blood { damage: i32 },
}

pub trait Hooks {
    /// Next value of the shared play-sim random table.
    fn random(&mut self) -> u8;

    /// Difference of two draws, roughly centred on zero.
    fn sub_random(&mut self) -> i32 {
        let r = self.random() as i32;
        r - self.random() as i32
    }

    /// Unobstructed line of sight between two actors.
    fn check_sight(&mut self, sim: &Sim, looker: Entity, target: Entity) -> bool;

    fn damage(
        &mut self,
        world: &mut World,
        target: Entity,
        _inflictor: Option<Entity>,
        _source: Option<Entity>,
        amount: i32,
    ) {
        if let Ok(mut mo) = world.get::<&mut Mobj>(target) {
            mo.health -= amount;
        }
    }

    fn touch_special(&mut self, _world: &mut World, _item: Entity, _toucher: Entity) -> Touch {
        Touch::Keep
    }

    /// `side` is the side the actor came from.
    fn cross_special_line(&mut self, _world: &mut World, _line: LineId, _side: usize, _thing: Entity) {}

    fn use_special_line(&mut self, _world: &mut World, _thing: Entity, _line: LineId, _side: usize) {}

    fn shoot_special_line(&mut self, _world: &mut World, _thing: Entity, _line: LineId) {}

    fn start_sound(&mut self, _world: &mut World, _origin: Entity, _sound: Sound) {}

    fn set_state(&mut self, _world: &mut World, _thing: Entity, _state: StateRequest) {}

    /// Shorten the current frame by `random() & 3` tics, keeping at least
    /// one.  The draw happens here so the random sequence stays in step
    /// even when nobody tracks frames.
    fn jitter_tics(&mut self, _world: &mut World, _thing: Entity) {
        self.random();
    }

    fn effect_spawned(&mut self, _world: &mut World, _thing: Entity, _effect: Effect) {}
}
