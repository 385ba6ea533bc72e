//! Actor lifetime: spawn, remove, and the few effect actors the movement
//! code creates itself.

use hecs::Entity;
use log::debug;

use super::{Effect, Hooks, Mobj, Player, Sim, SimError, VIEWHEIGHT};
use crate::defs::{MobjFlags, MobjInfo, StateRequest, info};
use crate::math::{Angle, FRACUNIT, Fixed};

/// Where a new actor's feet go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnZ {
    OnFloor,
    /// Top of the actor against the ceiling.
    OnCeiling,
    At(Fixed),
}

impl Sim {
    /// Create and link an actor.  It thinks after everything already
    /// spawned.
    pub fn spawn_mobj(
        &mut self,
        info: &MobjInfo,
        x: Fixed,
        y: Fixed,
        z: SpawnZ,
    ) -> Result<Entity, SimError> {
        let e = self.world.spawn((Mobj::from_info(info, x, y),));
        self.set_thing_position(e)?;

        let sector = self.level.sector_at(x, y);
        let (floor, ceil) = (sector.floor_h, sector.ceil_h);
        {
            let mut m = self.mobj_mut(e)?;
            m.floorz = floor;
            m.ceilingz = ceil;
            m.z = match z {
                SpawnZ::OnFloor => floor,
                SpawnZ::OnCeiling => ceil - info.height,
                SpawnZ::At(z) => z,
            };
        }

        self.thinkers.push(e);
        debug!("spawned {:?} as {e:?} at ({x:#x}, {y:#x})", info.kind);
        Ok(e)
    }

    /// Spawn the player body on the floor, facing `angle`.
    pub fn spawn_player(&mut self, x: Fixed, y: Fixed, angle: Angle) -> Result<Entity, SimError> {
        let e = self.spawn_mobj(&info::PLAYER, x, y, SpawnZ::OnFloor)?;
        self.mobj_mut(e)?.angle = angle;
        self.world
            .insert_one(e, Player::new(VIEWHEIGHT))
            .map_err(|_| SimError::NoSuchMobj(e))?;
        Ok(e)
    }

    /// Unlink and despawn.
    pub fn remove_mobj(&mut self, e: Entity) -> Result<(), SimError> {
        self.unset_thing_position(e)?;
        self.world.despawn(e).map_err(|_| SimError::NoSuchMobj(e))?;
        self.thinkers.retain(|&t| t != e);
        debug!("removed {e:?}");
        Ok(())
    }

    /// Stop a missile dead and switch it to its death frames.
    pub fn explode_missile(&mut self, e: Entity, hooks: &mut dyn Hooks) -> Result<(), SimError> {
        {
            let mut m = self.mobj_mut(e)?;
            m.momx = 0;
            m.momy = 0;
            m.momz = 0;
        }
        hooks.set_state(&mut self.world, e, StateRequest::Death);
        hooks.jitter_tics(&mut self.world, e);
        self.mobj_mut(e)?.flags.remove(MobjFlags::MISSILE);
        Ok(())
    }

    /// Bullet puff drifting upward from `(x, y, z)`.
    pub fn spawn_puff(
        &mut self,
        x: Fixed,
        y: Fixed,
        z: Fixed,
        melee: bool,
        hooks: &mut dyn Hooks,
    ) -> Result<Entity, SimError> {
        let z = z + (hooks.sub_random() << 10);
        let th = self.spawn_mobj(&info::PUFF, x, y, SpawnZ::At(z))?;
        self.mobj_mut(th)?.momz = FRACUNIT;
        hooks.jitter_tics(&mut self.world, th);
        hooks.effect_spawned(&mut self.world, th, Effect::Puff { melee });
        Ok(th)
    }

    /// Blood splat; `damage` picks the splat size.
    pub fn spawn_blood(
        &mut self,
        x: Fixed,
        y: Fixed,
        z: Fixed,
        damage: i32,
        hooks: &mut dyn Hooks,
    ) -> Result<Entity, SimError> {
        let z = z + (hooks.sub_random() << 10);
        let th = self.spawn_mobj(&info::BLOOD, x, y, SpawnZ::At(z))?;
        self.mobj_mut(th)?.momz = FRACUNIT * 2;
        hooks.jitter_tics(&mut self.world, th);
        hooks.effect_spawned(&mut self.world, th, Effect::Blood { damage });
        Ok(th)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::to_fixed;
    use crate::sim::PhysicsConfig;
    use crate::sim::test_support::*;

    #[test]
    fn spawn_heights() {
        let mut sim = sim_with(open_room(16, 128), PhysicsConfig::default());
        let a = sim.spawn_mobj(&info::KNIGHT, to_fixed(64), to_fixed(64), SpawnZ::OnFloor).unwrap();
        let b = sim.spawn_mobj(&info::KNIGHT, to_fixed(64), to_fixed(192), SpawnZ::OnCeiling).unwrap();
        let c = sim.spawn_mobj(&info::SKULL, to_fixed(192), to_fixed(64), SpawnZ::At(to_fixed(50))).unwrap();

        assert_eq!(sim.mobj(a).unwrap().z, to_fixed(16));
        assert_eq!(sim.mobj(b).unwrap().z, to_fixed(128 - 64));
        let c = sim.mobj(c).unwrap();
        assert_eq!(c.z, to_fixed(50));
        assert_eq!((c.floorz, c.ceilingz), (to_fixed(16), to_fixed(128)));
        assert_eq!(sim.thinkers().len(), 3);
    }

    #[test]
    fn effects_skip_the_blockmap() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let puff = sim.spawn_puff(to_fixed(64), to_fixed(64), to_fixed(32), true, &mut hooks).unwrap();

        assert!(sim.block_things(0, 0).is_empty());
        assert_eq!(sim.sector_things(0), vec![puff]);
        assert_eq!(sim.mobj(puff).unwrap().momz, FRACUNIT);
        assert_eq!(hooks.effects, vec![(puff, Effect::Puff { melee: true })]);
    }

    #[test]
    fn removal_unlinks_and_forgets() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let a = sim.spawn_mobj(&info::KNIGHT, to_fixed(64), to_fixed(64), SpawnZ::OnFloor).unwrap();
        let b = sim.spawn_mobj(&info::KNIGHT, to_fixed(100), to_fixed(64), SpawnZ::OnFloor).unwrap();

        sim.remove_mobj(a).unwrap();
        assert_eq!(sim.block_things(0, 0), vec![b]);
        assert_eq!(sim.sector_things(0), vec![b]);
        assert_eq!(sim.thinkers(), &[b]);
        assert!(matches!(sim.remove_mobj(a), Err(SimError::NoSuchMobj(_))));
    }

    #[test]
    fn explosion_stops_missile() {
        let mut sim = sim_with(open_room(0, 128), PhysicsConfig::default());
        let mut hooks = RecordingHooks::default();
        let m = sim.spawn_mobj(&FIREBALL, to_fixed(64), to_fixed(64), SpawnZ::At(to_fixed(32))).unwrap();
        sim.world_mut().get::<&mut Mobj>(m).unwrap().momx = to_fixed(10);

        sim.explode_missile(m, &mut hooks).unwrap();
        let mo = sim.mobj(m).unwrap();
        assert_eq!((mo.momx, mo.momy, mo.momz), (0, 0, 0));
        assert!(!mo.flags.contains(MobjFlags::MISSILE));
        assert_eq!(hooks.states, vec![(m, StateRequest::Death)]);
    }
}
