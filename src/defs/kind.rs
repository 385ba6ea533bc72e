//! The handful of actor categories the collision rules single out.

/// Actor category.  Anything the rules don't name is `Other(doomednum)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MobjKind {
    Player,
    /// Lost soul; charges with `SKULLFLY`.
    Skull,
    /// Hell knight – same species as `Bruiser` for missile infighting.
    Knight,
    /// Baron of hell.
    Bruiser,
    /// Cyberdemon – immune to splash damage.
    Cyborg,
    /// Spider mastermind – immune to splash damage.
    Spider,
    Puff,
    Blood,
    Other(u16),
}

impl MobjKind {
    /// Bosses that take no damage from `radius_attack`.
    #[inline]
    pub fn ignores_splash(self) -> bool {
        matches!(self, MobjKind::Cyborg | MobjKind::Spider)
    }

    /// Missiles from `self` don't hurt `other` when this holds.
    #[inline]
    pub fn same_species(self, other: MobjKind) -> bool {
        self == other
            || matches!(
                (self, other),
                (MobjKind::Knight, MobjKind::Bruiser) | (MobjKind::Bruiser, MobjKind::Knight)
            )
    }
}

/// Sounds the collision core itself asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    /// "Can't use that" grunt.
    NoWay,
    /// Player hit the floor hard.
    Oof,
}

/// State transitions the core requests; the state machine is external.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateRequest {
    /// Back to the spawn state (skull finished its charge).
    Spawn,
    /// Player stopped; leave the run frames if currently in one.
    StopWalking,
    /// Corpse crushed by a sector.
    Gibs,
    /// Missile impact; death sound included.
    Death,
}
