use hecs::Entity;
use thiserror::Error;

use crate::world::{LineId, SectorId};

/// Broken invariants.  Continuing after one of these would desync every
/// recording, so callers stop the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("entity {0:?} has no mobj")]
    NoSuchMobj(Entity),
    #[error("unlinking {thing:?}: not in the thing list of sector {sector}")]
    NotInSectorList { thing: Entity, sector: SectorId },
    #[error("unlinking {thing:?}: not in blocklink chain {bucket}")]
    NotInBlockChain { thing: Entity, bucket: usize },
    #[error("spechit list full ({max}) when line {line} was contacted", max = super::MAXSPECIALCROSS)]
    SpechitOverflow { line: LineId },
    #[error("intercept buffer full ({max})", max = super::MAXINTERCEPTS)]
    InterceptOverflow,
    #[error("slide traverse got a thing intercept")]
    SlideHitThing,
    #[error("blockmap cell ({bx},{by}) lists line {line}, only {count} exist")]
    BlockmapLine {
        bx: i32,
        by: i32,
        line: LineId,
        count: usize,
    },
}
