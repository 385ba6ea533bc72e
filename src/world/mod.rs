pub mod blockmap;
mod builder;
mod geometry;
mod helpers;

pub use blockmap::{Blockmap, MAPBLOCKSHIFT, MAPBLOCKSIZE, MAPBTOFRAC};
pub use builder::{LevelBuilder, LevelError, NodeChild};
pub use geometry::{
    BBox, BlockBox, Level, Line, LineId, LinedefFlags, Node, NodeId, Sector, SectorId, SlopeType,
    Subsector, SubsectorId, Vertex,
};
pub use helpers::{
    CHILD_MASK, DivLine, Opening, SUBSECTOR_BIT, box_on_line_side, intercept_vector, line_opening,
    point_on_divline_side, point_on_line_side,
};
