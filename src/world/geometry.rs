use bitflags::bitflags;

use super::blockmap::Blockmap;
use crate::math::{Fixed, fixed_div};

pub type LineId = u16;
pub type SectorId = u16;
pub type SubsectorId = u16;
pub type NodeId = u16;

/// Runtime snapshot of one map.
///
/// Lines, nodes and the blockmap never change after load; sector heights
/// are moved by the (external) floor / ceiling movers, who must call
/// `Sim::change_sector` afterwards.
#[derive(Debug)]
pub struct Level {
    pub name: String,
    pub lines: Vec<Line>,
    pub sectors: Vec<Sector>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<Node>,
    pub blockmap: Blockmap,
    /// Monsters may telefrag here (the MAP30 boss arena).
    pub monster_telefrag: bool,
}

/*--------------------------- lines -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0010;
        const LOWER_UNPEGGED  = 0x0020;
        const SECRET          = 0x0040;
        const BLOCK_SOUND     = 0x0080;
        const NOT_ON_MAP      = 0x0200;
    }
}

/// Broad orientation used to pick the cheap box-vs-line test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeType {
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

impl SlopeType {
    pub fn classify(dx: Fixed, dy: Fixed) -> SlopeType {
        if dx == 0 {
            SlopeType::Vertical
        } else if dy == 0 {
            SlopeType::Horizontal
        } else if fixed_div(dy, dx) > 0 {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub x: Fixed,
    pub y: Fixed,
}

/// Axis-aligned box in fixed point.  Edge order follows the classic
/// `BOXTOP, BOXBOTTOM, BOXLEFT, BOXRIGHT` indexing (see `edge_mut`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BBox {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: Fixed,
    pub right: Fixed,
}

impl BBox {
    pub const TOP: usize = 0;
    pub const BOTTOM: usize = 1;
    pub const LEFT: usize = 2;
    pub const RIGHT: usize = 3;

    /// Square footprint of radius `r` around `(x, y)`.
    #[inline]
    pub fn around(x: Fixed, y: Fixed, r: Fixed) -> BBox {
        BBox {
            top: y.wrapping_add(r),
            bottom: y.wrapping_sub(r),
            left: x.wrapping_sub(r),
            right: x.wrapping_add(r),
        }
    }

    /// Smallest box holding both points.
    pub fn of_points(a: Vertex, b: Vertex) -> BBox {
        BBox {
            top: a.y.max(b.y),
            bottom: a.y.min(b.y),
            left: a.x.min(b.x),
            right: a.x.max(b.x),
        }
    }

    pub fn add_point(&mut self, p: Vertex) {
        self.top = self.top.max(p.y);
        self.bottom = self.bottom.min(p.y);
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
    }

    /// Edge by numeric index; panics on `i > 3`.
    pub fn edge_mut(&mut self, i: usize) -> &mut Fixed {
        match i {
            BBox::TOP => &mut self.top,
            BBox::BOTTOM => &mut self.bottom,
            BBox::LEFT => &mut self.left,
            BBox::RIGHT => &mut self.right,
            _ => panic!("bbox edge {i} out of range"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub v1: Vertex,
    pub v2: Vertex,
    pub dx: Fixed,
    pub dy: Fixed,
    pub flags: LinedefFlags,
    /// 0 = no special.
    pub special: u16,
    pub tag: u16,
    /// Sector on side 0 (the side `point_on_line_side` calls front).
    pub front: SectorId,
    /// `None` for one-sided walls.
    pub back: Option<SectorId>,
    pub bbox: BBox,
    pub slope: SlopeType,
}

impl Line {
    #[inline]
    pub fn is_two_sided(&self) -> bool {
        self.flags.contains(LinedefFlags::TWO_SIDED)
    }
}

/*--------------------------- sectors -----------------------------*/

/// Blockmap cell range a sector can influence, already padded by
/// `MAXRADIUS` and clamped to the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockBox {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

#[derive(Debug, Clone)]
pub struct Sector {
    pub floor_h: Fixed,
    pub ceil_h: Fixed,
    /// Ceiling flat is the sky.
    pub ceiling_is_sky: bool,
    pub special: i16,
    pub tag: i16,
    pub blockbox: BlockBox,
}

/*------------------------ bsp leaves / nodes ---------------------*/

#[derive(Debug, Clone, Copy)]
pub struct Subsector {
    pub sector: SectorId,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
    /// `[front, back]`; `SUBSECTOR_BIT` marks a leaf.
    pub child: [u16; 2],
}
