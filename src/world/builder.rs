//! In-memory level construction.
//!
//! Stands in for the WAD loader: callers describe sectors, lines and the
//! BSP in fixed point, `build` derives the cached line data, the sector
//! block boxes and (unless one is supplied) the blockmap.

use thiserror::Error;

use super::blockmap::{Blockmap, MAPBLOCKSHIFT};
use super::helpers::{CHILD_MASK, SUBSECTOR_BIT};
use super::{
    BBox, BlockBox, Level, Line, LineId, LinedefFlags, Node, NodeId, Sector, SectorId, SlopeType,
    Subsector, SubsectorId, Vertex,
};
use crate::math::Fixed;
use crate::sim::MAXRADIUS;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no subsectors")]
    NoSubsectors,
    #[error("line {line} refers to sector {sector}, only {count} exist")]
    LineSector { line: usize, sector: SectorId, count: usize },
    #[error("subsector {subsector} refers to sector {sector}, only {count} exist")]
    SubsectorSector {
        subsector: usize,
        sector: SectorId,
        count: usize,
    },
    #[error("node {node} child {child:#06x} out of range")]
    NodeChild { node: usize, child: u16 },
    #[error("line {line} has zero length")]
    DegenerateLine { line: usize },
    #[error("blockmap lists line {line}, only {count} exist")]
    BlockmapLine { line: LineId, count: usize },
}

/// Child reference for `LevelBuilder::add_node`.
#[derive(Debug, Clone, Copy)]
pub enum NodeChild {
    Node(NodeId),
    Subsector(SubsectorId),
}

impl NodeChild {
    fn raw(self) -> u16 {
        match self {
            NodeChild::Node(n) => n,
            NodeChild::Subsector(s) => s | SUBSECTOR_BIT,
        }
    }
}

struct PendingLine {
    v1: Vertex,
    v2: Vertex,
    flags: LinedefFlags,
    special: u16,
    tag: u16,
    front: SectorId,
    back: Option<SectorId>,
}

pub struct LevelBuilder {
    name: String,
    sectors: Vec<Sector>,
    lines: Vec<PendingLine>,
    subsectors: Vec<Subsector>,
    nodes: Vec<Node>,
    blockmap: Option<Blockmap>,
    monster_telefrag: bool,
}

impl LevelBuilder {
    pub fn new(name: impl Into<String>) -> LevelBuilder {
        LevelBuilder {
            name: name.into(),
            sectors: Vec::new(),
            lines: Vec::new(),
            subsectors: Vec::new(),
            nodes: Vec::new(),
            blockmap: None,
            monster_telefrag: false,
        }
    }

    pub fn add_sector(&mut self, floor_h: Fixed, ceil_h: Fixed) -> SectorId {
        self.sectors.push(Sector {
            floor_h,
            ceil_h,
            ceiling_is_sky: false,
            special: 0,
            tag: 0,
            blockbox: BlockBox::default(),
        });
        (self.sectors.len() - 1) as SectorId
    }

    pub fn sky_ceiling(&mut self, sector: SectorId) -> &mut Self {
        if let Some(s) = self.sectors.get_mut(sector as usize) {
            s.ceiling_is_sky = true;
        }
        self
    }

    /// One-sided wall; `front` is on the right going v1 → v2.
    pub fn add_line(&mut self, x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed, front: SectorId) -> LineId {
        self.push_line(x1, y1, x2, y2, LinedefFlags::IMPASSABLE, front, None)
    }

    pub fn add_two_sided(
        &mut self,
        x1: Fixed,
        y1: Fixed,
        x2: Fixed,
        y2: Fixed,
        front: SectorId,
        back: SectorId,
    ) -> LineId {
        self.push_line(x1, y1, x2, y2, LinedefFlags::TWO_SIDED, front, Some(back))
    }

    #[allow(clippy::too_many_arguments)]
    fn push_line(
        &mut self,
        x1: Fixed,
        y1: Fixed,
        x2: Fixed,
        y2: Fixed,
        flags: LinedefFlags,
        front: SectorId,
        back: Option<SectorId>,
    ) -> LineId {
        self.lines.push(PendingLine {
            v1: Vertex { x: x1, y: y1 },
            v2: Vertex { x: x2, y: y2 },
            flags,
            special: 0,
            tag: 0,
            front,
            back,
        });
        (self.lines.len() - 1) as LineId
    }

    pub fn set_special(&mut self, line: LineId, special: u16, tag: u16) -> &mut Self {
        if let Some(l) = self.lines.get_mut(line as usize) {
            l.special = special;
            l.tag = tag;
        }
        self
    }

    pub fn add_line_flags(&mut self, line: LineId, flags: LinedefFlags) -> &mut Self {
        if let Some(l) = self.lines.get_mut(line as usize) {
            l.flags |= flags;
        }
        self
    }

    pub fn add_subsector(&mut self, sector: SectorId) -> SubsectorId {
        self.subsectors.push(Subsector { sector });
        (self.subsectors.len() - 1) as SubsectorId
    }

    /// Partition line `(x, y) + t·(dx, dy)`.  The last node added is the root.
    pub fn add_node(
        &mut self,
        x: Fixed,
        y: Fixed,
        dx: Fixed,
        dy: Fixed,
        front: NodeChild,
        back: NodeChild,
    ) -> NodeId {
        self.nodes.push(Node {
            x,
            y,
            dx,
            dy,
            child: [front.raw(), back.raw()],
        });
        (self.nodes.len() - 1) as NodeId
    }

    /// Use a precomputed blockmap instead of deriving one.
    pub fn with_blockmap(&mut self, blockmap: Blockmap) -> &mut Self {
        self.blockmap = Some(blockmap);
        self
    }

    pub fn monster_telefrag(&mut self, on: bool) -> &mut Self {
        self.monster_telefrag = on;
        self
    }

    pub fn build(self) -> Result<Level, LevelError> {
        if self.subsectors.is_empty() {
            return Err(LevelError::NoSubsectors);
        }
        let nsec = self.sectors.len();

        for (i, ss) in self.subsectors.iter().enumerate() {
            if ss.sector as usize >= nsec {
                return Err(LevelError::SubsectorSector {
                    subsector: i,
                    sector: ss.sector,
                    count: nsec,
                });
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            for &child in &node.child {
                let ok = if child & SUBSECTOR_BIT != 0 {
                    ((child & CHILD_MASK) as usize) < self.subsectors.len()
                } else {
                    (child as usize) < self.nodes.len()
                };
                if !ok {
                    return Err(LevelError::NodeChild { node: i, child });
                }
            }
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for (i, pending) in self.lines.into_iter().enumerate() {
            for sector in std::iter::once(pending.front).chain(pending.back) {
                if sector as usize >= nsec {
                    return Err(LevelError::LineSector { line: i, sector, count: nsec });
                }
            }
            let dx = pending.v2.x.wrapping_sub(pending.v1.x);
            let dy = pending.v2.y.wrapping_sub(pending.v1.y);
            if dx == 0 && dy == 0 {
                return Err(LevelError::DegenerateLine { line: i });
            }
            lines.push(Line {
                v1: pending.v1,
                v2: pending.v2,
                dx,
                dy,
                flags: pending.flags,
                special: pending.special,
                tag: pending.tag,
                front: pending.front,
                back: pending.back,
                bbox: BBox::of_points(pending.v1, pending.v2),
                slope: SlopeType::classify(dx, dy),
            });
        }

        let blockmap = match self.blockmap {
            Some(bm) => {
                for by in 0..bm.height {
                    for bx in 0..bm.width {
                        if let Some(&line) =
                            bm.lines_in(bx, by).iter().find(|&&l| l as usize >= lines.len())
                        {
                            return Err(LevelError::BlockmapLine { line, count: lines.len() });
                        }
                    }
                }
                bm
            }
            None => Blockmap::build(&lines),
        };

        let mut sectors = self.sectors;
        group_lines(&lines, &mut sectors, &blockmap);

        Ok(Level {
            name: self.name,
            lines,
            sectors,
            subsectors: self.subsectors,
            nodes: self.nodes,
            blockmap,
            monster_telefrag: self.monster_telefrag,
        })
    }
}

/// Per-sector block box: bounding box of every line touching the sector,
/// padded by `MAXRADIUS` and clamped to the grid.
fn group_lines(lines: &[Line], sectors: &mut [Sector], bm: &Blockmap) {
    let mut boxes: Vec<Option<BBox>> = vec![None; sectors.len()];
    for l in lines {
        for sector in std::iter::once(l.front).chain(l.back) {
            let b = boxes[sector as usize].get_or_insert(BBox::of_points(l.v1, l.v1));
            b.add_point(l.v1);
            b.add_point(l.v2);
        }
    }

    for (sector, bbox) in sectors.iter_mut().zip(boxes) {
        let Some(bbox) = bbox else {
            sector.blockbox = BlockBox { top: -1, bottom: 0, left: 0, right: -1 };
            continue;
        };
        let top = (bbox.top - bm.origin_y + MAXRADIUS) >> MAPBLOCKSHIFT;
        let bottom = (bbox.bottom - bm.origin_y - MAXRADIUS) >> MAPBLOCKSHIFT;
        let right = (bbox.right - bm.origin_x + MAXRADIUS) >> MAPBLOCKSHIFT;
        let left = (bbox.left - bm.origin_x - MAXRADIUS) >> MAPBLOCKSHIFT;
        sector.blockbox = BlockBox {
            top: top.min(bm.height - 1),
            bottom: bottom.max(0),
            right: right.min(bm.width - 1),
            left: left.max(0),
        };
    }
}
