//! Static line half of the BLOCKMAP.
//!
//! * One cell ≙ 128×128 map units.
//! * Cells are stored as offsets into one shared line-index list, the
//!   same shape the lump has on disk.
//! * The actor half (bucket chains) lives in `sim::spacial`.

use super::{Line, LineId};
use crate::math::{FRACBITS, Fixed};

pub const MAPBLOCKUNITS: i32 = 128;
/// `Fixed >> MAPBLOCKSHIFT` gives a cell coordinate.
pub const MAPBLOCKSHIFT: i32 = FRACBITS + 7;
/// Cell coordinate in 16.16, for the traversal DDA.
pub const MAPBTOFRAC: i32 = MAPBLOCKSHIFT - FRACBITS;
pub const MAPBLOCKSIZE: Fixed = MAPBLOCKUNITS << FRACBITS;

#[derive(Debug, Clone, Default)]
pub struct Blockmap {
    pub origin_x: Fixed,
    pub origin_y: Fixed,
    pub width: i32,
    pub height: i32,
    /// `width * height + 1` offsets into `line_list`.
    offsets: Vec<u32>,
    line_list: Vec<LineId>,
}

impl Blockmap {
    /// Wrap loader-supplied cell lists, row-major (`y * width + x`).
    pub fn from_cells(
        origin_x: Fixed,
        origin_y: Fixed,
        width: i32,
        height: i32,
        cells: &[Vec<LineId>],
    ) -> Blockmap {
        let mut offsets = Vec::with_capacity(cells.len() + 1);
        let mut line_list = Vec::new();
        offsets.push(0);
        for cell in cells {
            line_list.extend_from_slice(cell);
            offsets.push(line_list.len() as u32);
        }
        Blockmap {
            origin_x,
            origin_y,
            width,
            height,
            offsets,
            line_list,
        }
    }

    /// Grid over the bounding box of `lines`, origin snapped down to
    /// whole map units.  A line is listed in every cell its own bounding
    /// box overlaps.
    pub fn build(lines: &[Line]) -> Blockmap {
        let Some(first) = lines.first() else {
            return Blockmap::from_cells(0, 0, 1, 1, &[Vec::new()]);
        };

        let mut bbox = first.bbox;
        for l in lines {
            bbox.add_point(l.v1);
            bbox.add_point(l.v2);
        }

        let whole = !((1 << FRACBITS) - 1);
        let origin_x = bbox.left & whole;
        let origin_y = bbox.bottom & whole;
        let width = ((bbox.right - origin_x) >> MAPBLOCKSHIFT) + 1;
        let height = ((bbox.top - origin_y) >> MAPBLOCKSHIFT) + 1;

        let mut cells = vec![Vec::new(); (width * height) as usize];
        for (id, l) in lines.iter().enumerate() {
            let x0 = (l.bbox.left - origin_x) >> MAPBLOCKSHIFT;
            let x1 = (l.bbox.right - origin_x) >> MAPBLOCKSHIFT;
            let y0 = (l.bbox.bottom - origin_y) >> MAPBLOCKSHIFT;
            let y1 = (l.bbox.top - origin_y) >> MAPBLOCKSHIFT;
            for by in y0..=y1 {
                for bx in x0..=x1 {
                    cells[(by * width + bx) as usize].push(id as LineId);
                }
            }
        }

        Blockmap::from_cells(origin_x, origin_y, width, height, &cells)
    }

    /// World position → cell coordinates (may be out of bounds).
    #[inline]
    pub fn block_coords(&self, x: Fixed, y: Fixed) -> (i32, i32) {
        (
            x.wrapping_sub(self.origin_x) >> MAPBLOCKSHIFT,
            y.wrapping_sub(self.origin_y) >> MAPBLOCKSHIFT,
        )
    }

    #[inline]
    pub fn in_bounds(&self, bx: i32, by: i32) -> bool {
        bx >= 0 && by >= 0 && bx < self.width && by < self.height
    }

    /// Row-major cell number; caller checks bounds.
    #[inline]
    pub fn cell_index(&self, bx: i32, by: i32) -> usize {
        (by * self.width + bx) as usize
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Lines listed in an in-bounds cell; empty for anything else.
    pub fn lines_in(&self, bx: i32, by: i32) -> &[LineId] {
        if !self.in_bounds(bx, by) {
            return &[];
        }
        let cell = self.cell_index(bx, by);
        match (self.offsets.get(cell), self.offsets.get(cell + 1)) {
            (Some(&a), Some(&b)) => &self.line_list[a as usize..b as usize],
            _ => &[],
        }
    }
}
