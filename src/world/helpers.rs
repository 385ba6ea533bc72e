//! Fixed-point geometry predicates shared by the movement and tracing
//! code.  Every routine keeps the precision-dropping shifts of the DOS
//! executable; they decide which side of a line a corner lands on and
//! demos replay only if those answers match exactly.

use super::{BBox, Level, Line, Node, SlopeType, SubsectorId};
use crate::math::{FRACBITS, Fixed, fixed_div, fixed_mul};

pub const CHILD_MASK: u16 = 0x7FFF;

pub const SUBSECTOR_BIT: u16 = 0x8000;

// ──────────────────────────────────────────────────────────────────────────
//                       Level – point location
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Walk the BSP and return the subsector id containing `(x, y)`.
    ///
    /// A level without nodes is a single subsector.
    pub fn point_in_subsector(&self, x: Fixed, y: Fixed) -> SubsectorId {
        let Some(root) = self.nodes.len().checked_sub(1) else {
            return 0;
        };
        let mut child = root as u16;
        while child & SUBSECTOR_BIT == 0 {
            let node = &self.nodes[child as usize];
            child = node.child[node.point_side(x, y)];
        }
        child & CHILD_MASK
    }

    /// Sector under `(x, y)`.
    #[inline]
    pub fn sector_at(&self, x: Fixed, y: Fixed) -> &super::Sector {
        let ss = self.point_in_subsector(x, y);
        &self.sectors[self.subsectors[ss as usize].sector as usize]
    }

    #[inline]
    pub fn line(&self, id: super::LineId) -> &Line {
        &self.lines[id as usize]
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Node {
    /// 0 = *front* of splitter, 1 = *back*.
    #[inline]
    pub fn point_side(&self, x: Fixed, y: Fixed) -> usize {
        if self.dx == 0 {
            return if x <= self.x {
                (self.dy > 0) as usize
            } else {
                (self.dy < 0) as usize
            };
        }
        if self.dy == 0 {
            return if y <= self.y {
                (self.dx < 0) as usize
            } else {
                (self.dx > 0) as usize
            };
        }

        let dx = x.wrapping_sub(self.x);
        let dy = y.wrapping_sub(self.y);

        // sign bits decide it when the products must differ in sign
        if (self.dy ^ self.dx ^ dx ^ dy) < 0 {
            return ((self.dy ^ dx) < 0) as usize;
        }

        let left = fixed_mul(self.dy >> FRACBITS, dx);
        let right = fixed_mul(dy, self.dx >> FRACBITS);
        (right >= left) as usize
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Lines and divlines
// ──────────────────────────────────────────────────────────────────────────

/// Infinite line through `(x, y)` with direction `(dx, dy)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DivLine {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

impl DivLine {
    #[inline]
    pub fn from_line(line: &Line) -> DivLine {
        DivLine {
            x: line.v1.x,
            y: line.v1.y,
            dx: line.dx,
            dy: line.dy,
        }
    }
}

/// 0 = front, 1 = back.
pub fn point_on_line_side(x: Fixed, y: Fixed, line: &Line) -> usize {
    if line.dx == 0 {
        return if x <= line.v1.x {
            (line.dy > 0) as usize
        } else {
            (line.dy < 0) as usize
        };
    }
    if line.dy == 0 {
        return if y <= line.v1.y {
            (line.dx < 0) as usize
        } else {
            (line.dx > 0) as usize
        };
    }

    let dx = x.wrapping_sub(line.v1.x);
    let dy = y.wrapping_sub(line.v1.y);

    let left = fixed_mul(line.dy >> FRACBITS, dx);
    let right = fixed_mul(dy, line.dx >> FRACBITS);
    (right >= left) as usize
}

/// Same as `point_on_line_side` but against a divline, at 8 bits less
/// precision, with the sign-bit shortcut.
pub fn point_on_divline_side(x: Fixed, y: Fixed, line: &DivLine) -> usize {
    if line.dx == 0 {
        return if x <= line.x {
            (line.dy > 0) as usize
        } else {
            (line.dy < 0) as usize
        };
    }
    if line.dy == 0 {
        return if y <= line.y {
            (line.dx < 0) as usize
        } else {
            (line.dx > 0) as usize
        };
    }

    let dx = x.wrapping_sub(line.x);
    let dy = y.wrapping_sub(line.y);

    if (line.dy ^ line.dx ^ dx ^ dy) < 0 {
        // left is negative
        return ((line.dy ^ dx) < 0) as usize;
    }

    let left = fixed_mul(line.dy >> 8, dx >> 8);
    let right = fixed_mul(dy >> 8, line.dx >> 8);
    (right >= left) as usize
}

/// Which side of the (infinite) line the whole box is on: `Some(0)`,
/// `Some(1)`, or `None` when the box straddles it.
pub fn box_on_line_side(tmbox: &BBox, line: &Line) -> Option<usize> {
    let (p1, p2) = match line.slope {
        SlopeType::Horizontal => {
            let flip = (line.dx < 0) as usize;
            (
                (tmbox.top > line.v1.y) as usize ^ flip,
                (tmbox.bottom > line.v1.y) as usize ^ flip,
            )
        }
        SlopeType::Vertical => {
            let flip = (line.dy < 0) as usize;
            (
                (tmbox.right < line.v1.x) as usize ^ flip,
                (tmbox.left < line.v1.x) as usize ^ flip,
            )
        }
        SlopeType::Positive => (
            point_on_line_side(tmbox.left, tmbox.top, line),
            point_on_line_side(tmbox.right, tmbox.bottom, line),
        ),
        SlopeType::Negative => (
            point_on_line_side(tmbox.right, tmbox.top, line),
            point_on_line_side(tmbox.left, tmbox.bottom, line),
        ),
    };

    (p1 == p2).then_some(p1)
}

/// Fractional intercept of `v1` along `v2`; 0 when parallel.
pub fn intercept_vector(v2: &DivLine, v1: &DivLine) -> Fixed {
    let den = fixed_mul(v1.dy >> 8, v2.dx).wrapping_sub(fixed_mul(v1.dx >> 8, v2.dy));
    if den == 0 {
        return 0;
    }
    let num = fixed_mul(v1.x.wrapping_sub(v2.x) >> 8, v1.dy)
        .wrapping_add(fixed_mul(v2.y.wrapping_sub(v1.y) >> 8, v1.dx));
    fixed_div(num, den)
}

// ──────────────────────────────────────────────────────────────────────────
//                       Vertical opening through a line
// ──────────────────────────────────────────────────────────────────────────

/// Window through a two-sided line.
///
/// Lives across calls: a one-sided line only zeroes `range` and leaves the
/// other fields from whatever line was measured before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Opening {
    pub top: Fixed,
    pub bottom: Fixed,
    pub range: Fixed,
    pub low_floor: Fixed,
}

pub fn line_opening(level: &Level, line: &Line, open: &mut Opening) {
    let Some(back) = line.back else {
        open.range = 0;
        return;
    };
    let front = &level.sectors[line.front as usize];
    let back = &level.sectors[back as usize];

    open.top = front.ceil_h.min(back.ceil_h);
    if front.floor_h > back.floor_h {
        open.bottom = front.floor_h;
        open.low_floor = back.floor_h;
    } else {
        open.bottom = back.floor_h;
        open.low_floor = front.floor_h;
    }
    open.range = open.top.wrapping_sub(open.bottom);
}

// ──────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::to_fixed;
    use crate::world::{LevelBuilder, LinedefFlags, Vertex};

    fn line(x1: i32, y1: i32, x2: i32, y2: i32) -> Line {
        let v1 = Vertex { x: to_fixed(x1), y: to_fixed(y1) };
        let v2 = Vertex { x: to_fixed(x2), y: to_fixed(y2) };
        let dx = v2.x - v1.x;
        let dy = v2.y - v1.y;
        Line {
            v1,
            v2,
            dx,
            dy,
            flags: LinedefFlags::empty(),
            special: 0,
            tag: 0,
            front: 0,
            back: None,
            bbox: BBox::of_points(v1, v2),
            slope: SlopeType::classify(dx, dy),
        }
    }

    #[test]
    fn line_sides_follow_direction() {
        // pointing north: east is front
        let l = line(0, 0, 0, 64);
        assert_eq!(point_on_line_side(to_fixed(5), to_fixed(10), &l), 0);
        assert_eq!(point_on_line_side(to_fixed(-5), to_fixed(10), &l), 1);

        // pointing east: south is front
        let l = line(0, 0, 64, 0);
        assert_eq!(point_on_line_side(to_fixed(10), to_fixed(-5), &l), 0);
        assert_eq!(point_on_line_side(to_fixed(10), to_fixed(5), &l), 1);

        // diagonal
        let l = line(0, 0, 64, 64);
        assert_eq!(point_on_line_side(to_fixed(40), to_fixed(10), &l), 0);
        assert_eq!(point_on_line_side(to_fixed(10), to_fixed(40), &l), 1);
    }

    #[test]
    fn divline_side_agrees_on_clear_cases() {
        let l = line(0, 0, 64, 64);
        let dl = DivLine::from_line(&l);
        for (x, y) in [(40, 10), (10, 40), (-30, -50), (100, 3)] {
            assert_eq!(
                point_on_divline_side(to_fixed(x), to_fixed(y), &dl),
                point_on_line_side(to_fixed(x), to_fixed(y), &l),
                "({x},{y})"
            );
        }
    }

    #[test]
    fn box_straddle() {
        let l = line(0, 0, 0, 64);
        let hit = BBox::around(to_fixed(4), to_fixed(32), to_fixed(16));
        let miss = BBox::around(to_fixed(40), to_fixed(32), to_fixed(16));
        assert_eq!(box_on_line_side(&hit, &l), None);
        assert_eq!(box_on_line_side(&miss, &l), Some(0));

        let d = line(0, 0, 64, -64);
        assert_eq!(d.slope, SlopeType::Negative);
        assert_eq!(box_on_line_side(&BBox::around(to_fixed(32), to_fixed(-32), to_fixed(8)), &d), None);
    }

    #[test]
    fn intercept_halfway() {
        let trace = DivLine { x: 0, y: to_fixed(32), dx: to_fixed(128), dy: 0 };
        let wall = DivLine::from_line(&line(64, 0, 64, 64));
        assert_eq!(intercept_vector(&trace, &wall), to_fixed(1) / 2);
    }

    #[test]
    fn empty_tree_is_one_subsector() {
        let mut b = LevelBuilder::new("E");
        let s = b.add_sector(0, to_fixed(128));
        b.add_subsector(s);
        b.add_line(0, 0, to_fixed(64), 0, s);
        let lvl = b.build().unwrap();
        assert_eq!(lvl.point_in_subsector(to_fixed(5000), to_fixed(-5000)), 0);
    }

    #[test]
    fn single_sided_opening_is_stale() {
        let mut b = LevelBuilder::new("O");
        let a = b.add_sector(0, to_fixed(128));
        let c = b.add_sector(to_fixed(16), to_fixed(96));
        b.add_subsector(a);
        let two = b.add_two_sided(0, 0, 0, to_fixed(64), a, c);
        let one = b.add_line(to_fixed(64), 0, to_fixed(64), to_fixed(64), a);
        let lvl = b.build().unwrap();

        let mut open = Opening::default();
        line_opening(&lvl, lvl.line(two), &mut open);
        assert_eq!(
            open,
            Opening { top: to_fixed(96), bottom: to_fixed(16), range: to_fixed(80), low_floor: 0 }
        );

        line_opening(&lvl, lvl.line(one), &mut open);
        assert_eq!(open.range, 0);
        assert_eq!(open.top, to_fixed(96));
    }
}
