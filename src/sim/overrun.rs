//! Emulation of the DOS executable writing past its 8-entry special-line
//! list.  Entry `n` of the list held a line *pointer*; past the end sat
//! the movement bbox and then the crush flags, so touching more than
//! eight special lines scribbled "addresses" into them.

use log::warn;

use super::MAXSPECIALCROSS_ORIGINAL;
use crate::world::LineId;

/// Size of one line record in the original memory image.
const LINE_STRIDE: u32 = 0x3E;

/// What the entry at position `count - 1` lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrunEffect {
    /// One edge of the movement bbox, in `BBox::TOP..=RIGHT` order.
    BBox { edge: usize, value: u32 },
    CrushChange(u32),
    NoFit(u32),
    /// Past anything known; nothing is written.
    Unemulated { count: usize },
}

/// Fake address of `line` in the original memory image.
#[inline]
pub fn line_address(base: u32, line: LineId) -> u32 {
    base.wrapping_add((line as u32).wrapping_mul(LINE_STRIDE))
}

/// Effect of pushing `line` as the `count`-th entry (1-based).  `None`
/// while the list still fits.
pub fn spechit_overrun(base: u32, count: usize, line: LineId) -> Option<OverrunEffect> {
    if count <= MAXSPECIALCROSS_ORIGINAL {
        return None;
    }
    let value = line_address(base, line);
    let effect = match count {
        9..=12 => OverrunEffect::BBox { edge: count - 9, value },
        13 => OverrunEffect::CrushChange(value),
        14 => OverrunEffect::NoFit(value),
        _ => {
            warn!("spechit overrun with {count} entries is not emulated");
            OverrunEffect::Unemulated { count }
        }
    };
    Some(effect)
}
