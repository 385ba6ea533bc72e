//! Binary angles and the fine trig tables.
//!
//! * `Angle` is a full-circle `u32` (0x4000_0000 = 90°).
//! * `finesine` has `5 * FINEANGLES / 4` entries so `finecosine` is just a
//!   quarter-turn offset into the same table.
//! * Tables are built once on first use from the generator formulas,
//!   evaluated in `f64` and truncated toward zero.  The low entries match
//!   the shipped tables exactly; mid-table entries are an approximation
//!   and may be one unit off the shipped values.

use once_cell::sync::Lazy;

use super::fixed::{FRACUNIT, Fixed};

pub type Angle = u32;

pub const ANG45: Angle = 0x2000_0000;
pub const ANG90: Angle = 0x4000_0000;
pub const ANG180: Angle = 0x8000_0000;
pub const ANG270: Angle = 0xC000_0000;

pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
/// `Angle >> ANGLETOFINESHIFT` gives a fine-table index.
pub const ANGLETOFINESHIFT: u32 = 19;

pub const SLOPERANGE: u32 = 2048;

static FINESINE: Lazy<Vec<Fixed>> = Lazy::new(|| {
    (0..5 * FINEANGLES / 4)
        .map(|i| {
            let a = (i as f64 + 0.5) * std::f64::consts::TAU / FINEANGLES as f64;
            (a.sin() * FRACUNIT as f64) as Fixed
        })
        .collect()
});

static TANTOANGLE: Lazy<Vec<Angle>> = Lazy::new(|| {
    (0..=SLOPERANGE)
        .map(|i| {
            let t = (i as f64 / SLOPERANGE as f64).atan();
            (t * ANG180 as f64 / std::f64::consts::PI) as Angle
        })
        .collect()
});

/// Fine sine, `idx` in `0..FINEANGLES`.
#[inline]
pub fn finesine(idx: usize) -> Fixed {
    FINESINE[idx & FINEMASK]
}

/// Fine cosine, `idx` in `0..FINEANGLES`.
#[inline]
pub fn finecosine(idx: usize) -> Fixed {
    FINESINE[(idx & FINEMASK) + FINEANGLES / 4]
}

/// Fine-table index for a binary angle.
#[inline(always)]
pub fn fine_index(angle: Angle) -> usize {
    (angle >> ANGLETOFINESHIFT) as usize
}

#[inline]
pub fn tantoangle(idx: u32) -> Angle {
    TANTOANGLE[idx.min(SLOPERANGE) as usize]
}

/// Tangent lookup index, clamped to `SLOPERANGE`.
#[inline]
pub fn slope_div(num: u32, den: u32) -> u32 {
    if den < 512 {
        return SLOPERANGE;
    }
    let ans = (num << 3) / (den >> 8);
    ans.min(SLOPERANGE)
}

/// Angle of the vector `(x1,y1) → (x2,y2)`.
pub fn point_to_angle2(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Angle {
    point_to_angle(x2.wrapping_sub(x1), y2.wrapping_sub(y1))
}

/// Octant-folded arctangent of `(x, y)` through `tantoangle`.
pub fn point_to_angle(x: Fixed, y: Fixed) -> Angle {
    if x == 0 && y == 0 {
        return 0;
    }

    if x >= 0 {
        let x = x as u32;
        if y >= 0 {
            let y = y as u32;
            if x > y {
                // octant 0
                tantoangle(slope_div(y, x))
            } else {
                // octant 1
                (ANG90 - 1).wrapping_sub(tantoangle(slope_div(x, y)))
            }
        } else {
            let y = y.wrapping_neg() as u32;
            if x > y {
                // octant 8
                tantoangle(slope_div(y, x)).wrapping_neg()
            } else {
                // octant 7
                ANG270.wrapping_add(tantoangle(slope_div(x, y)))
            }
        }
    } else {
        let x = x.wrapping_neg() as u32;
        if y >= 0 {
            let y = y as u32;
            if x > y {
                // octant 3
                (ANG180 - 1).wrapping_sub(tantoangle(slope_div(y, x)))
            } else {
                // octant 2
                ANG90.wrapping_add(tantoangle(slope_div(x, y)))
            }
        } else {
            let y = y.wrapping_neg() as u32;
            if x > y {
                // octant 4
                ANG180.wrapping_add(tantoangle(slope_div(y, x)))
            } else {
                // octant 5
                (ANG270 - 1).wrapping_sub(tantoangle(slope_div(x, y)))
            }
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
