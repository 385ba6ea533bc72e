//! 16.16 fixed-point helpers.
//!
//! Every position, momentum and height in the play-sim is a `Fixed`.
//! The multiply / divide helpers truncate exactly like the DOS executable
//! did, so recorded demos keep replaying in sync.

/// 16.16 fixed-point value stored in an `i32`.
pub type Fixed = i32;

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: Fixed = 1 << FRACBITS;

/// `a * b` with the product computed in 64 bits and shifted back down.
///
/// The shift is arithmetic (rounds toward −∞) and the result wraps to 32
/// bits, same as the original.
#[inline(always)]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    ((a as i64 * b as i64) >> FRACBITS) as Fixed
}

/// `a / b` in 16.16.
///
/// Saturates to `i32::MIN`/`i32::MAX` whenever `|a| >> 14 >= |b|`; the
/// quotient would not fit anyway and the executable never trapped.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if (a.wrapping_abs() >> 14) >= b.wrapping_abs() || b == 0 {
        return if (a ^ b) < 0 { i32::MIN } else { i32::MAX };
    }
    (((a as i64) << FRACBITS) / b as i64) as Fixed
}

/// Octagonal distance estimate (`P_AproxDistance`).
#[inline]
pub fn approx_distance(dx: Fixed, dy: Fixed) -> Fixed {
    let dx = dx.wrapping_abs();
    let dy = dy.wrapping_abs();
    if dx < dy {
        dx.wrapping_add(dy).wrapping_sub(dx >> 1)
    } else {
        dx.wrapping_add(dy).wrapping_sub(dy >> 1)
    }
}

/// Whole map units → fixed.
#[inline(always)]
pub const fn to_fixed(units: i32) -> Fixed {
    units << FRACBITS
}

/// Fixed → f32 map units, for reporting only.
#[inline(always)]
pub fn to_f32(v: Fixed) -> f32 {
    v as f32 / FRACUNIT as f32
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
