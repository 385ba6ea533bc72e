//! Deterministic numeric core: 16.16 fixed point and binary angles.

pub mod angle;
pub mod fixed;

pub use angle::{
    ANG45, ANG90, ANG180, ANG270, ANGLETOFINESHIFT, Angle, FINEANGLES, fine_index, finecosine,
    finesine, point_to_angle, point_to_angle2,
};
pub use fixed::{FRACBITS, FRACUNIT, Fixed, approx_distance, fixed_div, fixed_mul, to_f32, to_fixed};
