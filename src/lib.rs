//! Blockmap collision, movement and ray tracing for a fixed-point 2.5-D
//! play simulation.
//!
//! * `math`  – 16.16 fixed point, binary angles, trig tables
//! * `defs`  – actor flags, kinds, spawn properties
//! * `world` – static level geometry, blockmap, point location
//! * `sim`   – actors, position linking, movement, tracing, attacks

pub mod defs;
pub mod math;
pub mod sim;
pub mod world;
