pub mod flags;
pub mod info;
pub mod kind;

pub use self::{
    flags::{MobjFlags, PathFlags},
    info::MobjInfo,
    kind::{MobjKind, Sound, StateRequest},
};
