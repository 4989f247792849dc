//! Byte storage for dynarray containers: fixed-length, aligned, zero-initialized
//! blocks whose creation reports out-of-memory instead of aborting.

pub mod align;
pub mod block;

pub use block::AlignedBlock;
