//! Core definitions relied upon by all dynarray-* crates: the shared error type,
//! argument verification helpers and overflow-checked size arithmetic.

pub mod arith;
pub mod error;
pub mod result;

pub use result::Result;
