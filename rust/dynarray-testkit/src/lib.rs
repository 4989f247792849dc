//! Test utilities for dynarray containers.
//!
//! This crate provides:
//! - Allocators with controllable failure and allocation accounting
//! - Generation of arbitrary, bounded, valid lists
//! - A checker that runs a copy and verifies its postconditions
//!
//! # Usage
//!
//! This crate is primarily intended for the dynarray test suites and the
//! `dynarray-cmd` property runner.

pub mod alloc;
pub mod data_gen;
pub mod props;
