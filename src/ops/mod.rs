//! High-level operations.
//!
//! This module contains the implementation of ocbind commands.

pub mod ocbind_build;
pub mod symbols;

pub use ocbind_build::{build, resolve_parameters, BuildOptions, BuildResult};
