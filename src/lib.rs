//! ocbind - symbol registry and build launcher for OpenCascade bindings
//!
//! This crate maintains the curated list of native symbols that should be
//! exposed through generated bindings, and launches the containerized
//! binding generator against a declarative spec file.

pub mod core;
pub mod launcher;
pub mod ops;
pub mod util;

/// Test utilities and stubs for ocbind unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a stub executor that records launches instead of spawning
/// processes, plus on-disk fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    params::{BuildParameters, GeneratorVersion, GeneratorVersions},
    registry::{RegistryDiff, SymbolRegistry},
    symbol::Symbol,
};

pub use launcher::{ExitStatus, LaunchError, LaunchState, Launcher};
pub use util::config::Config;
