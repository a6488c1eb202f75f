//! Core data model: symbols, the symbol registry, and build parameters.

pub mod params;
pub mod registry;
pub mod symbol;

pub use params::{BuildParameters, GeneratorVersion, GeneratorVersions};
pub use registry::{RegistryDiff, SymbolRegistry};
pub use symbol::Symbol;
