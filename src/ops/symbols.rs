//! Implementation of the `ocbind symbols` commands.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::registry::{RegistryDiff, SymbolRegistry};
use crate::util::config::Config;
use crate::util::context::GlobalContext;

/// Registry file used when none is configured.
pub const DEFAULT_REGISTRY: &str = "symbols.txt";

/// Locate the registry: explicit path, else config, else the default name.
///
/// Relative paths are resolved against the working directory.
pub fn registry_path(ctx: &GlobalContext, config: &Config, explicit: Option<&Path>) -> PathBuf {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.symbols.registry.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY));

    ctx.cwd().join(path)
}

/// Load and validate a registry, reporting every problem at once.
pub fn check(path: &Path) -> Result<SymbolRegistry> {
    let registry = SymbolRegistry::load(path)?;
    registry.validate()?;
    Ok(registry)
}

/// Load two registries and compare them by name.
///
/// Entries are not validated: drift is reported even for registries that
/// would fail `check`.
pub fn diff(old: &Path, new: &Path) -> Result<RegistryDiff> {
    let old = SymbolRegistry::load(old)?;
    let new = SymbolRegistry::load(new)?;
    Ok(old.diff(&new))
}
