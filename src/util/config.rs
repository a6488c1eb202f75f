//! Configuration file support for ocbind.
//!
//! ocbind reads two configuration files:
//! - Global: `<config dir>/ocbind/ocbind.toml` - user-wide defaults
//! - Project: `<working directory>/ocbind.toml` - project-specific settings
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both. Unlike a missing file, a file that
//! exists but fails to parse is an error: silently falling back to a default
//! generator version would produce a different build than the one asked for.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::params::{GeneratorVersions, DEFAULT_SPEC_FILE};
use crate::launcher::GeneratorSettings;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "ocbind.toml";

/// ocbind configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generator container settings
    pub generator: GeneratorConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Symbol registry settings
    pub symbols: SymbolsConfig,
}

/// Generator container settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Container runtime program (default: docker)
    pub runtime: Option<String>,

    /// Generator image without tag (default: donalffons/opencascade.js)
    pub image: Option<String>,

    /// Mount point of the working directory inside the container
    pub mount_point: Option<String>,

    /// Run the container with `-it`
    pub interactive: Option<bool>,

    /// Run the container with `--rm`
    pub remove: Option<bool>,

    /// Active generator version
    pub version: Option<String>,

    /// Previously used versions kept for rollback, newest first
    pub alternatives: Vec<String>,
}

/// Build settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Spec file passed to the generator, relative to the working directory
    pub spec_file: Option<PathBuf>,
}

/// Symbol registry settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Registry file, relative to the working directory
    pub registry: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, or defaults if the file doesn't exist.
    pub fn load_if_exists(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let generator = other.generator;
        if generator.runtime.is_some() {
            self.generator.runtime = generator.runtime;
        }
        if generator.image.is_some() {
            self.generator.image = generator.image;
        }
        if generator.mount_point.is_some() {
            self.generator.mount_point = generator.mount_point;
        }
        if generator.interactive.is_some() {
            self.generator.interactive = generator.interactive;
        }
        if generator.remove.is_some() {
            self.generator.remove = generator.remove;
        }
        if generator.version.is_some() {
            self.generator.version = generator.version;
        }
        // Alternatives are replaced, not merged
        if !generator.alternatives.is_empty() {
            self.generator.alternatives = generator.alternatives;
        }

        if other.build.spec_file.is_some() {
            self.build.spec_file = other.build.spec_file;
        }

        if other.symbols.registry.is_some() {
            self.symbols.registry = other.symbols.registry;
        }
    }

    /// Container settings with defaults filled in.
    pub fn generator_settings(&self) -> GeneratorSettings {
        let defaults = GeneratorSettings::default();
        let cfg = &self.generator;
        GeneratorSettings {
            runtime: cfg.runtime.clone().unwrap_or(defaults.runtime),
            image: cfg.image.clone().unwrap_or(defaults.image),
            mount_point: cfg.mount_point.clone().unwrap_or(defaults.mount_point),
            interactive: cfg.interactive.unwrap_or(defaults.interactive),
            remove: cfg.remove.unwrap_or(defaults.remove),
        }
    }

    /// Configured generator versions, if an active version is set.
    pub fn generator_versions(&self) -> Option<GeneratorVersions> {
        self.generator.version.as_ref().map(|active| {
            GeneratorVersions::new(active.clone())
                .with_alternatives(self.generator.alternatives.iter().cloned())
        })
    }

    /// Spec file, falling back to the conventional name.
    pub fn spec_file(&self) -> PathBuf {
        self.build
            .spec_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SPEC_FILE))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`ocbind.toml` in the working directory)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_if_exists(global_path)?);
    }

    config.merge(Config::load_if_exists(project_path)?);

    Ok(config)
}
