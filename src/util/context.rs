//! Global context for ocbind operations.
//!
//! Provides centralized access to the working directory and configuration
//! file locations.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{load_config, Config, CONFIG_FILE};

/// Project directories for ocbind
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "archiyou", "ocbind"));

/// Global context containing paths and settings shared by all commands.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Working directory exposed to the generator
    cwd: PathBuf,

    /// Global configuration file, if the platform has a config dir
    global_config: Option<PathBuf>,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global_config = PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE));

        GlobalContext {
            cwd,
            global_config,
            color: true,
        }
    }

    /// Override the global config location.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Whether colored output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Get the working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Path to the project config file.
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_FILE)
    }

    /// Path to the global config file.
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Result<Config> {
        load_config(self.global_config_path(), &self.project_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_config_path() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        assert_eq!(ctx.project_config_path(), PathBuf::from("/work/ocbind.toml"));
    }

    #[test]
    fn test_load_config_from_cwd() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[generator]\nversion = \"1.2.3\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).with_global_config(None);
        let config = ctx.load_config().unwrap();
        assert_eq!(config.generator.version, Some("1.2.3".to_string()));
    }
}
