//! Command implementations

pub mod build;
pub mod command;
pub mod completions;
pub mod symbols;
pub mod versions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;

use ocbind::util::{Config, GlobalContext};

/// A configuration file exists but could not be used.
#[derive(Debug, Error)]
#[error("{0:#}")]
pub struct ConfigFailure(pub anyhow::Error);

/// State shared by every command of one CLI invocation.
pub struct Session {
    pub ctx: GlobalContext,
}

impl Session {
    pub fn new(working_dir: Option<PathBuf>, color: bool) -> Result<Self> {
        let mut ctx = match working_dir {
            Some(dir) if dir.is_absolute() => GlobalContext::with_cwd(dir),
            Some(dir) => {
                let cwd = std::env::current_dir().context("failed to get current directory")?;
                GlobalContext::with_cwd(cwd.join(dir))
            }
            None => GlobalContext::new()?,
        };
        ctx.set_color(color);

        Ok(Session { ctx })
    }

    /// Load the merged configuration for the working directory.
    pub fn config(&self) -> Result<Config> {
        self.ctx
            .load_config()
            .map_err(|e| ConfigFailure(e).into())
    }
}
