//! `ocbind command` command
//!
//! Prints the exact generator invocation a build would run, so it can be
//! recorded or re-run by hand.

use anyhow::Result;

use super::build::options;
use super::Session;
use crate::cli::LaunchArgs;
use ocbind::launcher::ProcessExecutor;
use ocbind::ops::{build, BuildResult};

pub fn execute(session: &Session, args: LaunchArgs) -> Result<i32> {
    let config = session.config()?;
    let opts = options(args, true);

    if let BuildResult::Planned { command } =
        build(&session.ctx, &config, &opts, ProcessExecutor)?
    {
        println!("{}", command);
    }

    Ok(0)
}
