//! `ocbind build` command

use anyhow::Result;

use super::Session;
use crate::cli::{BuildArgs, LaunchArgs};
use ocbind::launcher::{ExitStatus, ProcessExecutor};
use ocbind::ops::{build, BuildOptions, BuildResult};

pub fn execute(session: &Session, args: BuildArgs) -> Result<i32> {
    let config = session.config()?;
    let opts = options(args.launch, args.dry_run);

    match build(&session.ctx, &config, &opts, ProcessExecutor)? {
        BuildResult::Planned { command } => {
            println!("{}", command);
            Ok(0)
        }
        BuildResult::Finished { status, .. } => {
            if status.success() {
                eprintln!("    Finished bindings in {}", session.ctx.cwd().display());
            } else {
                eprintln!("error: generator failed ({})", status);
            }
            Ok(exit_code(status))
        }
    }
}

pub(crate) fn options(args: LaunchArgs, dry_run: bool) -> BuildOptions {
    BuildOptions {
        generator_version: args.generator_version,
        generator_version_from_env: args.version_from_env,
        rollback: args.rollback,
        spec_file: args.spec_file,
        interactive: args.interactive,
        dry_run,
    }
}

/// Mirror the generator's status as our own exit code.
///
/// Signals map to `128 + signal`, as shells report them.
fn exit_code(status: ExitStatus) -> i32 {
    match status {
        ExitStatus::Code(code) => code,
        ExitStatus::Signal(signal) => 128 + signal,
    }
}
