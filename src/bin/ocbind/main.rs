//! ocbind CLI - symbol registry and generator launcher

use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Session;
use ocbind::core::params::InvalidParametersError;
use ocbind::core::registry::{RegistryFormatError, ValidationErrors};
use ocbind::launcher::LaunchError;
use ocbind::util::diagnostic::{emit, Diagnostic};

/// Configuration or parameter problems: nothing was started.
pub const EXIT_CONFIG: i32 = 78;

/// The container runtime could not be started.
pub const EXIT_LAUNCH: i32 = 127;

fn main() {
    let cli = Cli::parse_with_sources();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    // Set up logging
    let default_filter = if cli.verbose {
        "ocbind=debug"
    } else {
        "ocbind=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();

    let code = match run(cli, color) {
        Ok(code) => code,
        Err(e) => report(&e, color),
    };

    std::process::exit(code);
}

fn run(cli: Cli, color: bool) -> Result<i32> {
    let session = Session::new(cli.working_dir, color)?;

    match cli.command {
        Commands::Build(args) => commands::build::execute(&session, args),
        Commands::Command(args) => commands::command::execute(&session, args),
        Commands::Symbols(args) => commands::symbols::execute(&session, args),
        Commands::Versions => commands::versions::execute(&session),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error and pick the exit code for it.
fn report(err: &anyhow::Error, color: bool) -> i32 {
    if let Some(err) = err.downcast_ref::<LaunchError>() {
        emit(&Diagnostic::from(err), color);
        return match err {
            LaunchError::InvalidParameters(_) => EXIT_CONFIG,
            LaunchError::Spawn { .. } => EXIT_LAUNCH,
        };
    }

    if let Some(err) = err.downcast_ref::<InvalidParametersError>() {
        emit(&Diagnostic::from(err), color);
        return EXIT_CONFIG;
    }

    if let Some(errors) = err.downcast_ref::<ValidationErrors>() {
        emit(&Diagnostic::from(errors), color);
        return EXIT_CONFIG;
    }

    if let Some(err) = err.downcast_ref::<RegistryFormatError>() {
        emit(&Diagnostic::from(err), color);
        return EXIT_CONFIG;
    }

    if let Some(err) = err.downcast_ref::<commands::ConfigFailure>() {
        emit(&Diagnostic::error(format!("{:#}", err.0)), color);
        return EXIT_CONFIG;
    }

    eprintln!("error: {:#}", err);
    1
}
