//! CLI definitions using clap.

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;

const EXIT_STATUS_HELP: &str = "\
Exit status:
  The generator's own exit code, or 128+N when it is killed by signal N.
  78   configuration or pre-flight failure, nothing was started
  127  the container runtime could not be started
  A generator that itself exits 78, 127 or above 128 is reported with the
  same code; the preceding `error:` line tells the cases apart.";

/// ocbind - symbol registry and generator launcher for OpenCascade bindings
#[derive(Parser)]
#[command(name = "ocbind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory exposed to the generator (defaults to current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse the command line, recording where the generator version came from.
    pub fn parse_with_sources() -> Self {
        let matches = Cli::command().get_matches();
        let mut cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

        let from_env = version_from_env(&matches);
        match &mut cli.command {
            Commands::Build(args) => args.launch.version_from_env = from_env,
            Commands::Command(args) => args.version_from_env = from_env,
            _ => {}
        }
        cli
    }
}

fn version_from_env(matches: &ArgMatches) -> bool {
    match matches.subcommand() {
        Some(("build" | "command", sub)) => {
            sub.value_source("generator_version") == Some(ValueSource::EnvVariable)
        }
        _ => false,
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the binding generator
    #[command(after_help = EXIT_STATUS_HELP)]
    Build(BuildArgs),

    /// Print the generator command without running it
    Command(LaunchArgs),

    /// Inspect and validate symbol registries
    Symbols(SymbolsArgs),

    /// Show the active generator version and rollback alternatives
    Versions,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct LaunchArgs {
    /// Generator image tag to use (overrides ocbind.toml)
    #[arg(long, env = "OCBIND_GENERATOR_VERSION", value_name = "TAG")]
    pub generator_version: Option<String>,

    /// Use the n-th rollback version recorded in ocbind.toml
    /// (wins over OCBIND_GENERATOR_VERSION, not over --generator-version)
    #[arg(long, value_name = "N")]
    pub rollback: Option<usize>,

    /// Spec file passed to the generator, relative to the working directory
    #[arg(long, value_name = "FILE")]
    pub spec_file: Option<PathBuf>,

    /// Run the container with an interactive terminal (-it)
    #[arg(long)]
    pub interactive: bool,

    /// Whether `generator_version` came from the environment
    #[arg(skip)]
    pub version_from_env: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// Check parameters and print the command, but don't run it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SymbolsArgs {
    #[command(subcommand)]
    pub command: SymbolsCommands,
}

#[derive(Subcommand)]
pub enum SymbolsCommands {
    /// Validate a registry and report every problem
    Check(RegistryArgs),

    /// Compare two registries by name
    Diff(SymbolsDiffArgs),

    /// Print a registry's symbols in order, with its fingerprint
    List(RegistryArgs),
}

#[derive(Args)]
pub struct RegistryArgs {
    /// Registry file (defaults to `symbols.registry` in ocbind.toml, then symbols.txt)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct SymbolsDiffArgs {
    /// Older registry snapshot
    pub old: PathBuf,

    /// Newer registry
    pub new: PathBuf,

    /// Exit with status 1 when the registries differ
    #[arg(long)]
    pub exit_code: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
