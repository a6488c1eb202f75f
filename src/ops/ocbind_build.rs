//! Implementation of `ocbind build` and `ocbind command`.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::params::{
    BuildParameters, GeneratorVersion, InvalidParametersError, ParameterProblem,
};
use crate::launcher::{Executor, ExitStatus, LaunchError, Launcher};
use crate::util::config::Config;
use crate::util::context::GlobalContext;
use crate::util::hash::{self, sha256_file};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Explicit generator version (overrides config)
    pub generator_version: Option<String>,

    /// `generator_version` came from the environment rather than a flag
    pub generator_version_from_env: bool,

    /// Use the n-th recorded rollback version instead of the active one
    pub rollback: Option<usize>,

    /// Spec file relative to the working directory (overrides config)
    pub spec_file: Option<PathBuf>,

    /// Force `-it` on the container
    pub interactive: bool,

    /// Only print the composed command
    pub dry_run: bool,
}

/// Result of a build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    /// Pre-flight passed; the command was composed but not run.
    Planned { command: String },
    /// The generator ran to completion.
    Finished { command: String, status: ExitStatus },
}

/// Turn CLI options and configuration into parameters for one invocation.
///
/// Exactly one version is selected: an explicit flag, else the requested
/// rollback alternative, else a version from the environment, else the
/// active version. With none configured the version is left empty and
/// pre-flight reports it.
pub fn resolve_parameters(
    ctx: &GlobalContext,
    config: &Config,
    opts: &BuildOptions,
) -> Result<BuildParameters, InvalidParametersError> {
    let versions = config.generator_versions();

    let explicit = opts
        .generator_version
        .as_ref()
        .filter(|_| !(opts.generator_version_from_env && opts.rollback.is_some()));

    let version = match (explicit, opts.rollback) {
        (Some(tag), _) => GeneratorVersion::new(tag.clone()),
        (None, Some(n)) => {
            let available = versions.as_ref().map_or(0, |v| v.alternatives().len());
            versions
                .as_ref()
                .and_then(|v| v.rollback(n))
                .cloned()
                .ok_or_else(|| InvalidParametersError {
                    problems: vec![ParameterProblem::NoRollback {
                        requested: n,
                        available,
                    }],
                })?
        }
        (None, None) => versions
            .map(|v| v.select(None))
            .unwrap_or_else(|| GeneratorVersion::new("")),
    };

    let spec_file = opts.spec_file.clone().unwrap_or_else(|| config.spec_file());

    Ok(BuildParameters::new(spec_file, version, ctx.cwd()))
}

/// Run a build through `executor`.
///
/// Pass [`ProcessExecutor`](crate::launcher::ProcessExecutor) to spawn the
/// real container runtime.
pub fn build<E: Executor>(
    ctx: &GlobalContext,
    config: &Config,
    opts: &BuildOptions,
    executor: E,
) -> Result<BuildResult> {
    let params = resolve_parameters(ctx, config, opts).map_err(LaunchError::from)?;

    let mut settings = config.generator_settings();
    if opts.interactive {
        settings.interactive = true;
    }

    let mut launcher = Launcher::with_executor(settings, executor);

    if opts.dry_run {
        let command = launcher.plan(&params)?;
        return Ok(BuildResult::Planned { command });
    }

    if let Ok(digest) = sha256_file(&params.spec_path()) {
        tracing::debug!(
            "spec file {} ({})",
            params.spec_file.display(),
            hash::short(&digest)
        );
    }

    let status = launcher.launch(&params)?;
    let command = launcher.last_command().unwrap_or_default().to_string();

    Ok(BuildResult::Finished { command, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spec_workspace, StubExecutor};

    fn config_with_versions() -> Config {
        let mut config = Config::default();
        config.generator.version = Some("2.0.0-beta.b5ff984".to_string());
        config.generator.alternatives = vec![
            "2.0.0-beta.94e2944".to_string(),
            "2.0.0-beta.dd8ce1a".to_string(),
        ];
        config.build.spec_file = Some(PathBuf::from("spec.yml"));
        config
    }

    #[test]
    fn test_resolve_uses_active_version() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        let params =
            resolve_parameters(&ctx, &config_with_versions(), &BuildOptions::default()).unwrap();

        assert_eq!(params.generator_version.as_str(), "2.0.0-beta.b5ff984");
        assert_eq!(params.spec_file, PathBuf::from("spec.yml"));
        assert_eq!(params.working_directory, PathBuf::from("/work"));
    }

    #[test]
    fn test_resolve_explicit_version_wins() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        let opts = BuildOptions {
            generator_version: Some("1.2.3".to_string()),
            rollback: Some(1),
            ..Default::default()
        };

        let params = resolve_parameters(&ctx, &config_with_versions(), &opts).unwrap();
        assert_eq!(params.generator_version.as_str(), "1.2.3");
    }

    #[test]
    fn test_resolve_rollback_wins_over_env_version() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        let mut opts = BuildOptions {
            generator_version: Some("9.9.9".to_string()),
            generator_version_from_env: true,
            ..Default::default()
        };

        let params = resolve_parameters(&ctx, &config_with_versions(), &opts).unwrap();
        assert_eq!(params.generator_version.as_str(), "9.9.9");

        opts.rollback = Some(1);
        let params = resolve_parameters(&ctx, &config_with_versions(), &opts).unwrap();
        assert_eq!(params.generator_version.as_str(), "2.0.0-beta.94e2944");
    }

    #[test]
    fn test_resolve_rollback() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        let opts = BuildOptions {
            rollback: Some(2),
            ..Default::default()
        };

        let params = resolve_parameters(&ctx, &config_with_versions(), &opts).unwrap();
        assert_eq!(params.generator_version.as_str(), "2.0.0-beta.dd8ce1a");
    }

    #[test]
    fn test_resolve_unknown_rollback() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        let opts = BuildOptions {
            rollback: Some(5),
            ..Default::default()
        };

        let err = resolve_parameters(&ctx, &config_with_versions(), &opts).unwrap_err();
        assert!(matches!(
            err.problems[0],
            ParameterProblem::NoRollback {
                requested: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_resolve_default_spec_file() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"));
        let params =
            resolve_parameters(&ctx, &Config::default(), &BuildOptions::default()).unwrap();

        assert_eq!(params.spec_file, PathBuf::from("archiyou-opencascade.yml"));
        assert_eq!(params.generator_version.as_str(), "");
    }

    #[test]
    fn test_build_without_version_is_invalid() {
        let work = spec_workspace("archiyou-opencascade.yml");
        let ctx = GlobalContext::with_cwd(work.path().to_path_buf());
        let stub = StubExecutor::exiting(0);

        let err = build(&ctx, &Config::default(), &BuildOptions::default(), &stub)
            .unwrap_err();

        let launch_err = err.downcast_ref::<LaunchError>().unwrap();
        assert!(matches!(launch_err, LaunchError::InvalidParameters(_)));
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn test_build_runs_generator() {
        let work = spec_workspace("spec.yml");
        let ctx = GlobalContext::with_cwd(work.path().to_path_buf());
        let stub = StubExecutor::exiting(3);

        let result = build(&ctx, &config_with_versions(), &BuildOptions::default(), &stub)
            .unwrap();

        match result {
            BuildResult::Finished { command, status } => {
                assert_eq!(status, ExitStatus::Code(3));
                assert!(command.ends_with("donalffons/opencascade.js:2.0.0-beta.b5ff984 spec.yml"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(stub.calls().len(), 1);
    }

    #[test]
    fn test_build_dry_run_does_not_execute() {
        let work = spec_workspace("spec.yml");
        let ctx = GlobalContext::with_cwd(work.path().to_path_buf());
        let stub = StubExecutor::exiting(0);
        let opts = BuildOptions {
            dry_run: true,
            interactive: true,
            ..Default::default()
        };

        let result = build(&ctx, &config_with_versions(), &opts, &stub).unwrap();

        match result {
            BuildResult::Planned { command } => assert!(command.contains(" -it ")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(stub.calls().is_empty());
    }
}
