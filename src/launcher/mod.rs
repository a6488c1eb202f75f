//! Build launcher.
//!
//! Runs one generator invocation at a time:
//!
//! ```text
//! Idle -> ComposingCommand -> Executing -> Completed | Failed
//! ```
//!
//! Pre-flight failures go straight from `Idle` to `Failed` without starting
//! a process. A non-zero exit is a normal outcome and is returned as an
//! [`ExitStatus`]; only parameter problems and spawn failures are errors.
//! Nothing is retried.

pub mod command;
pub mod executor;

use std::fmt;

use thiserror::Error;

use crate::core::params::{BuildParameters, InvalidParametersError};

pub use command::{compose, GeneratorSettings};
pub use executor::{Executor, ExitStatus, ProcessExecutor};

/// Where a launcher is in its current invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    ComposingCommand,
    Executing,
    Completed,
    Failed,
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LaunchState::Idle => "idle",
            LaunchState::ComposingCommand => "composing command",
            LaunchState::Executing => "executing",
            LaunchState::Completed => "completed",
            LaunchState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A launch that could not produce an exit status.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    InvalidParameters(#[from] InvalidParametersError),

    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Composes and executes generator invocations.
///
/// `launch` takes `&mut self`, so a launcher runs one build at a time.
/// Concurrent builds need separate launchers on disjoint working
/// directories.
pub struct Launcher<E: Executor = ProcessExecutor> {
    settings: GeneratorSettings,
    executor: E,
    state: LaunchState,
    last_command: Option<String>,
}

impl Launcher<ProcessExecutor> {
    /// Create a launcher that spawns real processes.
    pub fn new(settings: GeneratorSettings) -> Self {
        Launcher::with_executor(settings, ProcessExecutor)
    }
}

impl<E: Executor> Launcher<E> {
    /// Create a launcher with a custom executor.
    pub fn with_executor(settings: GeneratorSettings, executor: E) -> Self {
        Launcher {
            settings,
            executor,
            state: LaunchState::Idle,
            last_command: None,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// State reached by the most recent launch.
    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Rendered command of the most recent launch that got past pre-flight.
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Run pre-flight and compose the command without executing it.
    pub fn plan(&self, params: &BuildParameters) -> Result<String, LaunchError> {
        let checked = params.preflight()?;
        Ok(compose(&self.settings, &checked).display_command())
    }

    /// Launch the generator and block until it exits.
    pub fn launch(&mut self, params: &BuildParameters) -> Result<ExitStatus, LaunchError> {
        self.state = LaunchState::Idle;
        self.last_command = None;

        let checked = match params.preflight() {
            Ok(checked) => checked,
            Err(err) => {
                self.transition(LaunchState::Failed);
                return Err(err.into());
            }
        };

        self.transition(LaunchState::ComposingCommand);
        let cmd = compose(&self.settings, &checked);
        let rendered = cmd.display_command();
        tracing::info!("{}", rendered);
        self.last_command = Some(rendered.clone());

        self.transition(LaunchState::Executing);
        let status = match self.executor.run(&cmd) {
            Ok(status) => status,
            Err(source) => {
                self.transition(LaunchState::Failed);
                return Err(LaunchError::Spawn {
                    command: rendered,
                    source,
                });
            }
        };

        if status.success() {
            self.transition(LaunchState::Completed);
        } else {
            tracing::warn!("generator {} ({})", status, checked.generator_version);
            self.transition(LaunchState::Failed);
        }

        Ok(status)
    }

    fn transition(&mut self, next: LaunchState) {
        tracing::debug!("launcher: {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::{GeneratorVersion, ParameterProblem};
    use crate::test_support::{spec_workspace, StubExecutor};

    fn params_in(dir: &std::path::Path) -> BuildParameters {
        BuildParameters::new("spec.yml", GeneratorVersion::new("1.2.3"), dir)
    }

    #[test]
    fn test_launch_completed() {
        let work = spec_workspace("spec.yml");
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));

        let status = launcher.launch(&params_in(work.path())).unwrap();

        assert_eq!(status, ExitStatus::Code(0));
        assert_eq!(launcher.state(), LaunchState::Completed);
        assert_eq!(launcher.executor().calls().len(), 1);
    }

    #[test]
    fn test_launch_propagates_exact_exit_code() {
        let work = spec_workspace("spec.yml");
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(137));

        let status = launcher.launch(&params_in(work.path())).unwrap();

        assert_eq!(status.code(), Some(137));
        assert_eq!(status.signal(), None);
        assert_eq!(launcher.state(), LaunchState::Failed);
    }

    #[test]
    fn test_launch_signal_is_failed_not_error() {
        let work = spec_workspace("spec.yml");
        let mut launcher = Launcher::with_executor(
            GeneratorSettings::default(),
            StubExecutor::signaled(9),
        );

        let status = launcher.launch(&params_in(work.path())).unwrap();

        assert_eq!(status, ExitStatus::Signal(9));
        assert_eq!(launcher.state(), LaunchState::Failed);
    }

    #[test]
    fn test_launch_spawn_failure_keeps_os_error() {
        let work = spec_workspace("spec.yml");
        let mut launcher = Launcher::with_executor(
            GeneratorSettings::default(),
            StubExecutor::failing_to_start(std::io::ErrorKind::NotFound),
        );

        let err = launcher.launch(&params_in(work.path())).unwrap_err();

        match err {
            LaunchError::Spawn { command, source } => {
                assert!(command.starts_with("docker run"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(launcher.state(), LaunchState::Failed);
    }

    #[test]
    fn test_launch_missing_spec_never_executes() {
        let work = tempfile::TempDir::new().unwrap();
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));

        let err = launcher.launch(&params_in(work.path())).unwrap_err();

        match err {
            LaunchError::InvalidParameters(err) => assert!(matches!(
                err.problems[0],
                ParameterProblem::MissingSpecFile { .. }
            )),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(launcher.executor().calls().is_empty());
        assert!(launcher.last_command().is_none());
        assert_eq!(launcher.state(), LaunchState::Failed);
    }

    #[test]
    fn test_launch_spec_outside_mount_never_executes() {
        let work = spec_workspace("spec.yml");
        let elsewhere = spec_workspace("spec.yml");
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));
        let params = BuildParameters::new(
            elsewhere.path().join("spec.yml"),
            GeneratorVersion::new("1.2.3"),
            work.path(),
        );

        match launcher.launch(&params).unwrap_err() {
            LaunchError::InvalidParameters(err) => assert!(matches!(
                err.problems[0],
                ParameterProblem::SpecFileOutsideWorkingDirectory { .. }
            )),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(launcher.executor().calls().is_empty());
    }

    #[test]
    fn test_launch_passes_spec_relative_to_mount() {
        let work = spec_workspace("spec.yml");
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));
        let params = BuildParameters::new(
            work.path().join("spec.yml"),
            GeneratorVersion::new("1.2.3"),
            work.path(),
        );

        launcher.launch(&params).unwrap();
        assert!(launcher.executor().calls()[0].ends_with(":1.2.3 spec.yml"));
    }

    #[test]
    fn test_launch_empty_version_never_executes() {
        let work = spec_workspace("spec.yml");
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));
        let params = BuildParameters::new("spec.yml", GeneratorVersion::new(""), work.path());

        assert!(matches!(
            launcher.launch(&params),
            Err(LaunchError::InvalidParameters(_))
        ));
        assert!(launcher.executor().calls().is_empty());
    }

    #[test]
    fn test_launch_passes_composed_command() {
        let work = spec_workspace("spec.yml");
        let mut launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));

        launcher.launch(&params_in(work.path())).unwrap();

        let calls = launcher.executor().calls();
        let wd = work.path().canonicalize().unwrap();
        let expected = format!(
            "docker run --rm -v {}:/src donalffons/opencascade.js:1.2.3 spec.yml",
            wd.display()
        );
        assert_eq!(calls[0], expected);
        assert_eq!(launcher.last_command(), Some(expected.as_str()));
    }

    #[test]
    fn test_launcher_is_reusable() {
        let work = spec_workspace("spec.yml");
        let mut launcher = Launcher::with_executor(
            GeneratorSettings::default(),
            StubExecutor::sequence([ExitStatus::Code(1), ExitStatus::Code(0)]),
        );

        assert_eq!(launcher.launch(&params_in(work.path())).unwrap(), ExitStatus::Code(1));
        assert_eq!(launcher.state(), LaunchState::Failed);
        assert_eq!(launcher.launch(&params_in(work.path())).unwrap(), ExitStatus::Code(0));
        assert_eq!(launcher.state(), LaunchState::Completed);
        assert_eq!(launcher.executor().calls().len(), 2);
    }

    #[test]
    fn test_plan_does_not_execute() {
        let work = spec_workspace("spec.yml");
        let launcher =
            Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));

        let rendered = launcher.plan(&params_in(work.path())).unwrap();

        assert!(rendered.ends_with("donalffons/opencascade.js:1.2.3 spec.yml"));
        assert!(launcher.executor().calls().is_empty());
        assert_eq!(launcher.state(), LaunchState::Idle);
    }
}
