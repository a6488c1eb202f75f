//! Test utilities and stubs for ocbind unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use ocbind::test_support::{spec_workspace, StubExecutor};
//!
//! let work = spec_workspace("spec.yml");
//! let mut launcher = Launcher::with_executor(GeneratorSettings::default(), StubExecutor::exiting(0));
//! launcher.launch(&BuildParameters::new("spec.yml", GeneratorVersion::new("1.2.3"), work.path()))?;
//! assert_eq!(launcher.executor().calls().len(), 1);
//! ```

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tempfile::TempDir;

use crate::launcher::{Executor, ExitStatus};
use crate::util::process::ProcessBuilder;

/// Scripted result of one stub execution.
#[derive(Debug, Clone, Copy)]
enum StubOutcome {
    Exit(ExitStatus),
    SpawnError(io::ErrorKind),
}

/// Executor that records commands instead of spawning them.
///
/// Outcomes are consumed in order; the last one repeats once the script
/// runs out.
#[derive(Debug)]
pub struct StubExecutor {
    script: Mutex<VecDeque<StubOutcome>>,
    calls: Mutex<Vec<String>>,
}

impl StubExecutor {
    fn scripted(outcomes: impl IntoIterator<Item = StubOutcome>) -> Self {
        StubExecutor {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every run exits with `code`.
    pub fn exiting(code: i32) -> Self {
        Self::scripted([StubOutcome::Exit(ExitStatus::Code(code))])
    }

    /// Every run is terminated by `signal`.
    pub fn signaled(signal: i32) -> Self {
        Self::scripted([StubOutcome::Exit(ExitStatus::Signal(signal))])
    }

    /// Every run fails to start with an error of `kind`.
    pub fn failing_to_start(kind: io::ErrorKind) -> Self {
        Self::scripted([StubOutcome::SpawnError(kind)])
    }

    /// Runs return these statuses in order.
    pub fn sequence(statuses: impl IntoIterator<Item = ExitStatus>) -> Self {
        Self::scripted(statuses.into_iter().map(StubOutcome::Exit))
    }

    /// Rendered commands of every run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for StubExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> io::Result<ExitStatus> {
        self.calls.lock().unwrap().push(cmd.display_command());

        let mut script = self.script.lock().unwrap();
        let outcome = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };

        match outcome {
            Some(StubOutcome::Exit(status)) => Ok(status),
            Some(StubOutcome::SpawnError(kind)) => Err(io::Error::new(kind, "stub spawn failure")),
            None => Ok(ExitStatus::Code(0)),
        }
    }
}

/// A temporary working directory containing an empty spec file.
pub fn spec_workspace(spec_file: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), spec_file, "");
    tmp
}

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_sequence_repeats_last() {
        let stub = StubExecutor::sequence([ExitStatus::Code(1), ExitStatus::Code(0)]);
        let cmd = ProcessBuilder::new("docker").arg("run");

        assert_eq!(stub.run(&cmd).unwrap(), ExitStatus::Code(1));
        assert_eq!(stub.run(&cmd).unwrap(), ExitStatus::Code(0));
        assert_eq!(stub.run(&cmd).unwrap(), ExitStatus::Code(0));
        assert_eq!(stub.calls(), vec!["docker run"; 3]);
    }

    #[test]
    fn test_spec_workspace() {
        let work = spec_workspace("nested/spec.yml");
        assert!(work.path().join("nested/spec.yml").is_file());
    }
}
