//! Execution seam between the launcher and the operating system.

use std::fmt;

use crate::util::process::ProcessBuilder;

/// How the generator process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal exit with the given code.
    Code(i32),
    /// Terminated by a signal (Unix only).
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }

    /// The exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Code(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }

    /// The terminating signal, if any.
    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitStatus::Code(_) => None,
            ExitStatus::Signal(signal) => Some(*signal),
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Code(code) => write!(f, "exit code {}", code),
            ExitStatus::Signal(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitStatus::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }

        // Neither a code nor a signal; not produced by any supported platform.
        ExitStatus::Code(-1)
    }
}

/// Runs a composed command to completion.
///
/// Implementations block until the process exits. An `Err` means the
/// process could not be started at all.
pub trait Executor {
    fn run(&self, cmd: &ProcessBuilder) -> std::io::Result<ExitStatus>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn run(&self, cmd: &ProcessBuilder) -> std::io::Result<ExitStatus> {
        (**self).run(cmd)
    }
}

/// Executes commands as real child processes with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> std::io::Result<ExitStatus> {
        cmd.status().map(ExitStatus::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_accessors() {
        assert!(ExitStatus::Code(0).success());
        assert!(!ExitStatus::Code(137).success());
        assert!(!ExitStatus::Signal(9).success());
        assert_eq!(ExitStatus::Code(137).code(), Some(137));
        assert_eq!(ExitStatus::Code(137).signal(), None);
        assert_eq!(ExitStatus::Signal(9).signal(), Some(9));
        assert_eq!(ExitStatus::Signal(9).code(), None);
    }

    #[test]
    fn test_exit_status_display() {
        assert_eq!(ExitStatus::Code(2).to_string(), "exit code 2");
        assert_eq!(ExitStatus::Signal(15).to_string(), "terminated by signal 15");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_reports_signal() {
        let cmd = ProcessBuilder::new("sh").args(["-c", "kill -TERM $$"]);
        let status = ProcessExecutor.run(&cmd).unwrap();
        assert_eq!(status, ExitStatus::Signal(15));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_reports_code() {
        let cmd = ProcessBuilder::new("sh").args(["-c", "exit 137"]);
        assert_eq!(ProcessExecutor.run(&cmd).unwrap(), ExitStatus::Code(137));
    }
}
