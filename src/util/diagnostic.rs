//! User-friendly diagnostic messages.
//!
//! Every reported error carries its root cause, the offending entries, and
//! where possible a suggested fix.

use std::error::Error as _;
use std::fmt;
use std::path::PathBuf;

use crate::core::params::{InvalidParametersError, ParameterProblem};
use crate::core::registry::{RegistryFormatError, ValidationError, ValidationErrors};
use crate::launcher::LaunchError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no generator version is configured.
    pub const NO_VERSION: &str =
        "help: Pass `--generator-version <TAG>` or set `generator.version` in ocbind.toml";

    /// Suggestion when the spec file is missing.
    pub const MISSING_SPEC: &str =
        "help: Pass `--spec-file <FILE>` or set `build.spec_file` in ocbind.toml";

    /// Suggestion when the spec file is not under the mounted directory.
    pub const SPEC_OUTSIDE_MOUNT: &str =
        "help: Move the spec file into the working directory or pass `-C <DIR>` to mount its parent";

    /// Suggestion when the container runtime cannot be started.
    pub const RUNTIME_NOT_FOUND: &str =
        "help: Install the container runtime or set `generator.runtime` in ocbind.toml";

    /// Suggestion when the registry has duplicates.
    pub const REMOVE_DUPLICATES: &str = "help: Keep the first entry of each duplicated symbol";

    /// Suggestion when a registry entry is not an identifier.
    pub const IDENTIFIER_GRAMMAR: &str =
        "help: Symbol names are alphanumeric segments joined by single underscores, e.g. `gp_Pnt`";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        let suggestion = suggestion.into();
        if !self.suggestions.contains(&suggestion) {
            self.suggestions.push(suggestion);
        }
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m".to_string(),
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m".to_string(),
            (false, severity) => severity.to_string(),
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        for suggestion in &self.suggestions {
            output.push_str(&format!("  {}\n", suggestion));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

impl From<&ValidationErrors> for Diagnostic {
    fn from(errors: &ValidationErrors) -> Self {
        let mut diag = Diagnostic::error(errors.to_string());
        for error in errors.iter() {
            diag = diag.with_context(error.to_string());
            diag = match error {
                ValidationError::Duplicate { .. } => {
                    diag.with_suggestion(suggestions::REMOVE_DUPLICATES)
                }
                ValidationError::Empty { .. } | ValidationError::InvalidName { .. } => {
                    diag.with_suggestion(suggestions::IDENTIFIER_GRAMMAR)
                }
            };
        }
        diag
    }
}

impl From<&RegistryFormatError> for Diagnostic {
    fn from(error: &RegistryFormatError) -> Self {
        let (RegistryFormatError::Io { path, .. }
        | RegistryFormatError::Json { path, .. }
        | RegistryFormatError::Toml { path, .. }) = error;

        let mut diag = Diagnostic::error(error.to_string()).with_location(path.clone());
        if let Some(source) = error.source() {
            diag = diag.with_context(source.to_string());
        }
        diag
    }
}

impl From<&InvalidParametersError> for Diagnostic {
    fn from(error: &InvalidParametersError) -> Self {
        let mut diag = Diagnostic::error("invalid build parameters");
        for problem in &error.problems {
            diag = diag.with_context(problem.to_string());
            diag = match problem {
                ParameterProblem::EmptyVersion => diag.with_suggestion(suggestions::NO_VERSION),
                ParameterProblem::MissingSpecFile { .. } => {
                    diag.with_suggestion(suggestions::MISSING_SPEC)
                }
                ParameterProblem::SpecFileOutsideWorkingDirectory { .. } => {
                    diag.with_suggestion(suggestions::SPEC_OUTSIDE_MOUNT)
                }
                _ => diag,
            };
        }
        diag
    }
}

impl From<&LaunchError> for Diagnostic {
    fn from(error: &LaunchError) -> Self {
        match error {
            LaunchError::InvalidParameters(err) => err.into(),
            LaunchError::Spawn { source, .. } => {
                let diag = Diagnostic::error(error.to_string()).with_context(source.to_string());
                if source.kind() == std::io::ErrorKind::NotFound {
                    diag.with_suggestion(suggestions::RUNTIME_NOT_FOUND)
                } else {
                    diag
                }
            }
        }
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
