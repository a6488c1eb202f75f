//! Parameters for one generator invocation and their pre-flight checks.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Container tag grammar: up to 128 chars of `[A-Za-z0-9_.-]`, not starting
/// with `.` or `-`.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").unwrap());

/// Conventional spec file name used when none is configured.
pub const DEFAULT_SPEC_FILE: &str = "archiyou-opencascade.yml";

/// Opaque generator version/tag, e.g. `2.0.0-beta.b5ff984`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratorVersion(String);

impl GeneratorVersion {
    pub fn new(tag: impl Into<String>) -> Self {
        GeneratorVersion(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the tag against the container tag grammar.
    pub fn check(&self) -> Result<(), ParameterProblem> {
        if self.0.is_empty() {
            Err(ParameterProblem::EmptyVersion)
        } else if !TAG.is_match(&self.0) {
            Err(ParameterProblem::InvalidVersion {
                version: self.0.clone(),
            })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for GeneratorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The known generator versions: one active, the rest kept for rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorVersions {
    active: GeneratorVersion,
    alternatives: Vec<GeneratorVersion>,
}

impl GeneratorVersions {
    pub fn new(active: impl Into<String>) -> Self {
        GeneratorVersions {
            active: GeneratorVersion::new(active),
            alternatives: Vec::new(),
        }
    }

    /// Record inactive versions, newest first. The active version is skipped
    /// if it appears among them.
    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in alternatives {
            let version = GeneratorVersion::new(tag);
            if version != self.active && !self.alternatives.contains(&version) {
                self.alternatives.push(version);
            }
        }
        self
    }

    pub fn active(&self) -> &GeneratorVersion {
        &self.active
    }

    pub fn alternatives(&self) -> &[GeneratorVersion] {
        &self.alternatives
    }

    /// The `n`-th rollback alternative (1-based).
    pub fn rollback(&self, n: usize) -> Option<&GeneratorVersion> {
        n.checked_sub(1).and_then(|i| self.alternatives.get(i))
    }

    /// Pick the single version used for this invocation.
    ///
    /// An explicit override wins over the active version.
    pub fn select(&self, explicit: Option<&str>) -> GeneratorVersion {
        match explicit {
            Some(tag) => GeneratorVersion::new(tag),
            None => self.active.clone(),
        }
    }
}

/// One pre-flight problem with the build parameters.
#[derive(Debug, Error)]
pub enum ParameterProblem {
    #[error("working directory {} does not exist", path.display())]
    MissingWorkingDirectory { path: PathBuf },

    #[error("working directory {} is not a directory", path.display())]
    WorkingDirectoryNotADirectory { path: PathBuf },

    #[error("working directory {} cannot be resolved: {source}", path.display())]
    UnresolvableWorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spec file {} does not exist", path.display())]
    MissingSpecFile { path: PathBuf },

    #[error("spec file {} is not a regular file", path.display())]
    SpecFileNotAFile { path: PathBuf },

    #[error("spec file {} is not readable: {source}", path.display())]
    UnreadableSpecFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "spec file {} is outside the working directory {}",
        path.display(),
        working_directory.display()
    )]
    SpecFileOutsideWorkingDirectory {
        path: PathBuf,
        working_directory: PathBuf,
    },

    #[error("generator version is empty")]
    EmptyVersion,

    #[error("generator version `{version}` is not a valid image tag")]
    InvalidVersion { version: String },

    #[error("no rollback version #{requested} ({available} recorded)")]
    NoRollback { requested: usize, available: usize },
}

/// Build parameters failed pre-flight; no process was started.
#[derive(Debug, Error)]
#[error("invalid build parameters: {}", summarize(problems))]
pub struct InvalidParametersError {
    pub problems: Vec<ParameterProblem>,
}

fn summarize(problems: &[ParameterProblem]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for one invocation of the external generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameters {
    /// Spec file, resolved against the working directory.
    pub spec_file: PathBuf,
    pub generator_version: GeneratorVersion,
    /// Directory exposed to the generator.
    pub working_directory: PathBuf,
}

impl BuildParameters {
    pub fn new(
        spec_file: impl Into<PathBuf>,
        generator_version: GeneratorVersion,
        working_directory: impl Into<PathBuf>,
    ) -> Self {
        BuildParameters {
            spec_file: spec_file.into(),
            generator_version,
            working_directory: working_directory.into(),
        }
    }

    /// Host path of the spec file.
    pub fn spec_path(&self) -> PathBuf {
        self.working_directory.join(&self.spec_file)
    }

    /// Check that an invocation can be attempted at all.
    ///
    /// Returns the parameters with the working directory made canonical and
    /// the spec file relative to it, which is the path the generator sees
    /// inside the mount. Only existence, readability and location of the
    /// spec file are checked, never its contents.
    pub fn preflight(&self) -> Result<BuildParameters, InvalidParametersError> {
        let mut problems = Vec::new();

        if let Err(problem) = self.generator_version.check() {
            problems.push(problem);
        }

        let working_directory = match check_working_directory(&self.working_directory) {
            Ok(dir) => Some(dir),
            Err(problem) => {
                problems.push(problem);
                None
            }
        };

        let spec_file = match working_directory {
            Some(ref dir) => match check_spec_file(dir, &self.spec_file) {
                Ok(spec_file) => Some(spec_file),
                Err(problem) => {
                    problems.push(problem);
                    None
                }
            },
            None => None,
        };

        match (working_directory, spec_file) {
            (Some(working_directory), Some(spec_file)) if problems.is_empty() => {
                Ok(BuildParameters {
                    spec_file,
                    generator_version: self.generator_version.clone(),
                    working_directory,
                })
            }
            _ => Err(InvalidParametersError { problems }),
        }
    }
}

fn check_working_directory(path: &Path) -> Result<PathBuf, ParameterProblem> {
    if !path.exists() {
        return Err(ParameterProblem::MissingWorkingDirectory {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ParameterProblem::WorkingDirectoryNotADirectory {
            path: path.to_path_buf(),
        });
    }
    path.canonicalize()
        .map_err(|source| ParameterProblem::UnresolvableWorkingDirectory {
            path: path.to_path_buf(),
            source,
        })
}

/// Check the spec file under the canonical `dir` and return its path
/// relative to `dir`.
fn check_spec_file(dir: &Path, spec_file: &Path) -> Result<PathBuf, ParameterProblem> {
    let path = dir.join(spec_file);
    if !path.exists() {
        return Err(ParameterProblem::MissingSpecFile { path });
    }
    if !path.is_file() {
        return Err(ParameterProblem::SpecFileNotAFile { path });
    }
    File::open(&path).map_err(|source| ParameterProblem::UnreadableSpecFile {
        path: path.clone(),
        source,
    })?;

    let canonical = path
        .canonicalize()
        .map_err(|source| ParameterProblem::UnreadableSpecFile {
            path: path.clone(),
            source,
        })?;
    match canonical.strip_prefix(dir) {
        Ok(relative) => Ok(relative.to_path_buf()),
        Err(_) => Err(ParameterProblem::SpecFileOutsideWorkingDirectory {
            path,
            working_directory: dir.to_path_buf(),
        }),
    }
}
