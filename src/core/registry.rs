//! The symbol registry: the curated allow-list of native symbols.
//!
//! A registry is loaded once from a source-controlled file and is immutable
//! afterwards. Several registries can coexist, which is what makes drift
//! detection between two library versions possible via [`SymbolRegistry::diff`].
//!
//! Supported storage formats, chosen by file extension:
//! - `.json`: a top-level array of strings
//! - `.toml`: `symbols = ["gp_Pnt", ...]`
//! - anything else: one name per line, `#` comments and blank lines ignored

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::symbol::Symbol;
use crate::util::hash::Fingerprint;

/// The registry source could not be read or is not a flat list of strings.
#[derive(Debug, Error)]
pub enum RegistryFormatError {
    #[error("failed to read symbol registry {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symbol registry {} is not a flat JSON array of strings", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("symbol registry {} must contain only `symbols = [\"...\"]`", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A single problem found while validating a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entry {index} is empty")]
    Empty { index: usize },

    #[error("entry {index} `{name}` is not a valid native identifier")]
    InvalidName { index: usize, name: String },

    #[error("`{name}` is listed more than once (entries {})", format_indices(indices))]
    Duplicate { name: String, indices: Vec<usize> },
}

fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every validation problem of a registry, in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("symbol registry has {} problem(s)", errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Iterate over the collected errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no errors were collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRegistry {
    symbols: Vec<String>,
}

/// An ordered, immutable list of symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolRegistry {
    symbols: Vec<Symbol>,
    origin: Option<PathBuf>,
}

impl SymbolRegistry {
    /// Build a registry from names, keeping their order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SymbolRegistry {
            symbols: names.into_iter().map(Symbol::new).collect(),
            origin: None,
        }
    }

    /// Load a registry from a file, keeping declaration order.
    pub fn load(path: &Path) -> Result<Self, RegistryFormatError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut registry = Self::parse(path, &contents)?;
        registry.origin = Some(path.to_path_buf());

        tracing::debug!(
            "loaded {} symbols from {}",
            registry.len(),
            path.display()
        );

        Ok(registry)
    }

    /// Parse registry contents, picking the format from the extension of `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, RegistryFormatError> {
        let names = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str::<Vec<String>>(contents).map_err(|source| {
                RegistryFormatError::Json {
                    path: path.to_path_buf(),
                    source,
                }
            })?,
            Some("toml") => {
                toml::from_str::<TomlRegistry>(contents)
                    .map_err(|source| RegistryFormatError::Toml {
                        path: path.to_path_buf(),
                        source,
                    })?
                    .symbols
            }
            _ => parse_lines(contents),
        };

        Ok(Self::from_names(names))
    }

    /// The file this registry was loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Symbols in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Iterate over symbols in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Symbol names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(Symbol::name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Check whether a symbol with this name is listed.
    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Validate every entry, collecting all problems.
    ///
    /// Per-entry problems come first in index order, followed by one
    /// duplicate report per repeated name in order of first occurrence.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        for (index, symbol) in self.symbols.iter().enumerate() {
            if symbol.name().is_empty() {
                errors.push(ValidationError::Empty { index });
            } else if !symbol.is_valid() {
                errors.push(ValidationError::InvalidName {
                    index,
                    name: symbol.name().to_string(),
                });
            }
        }

        let mut occurrences: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, name) in self.names().enumerate() {
            occurrences.entry(name).or_default().push(index);
        }

        let mut duplicates: Vec<(&str, Vec<usize>)> = occurrences
            .into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .collect();
        duplicates.sort_by_key(|(_, indices)| indices[0]);

        errors.extend(
            duplicates
                .into_iter()
                .map(|(name, indices)| ValidationError::Duplicate {
                    name: name.to_string(),
                    indices,
                }),
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }

    /// Compare two registries as sets of names.
    ///
    /// `added` holds names only in `newer`, `removed` names only in `self`.
    pub fn diff(&self, newer: &SymbolRegistry) -> RegistryDiff {
        let old: HashSet<&str> = self.names().collect();
        let new: HashSet<&str> = newer.names().collect();

        RegistryDiff {
            added: new.difference(&old).map(|s| s.to_string()).collect(),
            removed: old.difference(&new).map(|s| s.to_string()).collect(),
            unchanged: old.intersection(&new).count(),
        }
    }

    /// SHA-256 over the ordered names.
    ///
    /// Identifies exactly which registry revision a build was produced from.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        for name in self.names() {
            fp.update_str(name);
        }
        fp.finish()
    }
}

fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Drift between two registries, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDiff {
    /// Names present only in the newer registry.
    pub added: BTreeSet<String>,
    /// Names present only in the older registry.
    pub removed: BTreeSet<String>,
    /// Number of names present in both.
    pub unchanged: usize,
}

impl RegistryDiff {
    /// Whether the two registries list the same names.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl fmt::Display for RegistryDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.removed {
            writeln!(f, "- {}", name)?;
        }
        for name in &self.added {
            writeln!(f, "+ {}", name)?;
        }
        Ok(())
    }
}
