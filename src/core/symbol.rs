//! Native library symbols selected for binding exposure.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Alphanumeric segments joined by single underscores, e.g. `gp_Pnt` or
/// `Handle_Geom2d_Curve`. The first character must be a letter.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*(_[A-Za-z0-9]+)*$").unwrap());

/// One addressable construct (type, function or namespace-qualified name)
/// of the native library's public surface.
///
/// A `Symbol` is not checked on construction so that a registry with bad
/// entries can still be loaded and every problem reported at once by
/// [`SymbolRegistry::validate`](crate::core::registry::SymbolRegistry::validate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol {
    name: String,
}

impl Symbol {
    /// Create a symbol with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol { name: name.into() }
    }

    /// Get the symbol name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check the name against the identifier grammar.
    pub fn is_valid(&self) -> bool {
        is_valid_name(&self.name)
    }

    /// The namespace (package) prefix, e.g. `gp` for `gp_Pnt`.
    ///
    /// Returns `None` for unqualified names such as `Precision`.
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once('_').map(|(ns, _)| ns)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol::new(name)
    }
}

/// Check whether `name` is a valid native identifier.
pub fn is_valid_name(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}
