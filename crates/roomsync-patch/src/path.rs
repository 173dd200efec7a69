//! Paths locating a node inside the state tree.

use serde::{Deserialize, Serialize};

/// One step of a path: a map key or a sequence index.
///
/// Serialized untagged, so a path renders as a plain JSON array of strings
/// and numbers, e.g. `["players", "h", "inventory", 2]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Index into a sequence.
    Index(usize),
    /// Key into a map.
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Render a path as `/a/b/0` for diagnostics. The empty path is the root,
/// rendered as `/`.
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(&segment.to_string());
    }
    out
}
