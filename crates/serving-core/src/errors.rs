//! Validation and decoding errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path naming the field currently being validated, before any parent
/// prefixes it.
pub const CURRENT_FIELD: &str = "";

const MISSING_FIELD: &str = "missing field(s)";
const EXACTLY_ONE_GOT_BOTH: &str = "Expected exactly one, got both";
const EXACTLY_ONE_GOT_NEITHER: &str = "Expected exactly one, got neither";

/// A single validation failure and every field location responsible for it.
///
/// The message and the ordered paths are the contract consumers match on, so
/// both are reproduced exactly as constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}", render(.message, .paths))]
pub struct FieldError {
    pub message: String,
    pub paths: Vec<String>,
}

impl FieldError {
    pub fn new(message: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            message: message.into(),
            paths,
        }
    }

    pub fn missing_field(path: &str) -> Self {
        Self::new(MISSING_FIELD, vec![path.to_string()])
    }

    pub fn invalid_value(value: impl ToString, path: &str) -> Self {
        Self::new(
            format!("invalid value {}", quote(&value.to_string())),
            vec![path.to_string()],
        )
    }

    pub fn one_of_both(paths: &[&str]) -> Self {
        Self::new(EXACTLY_ONE_GOT_BOTH, owned(paths))
    }

    pub fn one_of_neither(paths: &[&str]) -> Self {
        Self::new(EXACTLY_ONE_GOT_NEITHER, owned(paths))
    }

    /// Moves every path under `prefix`, e.g. `revisionName` under
    /// `traffic[0]` becomes `traffic[0].revisionName`.
    pub fn with_prefix(self, prefix: &str) -> Self {
        Self {
            message: self.message,
            paths: self
                .paths
                .iter()
                .map(|path| join_path(prefix, path))
                .collect(),
        }
    }

    pub fn via_index(self, field: &str, index: usize) -> Self {
        self.with_prefix(&format!("{field}[{index}]"))
    }
}

/// Wraps `value` in double quotes, escaping only `"` and `\`.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

// A current-field error renders as the bare message.
fn render(message: &str, paths: &[String]) -> String {
    let paths: Vec<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|path| !path.is_empty())
        .collect();
    if paths.is_empty() {
        message.to_string()
    } else {
        format!("{}: {}", message, paths.join(", "))
    }
}

fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|path| path.to_string()).collect()
}

// Empty segments are dropped; index segments like `[2]` attach to the
// segment before them.
fn join_path(prefix: &str, path: &str) -> String {
    let mut joined = String::new();
    for segment in prefix
        .split('.')
        .chain(path.split('.'))
        .filter(|segment| !segment.is_empty())
    {
        if !joined.is_empty() && !segment.starts_with('[') {
            joined.push('.');
        }
        joined.push_str(segment);
    }
    joined
}

/// Errors surfaced to consumers that decode Route manifests
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid json manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid toml manifest: {0}")]
    Toml(#[from] toml::de::Error),
}
