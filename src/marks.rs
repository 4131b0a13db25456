//! Raw julia marks and the scalar-or-sequence normalization they rely on.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One `[[tasks.julia]]` table, as written by the task author.
///
/// Every field is optional; repeated marks on one task are folded into a
/// single resolved descriptor during collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMark {
    /// Path to the Julia script, relative to the manifest.
    pub script: Option<PathBuf>,
    /// Command line options for the interpreter, a single value or a list.
    pub options: Option<OneOrMany>,
    /// Name of a registered serializer for the task context.
    pub serializer: Option<String>,
    /// Suffix of the serialized context file, overrides the serializer's.
    pub suffix: Option<String>,
    /// Path to the Julia environment used to execute the task.
    pub project: Option<PathBuf>,
}

/// A scalar TOML value that can appear where a string is expected.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(v) => write!(f, "{v}"),
        }
    }
}

/// A field that accepts either one scalar or an ordered sequence of scalars.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl OneOrMany {
    /// Convert to an ordered list of strings. A bare scalar becomes a
    /// singleton; every element is stringified.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            OneOrMany::One(v) => vec![v.to_string()],
            OneOrMany::Many(vs) => vs.iter().map(Scalar::to_string).collect(),
        }
    }
}

/// Normalize an optional options field to a list of strings.
///
/// `None` yields an empty list. Pure and idempotent once already a list.
pub fn normalize_options(value: Option<&OneOrMany>) -> Vec<String> {
    value.map(OneOrMany::to_list).unwrap_or_default()
}

/// Resolve a possibly relative path against a root directory.
pub fn parse_relative_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Build the `--project=<path>` flag list: zero or one element.
pub fn project_flags(project: Option<&Path>, root: &Path) -> Vec<String> {
    match project {
        Some(path) => {
            let resolved = parse_relative_path(path, root);
            vec![format!("--project={}", resolved.display())]
        }
        None => Vec::new(),
    }
}
