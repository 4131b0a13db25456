//! Framework-shaped data types at the seam to the task orchestrator:
//! tracked nodes, collected tasks, and the bound execution plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::marks::parse_relative_path;
use crate::serialization::Serializer;

/// Reserved dependency key for the script node.
pub const SCRIPT_KEY: &str = "_script";
/// Reserved dependency key for the options pass-through node.
pub const OPTIONS_KEY: &str = "_options";
/// Reserved dependency key for the project pass-through node.
pub const PROJECT_KEY: &str = "_project";
/// Reserved dependency key for the serialized-context node.
pub const SERIALIZED_KEY: &str = "_serialized";

/// Returns true for internal dependency names that user tasks may not declare.
pub fn is_reserved(key: &str) -> bool {
    key.starts_with('_')
}

/// A unit of tracked dependency/product state: a file path or an in-memory
/// value the orchestrator watches for staleness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Path(PathBuf),
    Value(String),
}

impl Node {
    /// Stringified form handed to the external script.
    pub fn as_arg(&self) -> String {
        match self {
            Node::Path(path) => path.display().to_string(),
            Node::Value(value) => value.clone(),
        }
    }
}

/// Shape of one section of the context file, fixed at collection time.
///
/// A scalar section came from a bare string in the manifest and is collapsed
/// to a single value in the context file; a named section always serializes
/// as a mapping, regardless of how many entries it currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextShape {
    Scalar,
    Named,
}

/// One value in the serialized context: either a collapsed scalar or a
/// mapping from argument name to stringified node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Scalar(String),
    Map(BTreeMap<String, String>),
}

/// The mapping written to the serialized context file.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// Interpreter invocation bound to one task: plain data, constructed once
/// at collection and handed to the generic subprocess runner.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub executable: String,
    pub options: Vec<String>,
    /// Zero or one `--project=<path>` element.
    pub project: Vec<String>,
    pub script: PathBuf,
    pub serialized: PathBuf,
}

/// A fully wired task, ready for the execution phase.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    /// Manifest the task was declared in.
    pub source: PathBuf,
    /// User dependencies plus the reserved internal nodes.
    pub depends_on: BTreeMap<String, Node>,
    pub produces: BTreeMap<String, Node>,
    pub depends_shape: ContextShape,
    pub produces_shape: ContextShape,
    pub serializer: Serializer,
    pub plan: ExecutionPlan,
}

impl Task {
    /// Unique short identifier, `<manifest file name>::<task name>`.
    pub fn short_id(source: &Path, name: &str) -> String {
        let file = source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{file}::{name}")
    }
}

/// The collection-time view of the host session: configuration plus the
/// node-collection hook turning declared values into tracked nodes.
pub struct Session<'a> {
    /// Directory all relative paths resolve against (the manifest's parent).
    pub root: PathBuf,
    pub settings: &'a Settings,
}

impl Session<'_> {
    /// Turn a declared path-like value into a tracked path node.
    pub fn collect_node(&self, value: &str) -> Node {
        Node::Path(parse_relative_path(Path::new(value), &self.root))
    }

    /// Turn an in-memory value into a tracked pass-through node, so changes
    /// to it invalidate cached results.
    pub fn collect_value_node(&self, value: impl Into<String>) -> Node {
        Node::Value(value.into())
    }
}
