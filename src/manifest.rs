//! The pipeline manifest: task declarations plus process-wide settings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::marks::RawMark;

/// Default manifest file name, discovered by walking up the directory tree.
pub const MANIFEST_FILE: &str = "pipeline.toml";

/// A dependency or product declaration: a bare value (positional, collapsed
/// in the context file) or a table of named values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeField {
    Single(String),
    Named(BTreeMap<String, String>),
}

/// One `[[tasks]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub name: String,

    /// Repeated `[[tasks.julia]]` marks, folded during collection.
    #[serde(default)]
    pub julia: Vec<RawMark>,

    #[serde(default)]
    pub depends_on: Option<NodeField>,

    #[serde(default)]
    pub produces: Option<NodeField>,
}

/// Complete pipeline manifest (loaded from a TOML file).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest: Manifest = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        Ok(manifest)
    }
}

/// Discover the pipeline manifest by traversing up the directory tree.
pub fn discover_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let manifest_path = current.join(MANIFEST_FILE);
        if manifest_path.exists() {
            return Some(manifest_path);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Resolve the manifest path: an explicit path wins, otherwise discovery
/// from the current directory.
pub fn locate_manifest(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        anyhow::ensure!(path.exists(), "Manifest not found: {}", path.display());
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    discover_manifest(&cwd)
        .with_context(|| format!("No {MANIFEST_FILE} found in {} or any parent", cwd.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
        [settings]
        serializer = "json"
        options = ["--threads=2"]

        [[tasks]]
        name = "task_plot"
        depends_on = { data = "data.csv" }
        produces = "plot.png"

        [[tasks.julia]]
        script = "plot.jl"

        [[tasks.julia]]
        options = "--optimize=0"
    "#;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = toml::from_str(SAMPLE).unwrap();
        assert_eq!(manifest.settings.options(), vec!["--threads=2"]);
        assert_eq!(manifest.tasks.len(), 1);

        let task = &manifest.tasks[0];
        assert_eq!(task.name, "task_plot");
        assert_eq!(task.julia.len(), 2);
        assert!(matches!(task.depends_on, Some(NodeField::Named(_))));
        assert!(matches!(task.produces, Some(NodeField::Single(_))));
    }

    #[test]
    fn test_task_without_marks_parses() {
        let manifest: Manifest = toml::from_str(
            r#"
            [[tasks]]
            name = "task_plain"
            "#,
        )
        .unwrap();
        assert!(manifest.tasks[0].julia.is_empty());
    }

    #[test]
    fn test_discover_manifest_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "").unwrap();

        let found = discover_manifest(&nested).unwrap();
        assert_eq!(found, temp.path().join(MANIFEST_FILE));
    }

    #[test]
    fn test_from_file_reports_bad_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(MANIFEST_FILE);
        fs::write(&path, "tasks = 1").unwrap();
        assert!(Manifest::from_file(&path).is_err());
    }
}
