//! Serializer registry, context-file naming, and context-file writing.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::ContextMap;

/// Hidden directory under the task's source directory holding the
/// serialized context files. Shared by all tasks of a project; each task
/// only ever touches its own uniquely named file.
pub const HIDDEN_DIR: &str = ".taskjl";

/// A function turning the task context into serialized text.
pub type SerializeFn = Arc<dyn Fn(&ContextMap) -> Result<String> + Send + Sync>;

/// Serializer selector resolved for one task: a registry name or a
/// user-supplied callable.
#[derive(Clone)]
pub enum Serializer {
    Named(String),
    Custom(SerializeFn),
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Serializer::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Serializer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One registry entry: the codec plus the canonical file suffix.
#[derive(Clone)]
pub struct RegistryEntry {
    pub serialize: SerializeFn,
    pub suffix: String,
}

/// Registry of named serializers.
///
/// Populated once at process start and read-only afterwards; whichever
/// component needs a lookup receives it by reference.
pub struct SerializerRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

fn to_json(context: &ContextMap) -> Result<String> {
    serde_json::to_string(context).map_err(|e| Error::Serialize(e.to_string()))
}

#[cfg(feature = "yaml")]
fn to_yaml(context: &ContextMap) -> Result<String> {
    serde_yaml::to_string(context).map_err(|e| Error::Serialize(e.to_string()))
}

impl SerializerRegistry {
    /// Registry with the built-in entries: "json" is always present,
    /// "yaml"/"yml" only when the yaml feature is enabled.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
        };
        registry.register("json", ".json", Arc::new(to_json));
        #[cfg(feature = "yaml")]
        {
            registry.register("yaml", ".yaml", Arc::new(to_yaml));
            registry.register("yml", ".yml", Arc::new(to_yaml));
        }
        registry
    }

    /// Register a serializer under a name. Embedders use this to expose
    /// custom codecs to the manifest surface.
    pub fn register(&mut self, name: &str, suffix: &str, serialize: SerializeFn) {
        self.entries.insert(
            name.to_string(),
            RegistryEntry {
                serialize,
                suffix: suffix.to_string(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Canonical suffix of a named serializer, if registered.
    pub fn suffix_for(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.suffix.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Replace characters that are not valid in a single path segment.
///
/// `[`, `]`, `::`, `.` and `/` all map to `_`. Distinct task ids stay
/// distinct for any non-pathological naming scheme; ids are already unique
/// upstream.
pub fn sanitize_task_id(id: &str) -> String {
    id.replace("::", "_")
        .replace(['[', ']', '.', '/'], "_")
}

/// Deterministic, collision-free path of the serialized context file:
/// `<task_dir>/.taskjl/<sanitized id><suffix>`.
pub fn serialized_context_path(task_dir: &Path, task_id: &str, suffix: &str) -> PathBuf {
    task_dir
        .join(HIDDEN_DIR)
        .join(format!("{}{}", sanitize_task_id(task_id), suffix))
}

/// Write the task context to `path` with the selected serializer.
///
/// Parent directories are created if missing; creation tolerates concurrent
/// sibling tasks. The file content is fully replaced.
pub fn serialize_context(
    serializer: &Serializer,
    registry: &SerializerRegistry,
    path: &Path,
    context: &ContextMap,
) -> Result<()> {
    let serialize = match serializer {
        Serializer::Custom(f) => f.clone(),
        Serializer::Named(name) => registry
            .get(name)
            .ok_or_else(|| Error::UnknownSerializer { name: name.clone() })?
            .serialize
            .clone(),
    };

    let text = serialize(context)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::ContextWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| Error::ContextWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContextValue;
    use tempfile::TempDir;

    fn sample_context() -> ContextMap {
        let mut context = ContextMap::new();
        context.insert(
            "depends_on".to_string(),
            ContextValue::Scalar("/data/in.txt".to_string()),
        );
        let mut products = BTreeMap::new();
        products.insert("out".to_string(), "/data/out.txt".to_string());
        context.insert("produces".to_string(), ContextValue::Map(products));
        context
    }

    #[test]
    fn test_registry_defaults() {
        let registry = SerializerRegistry::with_defaults();
        assert!(registry.contains("json"));
        assert_eq!(registry.suffix_for("json"), Some(".json"));
        #[cfg(feature = "yaml")]
        {
            assert_eq!(registry.suffix_for("yaml"), Some(".yaml"));
            assert_eq!(registry.suffix_for("yml"), Some(".yml"));
        }
        assert!(!registry.contains("msgpack"));
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        let id = "pipeline.toml::task_plot[a.b/c]";
        assert_eq!(sanitize_task_id(id), sanitize_task_id(id));
    }

    #[test]
    fn test_sanitize_replaces_disallowed_characters() {
        assert_eq!(
            sanitize_task_id("pipeline.toml::task_plot[x]"),
            "pipeline_toml_task_plot_x_"
        );
        assert_eq!(sanitize_task_id("a/b.c"), "a_b_c");
    }

    #[test]
    fn test_distinct_ids_do_not_collide() {
        let ids = [
            "pipeline.toml::task_a",
            "pipeline.toml::task_b",
            "pipeline.toml::task_plot[a]",
            "pipeline.toml::task_plot[b]",
            "other.toml::task_a",
        ];
        let sanitized: std::collections::BTreeSet<_> =
            ids.iter().map(|id| sanitize_task_id(id)).collect();
        assert_eq!(sanitized.len(), ids.len());
    }

    #[test]
    fn test_context_path_layout() {
        let path = serialized_context_path(Path::new("/proj"), "pipeline.toml::task_a", ".json");
        assert_eq!(
            path,
            PathBuf::from("/proj/.taskjl/pipeline_toml_task_a.json")
        );
    }

    #[test]
    fn test_serialize_json_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(HIDDEN_DIR).join("task.json");
        let registry = SerializerRegistry::with_defaults();
        let context = sample_context();

        serialize_context(
            &Serializer::Named("json".to_string()),
            &registry,
            &path,
            &context,
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: ContextMap = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, context);
    }

    #[test]
    fn test_serialize_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(HIDDEN_DIR).join("task.json");
        assert!(!path.parent().unwrap().exists());

        let registry = SerializerRegistry::with_defaults();
        serialize_context(
            &Serializer::Named("json".to_string()),
            &registry,
            &path,
            &sample_context(),
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unknown_serializer_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("task.ctx");
        let registry = SerializerRegistry::with_defaults();

        let result = serialize_context(
            &Serializer::Named("msgpack".to_string()),
            &registry,
            &path,
            &sample_context(),
        );
        assert!(matches!(
            result,
            Err(Error::UnknownSerializer { name }) if name == "msgpack"
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_custom_serializer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("task.csv");
        let registry = SerializerRegistry::with_defaults();
        let custom: SerializeFn = Arc::new(|context| {
            Ok(context
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(","))
        });

        serialize_context(&Serializer::Custom(custom), &registry, &path, &sample_context())
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "depends_on,produces");
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_serialize_yaml_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("task.yaml");
        let registry = SerializerRegistry::with_defaults();
        let context = sample_context();

        serialize_context(
            &Serializer::Named("yaml".to_string()),
            &registry,
            &path,
            &context,
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: ContextMap = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, context);
    }
}
