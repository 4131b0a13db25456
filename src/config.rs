use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::marks::{normalize_options, OneOrMany};
use crate::serialization::SerializerRegistry;

/// Process-wide defaults for Julia tasks (the `[settings]` table of the
/// pipeline manifest).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Interpreter executable looked up on PATH.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Default serializer name; must be a registry key.
    #[serde(default = "default_serializer")]
    pub serializer: String,

    /// Default suffix for serialized context files. When unset, the
    /// resolved serializer's canonical suffix is used.
    #[serde(default)]
    pub suffix: Option<String>,

    /// Options prepended to every task's interpreter options.
    #[serde(default)]
    options: Option<OneOrMany>,

    /// Default Julia environment, resolved against the manifest directory.
    #[serde(default)]
    pub project: Option<PathBuf>,

    /// Reject tasks carrying more than one julia mark.
    #[serde(default)]
    pub strict: bool,
}

fn default_executable() -> String {
    "julia".to_string()
}

fn default_serializer() -> String {
    "json".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            serializer: default_serializer(),
            suffix: None,
            options: None,
            project: None,
            strict: false,
        }
    }
}

impl Settings {
    /// Normalized default option list.
    pub fn options(&self) -> Vec<String> {
        normalize_options(self.options.as_ref())
    }

    /// The configured default serializer must be registered, otherwise
    /// collection fails before any task is processed.
    pub fn validate(&self, registry: &SerializerRegistry) -> Result<()> {
        if !registry.contains(&self.serializer) {
            return Err(Error::UnknownSerializer {
                name: self.serializer.clone(),
            });
        }
        Ok(())
    }
}
