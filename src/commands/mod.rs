pub mod collect;
pub mod run;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::collect::collect_task;
use crate::manifest::{locate_manifest, Manifest};
use crate::model::{Session, Task};
use crate::serialization::SerializerRegistry;

/// A collected pipeline, ready to execute or print.
pub(crate) struct Pipeline {
    pub source: PathBuf,
    pub tasks: Vec<Task>,
    pub registry: SerializerRegistry,
}

/// Load the manifest and collect every task.
///
/// A single task's collection failure does not stop collection of its
/// siblings, but any failure aborts before execution begins: without a
/// complete set of tasks the dependency graph cannot be trusted.
pub(crate) fn collect_pipeline(manifest_arg: Option<&str>) -> Result<Pipeline> {
    let source = locate_manifest(manifest_arg)?;
    let manifest = Manifest::from_file(&source)?;

    let registry = SerializerRegistry::with_defaults();
    manifest.settings.validate(&registry).with_context(|| {
        format!(
            "Invalid [settings] table (registered serializers: {})",
            registry.names().collect::<Vec<_>>().join(", ")
        )
    })?;

    let session = Session {
        root: source
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
        settings: &manifest.settings,
    };

    let mut tasks = Vec::new();
    let mut failures = 0usize;
    for spec in &manifest.tasks {
        match collect_task(&session, &source, spec, &registry) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                failures += 1;
                tracing::error!(task = %spec.name, "collection failed: {err}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{failures} of {} task(s) failed to collect",
            manifest.tasks.len()
        );
    }

    Ok(Pipeline {
        source,
        tasks,
        registry,
    })
}
