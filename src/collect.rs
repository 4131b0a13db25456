//! Task collection: mark merging and task assembly.
//!
//! Folds repeated julia marks and configured defaults into one resolved
//! descriptor per task, turns the script and its execution options into
//! tracked dependency nodes, and wires up the execution plan.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::manifest::{NodeField, TaskSpec};
use crate::marks::{normalize_options, project_flags, RawMark};
use crate::model::{
    is_reserved, ContextShape, ExecutionPlan, Node, Session, Task, OPTIONS_KEY, PROJECT_KEY,
    SCRIPT_KEY, SERIALIZED_KEY,
};
use crate::serialization::{serialized_context_path, Serializer, SerializerRegistry};

/// Accepted script suffixes.
pub const SCRIPT_SUFFIXES: &[&str] = &["jl"];

/// Key under which a bare (positional) dependency or product is stored.
pub const POSITIONAL_KEY: &str = "0";

/// The fully resolved execution descriptor of one task.
#[derive(Debug, Clone)]
pub struct JuliaMark {
    pub script: std::path::PathBuf,
    pub options: Vec<String>,
    pub serializer: Serializer,
    pub suffix: String,
    pub project: Option<std::path::PathBuf>,
}

/// Fold N raw marks plus the configured defaults into one descriptor.
///
/// Precedence: `script`, `serializer`, `suffix` and `project` are
/// first-match-wins in declaration order; `options` is additive, defaults
/// first, then each mark's options in order.
pub fn merge_all_marks(
    name: &str,
    source: &Path,
    marks: &[RawMark],
    settings: &Settings,
    registry: &SerializerRegistry,
) -> Result<JuliaMark> {
    if settings.strict && marks.len() > 1 {
        return Err(Error::TooManyMarks {
            name: name.to_string(),
            count: marks.len(),
        });
    }

    let script = marks
        .iter()
        .find_map(|m| m.script.clone())
        .ok_or_else(|| Error::MissingScript {
            name: name.to_string(),
            path: source.to_path_buf(),
        })?;

    let mut options = settings.options();
    for mark in marks {
        options.extend(normalize_options(mark.options.as_ref()));
    }

    let serializer_name = marks
        .iter()
        .find_map(|m| m.serializer.clone())
        .unwrap_or_else(|| settings.serializer.clone());

    // A known serializer proposes its canonical suffix; an unknown name is
    // not an error here, the configured suffix applies instead.
    let proposed_suffix = registry
        .suffix_for(&serializer_name)
        .map(str::to_string)
        .or_else(|| settings.suffix.clone())
        .unwrap_or_default();
    let suffix = marks
        .iter()
        .find_map(|m| m.suffix.clone())
        .unwrap_or(proposed_suffix);

    let project = marks
        .iter()
        .find_map(|m| m.project.clone())
        .or_else(|| settings.project.clone());

    Ok(JuliaMark {
        script,
        options,
        serializer: Serializer::Named(serializer_name),
        suffix,
        project,
    })
}

/// Produce a fully wired task from its manifest entry.
///
/// Any failure aborts collection of this task only; the caller decides what
/// to do with sibling tasks.
pub fn collect_task(
    session: &Session<'_>,
    source: &Path,
    spec: &TaskSpec,
    registry: &SerializerRegistry,
) -> Result<Task> {
    let mark = merge_all_marks(&spec.name, source, &spec.julia, session.settings, registry)?;

    let extension = mark
        .script
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    if !SCRIPT_SUFFIXES.contains(&extension) {
        return Err(Error::ScriptExtension {
            path: mark.script.clone(),
            expected: SCRIPT_SUFFIXES
                .iter()
                .map(|s| format!(".{s}"))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let script_node = session.collect_node(&mark.script.display().to_string());
    let script_path = match &script_node {
        Node::Path(path) => path.clone(),
        Node::Value(value) => std::path::PathBuf::from(value),
    };

    let (mut depends_on, depends_shape) =
        resolve_nodes(session, &spec.name, spec.depends_on.as_ref())?;
    let (produces, produces_shape) = resolve_nodes(session, &spec.name, spec.produces.as_ref())?;

    let project = project_flags(mark.project.as_deref(), &session.root);

    let task_dir = source.parent().unwrap_or_else(|| Path::new("."));
    let task_id = Task::short_id(source, &spec.name);
    let serialized = serialized_context_path(task_dir, &task_id, &mark.suffix);

    // Synthetic nodes under reserved keys: changes to the script, the
    // options or the project invalidate cached results like any other
    // dependency.
    depends_on.insert(SCRIPT_KEY.to_string(), script_node);
    depends_on.insert(
        OPTIONS_KEY.to_string(),
        session.collect_value_node(mark.options.join(" ")),
    );
    depends_on.insert(
        PROJECT_KEY.to_string(),
        session.collect_value_node(project.join(" ")),
    );
    depends_on.insert(SERIALIZED_KEY.to_string(), Node::Path(serialized.clone()));

    Ok(Task {
        name: spec.name.clone(),
        source: source.to_path_buf(),
        depends_on,
        produces,
        depends_shape,
        produces_shape,
        serializer: mark.serializer,
        plan: ExecutionPlan {
            executable: session.settings.executable.clone(),
            options: mark.options,
            project,
            script: script_path,
            serialized,
        },
    })
}

/// Turn a declared dependency/product field into tracked nodes, recording
/// whether the section collapses to a scalar in the context file.
fn resolve_nodes(
    session: &Session<'_>,
    task_name: &str,
    field: Option<&NodeField>,
) -> Result<(BTreeMap<String, Node>, ContextShape)> {
    let mut nodes = BTreeMap::new();
    let shape = match field {
        None => ContextShape::Named,
        Some(NodeField::Single(value)) => {
            nodes.insert(POSITIONAL_KEY.to_string(), session.collect_node(value));
            ContextShape::Scalar
        }
        Some(NodeField::Named(map)) => {
            for (key, value) in map {
                if is_reserved(key) {
                    return Err(Error::ReservedName {
                        name: task_name.to_string(),
                        key: key.clone(),
                    });
                }
                nodes.insert(key.clone(), session.collect_node(value));
            }
            ContextShape::Named
        }
    };
    Ok((nodes, shape))
}
