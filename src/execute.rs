//! Task execution: environment gate, context-file setup, and the blocking
//! interpreter subprocess.

use std::collections::BTreeMap;
use std::process::Command;

use crate::collect::POSITIONAL_KEY;
use crate::error::{Error, Result};
use crate::model::{is_reserved, ContextMap, ContextShape, ContextValue, ExecutionPlan, Node, Task};
use crate::serialization::{serialize_context, SerializerRegistry};

/// Separates interpreter options from arguments to the script, so user
/// options can never be confused with script arguments.
pub const SEPARATOR: &str = "--";

/// Verify the interpreter is discoverable on PATH before doing any work.
///
/// Runs once per task, since tasks may be filtered and selected
/// individually.
pub fn ensure_interpreter(executable: &str) -> Result<()> {
    which::which(executable)
        .map(|_| ())
        .map_err(|_| Error::EnvironmentMissing {
            executable: executable.to_string(),
        })
}

/// Build the mapping handed to the external script: the task's resolved
/// dependency and product values, reserved internal keys removed.
pub fn collect_context(task: &Task) -> ContextMap {
    let mut context = ContextMap::new();
    if let Some(value) = section(&task.depends_on, task.depends_shape) {
        context.insert("depends_on".to_string(), value);
    }
    if let Some(value) = section(&task.produces, task.produces_shape) {
        context.insert("produces".to_string(), value);
    }
    context
}

fn section(nodes: &BTreeMap<String, Node>, shape: ContextShape) -> Option<ContextValue> {
    let user: BTreeMap<String, String> = nodes
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, node)| (key.clone(), node.as_arg()))
        .collect();

    match shape {
        ContextShape::Scalar => user.get(POSITIONAL_KEY).cloned().map(ContextValue::Scalar),
        ContextShape::Named => {
            if user.is_empty() {
                None
            } else {
                Some(ContextValue::Map(user))
            }
        }
    }
}

/// Run one task: gate, serialize the context, then spawn the interpreter
/// and block until it exits. Single attempt, no retries.
pub fn execute_task(task: &Task, registry: &SerializerRegistry) -> Result<()> {
    ensure_interpreter(&task.plan.executable)?;

    let context = collect_context(task);
    serialize_context(&task.serializer, registry, &task.plan.serialized, &context)?;

    run_julia_script(&task.plan)
}

/// Invoke the interpreter with
/// `[options...] [--project=<path>] -- <script> <serialized>`.
///
/// Stdio is inherited so output streams to the console; a non-zero exit is
/// surfaced with the exit code and the command line, not captured output.
pub fn run_julia_script(plan: &ExecutionPlan) -> Result<()> {
    let command_line = render_command(plan);
    tracing::info!(task = %plan.script.display(), "executing `{command_line}`");

    let status = Command::new(&plan.executable)
        .args(&plan.options)
        .args(&plan.project)
        .arg(SEPARATOR)
        .arg(&plan.script)
        .arg(&plan.serialized)
        .status()
        .map_err(|source| Error::Spawn {
            executable: plan.executable.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::TaskExecution {
            exit_code: status.code().unwrap_or(-1),
            command: command_line,
        })
    }
}

fn render_command(plan: &ExecutionPlan) -> String {
    let mut parts = vec![plan.executable.clone()];
    parts.extend(plan.options.iter().cloned());
    parts.extend(plan.project.iter().cloned());
    parts.push(SEPARATOR.to_string());
    parts.push(plan.script.display().to_string());
    parts.push(plan.serialized.display().to_string());
    parts.join(" ")
}
