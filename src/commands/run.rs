/// `taskjl run` command implementation
///
/// Collects all tasks, then executes the selection sequentially. A task's
/// execution failure is reported and does not stop sibling tasks.
use anyhow::Result;

use super::collect_pipeline;
use crate::cli::RunArgs;
use crate::execute::execute_task;
use crate::model::Task;

pub fn run(args: &RunArgs) -> Result<()> {
    let pipeline = collect_pipeline(args.manifest.as_deref())?;
    tracing::info!(
        manifest = %pipeline.source.display(),
        "collected {} task(s)",
        pipeline.tasks.len()
    );

    let selected = select_tasks(&pipeline.tasks, &args.tasks)?;

    let mut failed = 0usize;
    for task in &selected {
        match execute_task(task, &pipeline.registry) {
            Ok(()) => tracing::info!(task = %task.name, "task succeeded"),
            Err(err) => {
                failed += 1;
                tracing::error!(task = %task.name, "task failed: {err}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} task(s) failed", selected.len());
    }
    Ok(())
}

fn select_tasks<'a>(tasks: &'a [Task], names: &[String]) -> Result<Vec<&'a Task>> {
    if names.is_empty() {
        return Ok(tasks.iter().collect());
    }
    let mut selected = Vec::new();
    for name in names {
        let task = tasks
            .iter()
            .find(|t| &t.name == name)
            .ok_or_else(|| anyhow::anyhow!("No task named '{name}' in the manifest"))?;
        selected.push(task);
    }
    Ok(selected)
}
