/// `taskjl collect` command implementation
///
/// Prints the resolved execution plan of every task without executing
/// anything.
use anyhow::Result;

use super::collect_pipeline;
use crate::cli::CollectArgs;
use crate::serialization::Serializer;

pub fn run(args: &CollectArgs) -> Result<()> {
    let pipeline = collect_pipeline(args.manifest.as_deref())?;

    println!("Collected {} task(s) from {}", pipeline.tasks.len(), pipeline.source.display());
    for task in &pipeline.tasks {
        let serializer = match &task.serializer {
            Serializer::Named(name) => name.clone(),
            Serializer::Custom(_) => "<custom>".to_string(),
        };
        println!();
        println!("{}", task.name);
        println!("  script:     {}", task.plan.script.display());
        println!("  options:    {}", task.plan.options.join(" "));
        println!("  project:    {}", task.plan.project.join(" "));
        println!("  serializer: {serializer}");
        println!("  context:    {}", task.plan.serialized.display());
    }
    Ok(())
}
