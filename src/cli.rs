use clap::{Parser, Subcommand};

/// taskjl - Run Julia scripts as first-class pipeline tasks
///
/// Tasks are declared in a TOML manifest together with their scripts,
/// interpreter options and dependency/product files; taskjl serializes each
/// task's resolved context to a file and hands it to the interpreter.
#[derive(Parser, Debug)]
#[command(name = "taskjl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Julia scripts as pipeline tasks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect and execute the pipeline's tasks
    Run(RunArgs),

    /// Collect tasks and print the resolved plan without executing
    Collect(CollectArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Pipeline manifest path (discovered by walking up the tree if omitted)
    #[arg(short = 'm', long, env = "TASKJL_MANIFEST")]
    pub manifest: Option<String>,

    /// Only run the named task(s); may be given multiple times
    #[arg(short = 'k', long = "task")]
    pub tasks: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Pipeline manifest path (discovered by walking up the tree if omitted)
    #[arg(short = 'm', long, env = "TASKJL_MANIFEST")]
    pub manifest: Option<String>,
}
