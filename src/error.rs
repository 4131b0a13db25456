use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while collecting or executing Julia tasks
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "the task '{name}' in {path:?} is marked to be executed with Julia, but no \
         script was given; set `script = \"...\"` in one of its [[tasks.julia]] tables"
    )]
    MissingScript { name: String, path: PathBuf },

    #[error("the task '{name}' carries {count} julia marks, but strict mode allows only one")]
    TooManyMarks { name: String, count: usize },

    #[error("the script {path:?} does not have an accepted suffix (expected one of: {expected})")]
    ScriptExtension { path: PathBuf, expected: String },

    #[error("serializer '{name}' is not registered")]
    UnknownSerializer { name: String },

    #[error("'{executable}' is needed to run Julia scripts, but it was not found on your PATH")]
    EnvironmentMissing { executable: String },

    #[error("the command `{command}` exited with code {exit_code}")]
    TaskExecution { exit_code: i32, command: String },

    #[error(
        "the task '{name}' declares '{key}', but names starting with '_' are \
         reserved for internal dependencies"
    )]
    ReservedName { name: String, key: String },

    #[error("failed to write serialized context to {path:?}")]
    ContextWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize task context: {0}")]
    Serialize(String),

    #[error("failed to spawn '{executable}'")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
