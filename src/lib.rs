// Library interface for taskjl
// This allows integration tests and embedders to use taskjl's modules

pub mod collect;
pub mod config;
pub mod error;
pub mod execute;
pub mod manifest;
pub mod marks;
pub mod model;
pub mod serialization;

// Re-export commonly used types
pub use collect::{collect_task, merge_all_marks, JuliaMark};
pub use config::Settings;
pub use error::Error;
pub use execute::execute_task;
pub use manifest::Manifest;
pub use model::{Node, Session, Task};
pub use serialization::{Serializer, SerializerRegistry};
