//! Tasks, steps and shell command rendering
//!
//! This module holds the task model and the renderer that turns a task graph
//! into a single shell command string.

pub mod artifact;
pub mod definition;
pub mod env;
pub mod render;
pub mod step;

// Re-export main types
pub use artifact::TaskArtifact;
pub use definition::{Task, TaskOptions};
pub use env::EnvMap;
pub use step::{Step, StepAction, StepOptions};
