//! Taskweave - compose project tasks and render them into shell commands
//!
//! A task is an ordered list of steps, each either an inline shell fragment
//! or a reference to another task. Rendering flattens a task and everything
//! it references into one grouped, AND-chained command string that any POSIX
//! shell can run.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod task;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, TaskweaveError};
pub use registry::{TaskLookup, Tasks};
pub use task::{Step, StepOptions, Task, TaskArtifact, TaskOptions};

/// Current version of Taskweave
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
