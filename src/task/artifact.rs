//! Task artifacts

use crate::task::Task;

/// An output directory declared for a task, for external tooling such as CI
/// artifact collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskArtifact {
    task: Task,
    directory: String,
}

impl TaskArtifact {
    pub fn new(task: Task, directory: impl Into<String>) -> Self {
        TaskArtifact {
            task,
            directory: directory.into(),
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }
}
