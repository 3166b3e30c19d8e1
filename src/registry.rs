//! Task registry
//!
//! The renderer only needs to look tasks up by name and read the shared base
//! environment; [`TaskLookup`] is that capability. [`Tasks`] is the concrete
//! registry that owns tasks and enforces unique names.

use crate::config::Manifest;
use crate::error::{ConfigError, ConfigResult, RenderError, RenderResult};
use crate::task::{EnvMap, Task, TaskOptions};
use std::collections::BTreeMap;

/// Read-only view of a registry used during rendering
pub trait TaskLookup {
    /// Find a task by name
    fn try_find(&self, name: &str) -> Option<&Task>;

    /// Base environment shared by every task
    fn env(&self) -> &EnvMap;
}

/// A registry of uniquely named tasks
#[derive(Debug, Clone, Default)]
pub struct Tasks {
    tasks: BTreeMap<String, Task>,
    env: EnvMap,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a parsed manifest
    pub fn from_manifest(manifest: Manifest) -> ConfigResult<Self> {
        let mut tasks = Tasks {
            tasks: BTreeMap::new(),
            env: manifest.env,
        };
        for (name, spec) in manifest.tasks {
            let task = Task::from_spec(name.clone(), spec)?;
            tasks.tasks.insert(name, task);
        }
        Ok(tasks)
    }

    /// Create a new task. Names must be unique.
    pub fn add_task(&mut self, name: &str, options: TaskOptions) -> ConfigResult<&mut Task> {
        if self.tasks.contains_key(name) {
            return Err(ConfigError::DuplicateTask(name.to_string()));
        }
        Ok(self
            .tasks
            .entry(name.to_string())
            .or_insert_with(|| Task::new(name, options)))
    }

    pub fn remove_task(&mut self, name: &str) -> Option<Task> {
        self.tasks.remove(name)
    }

    pub fn try_find_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.get_mut(name)
    }

    /// All tasks, sorted by name
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Set a base environment variable
    pub fn add_env(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.set(name, value);
    }

    /// Merge variables into the base environment, overriding existing entries
    pub fn extend_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env.extend(vars);
    }

    /// Render the named task against this registry
    pub fn render(&self, name: &str) -> RenderResult<String> {
        let task = self
            .try_find(name)
            .ok_or_else(|| RenderError::UnknownTask(name.to_string()))?;
        task.to_shell_command(self)
    }

    /// Export every task and the base environment
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            env: self.env.clone(),
            tasks: self
                .tasks
                .iter()
                .map(|(name, task)| {
                    let mut spec = task.to_spec();
                    // The map key already carries the name
                    spec.name.clear();
                    (name.clone(), spec)
                })
                .collect(),
        }
    }
}

impl TaskLookup for Tasks {
    fn try_find(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    fn env(&self) -> &EnvMap {
        &self.env
    }
}
