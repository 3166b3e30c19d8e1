//! The task entity
//!
//! A task owns an ordered list of steps, an environment, an optional skip
//! condition and some display metadata.

use crate::config::{TaskCategory, TaskSpec};
use crate::error::{ConfigError, ConfigResult, RenderResult};
use crate::registry::TaskLookup;
use crate::task::{render, EnvMap, Step, StepOptions, TaskArtifact};

/// Options accepted when a task is created
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub condition: Option<String>,
    pub env: EnvMap,

    /// First inline command, added before `steps`
    pub exec: Option<String>,

    pub steps: Vec<Step>,
}

/// A named, composable unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,

    /// Shell predicate; a non-zero exit turns the task into a no-op
    pub condition: Option<String>,

    env: EnvMap,
    steps: Vec<Step>,
}

impl Task {
    /// Create a new task
    pub fn new(name: impl Into<String>, options: TaskOptions) -> Self {
        let mut task = Task {
            name: name.into(),
            description: options.description,
            category: options.category,
            condition: options.condition,
            env: options.env,
            steps: Vec::new(),
        };
        if let Some(command) = options.exec {
            task.exec(command, StepOptions::default());
        }
        task.steps.extend(options.steps);
        task
    }

    /// Create a task from its exported record
    pub fn from_spec(name: impl Into<String>, spec: TaskSpec) -> ConfigResult<Self> {
        let name = name.into();
        let steps = spec
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                Step::from_spec(step).map_err(|reason| ConfigError::InvalidStep {
                    task: name.clone(),
                    index,
                    reason,
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Task {
            name,
            description: spec.description,
            category: spec.category,
            condition: spec.condition,
            env: spec.env,
            steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an inline command step
    pub fn exec(&mut self, command: impl Into<String>, options: StepOptions) {
        self.steps.push(Step::exec(command, options));
    }

    /// Insert an inline command step before every existing step
    pub fn prepend(&mut self, command: impl Into<String>, options: StepOptions) {
        self.steps.insert(0, Step::exec(command, options));
    }

    /// Append a step that runs `subtask`.
    ///
    /// Only the name is recorded; it is resolved when the task is rendered.
    pub fn exec_task(&mut self, subtask: &Task, options: StepOptions) {
        self.exec_task_named(subtask.name(), options);
    }

    /// Append a step that runs the task called `name`, which may not exist yet
    pub fn exec_task_named(&mut self, name: impl Into<String>, options: StepOptions) {
        self.steps.push(Step::exec_task(name, options));
    }

    /// Remove all steps, optionally re-seeding with one inline command
    pub fn reset(&mut self, command: Option<&str>) {
        self.steps.clear();
        if let Some(command) = command {
            self.exec(command, StepOptions::default());
        }
    }

    /// Set a task-level environment variable.
    ///
    /// Values of the form `$(...)` are kept verbatim and evaluated by the shell.
    pub fn env(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.set(name, value);
    }

    /// Task-level environment
    pub fn env_vars(&self) -> &EnvMap {
        &self.env
    }

    /// Declare an output directory for this task
    pub fn artifact(&self, directory: impl Into<String>) -> TaskArtifact {
        TaskArtifact::new(self.clone(), directory)
    }

    /// A copy of the current steps
    pub fn steps(&self) -> Vec<Step> {
        self.steps.clone()
    }

    /// Render this task, and every subtask it references, into one shell command
    pub fn to_shell_command(&self, registry: &dyn TaskLookup) -> RenderResult<String> {
        render::render(self, registry)
    }

    /// Export as a manifest record
    pub fn to_spec(&self) -> TaskSpec {
        TaskSpec {
            name: self.name.clone(),
            category: self.category,
            description: self.description.clone(),
            env: self.env.clone(),
            steps: self.steps.iter().map(Step::to_spec).collect(),
            condition: self.condition.clone(),
        }
    }

    pub(crate) fn step_slice(&self) -> &[Step] {
        &self.steps
    }
}
