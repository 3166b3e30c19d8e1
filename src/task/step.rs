//! Task steps
//!
//! A step is an immutable value: either an inline shell fragment or a
//! by-name reference to another task.

use crate::config::StepSpec;
use crate::task::env::EnvMap;

/// What a step does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Inline shell fragment, emitted as-is
    Exec(String),

    /// Another task, resolved by name at render time
    ExecTask(String),
}

/// Options shared by both step variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOptions {
    /// Label echoed before the step runs
    pub name: Option<String>,

    /// Variables exported for this step only
    pub env: EnvMap,

    /// Working directory for this step
    pub cwd: Option<String>,
}

impl StepOptions {
    pub fn named(name: impl Into<String>) -> Self {
        StepOptions {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.set(name, value);
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// A single step of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    action: StepAction,
    options: StepOptions,
}

impl Step {
    /// Inline command step
    pub fn exec(command: impl Into<String>, options: StepOptions) -> Self {
        Step {
            action: StepAction::Exec(command.into()),
            options,
        }
    }

    /// Subtask reference step
    pub fn exec_task(task_name: impl Into<String>, options: StepOptions) -> Self {
        Step {
            action: StepAction::ExecTask(task_name.into()),
            options,
        }
    }

    /// Build a step from a manifest record.
    ///
    /// Exactly one of `exec` and `task` must be set.
    pub fn from_spec(spec: StepSpec) -> Result<Self, String> {
        let options = StepOptions {
            name: spec.name,
            env: spec.env,
            cwd: spec.cwd,
        };
        match (spec.exec, spec.task) {
            (Some(command), None) => Ok(Step::exec(command, options)),
            (None, Some(task)) => Ok(Step::exec_task(task, options)),
            (Some(_), Some(_)) => Err("a step cannot set both 'exec' and 'task'".to_string()),
            (None, None) => Err("a step must set either 'exec' or 'task'".to_string()),
        }
    }

    /// Export as a manifest record
    pub fn to_spec(&self) -> StepSpec {
        let (exec, task) = match &self.action {
            StepAction::Exec(cmd) => (Some(cmd.clone()), None),
            StepAction::ExecTask(name) => (None, Some(name.clone())),
        };
        StepSpec {
            exec,
            task,
            name: self.options.name.clone(),
            env: self.options.env.clone(),
            cwd: self.options.cwd.clone(),
        }
    }

    pub fn action(&self) -> &StepAction {
        &self.action
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    pub fn env(&self) -> &EnvMap {
        &self.options.env
    }

    pub fn cwd(&self) -> Option<&str> {
        self.options.cwd.as_deref()
    }

    /// Name of the referenced task, if this is a subtask step
    pub fn subtask(&self) -> Option<&str> {
        match &self.action {
            StepAction::ExecTask(name) => Some(name),
            StepAction::Exec(_) => None,
        }
    }
}
