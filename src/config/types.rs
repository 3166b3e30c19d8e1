//! Manifest record types
//!
//! This module defines the serializable records that represent a taskweave.yml
//! manifest. They are the persisted form of [`crate::task::Task`] and
//! [`crate::task::Step`].

use crate::task::EnvMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level manifest structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    /// Base environment shared by every task
    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub env: EnvMap,

    /// Tasks keyed by name
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskSpec>,
}

/// The exported form of one task
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TaskSpec {
    /// Task name. Filled from the map key when loading a manifest.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub env: EnvMap,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepSpec>,

    /// Shell predicate; a non-zero exit skips the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// The exported form of one step
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StepSpec {
    /// Inline shell command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,

    /// Name of a task to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Label echoed before the step runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub env: EnvMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

/// Priority bands used to group tasks in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum TaskCategory {
    #[serde(rename = "00.build")]
    Build,
    #[serde(rename = "10.test")]
    Test,
    #[serde(rename = "20.release")]
    Release,
    #[serde(rename = "30.maintain")]
    Maintain,
    #[serde(rename = "99.misc")]
    Misc,
}

impl TaskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Build => "build",
            TaskCategory::Test => "test",
            TaskCategory::Release => "release",
            TaskCategory::Maintain => "maintain",
            TaskCategory::Misc => "misc",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
