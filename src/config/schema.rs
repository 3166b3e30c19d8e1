//! Manifest validation
//!
//! Catches configuration bugs before anything is rendered: malformed steps,
//! bad variable names, references to undefined tasks and reference cycles.

use crate::config::types::{Manifest, StepSpec};
use crate::error::{ConfigError, ConfigResult};
use crate::task::EnvMap;
use std::collections::HashSet;

/// Validate a complete manifest
pub fn validate_manifest(manifest: &Manifest) -> ConfigResult<()> {
    validate_env_names("env", &manifest.env)?;
    for (name, task) in &manifest.tasks {
        validate_steps(name, &task.steps)?;
        validate_env_names(&format!("task '{}'", name), &task.env)?;
        for (index, step) in task.steps.iter().enumerate() {
            validate_env_names(&format!("step {} of task '{}'", index, name), &step.env)?;
        }
    }

    for (name, task) in &manifest.tasks {
        for step in &task.steps {
            if let Some(subtask) = &step.task {
                if !manifest.tasks.contains_key(subtask) {
                    return Err(ConfigError::TaskNotFound(format!(
                        "{} (referenced by '{}')",
                        subtask, name
                    )));
                }
            }
        }
    }

    detect_circular_task_dependencies(manifest)
}

fn validate_env_names(owner: &str, env: &EnvMap) -> ConfigResult<()> {
    match env.invalid_name() {
        Some(bad) => Err(ConfigError::Invalid(format!(
            "invalid environment variable name '{}' in {}",
            bad, owner
        ))),
        None => Ok(()),
    }
}

/// Check that each step sets exactly one of `exec` and `task`
pub fn validate_steps(task: &str, steps: &[StepSpec]) -> ConfigResult<()> {
    for (index, step) in steps.iter().enumerate() {
        let reason = match (&step.exec, &step.task) {
            (Some(_), Some(_)) => "a step cannot set both 'exec' and 'task'",
            (None, None) => "a step must set either 'exec' or 'task'",
            _ => continue,
        };
        return Err(ConfigError::InvalidStep {
            task: task.to_string(),
            index,
            reason: reason.to_string(),
        });
    }
    Ok(())
}

/// Detect cycles in task references
fn detect_circular_task_dependencies(manifest: &Manifest) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for task_name in manifest.tasks.keys() {
        let mut stack = Vec::new();
        check_task_cycle(manifest, task_name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Depth-first walk; `stack` holds the current reference chain
fn check_task_cycle(
    manifest: &Manifest,
    task_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    if let Some(start) = stack.iter().position(|t| t == task_name) {
        let mut chain = stack[start..].to_vec();
        chain.push(task_name.to_string());
        return Err(ConfigError::CircularDependency(chain.join(" -> ")));
    }

    if visited.contains(task_name) {
        return Ok(());
    }

    let task = manifest
        .tasks
        .get(task_name)
        .ok_or_else(|| ConfigError::TaskNotFound(task_name.to_string()))?;

    stack.push(task_name.to_string());
    for subtask in task.steps.iter().filter_map(|s| s.task.as_deref()) {
        check_task_cycle(manifest, subtask, visited, stack)?;
    }
    stack.pop();
    visited.insert(task_name.to_string());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::TaskSpec;

    fn exec(cmd: &str) -> StepSpec {
        StepSpec {
            exec: Some(cmd.to_string()),
            ..Default::default()
        }
    }

    fn spawn(task: &str) -> StepSpec {
        StepSpec {
            task: Some(task.to_string()),
            ..Default::default()
        }
    }

    fn manifest(tasks: Vec<(&str, Vec<StepSpec>)>) -> Manifest {
        let mut manifest = Manifest::default();
        for (name, steps) in tasks {
            manifest.tasks.insert(
                name.to_string(),
                TaskSpec {
                    name: name.to_string(),
                    steps,
                    ..Default::default()
                },
            );
        }
        manifest
    }

    #[test]
    fn test_validate_valid_manifest() {
        let m = manifest(vec![
            ("compile", vec![exec("tsc")]),
            ("build", vec![spawn("compile"), exec("echo done")]),
        ]);
        assert!(validate_manifest(&m).is_ok());
    }

    #[test]
    fn test_validate_step_with_both() {
        let step = StepSpec {
            exec: Some("make".to_string()),
            task: Some("build".to_string()),
            ..Default::default()
        };
        let m = manifest(vec![("bad", vec![step])]);
        let result = validate_manifest(&m);
        assert!(matches!(result, Err(ConfigError::InvalidStep { index: 0, .. })));
    }

    #[test]
    fn test_validate_step_with_neither() {
        let m = manifest(vec![("bad", vec![exec("ok"), StepSpec::default()])]);
        let result = validate_manifest(&m);
        assert!(matches!(result, Err(ConfigError::InvalidStep { index: 1, .. })));
    }

    #[test]
    fn test_validate_missing_reference() {
        let m = manifest(vec![("build", vec![spawn("ghost")])]);
        let result = validate_manifest(&m);
        assert!(matches!(result, Err(ConfigError::TaskNotFound(ref msg)) if msg.contains("ghost")));
    }

    #[test]
    fn test_detect_circular_dependency() {
        let m = manifest(vec![("a", vec![spawn("b")]), ("b", vec![spawn("a")])]);
        let result = validate_manifest(&m);
        assert!(matches!(
            result,
            Err(ConfigError::CircularDependency(ref chain)) if chain == "a -> b -> a"
        ));
    }

    #[test]
    fn test_shared_subtask_is_not_a_cycle() {
        let m = manifest(vec![
            ("lint", vec![exec("eslint .")]),
            ("check", vec![spawn("lint")]),
            ("ci", vec![spawn("lint"), spawn("check")]),
        ]);
        assert!(validate_manifest(&m).is_ok());
    }

    #[test]
    fn test_validate_env_names() {
        let mut m = manifest(vec![("build", vec![exec("make")])]);
        m.tasks
            .get_mut("build")
            .unwrap()
            .env
            .set("BUILD MODE", "release");

        let result = validate_manifest(&m);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(ref msg)) if msg.contains("BUILD MODE") && msg.contains("build")
        ));
    }

    #[test]
    fn test_validate_step_env_names() {
        let mut step = exec("make");
        step.env.set("1BAD", "x");
        let m = manifest(vec![("build", vec![step])]);
        assert!(matches!(validate_manifest(&m), Err(ConfigError::Invalid(_))));
    }
}
