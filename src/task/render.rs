//! Shell command rendering
//!
//! Flattens a task and every subtask it references into one grouped,
//! AND-chained shell command. Each rendered task is a self-contained
//! `( ... )` group, so it can be nested verbatim inside a parent.
//!
//! Command and condition text is opaque. It may end in a comment or a heredoc,
//! so every group closing over such text starts its `)` on a new line.
//!
//! The registry base environment is exported once, by the outermost task.
//! Nested tasks export only their own variables, on top of whatever the
//! calling step already exported.

use crate::error::{RenderError, RenderResult};
use crate::registry::TaskLookup;
use crate::task::env::quote_literal;
use crate::task::{EnvMap, Step, StepAction, Task};

/// Sequence emitted for a task without steps
const EMPTY_SEQUENCE: &str = "true";

/// Render `task` against `registry`
pub fn render(task: &Task, registry: &dyn TaskLookup) -> RenderResult<String> {
    RenderContext::new(registry).render_task(task)
}

/// State for a single render call
struct RenderContext<'a> {
    registry: &'a dyn TaskLookup,

    /// Tasks currently being rendered, outermost first
    task_stack: Vec<String>,
}

impl<'a> RenderContext<'a> {
    fn new(registry: &'a dyn TaskLookup) -> Self {
        RenderContext {
            registry,
            task_stack: Vec::new(),
        }
    }

    fn is_task_in_stack(&self, name: &str) -> bool {
        self.task_stack.iter().any(|t| t == name)
    }

    fn cycle_through(&self, name: &str) -> String {
        let start = self
            .task_stack
            .iter()
            .position(|t| t == name)
            .unwrap_or(0);
        let mut chain: Vec<&str> = self.task_stack[start..].iter().map(String::as_str).collect();
        chain.push(name);
        chain.join(" -> ")
    }

    fn render_task(&mut self, task: &Task) -> RenderResult<String> {
        if self.is_task_in_stack(task.name()) {
            return Err(RenderError::CircularReference(self.cycle_through(task.name())));
        }

        self.task_stack.push(task.name().to_string());
        let sequence = self.render_steps(task.step_slice());
        self.task_stack.pop();
        let sequence = sequence?;

        let gated = match &task.condition {
            Some(condition) => format!("! ( {}\n) || ( {} )", condition, sequence),
            None => sequence,
        };

        let env = if self.task_stack.is_empty() {
            EnvMap::merged(self.registry.env(), task.env_vars())
        } else {
            task.env_vars().clone()
        };
        Ok(format!("( {}{} )", assignments(&env)?, gated))
    }

    fn render_steps(&mut self, steps: &[Step]) -> RenderResult<String> {
        if steps.is_empty() {
            return Ok(EMPTY_SEQUENCE.to_string());
        }

        let fragments = steps
            .iter()
            .map(|step| self.render_step(step))
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(fragments.join(" && "))
    }

    fn render_step(&mut self, step: &Step) -> RenderResult<String> {
        let mut parts = Vec::new();

        if let Some(cwd) = step.cwd() {
            parts.push(format!("cd {}", quote_literal(cwd)));
        }

        if let Some(name) = step.name() {
            parts.push(format!("echo {}", quote_literal(name)));
        }

        let close = match step.action() {
            StepAction::Exec(command) => {
                parts.push(command.clone());
                "\n)"
            }
            StepAction::ExecTask(name) => {
                let registry = self.registry;
                let subtask = registry
                    .try_find(name)
                    .ok_or_else(|| RenderError::UnknownTask(name.clone()))?;
                parts.push(format!("( {} )", self.render_task(subtask)?));
                " )"
            }
        };

        Ok(format!(
            "( {}{}{}",
            assignments(step.env())?,
            parts.join(" && "),
            close
        ))
    }
}

/// `export` assignments followed by a space, or nothing for an empty map
fn assignments(env: &EnvMap) -> RenderResult<String> {
    if let Some(name) = env.invalid_name() {
        return Err(RenderError::InvalidEnvName(name.to_string()));
    }
    if env.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{} ", env.to_assignments()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Tasks;
    use crate::task::{StepOptions, TaskOptions};

    #[test]
    fn test_render_single_step_with_env() {
        let mut tasks = Tasks::new();
        let build = tasks.add_task("build", TaskOptions::default()).unwrap();
        build.exec("npm run compile", StepOptions::default());
        build.env("FOO", "bar");

        let rendered = tasks.render("build").unwrap();
        assert_eq!(rendered, "( export FOO=\"bar\"; ( npm run compile\n) )");
    }

    #[test]
    fn test_render_and_chain_in_order() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("ci", TaskOptions::default()).unwrap();
        task.exec("lint", StepOptions::default());
        task.exec("test", StepOptions::default());
        task.prepend("install", StepOptions::default());

        assert_eq!(
            tasks.render("ci").unwrap(),
            "( ( install\n) && ( lint\n) && ( test\n) )"
        );
    }

    #[test]
    fn test_render_empty_task() {
        let mut tasks = Tasks::new();
        tasks.add_task("noop", TaskOptions::default()).unwrap();
        assert_eq!(tasks.render("noop").unwrap(), "( true )");
    }

    #[test]
    fn test_render_condition_gate() {
        let mut tasks = Tasks::new();
        let task = tasks
            .add_task(
                "deploy",
                TaskOptions {
                    condition: Some("test -n \"$CI\"".to_string()),
                    exec: Some("./deploy.sh".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        task.exec("echo done", StepOptions::default());

        assert_eq!(
            tasks.render("deploy").unwrap(),
            "( ! ( test -n \"$CI\"\n) || ( ( ./deploy.sh\n) && ( echo done\n) ) )"
        );
    }

    #[test]
    fn test_render_step_name_and_cwd() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("docs", TaskOptions::default()).unwrap();
        task.exec("make html", StepOptions::named("Building docs").with_cwd("docs"));

        assert_eq!(
            tasks.render("docs").unwrap(),
            "( ( cd \"docs\" && echo \"Building docs\" && make html\n) )"
        );
    }

    #[test]
    fn test_render_step_env_is_local() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("test", TaskOptions::default()).unwrap();
        task.exec("cargo test", StepOptions::default().with_env("RUST_LOG", "debug"));
        task.exec("cargo doc", StepOptions::default());

        assert_eq!(
            tasks.render("test").unwrap(),
            "( ( export RUST_LOG=\"debug\"; cargo test\n) && ( cargo doc\n) )"
        );
    }

    #[test]
    fn test_render_nested_subtask() {
        let mut tasks = Tasks::new();
        tasks
            .add_task(
                "compile",
                TaskOptions {
                    exec: Some("tsc".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let build = tasks.add_task("build", TaskOptions::default()).unwrap();
        build.exec_task_named("compile", StepOptions::default());
        build.exec("echo built", StepOptions::default());

        let compile = tasks.render("compile").unwrap();
        let build = tasks.render("build").unwrap();
        assert_eq!(compile, "( ( tsc\n) )");
        assert_eq!(build, format!("( ( ( {} ) ) && ( echo built\n) )", compile));
    }

    #[test]
    fn test_render_registry_env_layering() {
        let mut tasks = Tasks::new();
        tasks.add_env("CI", "1");
        tasks.add_env("MODE", "dev");
        let task = tasks.add_task("build", TaskOptions::default()).unwrap();
        task.env("MODE", "prod");
        task.exec("make", StepOptions::default());

        assert_eq!(
            tasks.render("build").unwrap(),
            "( export CI=\"1\"; export MODE=\"prod\"; ( make\n) )"
        );
    }

    #[test]
    fn test_render_unknown_subtask() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("build", TaskOptions::default()).unwrap();
        task.exec("echo before", StepOptions::default());
        task.exec_task_named("missing", StepOptions::default());

        let err = tasks.render("build").unwrap_err();
        assert_eq!(err, RenderError::UnknownTask("missing".to_string()));
    }

    #[test]
    fn test_render_self_reference() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("loop", TaskOptions::default()).unwrap();
        task.exec_task_named("loop", StepOptions::default());

        let err = tasks.render("loop").unwrap_err();
        assert_eq!(err, RenderError::CircularReference("loop -> loop".to_string()));
    }

    #[test]
    fn test_render_indirect_cycle() {
        let mut tasks = Tasks::new();
        tasks
            .add_task("root", TaskOptions::default())
            .unwrap()
            .exec_task_named("a", StepOptions::default());
        tasks
            .add_task("a", TaskOptions::default())
            .unwrap()
            .exec_task_named("b", StepOptions::default());
        tasks
            .add_task("b", TaskOptions::default())
            .unwrap()
            .exec_task_named("a", StepOptions::default());

        let err = tasks.render("root").unwrap_err();
        assert_eq!(err, RenderError::CircularReference("a -> b -> a".to_string()));
    }

    #[test]
    fn test_render_diamond_is_allowed() {
        let mut tasks = Tasks::new();
        tasks
            .add_task(
                "shared",
                TaskOptions {
                    exec: Some("echo shared".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let top = tasks.add_task("top", TaskOptions::default()).unwrap();
        top.exec_task_named("shared", StepOptions::default());
        top.exec_task_named("shared", StepOptions::default());

        let rendered = tasks.render("top").unwrap();
        assert_eq!(rendered.matches("echo shared").count(), 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut tasks = Tasks::new();
        tasks.add_env("B", "2");
        tasks.add_env("A", "1");
        let task = tasks.add_task("t", TaskOptions::default()).unwrap();
        task.env("Z", "26");
        task.exec("true", StepOptions::default());

        assert_eq!(tasks.render("t").unwrap(), tasks.render("t").unwrap());
    }

    #[test]
    fn test_render_closes_groups_on_new_line() {
        let mut tasks = Tasks::new();
        let task = tasks
            .add_task(
                "greet",
                TaskOptions {
                    condition: Some("true # always".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        task.exec("echo hi # say hi", StepOptions::default());

        assert_eq!(
            tasks.render("greet").unwrap(),
            "( ! ( true # always\n) || ( ( echo hi # say hi\n) ) )"
        );
    }

    #[test]
    fn test_render_base_env_exported_once() {
        let mut tasks = Tasks::new();
        tasks.add_env("MODE", "base");
        let sub = tasks.add_task("sub", TaskOptions::default()).unwrap();
        sub.env("SUB_ONLY", "1");
        sub.exec("echo $MODE", StepOptions::default());
        tasks
            .add_task("top", TaskOptions::default())
            .unwrap()
            .exec_task_named("sub", StepOptions::default().with_env("MODE", "step"));

        assert_eq!(
            tasks.render("top").unwrap(),
            "( export MODE=\"base\"; ( export MODE=\"step\"; \
             ( ( export SUB_ONLY=\"1\"; ( echo $MODE\n) ) ) ) )"
        );
        assert_eq!(
            tasks.render("sub").unwrap(),
            "( export MODE=\"base\"; export SUB_ONLY=\"1\"; ( echo $MODE\n) )"
        );
    }

    #[test]
    fn test_render_rejects_invalid_env_name() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("bad", TaskOptions::default()).unwrap();
        task.env("MY VAR", "x");
        task.exec("true", StepOptions::default());

        assert_eq!(
            tasks.render("bad"),
            Err(RenderError::InvalidEnvName("MY VAR".to_string()))
        );
    }

    #[test]
    fn test_render_rejects_invalid_step_env_name() {
        let mut tasks = Tasks::new();
        let task = tasks.add_task("bad", TaskOptions::default()).unwrap();
        task.exec("true", StepOptions::default().with_env("A-B", "x"));

        assert_eq!(
            tasks.render("bad"),
            Err(RenderError::InvalidEnvName("A-B".to_string()))
        );
    }
}
