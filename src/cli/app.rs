//! Main CLI application

use crate::config::{load_env_file, parse_manifest_auto, parse_manifest_file, validate_manifest};
use crate::config::{Manifest, TaskCategory};
use crate::registry::{TaskLookup, Tasks};
use crate::task::Task;
use crate::ui::{Ui, Verbosity};
use anyhow::{Context as _, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// CLI application
pub struct App {
    /// Loaded task registry
    tasks: Tasks,
    /// Manifest file path
    manifest_path: PathBuf,
    ui: Ui,
}

impl App {
    /// Load the manifest, validate it and build the registry
    pub fn load(manifest_path: Option<PathBuf>, env_file: Option<&Path>, ui: Ui) -> Result<Self> {
        let (manifest, manifest_path) = match manifest_path {
            Some(path) => {
                let manifest = parse_manifest_file(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                (manifest, path)
            }
            None => parse_manifest_auto()?,
        };
        ui.debug(&format!("Using manifest {}", manifest_path.display()));

        validate_manifest(&manifest)
            .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

        let mut tasks = Tasks::from_manifest(manifest)?;

        if let Some(env_file) = env_file {
            let vars = load_env_file(env_file)?;
            for (name, _) in vars.iter() {
                if tasks.env().contains_key(name) {
                    ui.warn(&format!(
                        "{} overrides manifest env '{}'",
                        env_file.display(),
                        name
                    ));
                }
            }
            ui.debug(&format!(
                "Loaded {} variables from {}",
                vars.len(),
                env_file.display()
            ));
            tasks.extend_env(vars.iter());
        }

        Ok(App {
            tasks,
            manifest_path,
            ui,
        })
    }

    /// Dispatch a parsed subcommand
    pub fn run(&self, subcommand: &str, matches: &ArgMatches) -> Result<()> {
        match subcommand {
            "list" => {
                self.list();
                Ok(())
            }
            "render" => {
                let name = required_task(matches)?;
                self.ui.debug(&format!("Rendering task: {}", name));
                let command = self
                    .tasks
                    .render(name)
                    .with_context(|| format!("failed to render task '{}'", name))?;
                println!("{}", command);
                Ok(())
            }
            "spec" => self.spec(matches.get_one::<String>("task").map(String::as_str)),
            other => anyhow::bail!("unknown command '{}'", other),
        }
    }

    /// Print tasks grouped by category
    fn list(&self) {
        let mut groups: BTreeMap<Option<TaskCategory>, Vec<&Task>> = BTreeMap::new();
        for task in self.tasks.all() {
            groups.entry(task.category).or_default().push(task);
        }

        if groups.is_empty() {
            self.ui
                .info(&format!("No tasks defined in {}", self.manifest_path.display()));
            return;
        }

        // Uncategorised tasks sort first as `None`; print them last
        let (uncategorised, categorised): (Vec<_>, Vec<_>) =
            groups.into_iter().partition(|(category, _)| category.is_none());
        for (category, tasks) in categorised.into_iter().chain(uncategorised) {
            let heading = category.map_or("other", |c| c.label());
            println!("{}:", heading);
            for task in tasks {
                match &task.description {
                    Some(desc) => println!("  {:<20} {}", task.name(), desc),
                    None => println!("  {}", task.name()),
                }
            }
        }
    }

    /// Print the structured export of one task, or of the whole manifest
    fn spec(&self, name: Option<&str>) -> Result<()> {
        let yaml = match name {
            Some(name) => {
                let task = self
                    .tasks
                    .try_find(name)
                    .ok_or_else(|| anyhow::anyhow!("task '{}' is not defined", name))?;
                serde_yaml::to_string(&task.to_spec())?
            }
            None => {
                let manifest: Manifest = self.tasks.to_manifest();
                serde_yaml::to_string(&manifest)?
            }
        };
        print!("{}", yaml);
        Ok(())
    }
}

fn required_task(matches: &ArgMatches) -> Result<&str> {
    matches
        .get_one::<String>("task")
        .map(String::as_str)
        .context("missing task name")
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("taskweave")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compose project tasks and render them into shell commands")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to taskweave.yml manifest")
                .global(true),
        )
        .arg(
            Arg::new("env-file")
                .short('e')
                .long("env-file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Load base environment variables from a dotenv file")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print results and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no status output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("list").about("List tasks grouped by category"))
        .subcommand(
            Command::new("render")
                .about("Print the shell command for a task")
                .arg(Arg::new("task").required(true).value_name("TASK")),
        )
        .subcommand(
            Command::new("spec")
                .about("Print the structured export of a task, or of every task")
                .arg(Arg::new("task").value_name("TASK")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    run_from(std::env::args_os())
}

/// Run the CLI application with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let ui = Ui::new(get_verbosity(&matches));

    let (subcommand, sub_matches) = matches
        .subcommand()
        .context("no command given")?;

    if subcommand == "completions" {
        if let Some(shell) = sub_matches.get_one::<Shell>("shell") {
            let mut cmd = build_command();
            clap_complete::generate(*shell, &mut cmd, "taskweave", &mut io::stdout());
        }
        return Ok(());
    }

    let app = App::load(
        matches.get_one::<PathBuf>("file").cloned(),
        matches.get_one::<PathBuf>("env-file").map(PathBuf::as_path),
        ui,
    )?;
    app.run(subcommand, sub_matches)
}
