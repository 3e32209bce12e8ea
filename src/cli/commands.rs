//! Command dispatch

use std::env;
use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ChartDocument, RenderOptions};
use crate::cli::args::{ChartArgs, Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::NodeId;
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `orgchart --help`".to_string(),
        ));
    };

    match command {
        Commands::Show {
            chart,
            collapse,
            attributes,
            no_counts,
        } => cmd_show(&container(cli)?, chart, collapse, attributes, *no_counts),
        Commands::Move {
            chart,
            moved,
            target,
            then,
            format,
        } => cmd_move(&container(cli)?, chart, moved, target, then, *format),
        Commands::Check { chart } => cmd_check(&container(cli)?, chart),
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => env::current_dir()
            .map_err(|e| InfraError::io("resolve current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    Ok(Settings::load(Some(&dir))?)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

/// Parse `MOVED:TARGET`.
pub fn parse_move(spec: &str) -> CliResult<(NodeId, NodeId)> {
    match spec.split_once(':') {
        Some((moved, target)) if !moved.trim().is_empty() && !target.trim().is_empty() => {
            Ok((NodeId::from_input(moved), NodeId::from_input(target)))
        }
        _ => Err(CliError::InvalidArgs(format!(
            "expected MOVED:TARGET, got '{}'",
            spec
        ))),
    }
}

#[instrument(skip(container))]
fn cmd_show(
    container: &ServiceContainer,
    chart: &ChartArgs,
    collapse: &[String],
    attributes: &[String],
    no_counts: bool,
) -> CliResult<()> {
    let mut options = RenderOptions::from(&container.settings.render);
    if !attributes.is_empty() {
        options.attributes = attributes.to_vec();
    }
    if no_counts {
        options.show_counts = false;
    }

    let mut service = container
        .chart_service(chart.file.as_deref())?
        .with_render_options(options);
    for id in collapse {
        let id = NodeId::from_input(id);
        if !service.tree().contains(&id) {
            output::warning(&format!("unknown node {}, not collapsed", id));
            continue;
        }
        service.collapse(&id);
    }

    output::info(&service.render());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_move(
    container: &ServiceContainer,
    chart: &ChartArgs,
    moved: &str,
    target: &str,
    then: &[String],
    format: OutputFormat,
) -> CliResult<()> {
    let mut moves = vec![(NodeId::from_input(moved), NodeId::from_input(target))];
    for spec in then {
        moves.push(parse_move(spec)?);
    }

    let mut service = container.chart_service(chart.file.as_deref())?;
    let applied = service.move_nodes(moves)?;
    info!("applied {} move(s)", applied);

    match format {
        OutputFormat::Tree => output::info(&service.render()),
        OutputFormat::Toml => {
            let text = ChartDocument::from_tree(service.tree())
                .to_toml()
                .map_err(|source| ApplicationError::Serialize {
                    context: "chart".to_string(),
                    source,
                })?;
            output::info(&text);
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_check(container: &ServiceContainer, chart: &ChartArgs) -> CliResult<()> {
    let path = container.resolve_chart_path(chart.file.as_deref())?;
    let tree = container.chart_loader().load(&path)?;
    tree.check_invariants()?;

    output::success(&format!(
        "{}: {} nodes, depth {}, root {}",
        path.display(),
        tree.len(),
        tree.depth(),
        tree.root_id()
    ));
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let dir = config_dir(cli)?;
            output::header("Config files (lowest precedence first)");
            match global_config_path() {
                Some(path) => output::detail(&describe_path("global", &path)),
                None => output::detail("global: <no config directory on this platform>"),
            }
            output::detail(&describe_path("local", &local_config_path(&dir)));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn describe_path(label: &str, path: &std::path::Path) -> String {
    let state = if path.exists() { "found" } else { "missing" };
    format!("{}: {} ({})", label, path.display(), state)
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    debug!("generating completions for {:?}", shell);
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
