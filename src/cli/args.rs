//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Organizational chart: show the hierarchy, collapse branches, move people between managers
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding .orgchart.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the chart as a tree
    Show {
        #[command(flatten)]
        chart: ChartArgs,

        /// Collapse node (repeatable)
        #[arg(long, value_name = "ID")]
        collapse: Vec<String>,

        /// Attribute to show after names (repeatable, replaces configured list)
        #[arg(long = "attr", value_name = "NAME")]
        attributes: Vec<String>,

        /// Hide subordinate counts
        #[arg(long)]
        no_counts: bool,
    },

    /// Move a node under a new manager and print the result
    Move {
        #[command(flatten)]
        chart: ChartArgs,

        /// Node to move
        moved: String,

        /// New manager
        target: String,

        /// Further moves applied afterwards, as MOVED:TARGET (repeatable)
        #[arg(long, value_name = "MOVED:TARGET")]
        then: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },

    /// Validate a chart file
    Check {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChartArgs {
    /// Chart file (TOML); falls back to chart_file from config
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings
    Show,
    /// Print config file locations
    Path,
    /// Print a commented config template
    Template,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree
    Tree,
    /// Chart document, loadable again with --file
    Toml,
}
