//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `analyze`: Build the dependency graph and print it
//! - `cycles`: Report circular include chains
//! - `chain`: Print everything a template pulls in
//! - `init`: Initialize the configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::{core::AnalysisOptions, output::OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "hugo-deps", author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Analyze(cmd)) => Some(&cmd.common),
            Some(Command::Cycles(cmd)) => Some(&cmd.common),
            Some(Command::Chain(cmd)) => Some(&cmd.common),
            Some(Command::Init) | None => None,
        }
    }

    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|c| c.verbose)
    }

    pub fn quiet(&self) -> bool {
        self.common().is_some_and(|c| c.quiet)
    }

    pub fn debug(&self) -> bool {
        self.common().is_some_and(|c| c.debug)
    }
}

/// Arguments shared by every analysis command.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Hugo project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Skip module imports; analyze local templates only
    #[arg(long)]
    pub no_modules: bool,

    /// Ignore files matching this glob (repeatable, added to config file ignores)
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignores: Vec<String>,

    /// Hugo cache root for module lookup (overrides config and environment)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Read the site configuration through `hugo config`
    #[arg(long)]
    pub hugo: bool,

    /// Only print the requested output; suppress diagnostics
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit debug tracing to stderr
    #[arg(long)]
    pub debug: bool,
}

impl CommonArgs {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            project_root: Some(self.path.clone()),
            include_modules: self.no_modules.then_some(false),
            ignores: self.ignores.clone(),
            cache_dir: self.cache_dir.clone(),
            use_hugo: self.hugo,
            verbose: self.verbose,
        }
    }
}

#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write the graph to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CyclesCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ChainCommand {
    /// Template node id, display name (e.g. `_partials/header.html`) or alias
    pub template: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the template dependency graph and print it
    Analyze(AnalyzeCommand),
    /// Report circular include chains
    Cycles(CyclesCommand),
    /// Print the include chain starting at a template
    Chain(ChainCommand),
    /// Initialize a new .hugodepsrc.json configuration file
    Init,
}
