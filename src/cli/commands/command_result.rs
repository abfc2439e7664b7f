use std::path::PathBuf;

use crate::issues::Issue;

#[derive(Debug)]
pub enum CommandSummary {
    Analyze(AnalyzeSummary),
    Cycles(CyclesSummary),
    Chain(ChainSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct AnalyzeSummary {
    /// Rendered graph; empty when written to `output_path`.
    pub rendered: String,
    pub output_path: Option<PathBuf>,
    pub node_count: usize,
    pub edge_count: usize,
}

#[derive(Debug)]
pub struct CyclesSummary {
    /// Each cycle as display names, in traversal order.
    pub cycles: Vec<Vec<String>>,
}

#[derive(Debug)]
pub struct ChainSummary {
    pub template: String,
    /// Display names in visitation order, starting with the template itself;
    /// `None` when no template matched.
    pub chain: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running a hugo-deps command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// Diagnostics from the analysis, sorted.
    pub issues: Vec<Issue>,
    /// Problems found in the site configuration's module section.
    pub config_warnings: Vec<String>,
    /// Number of template files parsed.
    pub templates_analyzed: usize,
}

impl CommandResult {
    /// Whether the command's own finding should fail the run, independent of
    /// diagnostics: any cycle for `cycles`, an unknown template for `chain`.
    pub fn has_findings(&self) -> bool {
        match &self.summary {
            CommandSummary::Cycles(summary) => !summary.cycles.is_empty(),
            CommandSummary::Chain(summary) => summary.chain.is_none(),
            CommandSummary::Init(summary) => summary.error.is_some(),
            CommandSummary::Analyze(_) => false,
        }
    }
}
