use std::path::PathBuf;

use anyhow::Result;

use super::{CommandResult, CommandSummary};
use crate::{
    cli::args::CommonArgs,
    core::{Analysis, AnalysisContext, DependencyGraph},
    issues::Severity,
};

/// Configure and run the pipeline; returns the canonical project root with
/// the results.
pub fn analyze_project(common: &CommonArgs) -> Result<(PathBuf, Analysis)> {
    let ctx = AnalysisContext::new(common.analysis_options())?;
    let project_root = ctx.project_root.clone();
    Ok((project_root, ctx.into_analysis()))
}

pub fn finish(summary: CommandSummary, analysis: Analysis) -> CommandResult {
    let Analysis {
        templates,
        mut issues,
        config_warnings,
        ..
    } = analysis;

    issues.sort();

    let error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    CommandResult {
        summary,
        error_count,
        warning_count,
        issues,
        config_warnings,
        templates_analyzed: templates.len(),
    }
}

/// Map node ids to display names; unknown ids are kept as-is.
pub fn display_names(graph: &DependencyGraph, ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            graph
                .node(id)
                .map_or_else(|| id.clone(), |node| node.display_name.clone())
        })
        .collect()
}
