use std::fs;

use anyhow::{Context, Result};

use super::super::args::AnalyzeCommand;
use super::{
    AnalyzeSummary, CommandResult, CommandSummary,
    helper::{analyze_project, finish},
};
use crate::output::render;

pub fn analyze(cmd: AnalyzeCommand) -> Result<CommandResult> {
    let (project_root, analysis) = analyze_project(&cmd.common)?;
    let rendered = render(cmd.format, &analysis.graph, &project_root)?;

    let rendered = match &cmd.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            String::new()
        }
        None => rendered,
    };

    let summary = AnalyzeSummary {
        rendered,
        output_path: cmd.output,
        node_count: analysis.graph.node_count(),
        edge_count: analysis.graph.edge_count(),
    };

    Ok(finish(CommandSummary::Analyze(summary), analysis))
}
