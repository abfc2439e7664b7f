use anyhow::Result;

use super::super::args::ChainCommand;
use super::{
    ChainSummary, CommandResult, CommandSummary,
    helper::{analyze_project, display_names, finish},
};

pub fn chain(cmd: ChainCommand) -> Result<CommandResult> {
    let (project_root, analysis) = analyze_project(&cmd.common)?;

    let chain = analysis
        .find_template(&cmd.template, &project_root)
        .map(|template| {
            let ids = analysis.graph.dependency_chain(&template.node_id());
            display_names(&analysis.graph, &ids)
        });

    let summary = ChainSummary {
        template: cmd.template,
        chain,
    };

    Ok(finish(CommandSummary::Chain(summary), analysis))
}
