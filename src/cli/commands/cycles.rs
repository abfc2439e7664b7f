use anyhow::Result;

use super::super::args::CyclesCommand;
use super::{
    CommandResult, CommandSummary, CyclesSummary,
    helper::{analyze_project, display_names, finish},
};

pub fn cycles(cmd: CyclesCommand) -> Result<CommandResult> {
    let (_, analysis) = analyze_project(&cmd.common)?;

    let cycles = analysis
        .graph
        .detect_cycles()
        .iter()
        .map(|cycle| display_names(&analysis.graph, cycle))
        .collect();

    Ok(finish(
        CommandSummary::Cycles(CyclesSummary { cycles }),
        analysis,
    ))
}
