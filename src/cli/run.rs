use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, analyze::analyze, chain::chain, cycles::cycles, init::init},
};

/// Dispatch to the command handler.
///
/// `Err` means the command could not run at all (configuration error,
/// unreadable project); problems found while analyzing are in the result.
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Analyze(cmd)) => analyze(cmd),
        Some(Command::Cycles(cmd)) => cycles(cmd),
        Some(Command::Chain(cmd)) => chain(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
