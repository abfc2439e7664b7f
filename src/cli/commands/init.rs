use std::{fs, path::Path};

use anyhow::Result;

use super::{CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init() -> Result<CommandResult> {
    let config_path = Path::new(CONFIG_FILE_NAME);

    let summary = if config_path.exists() {
        InitSummary {
            created: false,
            error: Some(format!("{} already exists", CONFIG_FILE_NAME)),
        }
    } else {
        fs::write(config_path, default_config_json()?)?;
        InitSummary {
            created: true,
            error: None,
        }
    };

    Ok(CommandResult {
        summary: CommandSummary::Init(summary),
        error_count: 0,
        warning_count: 0,
        issues: Vec::new(),
        config_warnings: Vec::new(),
        templates_analyzed: 0,
    })
}
