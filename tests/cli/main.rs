use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod analyze;
mod chain;
mod cycles;
mod init;

const BIN_NAME: &str = "hugo-deps";

/// A temporary Hugo project driven through the built binary.
pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        // Keeps config discovery inside the project.
        fs::create_dir(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let test = Self::new()?;
        for (path, content) in files {
            test.write_file(path, content)?;
        }
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd.env("HUGO_CACHEDIR", self.project_dir.join(".cache"));
        cmd
    }

    pub fn analyze_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("analyze");
        cmd
    }

    pub fn cycles_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("cycles");
        cmd
    }

    pub fn chain_command(&self, template: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("chain").arg(template);
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }
}

/// Captured stdout, stderr and exit code of one run.
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

pub fn run(cmd: &mut Command) -> Result<RunResult> {
    let Output {
        status,
        stdout,
        stderr,
    } = cmd.output().context("Failed to run hugo-deps")?;
    Ok(RunResult {
        stdout: String::from_utf8(stdout)?,
        stderr: String::from_utf8(stderr)?,
        code: status.code(),
    })
}
