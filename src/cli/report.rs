//! Report formatting and printing utilities.
//!
//! Command output (the graph, cycles, chains) goes to stdout; diagnostics
//! and summaries go to stderr in cargo style so the output can be piped.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    AnalyzeSummary, ChainSummary, CommandResult, CommandSummary, CyclesSummary, InitSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stderr.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stderr().lock());
}

/// Print issues to a custom writer.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    let max_line_width = calculate_max_line_width(&sorted);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no issues are found.
pub fn print_success_to<W: Write>(templates: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Analyzed {} {} - no issues found",
            templates,
            if templates == 1 { "template" } else { "templates" }
        )
        .green()
    );
}

/// Print site configuration warnings.
pub fn print_config_warnings_to<W: Write>(warnings: &[String], writer: &mut W) {
    for warning in warnings {
        let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), warning);
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let (file_path, line, col, source_line) = extract_location_info(&loc);

    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    // Source issues name the offending reference; quote it like cargo does.
    let message = match loc {
        ReportLocation::Source(_) => format!("\"{}\"", issue.message()),
        _ => issue.message(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        message,
        issue.report_rule().to_string().dimmed().cyan()
    );

    if line > 0 {
        let _ = writeln!(writer, "  {} {}:{}:{}", "-->".blue(), file_path, line, col);
    } else {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), file_path);
    }

    if let Some(source_line) = source_line {
        let caret_char = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based
        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} {} ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        if issues.len() == 1 { "problem" } else { "problems" },
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

fn extract_location_info<'a>(
    loc: &'a ReportLocation<'a>,
) -> (&'a str, usize, usize, Option<&'a str>) {
    match loc {
        ReportLocation::Source(ctx) => (
            ctx.file_path(),
            ctx.line(),
            ctx.col(),
            Some(&ctx.source_line),
        ),
        ReportLocation::File { path } | ReportLocation::Module { path } => (path, 0, 0, None),
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line()),
            _ => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

// ============================================================
// Command Output
// ============================================================

pub fn print(result: &CommandResult, verbose: bool, quiet: bool) {
    print_to(
        result,
        verbose,
        quiet,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
}

/// Print a command result: command output to `out`, diagnostics to `err`.
pub fn print_to<O: Write, E: Write>(
    result: &CommandResult,
    verbose: bool,
    quiet: bool,
    out: &mut O,
    err: &mut E,
) {
    match &result.summary {
        CommandSummary::Analyze(summary) => print_analyze(summary, quiet, out, err),
        CommandSummary::Cycles(summary) => print_cycles(summary, quiet, out, err),
        CommandSummary::Chain(summary) => print_chain(summary, out, err),
        CommandSummary::Init(summary) => {
            print_init(summary, out, err);
            return;
        }
    }

    if quiet {
        return;
    }

    print_config_warnings_to(&result.config_warnings, err);
    report_to(&result.issues, err);

    if result.issues.is_empty() {
        print_success_to(result.templates_analyzed, err);
    } else if verbose {
        let _ = writeln!(
            err,
            "{} {} templates analyzed",
            "note:".bold(),
            result.templates_analyzed
        );
    }
}

fn print_analyze<O: Write, E: Write>(
    summary: &AnalyzeSummary,
    quiet: bool,
    out: &mut O,
    err: &mut E,
) {
    match &summary.output_path {
        Some(path) => {
            if !quiet {
                let _ = writeln!(
                    err,
                    "{} {}",
                    SUCCESS_MARK.green(),
                    format!(
                        "Wrote graph ({} nodes, {} edges) to {}",
                        summary.node_count,
                        summary.edge_count,
                        path.display()
                    )
                    .green()
                );
            }
        }
        None => {
            let _ = write!(out, "{}", summary.rendered);
        }
    }
}

fn print_cycles<O: Write, E: Write>(
    summary: &CyclesSummary,
    quiet: bool,
    out: &mut O,
    err: &mut E,
) {
    if summary.cycles.is_empty() {
        if !quiet {
            let _ = writeln!(err, "{} {}", SUCCESS_MARK.green(), "No cycles found".green());
        }
        return;
    }

    for (i, cycle) in summary.cycles.iter().enumerate() {
        // Close the loop back to the first node.
        let mut path = cycle.clone();
        if let Some(first) = cycle.first() {
            path.push(first.clone());
        }
        let _ = writeln!(out, "cycle {}: {}", i + 1, path.join(" -> "));
    }

    if !quiet {
        let _ = writeln!(
            err,
            "{} {} {} found",
            FAILURE_MARK.red(),
            summary.cycles.len(),
            if summary.cycles.len() == 1 { "cycle" } else { "cycles" }
        );
    }
}

fn print_chain<O: Write, E: Write>(summary: &ChainSummary, out: &mut O, err: &mut E) {
    let Some(chain) = &summary.chain else {
        let _ = writeln!(
            err,
            "{}: no template matches \"{}\"",
            "error".bold().red(),
            summary.template
        );
        return;
    };

    for (i, name) in chain.iter().enumerate() {
        if i == 0 {
            let _ = writeln!(out, "{}", name);
        } else {
            let _ = writeln!(out, "  {}", name);
        }
    }
}

fn print_init<O: Write, E: Write>(summary: &InitSummary, out: &mut O, err: &mut E) {
    if let Some(error) = &summary.error {
        let _ = writeln!(err, "Error: {}", error);
    } else if summary.created {
        let _ = writeln!(
            out,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    }
}

// ============================================================
// Tests
// ============================================================
