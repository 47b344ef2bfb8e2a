//! Terminal output helpers
//!
//! All human-facing output of the CLI goes through here. Styling is
//! applied only when the stream is a terminal; `--json` callers bypass
//! this module entirely.

use std::path::Path;

use is_terminal::IsTerminal;

use crossterm::style::Stylize;

use flotilla::environment::DescriptorWarning;
use flotilla::validate::{Issue, Severity};
use flotilla::FailureReport;

fn color_enabled() -> bool {
    std::io::stdout().is_terminal()
}

pub fn info(message: impl AsRef<str>) {
    println!("{}", message.as_ref());
}

pub fn warn(message: impl AsRef<str>) {
    if color_enabled() {
        eprintln!("{} {}", "warning:".yellow().bold(), message.as_ref());
    } else {
        eprintln!("warning: {}", message.as_ref());
    }
}

pub fn error(message: impl AsRef<str>) {
    if color_enabled() {
        eprintln!("{} {}", "error:".red().bold(), message.as_ref());
    } else {
        eprintln!("error: {}", message.as_ref());
    }
}

/// Render a validation issue with its severity tag
pub fn print_issue(issue: &Issue) {
    if !color_enabled() {
        println!("{issue}");
        return;
    }
    match issue.severity {
        Severity::Fatal => println!("{} {}", "[ERROR]".red().bold(), issue.description),
        Severity::Advisory => println!("{} {}", "[WARN]".yellow(), issue.description),
    }
}

/// Warn about unknown descriptor keys, with a suggestion when one is close
pub fn print_descriptor_warnings(warnings: &[DescriptorWarning]) {
    for warning in warnings {
        warn(format!(
            "unknown key '{}' in {}",
            warning.key,
            warning.file.display()
        ));
        if let Some(suggestion) = &warning.suggestion {
            eprintln!("  did you mean '{suggestion}'?");
        }
    }
}

/// Render every collected per-unit failure
pub fn print_failure_report(report: &FailureReport) {
    for failure in report.failures() {
        error(format!("{}: {}", failure.unit, failure.error));
    }
}

/// One status line for a node: `host (node name) is up/down`
pub fn print_node_status(name: &str, host: &str, reachable: bool) {
    let status: String = if !color_enabled() {
        if reachable { "up" } else { "down" }.to_string()
    } else if reachable {
        "up".green().to_string()
    } else {
        "down".red().bold().to_string()
    };
    println!("host {host} (node {name}) is {status}");
}

/// One status line for an application's placements
///
/// Each target renders as `+node` (deployment recorded) or `-node`.
pub fn print_app_status(app: &str, placements: &[(String, bool)]) {
    let mut line = format!("{app}:");
    for (node, deployed) in placements {
        let mark = format!(" {}{}", if *deployed { "+" } else { "-" }, node);
        if !color_enabled() {
            line.push_str(&mark);
        } else if *deployed {
            line.push_str(&mark.green().to_string());
        } else {
            line.push_str(&mark.red().to_string());
        }
    }
    println!("{line}");
}

pub fn print_created(path: &Path) {
    info(format!("created {}", path.display()));
}
