//! `flotilla vet` - validate the project configuration

use std::path::Path;

use anyhow::{bail, Result};

use flotilla::validate;

use crate::commands;
use crate::ui;

pub fn run(project: &Path, json: bool) -> Result<()> {
    let env = commands::load_environment(project)?;

    let (_, warnings) = env.applications_with_warnings()?;
    ui::print_descriptor_warnings(&warnings);

    let issues = validate::validate(&env)?;

    let mut fatal = false;
    for issue in &issues {
        fatal = fatal || issue.is_fatal();
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "severity": if issue.is_fatal() { "fatal" } else { "advisory" },
                    "description": issue.description,
                })
            );
        } else {
            ui::print_issue(issue);
        }
    }

    if fatal {
        bail!("found fatal configuration errors");
    }
    if !json && issues.is_empty() {
        ui::info("no issues found");
    }
    Ok(())
}
