//! `flotilla deploy` - deploy applications to their resolved target nodes

use std::path::Path;

use anyhow::{bail, Result};

use flotilla::{deploy, selector, DockerCli, Environment, FailureReport, LockState};

use crate::commands;
use crate::ui;

pub fn run(project: &Path, app: Option<&str>) -> Result<()> {
    let env = commands::load_environment(project)?;
    let apps = commands::select_applications(&env, app)?;

    let engine = DockerCli::new(project);
    let mut lock = LockState::load(project)?;

    let mut units = 0usize;
    let mut report = FailureReport::new();
    for app in &apps {
        let targets = match selector::resolve_all(&app.deploys_to, env.nodes()) {
            Ok(targets) => targets,
            Err(e) => {
                units += 1;
                report.record(app.name.clone(), e);
                continue;
            }
        };

        for node in targets {
            units += 1;
            ui::info(format!("deploying {} to {}", app.name, node.name));
            match deploy::deploy(app, node, &env, &mut lock, &engine) {
                Ok(()) => ui::info(format!("deployed {} to {}", app.name, node.name)),
                Err(e) => report.record(format!("{} -> {}", app.name, node.name), e),
            }
        }
    }

    if !report.is_empty() {
        ui::print_failure_report(&report);
        bail!("{} of {} deployments failed", report.len(), units);
    }
    Ok(())
}
