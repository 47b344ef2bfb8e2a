//! `flotilla build` - build application images and record them in the lock

use std::path::Path;

use anyhow::{bail, Result};

use flotilla::{build, DockerCli, FailureReport, LockState, UuidTokens};

use crate::commands;
use crate::ui;

pub fn run(project: &Path, app: Option<&str>) -> Result<()> {
    let env = commands::load_environment(project)?;
    let apps = commands::select_applications(&env, app)?;

    let engine = DockerCli::new(project);
    let tokens = UuidTokens::new();
    let mut lock = LockState::load_or_default(project)?;

    let mut report = FailureReport::new();
    for app in &apps {
        ui::info(format!("building {}", app.name));
        match build::build(app, &env, &engine, &tokens) {
            Ok(image) => {
                // Record and persist per application, so an interrupted run
                // keeps every build that completed.
                lock.set_version(&app.name, &image);
                lock.save(project)?;
                ui::info(format!("built {} -> {}", app.name, image));
            }
            Err(e) => report.record(app.name.clone(), e),
        }
    }

    if !report.is_empty() {
        ui::print_failure_report(&report);
        bail!("{} of {} builds failed", report.len(), apps.len());
    }
    Ok(())
}
