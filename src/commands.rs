//! CLI command implementations
//!
//! Each submodule drives the library orchestrators for one subcommand and
//! owns its operator-facing output. Shared plumbing (environment loading
//! with warning display) lives here.

pub mod build;
pub mod deploy;
pub mod init;
pub mod status;
pub mod vet;

use std::path::Path;

use anyhow::{Context, Result};

use flotilla::{Application, LoadedEnvironment};

use crate::ui;

/// Load the project environment, surfacing descriptor warnings
pub fn load_environment(project: &Path) -> Result<LoadedEnvironment> {
    let (env, warnings) = LoadedEnvironment::load(project)
        .with_context(|| format!("loading environment from {}", project.display()))?;
    ui::print_descriptor_warnings(&warnings);
    Ok(env)
}

/// Applications to operate on: all of them, or one selected by name
pub fn select_applications(
    env: &LoadedEnvironment,
    app: Option<&str>,
) -> Result<Vec<Application>> {
    use flotilla::Environment;

    match app {
        Some(name) => {
            let app = env.application(name).map_err(|e| {
                if let flotilla::FlotillaError::UnknownApplication {
                    suggestion: Some(suggestion),
                    ..
                } = &e
                {
                    anyhow::anyhow!("{e}. Did you mean '{suggestion}'?")
                } else {
                    anyhow::anyhow!(e)
                }
            })?;
            Ok(vec![app])
        }
        None => {
            let (apps, warnings) = env
                .applications_with_warnings()
                .context("loading application descriptions")?;
            ui::print_descriptor_warnings(&warnings);
            Ok(apps)
        }
    }
}
