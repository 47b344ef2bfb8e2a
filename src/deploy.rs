//! Deploy orchestration
//!
//! Installs one application on one resolved target node: pull the locked
//! image, stop the previously recorded container if any, create and start
//! a new one, record the new container in the lock state and persist it
//! immediately.
//!
//! Re-running with an unchanged image still stops and restarts the
//! container; there is no no-op short-circuit.

use crate::engine::DeployEngine;
use crate::environment::Environment;
use crate::error::{FlotillaError, FlotillaResult};
use crate::lockfile::LockState;
use crate::models::{Application, Node};

/// Deploy an application onto a node
///
/// Any capability failure aborts this (application, node) pair without
/// touching the lock state, so a stale entry is preferred over recording a
/// container that never started.
pub fn deploy(
    app: &Application,
    node: &Node,
    env: &dyn Environment,
    lock: &mut LockState,
    engine: &dyn DeployEngine,
) -> FlotillaResult<()> {
    let image = lock
        .version(&app.name)
        .ok_or_else(|| FlotillaError::NoBuildRecorded {
            app: app.name.clone(),
        })?
        .to_string();

    engine
        .pull_image(node, &image)
        .map_err(|e| deploy_failed(app, node, e))?;

    if let Some(prior) = lock.deployment(&app.name, &node.name) {
        let container = prior.container.clone();
        engine
            .stop_container(node, &container)
            .map_err(|e| deploy_failed(app, node, e))?;
    }

    let container = engine
        .create_container(node, &image, app.run.as_ref())
        .map_err(|e| deploy_failed(app, node, e))?;
    engine
        .start_container(node, &container)
        .map_err(|e| deploy_failed(app, node, e))?;

    lock.set_deployment(&app.name, &node.name, container);
    lock.save(env.base_dir())?;

    Ok(())
}

fn deploy_failed(app: &Application, node: &Node, error: impl std::fmt::Display) -> FlotillaError {
    FlotillaError::DeployFailed {
        app: app.name.clone(),
        node: node.name.clone(),
        message: error.to_string(),
    }
}
