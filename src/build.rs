//! Build orchestration
//!
//! For one application: resolve the node that performs the build, assemble
//! the build context from the application directory, drive the injected
//! build capability, and return the versioned image reference. The caller
//! records the reference in the lock state only after everything here
//! succeeded.

use std::path::Path;

use crate::engine::{BuildContext, BuildEngine, EngineError, TokenSource};
use crate::environment::{Environment, APPLICATIONS_DIR};
use crate::error::{FlotillaError, FlotillaResult};
use crate::models::{Application, Node};
use crate::selector;

/// File that marks an application as buildable
pub const BUILD_FILE: &str = "Dockerfile";

/// Build an application's image, returning the image reference
///
/// An application without a `Dockerfile` is not built: its preconfigured
/// `image` is the effective reference, with zero capability calls. That is
/// a valid common path, not a fallback.
pub fn build(
    app: &Application,
    env: &dyn Environment,
    engine: &dyn BuildEngine,
    tokens: &dyn TokenSource,
) -> FlotillaResult<String> {
    let app_dir = env.base_dir().join(APPLICATIONS_DIR).join(&app.name);

    if !app_dir.join(BUILD_FILE).exists() {
        return app
            .image
            .clone()
            .ok_or_else(|| FlotillaError::MissingImage {
                app: app.name.clone(),
            });
    }

    let node = resolve_build_node(app, env)?;
    let context = assemble_context(&app_dir).map_err(|e| build_failed(app, e))?;

    let token = tokens.next_token()?;
    let image = format!("{}/{}:{}", env.registry().host, app.name, token);

    engine
        .build_image(node, &context, &app.build_args(), &image)
        .map_err(|e| build_failed(app, e))?;

    if app.push_enabled() {
        engine
            .push_image(node, &image, env.registry())
            .map_err(|e| build_failed(app, e))?;
    }

    Ok(image)
}

fn build_failed(app: &Application, error: impl std::fmt::Display) -> FlotillaError {
    FlotillaError::BuildFailed {
        app: app.name.clone(),
        message: error.to_string(),
    }
}

/// Resolve the node that performs an application's build
///
/// `buildsOn` takes precedence; a label selector matching several nodes
/// picks the lexicographically-first node name so builds stay
/// reproducible. Without `buildsOn` the first node of the deployment
/// target set builds.
pub fn resolve_build_node<'a>(
    app: &Application,
    env: &'a dyn Environment,
) -> FlotillaResult<&'a Node> {
    if let Some(selector_str) = app.build.as_ref().and_then(|b| b.builds_on.as_deref()) {
        let mut matched = selector::resolve(selector_str, env.nodes())?;
        if matched.is_empty() {
            return Err(FlotillaError::UnmatchedSelector {
                selector: selector_str.to_string(),
            });
        }
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        return Ok(matched[0]);
    }

    let targets = selector::resolve_all(&app.deploys_to, env.nodes())?;
    targets
        .first()
        .copied()
        .ok_or_else(|| FlotillaError::UnmatchedSelector {
            selector: app.deploys_to.join(", "),
        })
}

/// Collect every file under the application directory into a build context
///
/// Nothing is excluded; the walk is sorted so the context is assembled
/// deterministically.
fn assemble_context(app_dir: &Path) -> Result<BuildContext, EngineError> {
    let mut files = Vec::new();
    let walk = ignore::WalkBuilder::new(app_dir)
        .standard_filters(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    for entry in walk {
        let entry = entry.map_err(|e| EngineError::CommandFailed {
            command: "context assembly".to_string(),
            status: "walk error".to_string(),
            detail: e.to_string(),
        })?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }

    Ok(BuildContext {
        root: app_dir.to_path_buf(),
        files,
    })
}
