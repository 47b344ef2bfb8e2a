//! Lock-state store
//!
//! `flotilla.lock` is the single source of truth for "which image version
//! is deployed where": the last successfully built image reference per
//! application, and the currently running container per (application, node)
//! pair.
//!
//! The store is saved after every successful mutation, not batched, so a
//! crash mid-run leaves the file consistent with the deployments that
//! actually completed. Writes go through a tempfile + rename so a partial
//! write never clobbers the previous state.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FlotillaError, FlotillaResult};

/// File name of the lock file at the project root
pub const LOCK_FILE: &str = "flotilla.lock";

const LOCK_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    LOCK_SCHEMA_VERSION
}

/// One recorded deployment: the running container on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub container: String,
    pub deployed_at: DateTime<Utc>,
}

/// Persisted deployment state of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockState {
    #[serde(default = "default_schema_version")]
    version: u32,

    /// application name -> last successfully built image reference
    #[serde(default)]
    versions: BTreeMap<String, String>,

    /// application name -> node name -> running container
    #[serde(default)]
    deployments: BTreeMap<String, BTreeMap<String, Deployment>>,
}

impl Default for LockState {
    fn default() -> Self {
        Self::new()
    }
}

impl LockState {
    pub fn new() -> Self {
        Self {
            version: LOCK_SCHEMA_VERSION,
            versions: BTreeMap::new(),
            deployments: BTreeMap::new(),
        }
    }

    /// Load the lock file from a project directory
    pub fn load(base_dir: &Path) -> FlotillaResult<Self> {
        let path = base_dir.join(LOCK_FILE);
        if !path.exists() {
            return Err(FlotillaError::LockNotFound { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| FlotillaError::PersistenceFailed {
            message: format!("reading {}: {}", path.display(), e),
        })?;
        let state: Self =
            toml::from_str(&content).map_err(|e| FlotillaError::PersistenceFailed {
                message: format!("parsing {}: {}", path.display(), e),
            })?;

        if state.version != LOCK_SCHEMA_VERSION {
            return Err(FlotillaError::LockVersionMismatch {
                path,
                found: state.version,
                expected: LOCK_SCHEMA_VERSION,
            });
        }

        Ok(state)
    }

    /// Load the lock file, or start empty if none exists yet
    ///
    /// Parse failures still fail: a corrupt lock file must not be silently
    /// replaced.
    pub fn load_or_default(base_dir: &Path) -> FlotillaResult<Self> {
        match Self::load(base_dir) {
            Ok(state) => Ok(state),
            Err(FlotillaError::LockNotFound { .. }) => Ok(Self::new()),
            Err(e) => Err(e),
        }
    }

    /// Persist the lock file atomically
    pub fn save(&self, base_dir: &Path) -> FlotillaResult<()> {
        let path = base_dir.join(LOCK_FILE);
        let content =
            toml::to_string_pretty(self).map_err(|e| FlotillaError::PersistenceFailed {
                message: format!("serializing lock state: {e}"),
            })?;

        let mut tmp = tempfile::NamedTempFile::new_in(base_dir).map_err(|e| {
            FlotillaError::PersistenceFailed {
                message: format!("creating temp file in {}: {}", base_dir.display(), e),
            }
        })?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| FlotillaError::PersistenceFailed {
                message: format!("writing lock state: {e}"),
            })?;
        tmp.persist(&path)
            .map_err(|e| FlotillaError::PersistenceFailed {
                message: format!("replacing {}: {}", path.display(), e),
            })?;

        Ok(())
    }

    /// Last successfully built image reference for an application
    pub fn version(&self, app: &str) -> Option<&str> {
        self.versions.get(app).map(|s| s.as_str())
    }

    /// Record a successful build, overwriting any prior value
    pub fn set_version(&mut self, app: &str, image: impl Into<String>) {
        self.versions.insert(app.to_string(), image.into());
    }

    /// Currently recorded deployment for an (application, node) pair
    pub fn deployment(&self, app: &str, node: &str) -> Option<&Deployment> {
        self.deployments.get(app).and_then(|nodes| nodes.get(node))
    }

    /// Record a successful deployment, overwriting any prior entry for
    /// this exact pair
    pub fn set_deployment(&mut self, app: &str, node: &str, container: impl Into<String>) {
        self.deployments.entry(app.to_string()).or_default().insert(
            node.to_string(),
            Deployment {
                container: container.into(),
                deployed_at: Utc::now(),
            },
        );
    }

    /// All recorded build versions, for status reporting
    pub fn versions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.versions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
