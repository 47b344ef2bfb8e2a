//! Error types for Flotilla
//!
//! Library errors use `thiserror`; the CLI layer wraps them with `anyhow`
//! for operator-facing context.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Flotilla operations
pub type FlotillaResult<T> = Result<T, FlotillaError>;

/// Main error type for Flotilla operations
#[derive(Error, Debug)]
pub enum FlotillaError {
    /// Selector string does not start with `.` or `#`
    #[error("invalid selector \"{selector}\" - must start with '.' or '#'")]
    InvalidSelector { selector: String },

    /// A declared selector matched no node in the environment
    #[error("selector \"{selector}\" matches no node in the environment")]
    UnmatchedSelector { selector: String },

    /// Application has neither a Dockerfile nor a preconfigured image
    #[error("application '{app}' has no Dockerfile and no 'image' entry in application.yaml")]
    MissingImage { app: String },

    /// Deploy was requested before any build was recorded
    #[error("application '{app}' has no entry in flotilla.lock - run 'flotilla build' first")]
    NoBuildRecorded { app: String },

    /// The token source produced a version token it already issued
    #[error("version token '{token}' was already issued - refusing to alias two builds")]
    VersionTokenCollision { token: String },

    /// Context assembly, image build, or push failed
    #[error("build of '{app}' failed: {message}")]
    BuildFailed { app: String, message: String },

    /// Pull, stop, create, or start failed for one (application, node) pair
    #[error("deploy of '{app}' to node '{node}' failed: {message}")]
    DeployFailed {
        app: String,
        node: String,
        message: String,
    },

    /// Lock file does not exist yet
    #[error("no lock file at {path} - run 'flotilla build' first")]
    LockNotFound { path: PathBuf },

    /// Lock file was written by an incompatible version of the tool
    #[error("lock file {path} has schema version {found}, expected {expected}")]
    LockVersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Lock store could not be read or written
    #[error("failed to persist lock state: {message}")]
    PersistenceFailed { message: String },

    /// Environment or application descriptor could not be parsed
    #[error("invalid descriptor {file}: {message}")]
    InvalidDescriptor { file: PathBuf, message: String },

    /// Named application does not exist in the project
    ///
    /// `suggestion` carries the closest known name, if any; the CLI layer
    /// renders it as a "did you mean" hint.
    #[error("application '{name}' not found")]
    UnknownApplication {
        name: String,
        suggestion: Option<String>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single failed unit of work in a multi-unit run
#[derive(Debug)]
pub struct UnitFailure {
    /// Identifies the unit, e.g. `app` or `app -> node`
    pub unit: String,
    pub error: FlotillaError,
}

/// Accumulates per-unit failures so one bad node does not block the rest
/// of the fleet.
///
/// Build and deploy loops record failures here and keep going; the run as
/// a whole fails afterwards if anything was recorded.
#[derive(Debug, Default)]
pub struct FailureReport {
    failures: Vec<UnitFailure>,
}

impl FailureReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, unit: impl Into<String>, error: FlotillaError) {
        self.failures.push(UnitFailure {
            unit: unit.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[UnitFailure] {
        &self.failures
    }
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{}: {}", failure.unit, failure.error)?;
        }
        Ok(())
    }
}
