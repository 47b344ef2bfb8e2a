//! Injected engine capabilities
//!
//! The orchestrators never talk to a container engine directly; they drive
//! the narrow traits defined here. The shipped implementation
//! (`engine::docker::DockerCli`) drives the `docker` command-line client
//! against a remote engine endpoint; tests substitute in-memory fakes.

mod docker;
mod probe;

pub use docker::DockerCli;
pub use probe::TcpProbe;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;

use crate::error::{FlotillaError, FlotillaResult};
use crate::models::{Node, RegistryConfig, RunConfig};

/// Errors surfaced by an engine capability
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine endpoint on the node could not be reached
    #[error("node '{node}' is unreachable at {addr}: {message}")]
    Unreachable {
        node: String,
        addr: String,
        message: String,
    },

    /// The engine client binary could not be spawned
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The engine client reported a failure
    #[error("{command} failed ({status}): {detail}")]
    CommandFailed {
        command: String,
        status: String,
        detail: String,
    },
}

/// Files making up an image build context
///
/// `files` lists every file under `root`; nothing in the application
/// directory is excluded from the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Capability to build and push images
pub trait BuildEngine {
    fn build_image(
        &self,
        node: &Node,
        context: &BuildContext,
        args: &BTreeMap<String, String>,
        tag: &str,
    ) -> Result<(), EngineError>;

    fn push_image(
        &self,
        node: &Node,
        image: &str,
        registry: &RegistryConfig,
    ) -> Result<(), EngineError>;
}

/// Capability to run containers on a node
pub trait DeployEngine {
    fn pull_image(&self, node: &Node, image: &str) -> Result<(), EngineError>;

    fn stop_container(&self, node: &Node, container: &str) -> Result<(), EngineError>;

    /// Create a container from an image; returns the container identity
    fn create_container(
        &self,
        node: &Node,
        image: &str,
        run: Option<&RunConfig>,
    ) -> Result<String, EngineError>;

    fn start_container(&self, node: &Node, container: &str) -> Result<(), EngineError>;
}

/// Reachability probe against a node's engine management port
///
/// Used by status reporting only, never by build or deploy.
pub trait NodeProbe {
    fn is_reachable(&self, node: &Node) -> bool;
}

/// Source of image version tokens
///
/// Tokens tag built images and must never collide across builds; two
/// different build outputs silently aliasing under one tag would corrupt
/// the lock state's meaning. Injected so tests can supply deterministic
/// tokens.
pub trait TokenSource {
    fn next_token(&self) -> FlotillaResult<String>;
}

/// Production token source: random UUIDs, checked against every token
/// issued in this process
///
/// A repeated token is a fatal invariant violation, not a value to retry.
#[derive(Debug, Default)]
pub struct UuidTokens {
    issued: RefCell<HashSet<String>>,
}

impl UuidTokens {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSource for UuidTokens {
    fn next_token(&self) -> FlotillaResult<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        if !self.issued.borrow_mut().insert(token.clone()) {
            return Err(FlotillaError::VersionTokenCollision { token });
        }
        Ok(token)
    }
}
