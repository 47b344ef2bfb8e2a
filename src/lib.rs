//! Flotilla - declarative container deployment for small device fleets
//!
//! Flotilla reads a declarative project description (nodes and
//! applications), builds container images, places applications onto nodes
//! by selector matching, and records the resulting deployment state in
//! `flotilla.lock` so re-deploys are idempotent and auditable.

pub mod build;
pub mod deploy;
pub mod engine;
pub mod environment;
pub mod error;
pub mod lockfile;
pub mod models;
pub mod selector;
pub mod validate;

// Re-exports for convenience
pub use engine::{BuildEngine, DeployEngine, DockerCli, NodeProbe, TcpProbe, TokenSource, UuidTokens};
pub use environment::{Environment, LoadedEnvironment};
pub use error::{FailureReport, FlotillaError, FlotillaResult};
pub use lockfile::LockState;
pub use models::{Application, Node, RegistryConfig};
pub use selector::{resolve, resolve_all, Selector};
pub use validate::{validate, Issue, Severity};
