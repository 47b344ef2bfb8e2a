//! Core data models for Flotilla
//!
//! Defines the fundamental data structures used throughout Flotilla:
//! - `Node`: a deployment target (device) from `environment.yaml`
//! - `RegistryConfig`: image registry access configuration
//! - `Application`: one deployable unit from `applications/*/application.yaml`
//! - Supporting structs: `BuildConfig`, `RunConfig`, `PortSpec`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single device on which applications can be deployed
///
/// Nodes are loaded from the environment descriptor and immutable for the
/// process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique name within an environment
    pub name: String,
    /// Network host (name or address) of the device
    pub host: String,
    /// Labels referenced by `.label` selectors
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Node {
    /// Whether this node carries the given label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Access configuration for the image registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RegistryConfig {
    /// Whether credential material is configured for pushes
    pub fn has_credentials(&self) -> bool {
        self.user.is_some()
    }
}

/// Build configuration of an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Selector overriding where the image is built
    #[serde(default, rename = "buildsOn")]
    pub builds_on: Option<String>,

    /// Build arguments handed to the image build
    #[serde(default)]
    pub args: BTreeMap<String, String>,

    /// Skip pushing the built image to the registry
    #[serde(default, rename = "dontPush")]
    pub dont_push: bool,
}

/// Run-time configuration of an application's containers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Port bindings, source port -> target port
    #[serde(default)]
    pub ports: BTreeMap<PortSpec, PortSpec>,

    /// Volume bindings, host path -> container path
    #[serde(default)]
    pub volumes: BTreeMap<String, String>,
}

/// A declared port, kept as written so validation (not deserialization)
/// decides whether it is a valid port number
///
/// YAML authors write ports as integers (`8080: 8080`) or strings
/// (`"8080": "8080"`); both forms parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PortSpec(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum PortSpecDe {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for PortSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match PortSpecDe::deserialize(deserializer)? {
            PortSpecDe::Number(n) => Ok(Self(n.to_string())),
            PortSpecDe::Text(s) => Ok(Self(s)),
        }
    }
}

impl PortSpec {
    /// Parse as a port number; `None` if out of [0, 65535] or not numeric
    pub fn as_port_number(&self) -> Option<u16> {
        self.0.parse::<u16>().ok()
    }
}

impl std::fmt::Display for PortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single deployable application in a flotilla project
///
/// `name` comes from the application's directory basename, not the
/// manifest, so it is unique per project by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Identity, derived from the application directory
    #[serde(skip)]
    pub name: String,

    /// Placement selectors; non-empty, ordered as declared
    #[serde(rename = "deploysTo")]
    pub deploys_to: Vec<String>,

    /// Preconfigured image, used when the application has no build step
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub build: Option<BuildConfig>,

    #[serde(default)]
    pub run: Option<RunConfig>,
}

impl Application {
    /// Build arguments, empty if no build section is declared
    pub fn build_args(&self) -> BTreeMap<String, String> {
        self.build
            .as_ref()
            .map(|b| b.args.clone())
            .unwrap_or_default()
    }

    /// Whether the built image should be pushed to the registry
    pub fn push_enabled(&self) -> bool {
        !self.build.as_ref().is_some_and(|b| b.dont_push)
    }
}
