//! Environment loading and access
//!
//! An environment is the node and registry configuration of one flotilla
//! project (`environment.yaml` at the project root) plus the applications
//! discovered under `applications/*/application.yaml`.
//!
//! The `Environment` trait is the seam the orchestrators and the validation
//! pass depend on, so they can be tested against an in-memory implementation
//! without any file access.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FlotillaError, FlotillaResult};
use crate::models::{Application, Node, RegistryConfig};

/// File name of the environment descriptor
pub const ENVIRONMENT_FILE: &str = "environment.yaml";

/// File name of an application manifest
pub const APPLICATION_FILE: &str = "application.yaml";

/// Directory holding the application definitions
pub const APPLICATIONS_DIR: &str = "applications";

/// Behavior of a flotilla environment
pub trait Environment {
    fn registry(&self) -> &RegistryConfig;
    fn nodes(&self) -> &[Node];
    fn base_dir(&self) -> &Path;

    /// All applications of the project, sorted by name
    fn applications(&self) -> FlotillaResult<Vec<Application>>;

    /// Look up one application by name, with a "did you mean" suggestion
    /// on miss
    fn application(&self, name: &str) -> FlotillaResult<Application> {
        let applications = self.applications()?;
        let mut known = Vec::new();
        for app in applications {
            if app.name == name {
                return Ok(app);
            }
            known.push(app.name);
        }
        Err(FlotillaError::UnknownApplication {
            name: name.to_string(),
            suggestion: suggest_name(name, &known),
        })
    }
}

/// A non-fatal problem in a descriptor file, e.g. an unknown key
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorWarning {
    pub key: String,
    pub file: PathBuf,
    pub suggestion: Option<String>,
}

/// Environment loaded from a project directory
pub struct LoadedEnvironment {
    base_dir: PathBuf,
    registry: RegistryConfig,
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentFile {
    #[serde(default)]
    registry: RegistryConfig,
    #[serde(default)]
    nodes: Vec<Node>,
}

impl LoadedEnvironment {
    /// Load `environment.yaml` from the project directory
    ///
    /// Unknown keys are collected as warnings rather than rejected, so a
    /// newer descriptor still loads on an older tool.
    pub fn load(base_dir: &Path) -> FlotillaResult<(Self, Vec<DescriptorWarning>)> {
        let file = base_dir.join(ENVIRONMENT_FILE);
        let content = fs::read_to_string(&file).map_err(|e| FlotillaError::InvalidDescriptor {
            file: file.clone(),
            message: e.to_string(),
        })?;

        let (parsed, warnings): (EnvironmentFile, _) =
            deserialize_with_warnings(&content, &file, ENVIRONMENT_KEYS)?;

        Ok((
            Self {
                base_dir: base_dir.to_path_buf(),
                registry: parsed.registry,
                nodes: parsed.nodes,
            },
            warnings,
        ))
    }

    /// All applications plus the descriptor warnings gathered while
    /// loading them
    pub fn applications_with_warnings(
        &self,
    ) -> FlotillaResult<(Vec<Application>, Vec<DescriptorWarning>)> {
        let mut applications = Vec::new();
        let mut warnings = Vec::new();

        let dir = self.base_dir.join(APPLICATIONS_DIR);
        if !dir.exists() {
            return Ok((applications, warnings));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_dir() && p.join(APPLICATION_FILE).exists())
            .collect();
        // Deterministic discovery order regardless of directory iteration.
        entries.sort();

        for app_dir in entries {
            let (app, mut app_warnings) = load_application(&app_dir)?;
            applications.push(app);
            warnings.append(&mut app_warnings);
        }

        Ok((applications, warnings))
    }
}

impl Environment for LoadedEnvironment {
    fn registry(&self) -> &RegistryConfig {
        &self.registry
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn applications(&self) -> FlotillaResult<Vec<Application>> {
        self.applications_with_warnings().map(|(apps, _)| apps)
    }
}

/// Load one application manifest from its directory
///
/// The application name is the directory basename. A manifest with an
/// empty `deploysTo` list is rejected: an application that deploys nowhere
/// is a misconfiguration, not a valid no-op.
pub fn load_application(app_dir: &Path) -> FlotillaResult<(Application, Vec<DescriptorWarning>)> {
    let file = app_dir.join(APPLICATION_FILE);
    let content = fs::read_to_string(&file).map_err(|e| FlotillaError::InvalidDescriptor {
        file: file.clone(),
        message: e.to_string(),
    })?;

    let (mut app, warnings): (Application, _) =
        deserialize_with_warnings(&content, &file, APPLICATION_KEYS)?;

    app.name = app_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if app.deploys_to.is_empty() {
        return Err(FlotillaError::InvalidDescriptor {
            file,
            message: "'deploysTo' must list at least one selector".to_string(),
        });
    }

    Ok((app, warnings))
}

const ENVIRONMENT_KEYS: &[&str] = &["registry", "host", "user", "password", "nodes", "name", "labels"];

const APPLICATION_KEYS: &[&str] = &[
    "deploysTo", "image", "build", "buildsOn", "args", "dontPush", "run", "ports", "volumes",
];

fn deserialize_with_warnings<'de, T: Deserialize<'de>>(
    content: &'de str,
    file: &Path,
    known_keys: &[&str],
) -> FlotillaResult<(T, Vec<DescriptorWarning>)> {
    let mut unknown: Vec<String> = Vec::new();
    let deserializer = serde_yaml_ng::Deserializer::from_str(content);

    let value: T = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(path.to_string());
    })
    .map_err(|e| FlotillaError::InvalidDescriptor {
        file: file.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            let suggestion = suggest_from(&key, known_keys);
            DescriptorWarning {
                key,
                file: file.to_path_buf(),
                suggestion,
            }
        })
        .collect();

    Ok((value, warnings))
}

/// Closest known application name, if any is close enough
pub fn suggest_name(unknown: &str, known: &[String]) -> Option<String> {
    let candidates: Vec<&str> = known.iter().map(|s| s.as_str()).collect();
    suggest_from(unknown, &candidates)
}

fn suggest_from(unknown: &str, candidates: &[&str]) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
