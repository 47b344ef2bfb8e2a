//! Static validation of a project configuration
//!
//! The validation pass checks an environment (node set + application set)
//! for structural conflicts before any deployment is attempted. It never
//! mutates state, is safe to run repeatedly, and accumulates every problem
//! found in one pass instead of stopping at the first.

use std::collections::BTreeMap;

use crate::environment::Environment;
use crate::error::FlotillaResult;
use crate::models::Application;
use crate::selector;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Advisory,
    Fatal,
}

/// A single problem found in a project configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub description: String,
    pub severity: Severity,
}

impl Issue {
    pub fn fatal(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: Severity::Fatal,
        }
    }

    pub fn advisory(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: Severity::Advisory,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Fatal => "ERROR",
            Severity::Advisory => "WARN",
        };
        write!(f, "[{}] {}", level, self.description)
    }
}

/// Validate an environment
///
/// Selector resolution failures (syntax errors, unmatched selectors)
/// propagate as the error return; structural conflicts are collected as
/// issues.
pub fn validate(env: &dyn Environment) -> FlotillaResult<Vec<Issue>> {
    let mut issues = Vec::new();
    check_node_names(env, &mut issues);
    check_ports(env, &mut issues)?;
    Ok(issues)
}

/// Every node name in the environment must be unique
fn check_node_names(env: &dyn Environment, issues: &mut Vec<Issue>) {
    let mut seen = std::collections::BTreeSet::new();
    for node in env.nodes() {
        if !seen.insert(node.name.as_str()) {
            issues.push(Issue::fatal(format!(
                "node name is not unique: {}",
                node.name
            )));
        }
    }
}

/// Port bindings must be valid numbers and must not collide per node
///
/// For each node the union of applications placed on it is computed from
/// their resolved deployment target sets; two applications scheduled onto
/// the same node must not declare the same target port.
fn check_ports(env: &dyn Environment, issues: &mut Vec<Issue>) -> FlotillaResult<()> {
    let applications = env.applications()?;

    let mut node_apps: BTreeMap<&str, Vec<&Application>> = BTreeMap::new();
    for app in &applications {
        let targets = selector::resolve_all(&app.deploys_to, env.nodes())?;
        for node in targets {
            node_apps.entry(node.name.as_str()).or_default().push(app);
        }
    }

    for (node_name, apps) in node_apps {
        let mut ports_used: BTreeMap<&str, &str> = BTreeMap::new();
        for app in apps {
            let Some(run) = app.run.as_ref() else {
                continue;
            };
            for (source, target) in &run.ports {
                if source.as_port_number().is_none() {
                    issues.push(Issue::fatal(format!(
                        "source port {} on application {} is not a valid port number",
                        source, app.name
                    )));
                }
                if target.as_port_number().is_none() {
                    issues.push(Issue::fatal(format!(
                        "target port {} on application {} is not a valid port number",
                        target, app.name
                    )));
                    continue;
                }

                if let Some(owner) = ports_used.get(target.0.as_str()) {
                    issues.push(Issue::fatal(format!(
                        "port {} on node {} is used by applications {} and {}",
                        target, node_name, owner, app.name
                    )));
                } else {
                    ports_used.insert(target.0.as_str(), app.name.as_str());
                }
            }
        }
    }

    Ok(())
}
