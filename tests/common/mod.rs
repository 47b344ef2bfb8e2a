//! Common test utilities for Flotilla integration tests.
//!
//! Provides:
//! - `TestProject`: an isolated project directory with descriptor builders
//! - CLI execution helpers against the built `flotilla` binary
//! - In-memory engine fakes for driving the orchestrators without docker

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use flotilla::engine::{
    BuildContext, BuildEngine, DeployEngine, EngineError, TokenSource,
};
use flotilla::error::FlotillaResult;
use flotilla::models::{Node, RegistryConfig, RunConfig};

/// Result of running a flotilla CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated flotilla project in a temp directory
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create temp project"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `environment.yaml`
    pub fn with_environment(self, content: &str) -> Self {
        std::fs::write(self.path().join("environment.yaml"), content).unwrap();
        self
    }

    /// Write an application manifest (and optional extra files)
    pub fn with_application(self, name: &str, manifest: &str) -> Self {
        let dir = self.path().join("applications").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("application.yaml"), manifest).unwrap();
        self
    }

    /// Add a file inside an application directory
    pub fn with_app_file(self, app: &str, file: &str, content: &str) -> Self {
        let path = self.path().join("applications").join(app).join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    /// Run the flotilla binary against this project
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_flotilla"))
            .arg("--project")
            .arg(self.path())
            .args(args)
            .output()
            .expect("run flotilla binary");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path().join("flotilla.lock")
    }
}

/// Standard two-node environment used across tests
pub const TWO_NODE_ENVIRONMENT: &str = r#"
registry:
  host: registry.local
nodes:
  - name: alpha
    host: 127.0.0.1
    labels: [sensor]
  - name: bravo
    host: 127.0.0.1
    labels: [sensor, gateway]
"#;

pub fn node(name: &str, labels: &[&str]) -> Node {
    Node {
        name: name.to_string(),
        host: format!("{name}.local"),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

/// What an engine fake was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Build { node: String, tag: String },
    Push { node: String, image: String },
    Pull { node: String, image: String },
    Stop { node: String, container: String },
    Create { node: String, image: String },
    Start { node: String, container: String },
}

/// Operations a `FailingEngine` can be told to fail at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Never,
    Build,
    Push,
    Pull,
    Stop,
    Create,
    Start,
}

/// In-memory engine recording every call; optionally fails one operation
pub struct RecordingEngine {
    pub calls: RefCell<Vec<EngineCall>>,
    pub fail_at: FailAt,
    counter: RefCell<u32>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::failing_at(FailAt::Never)
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_at,
            counter: RefCell::new(0),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    fn fail(&self, what: &str) -> EngineError {
        EngineError::CommandFailed {
            command: what.to_string(),
            status: "exit 1".to_string(),
            detail: "injected failure".to_string(),
        }
    }
}

impl BuildEngine for RecordingEngine {
    fn build_image(
        &self,
        node: &Node,
        _context: &BuildContext,
        _args: &BTreeMap<String, String>,
        tag: &str,
    ) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(EngineCall::Build {
            node: node.name.clone(),
            tag: tag.to_string(),
        });
        if self.fail_at == FailAt::Build {
            return Err(self.fail("build"));
        }
        Ok(())
    }

    fn push_image(
        &self,
        node: &Node,
        image: &str,
        _registry: &RegistryConfig,
    ) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(EngineCall::Push {
            node: node.name.clone(),
            image: image.to_string(),
        });
        if self.fail_at == FailAt::Push {
            return Err(self.fail("push"));
        }
        Ok(())
    }
}

impl DeployEngine for RecordingEngine {
    fn pull_image(&self, node: &Node, image: &str) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(EngineCall::Pull {
            node: node.name.clone(),
            image: image.to_string(),
        });
        if self.fail_at == FailAt::Pull {
            return Err(self.fail("pull"));
        }
        Ok(())
    }

    fn stop_container(&self, node: &Node, container: &str) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(EngineCall::Stop {
            node: node.name.clone(),
            container: container.to_string(),
        });
        if self.fail_at == FailAt::Stop {
            return Err(self.fail("stop"));
        }
        Ok(())
    }

    fn create_container(
        &self,
        node: &Node,
        image: &str,
        _run: Option<&RunConfig>,
    ) -> Result<String, EngineError> {
        self.calls.borrow_mut().push(EngineCall::Create {
            node: node.name.clone(),
            image: image.to_string(),
        });
        if self.fail_at == FailAt::Create {
            return Err(self.fail("create"));
        }
        let mut counter = self.counter.borrow_mut();
        *counter += 1;
        Ok(format!("container-{}", *counter))
    }

    fn start_container(&self, node: &Node, container: &str) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(EngineCall::Start {
            node: node.name.clone(),
            container: container.to_string(),
        });
        if self.fail_at == FailAt::Start {
            return Err(self.fail("start"));
        }
        Ok(())
    }
}

/// Deterministic token source yielding `t1`, `t2`, ...
pub struct SequenceTokens {
    counter: RefCell<u32>,
}

impl SequenceTokens {
    pub fn new() -> Self {
        Self {
            counter: RefCell::new(0),
        }
    }
}

impl TokenSource for SequenceTokens {
    fn next_token(&self) -> FlotillaResult<String> {
        let mut counter = self.counter.borrow_mut();
        *counter += 1;
        Ok(format!("t{}", *counter))
    }
}
