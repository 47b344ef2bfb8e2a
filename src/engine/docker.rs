//! Docker CLI transport
//!
//! Implements the engine capabilities by driving the `docker` binary
//! against a node's remote engine endpoint (`tcp://host:2376`). When TLS
//! material exists under `.flotilla-certs/<node>/` the connection is
//! verified; otherwise it falls back to plain TCP.
//!
//! Every operation starts with an explicit TCP connect probe with a
//! bounded timeout, so an unreachable node surfaces as a connection error
//! instead of hanging on transport defaults.

use std::collections::BTreeMap;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::{BuildContext, BuildEngine, DeployEngine, EngineError};
use crate::models::{Node, RegistryConfig, RunConfig};

/// TCP port of the remote engine endpoint
pub const ENGINE_PORT: u16 = 2376;

/// Directory (under the project root) holding per-node TLS material
pub const CERTS_DIR: &str = ".flotilla-certs";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Engine implementation backed by the `docker` command-line client
pub struct DockerCli {
    certs_dir: PathBuf,
}

impl DockerCli {
    /// Create a transport for a project; TLS material is looked up under
    /// `<project>/.flotilla-certs/<node>/`
    pub fn new(project_root: &std::path::Path) -> Self {
        Self {
            certs_dir: project_root.join(CERTS_DIR),
        }
    }

    fn engine_addr(node: &Node) -> String {
        format!("{}:{}", node.host, ENGINE_PORT)
    }

    /// Fail fast when the engine endpoint does not accept connections
    fn ensure_reachable(&self, node: &Node) -> Result<(), EngineError> {
        let addr = Self::engine_addr(node);
        let resolved = addr
            .to_socket_addrs()
            .map_err(|e| EngineError::Unreachable {
                node: node.name.clone(),
                addr: addr.clone(),
                message: e.to_string(),
            })?
            .next()
            .ok_or_else(|| EngineError::Unreachable {
                node: node.name.clone(),
                addr: addr.clone(),
                message: "no address resolved".to_string(),
            })?;

        TcpStream::connect_timeout(&resolved, CONNECT_TIMEOUT)
            .map(|_| ())
            .map_err(|e| EngineError::Unreachable {
                node: node.name.clone(),
                addr,
                message: e.to_string(),
            })
    }

    /// Base `docker` invocation pointed at the node's engine endpoint
    fn docker(&self, node: &Node) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("-H")
            .arg(format!("tcp://{}:{}", node.host, ENGINE_PORT));

        let certs = self.certs_dir.join(&node.name);
        if certs.exists() {
            cmd.arg("--tlsverify")
                .arg("--tlscacert")
                .arg(certs.join("ca.pem"))
                .arg("--tlscert")
                .arg(certs.join("cert.pem"))
                .arg("--tlskey")
                .arg(certs.join("key.pem"));
        }

        cmd
    }

    /// Run a command, capturing output; non-zero exit becomes an error
    /// carrying the stderr tail
    fn run(mut cmd: Command, what: &str) -> Result<String, EngineError> {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| EngineError::Spawn {
                command: what.to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no error output")
                .to_string();
            return Err(EngineError::CommandFailed {
                command: what.to_string(),
                status: output
                    .status
                    .code()
                    .map(|c| format!("exit {c}"))
                    .unwrap_or_else(|| "signal".to_string()),
                detail,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl BuildEngine for DockerCli {
    fn build_image(
        &self,
        node: &Node,
        context: &BuildContext,
        args: &BTreeMap<String, String>,
        tag: &str,
    ) -> Result<(), EngineError> {
        self.ensure_reachable(node)?;

        let mut cmd = self.docker(node);
        cmd.arg("build").arg("--pull").arg("-t").arg(tag);
        for (key, value) in args {
            cmd.arg("--build-arg").arg(format!("{key}={value}"));
        }
        cmd.arg(&context.root);

        Self::run(cmd, "docker build").map(|_| ())
    }

    fn push_image(
        &self,
        node: &Node,
        image: &str,
        registry: &RegistryConfig,
    ) -> Result<(), EngineError> {
        self.ensure_reachable(node)?;

        if let (Some(user), Some(password)) = (&registry.user, &registry.password) {
            let mut cmd = self.docker(node);
            cmd.arg("login")
                .arg(&registry.host)
                .arg("-u")
                .arg(user)
                .arg("--password")
                .arg(password);
            Self::run(cmd, "docker login")?;
        }

        let mut cmd = self.docker(node);
        cmd.arg("push").arg(image);
        Self::run(cmd, "docker push").map(|_| ())
    }
}

impl DeployEngine for DockerCli {
    fn pull_image(&self, node: &Node, image: &str) -> Result<(), EngineError> {
        self.ensure_reachable(node)?;

        let mut cmd = self.docker(node);
        cmd.arg("pull").arg(image);
        Self::run(cmd, "docker pull").map(|_| ())
    }

    fn stop_container(&self, node: &Node, container: &str) -> Result<(), EngineError> {
        self.ensure_reachable(node)?;

        let mut cmd = self.docker(node);
        cmd.arg("stop").arg(container);
        Self::run(cmd, "docker stop").map(|_| ())
    }

    fn create_container(
        &self,
        node: &Node,
        image: &str,
        run: Option<&RunConfig>,
    ) -> Result<String, EngineError> {
        self.ensure_reachable(node)?;

        let mut cmd = self.docker(node);
        cmd.arg("create");
        if let Some(run) = run {
            for (source, target) in &run.ports {
                cmd.arg("-p").arg(format!("{source}:{target}"));
            }
            for (host, container_path) in &run.volumes {
                cmd.arg("-v").arg(format!("{host}:{container_path}"));
            }
        }
        cmd.arg(image);

        let stdout = Self::run(cmd, "docker create")?;
        Ok(stdout.trim().to_string())
    }

    fn start_container(&self, node: &Node, container: &str) -> Result<(), EngineError> {
        self.ensure_reachable(node)?;

        let mut cmd = self.docker(node);
        cmd.arg("start").arg(container);
        Self::run(cmd, "docker start").map(|_| ())
    }
}
