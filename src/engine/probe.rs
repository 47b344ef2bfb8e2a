//! Node reachability probe
//!
//! A plain TCP connect against the engine management port, with a short
//! timeout. Status reporting uses this; build and deploy never do.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{docker::ENGINE_PORT, NodeProbe};
use crate::models::Node;

/// TCP-based reachability probe
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeProbe for TcpProbe {
    fn is_reachable(&self, node: &Node) -> bool {
        let addr = format!("{}:{}", node.host, ENGINE_PORT);
        let Ok(mut resolved) = addr.to_socket_addrs() else {
            return false;
        };
        let Some(addr) = resolved.next() else {
            return false;
        };
        TcpStream::connect_timeout(&addr, self.timeout).is_ok()
    }
}
