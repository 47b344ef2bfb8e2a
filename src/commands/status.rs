//! `flotilla status` - node reachability and recorded deployments

use std::path::Path;

use anyhow::Result;

use flotilla::{selector, Environment, LockState, NodeProbe, TcpProbe};

use crate::commands;
use crate::ui;

pub fn run(project: &Path, json: bool) -> Result<()> {
    let env = commands::load_environment(project)?;
    let apps = commands::select_applications(&env, None)?;
    let lock = LockState::load_or_default(project)?;
    let probe = TcpProbe::new();

    for node in env.nodes() {
        let reachable = probe.is_reachable(node);
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "node": node.name,
                    "host": node.host,
                    "reachable": reachable,
                })
            );
        } else {
            ui::print_node_status(&node.name, &node.host, reachable);
        }
    }

    for app in &apps {
        let targets = selector::resolve_all(&app.deploys_to, env.nodes())?;
        let placements: Vec<(String, bool)> = targets
            .iter()
            .map(|node| {
                let deployed = lock.deployment(&app.name, &node.name).is_some();
                (node.name.clone(), deployed)
            })
            .collect();

        if json {
            for (node, deployed) in &placements {
                println!(
                    "{}",
                    serde_json::json!({
                        "application": app.name,
                        "node": node,
                        "deployed": deployed,
                        "image": lock.version(&app.name),
                    })
                );
            }
        } else {
            ui::print_app_status(&app.name, &placements);
        }
    }

    Ok(())
}
