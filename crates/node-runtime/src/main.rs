//! # Message-Exchange Node Runtime
//!
//! Runs a single-process network: the configured node, one counterparty and
//! a notary, all on the in-memory session router. The configured node sends
//! a message, the counterparty replies, and the process then waits for
//! Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging
//! 2. Load and validate configuration (from env)
//! 3. Create the notary and the shared session router
//! 4. Start both nodes
//! 5. Exchange a message and a reply

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use mx_02_finality::{FinalityConfig, NotaryService};
use mx_telemetry::{gather_metrics, init_logging, TelemetryConfig};
use node_runtime::{load_config, Node, NodeConfig};
use shared_bus::InMemorySessionRouter;
use shared_crypto::PartyKeyPair;

/// Counterparty name used when the configured node is not already it.
fn counterparty_name(local: &str) -> &'static str {
    if local == "PartyB" {
        "PartyA"
    } else {
        "PartyB"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load node configuration")?;
    init_logging(&TelemetryConfig::for_node(&config.identity.name))
        .context("Failed to initialise logging")?;

    info!("===========================================");
    info!("  Message-Exchange Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let router = Arc::new(InMemorySessionRouter::with_capacity(
        config.session.channel_capacity,
    ));
    let notary = Arc::new(NotaryService::new(
        PartyKeyPair::generate("Notary"),
        FinalityConfig::default(),
    ));

    // The counterparty mirrors the local settings under its own name.
    let mut peer_config: NodeConfig = config.clone();
    peer_config.identity.name = counterparty_name(&config.identity.name).to_string();
    peer_config.identity.seed = None;

    let local = Node::new(config, router.clone(), notary.clone())?;
    let peer = Node::new(peer_config, router.clone(), notary.clone())?;
    let local_handle = local.start()?;
    let peer_handle = peer.start()?;

    let peer_party = local
        .lookup_party(&peer.party().name)
        .context("Counterparty did not register")?;

    match local.send_message(&peer_party, "hi").await {
        Ok(sent) => {
            info!(tx_id = %sent.id().short(), "Message finalized");
            match peer.reply_to(&sent, "hello back").await {
                Ok(reply) => info!(tx_id = %reply.id().short(), "Reply finalized"),
                Err(e) => error!(error = %e, "Reply failed"),
            }
        }
        Err(e) => error!(error = %e, "Message failed"),
    }

    match gather_metrics() {
        Ok(metrics) => info!("Session metrics:\n{metrics}"),
        Err(e) => error!(error = %e, "Failed to render metrics"),
    }

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    local.shutdown();
    peer.shutdown();
    let _ = tokio::join!(local_handle, peer_handle);
    info!("Shutdown complete");

    Ok(())
}
