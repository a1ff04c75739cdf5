//! `coordinator` binary — cluster front-end for the distributed
//! relational engine: builds tables, broadcasts fragment writes, and
//! plans/executes distributed natural joins across a fixed set of nodes.

mod api;
mod config;
mod health;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dqe_core::NodeRpc;
use dqe_wire::HttpNodeClient;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use api::CoordinatorState;
use config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env_and_args(Cli::parse())?;
    info!(peers = ?config.peers, "Starting coordinator, binding {}", config.bind);

    let nodes: Vec<Arc<dyn NodeRpc>> = config
        .peers
        .iter()
        .map(|url| Arc::new(HttpNodeClient::new(url.clone())) as Arc<dyn NodeRpc>)
        .collect();

    let state = CoordinatorState::new(nodes);
    let app = api::router(state)
        .merge(health::health_router())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("coordinator listening on {}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
