//! `node` binary — a single node of the distributed relational engine,
//! storing fragments and answering the coordinator's scan/insert RPCs.

mod api;
mod config;
mod health;

use anyhow::Result;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use api::NodeState;
use config::{Config, NodeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = NodeConfig::from_env_and_args(Config::parse())?;
    info!("Starting node, binding {}", config.bind);

    let state = NodeState::new();
    let app = api::router(state)
        .merge(health::health_router())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("node listening on {}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
