//! Node configuration from environment variables, overridable by CLI flags.

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "node")]
#[command(about = "A fragment-store node of the distributed relational engine")]
pub struct Config {
    /// Address to bind the HTTP API on.
    #[arg(long, env = "NODE_BIND")]
    pub bind: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind: String,
}

impl NodeConfig {
    pub fn from_env_and_args(cli: Config) -> Result<Self> {
        let bind = cli
            .bind
            .or_else(|| std::env::var("NODE_BIND").ok())
            .unwrap_or_else(|| "0.0.0.0:8081".to_string());
        bind.parse::<std::net::SocketAddr>()
            .context("NODE_BIND must be a valid socket address")?;
        Ok(Self { bind })
    }
}
