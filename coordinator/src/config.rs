//! Coordinator configuration: listen address and the peer node list,
//! from environment variables, overridable by CLI flags.

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "coordinator")]
#[command(about = "Coordinator front-end for the distributed relational engine")]
pub struct Cli {
    /// Address to bind the HTTP API on.
    #[arg(long, env = "COORDINATOR_BIND")]
    pub bind: Option<String>,

    /// Comma-separated `http://host:port` base URLs of the cluster's
    /// nodes, in ordinal order (node 0 first).
    #[arg(long, env = "COORDINATOR_PEERS", value_delimiter = ',')]
    pub peers: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub peers: Vec<String>,
}

impl Config {
    pub fn from_env_and_args(cli: Cli) -> Result<Self> {
        let bind = cli
            .bind
            .or_else(|| std::env::var("COORDINATOR_BIND").ok())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        bind.parse::<std::net::SocketAddr>()
            .context("COORDINATOR_BIND must be a valid socket address")?;

        let peers = match cli.peers {
            Some(p) if !p.is_empty() => p,
            _ => std::env::var("COORDINATOR_PEERS")
                .context("COORDINATOR_PEERS required: comma-separated node base URLs")?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        if peers.is_empty() {
            anyhow::bail!("at least one peer node is required");
        }

        Ok(Self { bind, peers })
    }
}
