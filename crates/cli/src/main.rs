//! `dqe` CLI - command-line client for the coordinator's `BuildTable`,
//! `FragmentWrite` and `Join` RPCs (§6.1).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dqe_core::{Row, TableSchema};
use dqe_wire::CoordinatorClient;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dqe")]
#[command(about = "Client for the distributed fragment-relational engine's coordinator")]
#[command(version)]
struct Cli {
    /// Coordinator base URL, e.g. http://localhost:8080
    #[arg(long, global = true, default_value = "http://localhost:8080")]
    coordinator: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a table from a logical schema and a partition plan
    BuildTable {
        /// Path to a JSON file holding the table's logical schema
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to a JSON file holding the partition plan (§6.2 format)
        #[arg(short, long)]
        plan: PathBuf,
    },

    /// Append one row to a table
    Write {
        /// Target table name
        table: String,

        /// Path to a JSON file holding the row as a tagged-value array
        #[arg(short, long)]
        row: PathBuf,
    },

    /// Compute the natural join of two or more tables
    Join {
        /// Table names, in join order
        tables: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = CoordinatorClient::new(cli.coordinator.clone());

    match cli.command {
        Commands::BuildTable { schema, plan } => build_table(&client, &schema, &plan).await?,
        Commands::Write { table, row } => write_row(&client, &table, &row).await?,
        Commands::Join { tables } => join(&client, tables).await?,
    }

    Ok(())
}

async fn build_table(client: &CoordinatorClient, schema_path: &PathBuf, plan_path: &PathBuf) -> Result<()> {
    let schema_bytes = std::fs::read(schema_path).with_context(|| format!("reading {:?}", schema_path))?;
    let logical_schema: TableSchema =
        serde_json::from_slice(&schema_bytes).with_context(|| format!("parsing schema {:?}", schema_path))?;

    let plan_bytes = std::fs::read(plan_path).with_context(|| format!("reading {:?}", plan_path))?;
    let partition_plan: serde_json::Value =
        serde_json::from_slice(&plan_bytes).with_context(|| format!("parsing plan {:?}", plan_path))?;

    info!(table = %logical_schema.table_name, "building table");
    client.build_table(logical_schema, partition_plan).await?;
    println!("ok");
    Ok(())
}

async fn write_row(client: &CoordinatorClient, table: &str, row_path: &PathBuf) -> Result<()> {
    let row_bytes = std::fs::read(row_path).with_context(|| format!("reading {:?}", row_path))?;
    let row: Row = serde_json::from_slice(&row_bytes).with_context(|| format!("parsing row {:?}", row_path))?;

    let row_id = client.fragment_write(table, row).await?;
    println!("{}", row_id);
    Ok(())
}

async fn join(client: &CoordinatorClient, tables: Vec<String>) -> Result<()> {
    info!(?tables, "joining");
    let dataset = client.join(tables).await?;
    println!("{}", serde_json::to_string_pretty(&dataset)?);
    Ok(())
}
