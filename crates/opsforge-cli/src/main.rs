mod health;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use opsforge_ops::{register_operations, OpsConfig, ShellRunner};
use opsforge_tools::{Dispatcher, DispatcherConfig, McpServer, OperationCatalog};

/// opsforge -- infrastructure operations over MCP.
#[derive(Parser, Debug)]
#[command(name = "opsforge", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "opsforge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server on stdin/stdout
    Serve,

    /// Run the stateless health responder
    Health {
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Print the operation catalog as JSON
    ListOps,
}

fn build_catalog(config: OpsConfig) -> anyhow::Result<OperationCatalog> {
    let runner = Arc::new(ShellRunner::new(Duration::from_secs(
        config.command_timeout_secs,
    )));
    let catalog = OperationCatalog::new();
    register_operations(&catalog, runner, Arc::new(config))?;
    Ok(catalog)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with env filter (e.g., RUST_LOG=debug). Logs go
    // to stderr: stdout carries the JSON-RPC stream when serving.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = OpsConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let catalog = build_catalog(config)?;
            let dispatcher = Dispatcher::new(catalog, DispatcherConfig::default());
            let server = McpServer::new(dispatcher);
            tracing::info!("opsforge MCP server running on stdio");
            server
                .run(
                    tokio::io::BufReader::new(tokio::io::stdin()),
                    tokio::io::stdout(),
                )
                .await
        }
        Commands::Health { port } => health::serve(port).await,
        Commands::ListOps => {
            let catalog = build_catalog(config)?;
            println!("{}", serde_json::to_string_pretty(&catalog.list())?);
            Ok(())
        }
    }
}
