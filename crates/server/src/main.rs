mod api;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use bidboard_athena::{AthenaClient, AthenaConfig, RowSource};
use bidboard_core::Config;
use bidboard_shape::{validate_limit, Limit, ResourceKind};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::state::AppState;

/// Bid board backend: warehouse-backed listing API.
#[derive(Parser, Debug)]
#[command(name = "bidboard-server", version, about = "Bid board listing API over Athena")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Print the SQL a listing would run
    Sql {
        /// evaluations, announcements, companies, orderers or partners
        resource: ResourceKind,
        /// Same rules as the `limit` query parameter
        #[arg(long)]
        limit: Option<String>,
    },
    /// Run one listing against Athena and print the JSON
    Fetch {
        resource: ResourceKind,
        #[arg(long)]
        limit: Option<String>,
    },
}

fn load_config() -> anyhow::Result<Config> {
    bidboard_core::config::load_dotenv();
    let config = Config::from_env();
    config.validate()?;
    Ok(config)
}

fn parse_limit(raw: Option<&str>) -> anyhow::Result<Limit> {
    validate_limit(raw).with_context(|| format!("--limit {:?}", raw.unwrap_or_default()))
}

async fn connect_athena() -> anyhow::Result<AthenaClient> {
    let athena = AthenaConfig::from_env();
    athena.log_summary();
    if !athena.is_configured() {
        warn!("ATHENA_OUTPUT_LOCATION not set, using the default results bucket");
    }
    AthenaClient::new(athena)
        .await
        .context("failed to initialise Athena client")
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let client = connect_athena().await?;
    let source: Arc<dyn RowSource> = Arc::new(client);
    let state = Arc::new(AppState::new(source, config.warehouse.table_prefix.clone()));

    let cors = router::cors_layer(&config.server.cors_origin)?;
    let app = router::build_router(state, cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn fetch(config: &Config, kind: ResourceKind, limit: Limit) -> anyhow::Result<()> {
    let client = connect_athena().await?;
    let sql = kind.render_query(&config.warehouse.table_prefix, limit);
    let rows = client.fetch_rows(&sql).await?;
    let json = kind.shape_json(rows, limit)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            config.log_summary();
            serve(&config).await?;
        }
        Command::Sql { resource, limit } => {
            let limit = parse_limit(limit.as_deref())?;
            println!("{}", resource.render_query(&config.warehouse.table_prefix, limit));
        }
        Command::Fetch { resource, limit } => {
            let limit = parse_limit(limit.as_deref())?;
            fetch(&config, resource, limit).await?;
        }
    }

    Ok(())
}
