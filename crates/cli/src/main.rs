//! `rooms-service` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`: start the API server.
//! - `migrate`: run pending database migrations.
//! - `add-building`: register a building so rooms can be created under it.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use db::{DocumentStore, MemoryStore, PgStore};
use rooms::{Building, RoomService};

#[derive(Parser)]
#[command(
    name = "rooms-service",
    about = "Room management for campus buildings",
    version
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, env = "ROOMS_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Process-local store; data is lost on exit.
    Memory,
    /// Postgres `documents` table.
    Postgres,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "ROOMS_BIND", default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, env = "ROOMS_STORE", value_enum, default_value_t = StoreKind::Memory)]
        store: StoreKind,
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
        #[arg(long, env = "ROOMS_DB_MAX_CONNECTIONS", default_value_t = 10)]
        max_connections: u32,
        /// Omit store failure details from 500 responses.
        #[arg(long, env = "ROOMS_REDACT_ERRORS")]
        redact_errors: bool,
        /// Building codes to register at start-up (memory store only).
        #[arg(long = "seed-building", value_name = "CODE")]
        seed_buildings: Vec<String>,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Register a building in the Postgres store.
    AddBuilding {
        #[arg(long)]
        code: String,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve {
            bind,
            store,
            database_url,
            max_connections,
            redact_errors,
            seed_buildings,
        } => {
            let kind = store;
            let store: Arc<dyn DocumentStore> = match kind {
                StoreKind::Memory => {
                    let memory = Arc::new(MemoryStore::new());
                    for code in &seed_buildings {
                        rooms::insert_building(memory.as_ref(), &Building::new(code.as_str()))
                            .await
                            .with_context(|| format!("failed to seed building {code}"))?;
                    }
                    memory
                }
                StoreKind::Postgres => {
                    if !seed_buildings.is_empty() {
                        warn!("--seed-building is ignored for the postgres store; use add-building");
                    }
                    let url = database_url.context("--database-url is required for the postgres store")?;
                    let pool = db::pool::create_pool(&url, max_connections)
                        .await
                        .context("failed to connect to database")?;
                    Arc::new(PgStore::new(pool))
                }
            };

            info!("Starting API server on {bind} ({kind:?} store)");
            let state = api::AppState::new(RoomService::new(store)).with_redacted_errors(redact_errors);
            api::serve(&bind, state).await?;
        }
        Command::Migrate { database_url } => {
            info!("Running migrations");
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::AddBuilding { code, database_url } => {
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .context("failed to connect to database")?;
            let store = PgStore::new(pool);
            let id = rooms::insert_building(&store, &Building::new(code.as_str()))
                .await
                .with_context(|| format!("failed to add building {code}"))?;
            println!("building {code} added with id {id}");
        }
    }

    Ok(())
}
