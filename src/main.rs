//! Book Finder API Server
//!
//! Run with: cargo run --bin bookfinder
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the default locations)
//! with environment overrides; see [`bookfinder::config`]. `RUST_LOG`
//! takes precedence over the configured log level.

use bookfinder::api::{serve, AppState};
use bookfinder::auth::TokenIssuer;
use bookfinder::config::{generate_default_config, Config, LoggingConfig};
use bookfinder::db::Database;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bookfinder")]
#[command(author, version, about = "Book Finder API server", long_about = None)]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    config.validate()?;

    init_tracing(&config.logging);

    tracing::info!("Starting Book Finder API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.database.path);

    let db = Arc::new(Database::open(&config.database.path)?);

    if let Some(seed_path) = &config.catalog.seed_path {
        match db.seed_catalog(Path::new(seed_path)).await {
            Ok(0) => {}
            Ok(inserted) => tracing::info!("Seeded {} books from {}", inserted, seed_path),
            Err(e) => tracing::warn!("Failed to seed catalog from {}: {}", seed_path, e),
        }
    }

    let secret = match &config.auth.jwt_secret {
        Some(secret) => secret.clone(),
        None => {
            tracing::warn!(
                "No JWT secret configured; using a random secret, sessions end on restart"
            );
            format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
        }
    };
    let tokens = Arc::new(TokenIssuer::new(secret.as_bytes(), config.auth.token_ttl_days));

    let state = AppState::new(db, tokens, config.server.clone());

    serve(state, &config.server).await?;

    tracing::info!("Book Finder API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bookfinder={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
