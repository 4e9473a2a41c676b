//! tenantlock server
//!
//! Serves license activation and validation for client installations,
//! tenant resolution for the web front end, and the admin API.
//!
//! Usage:
//!   TENANTLOCK_ADMIN_TOKEN=... tenantlock-server --port 8080 --database tenantlock.db

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tenantlock_server::{build_router, AppState};
use tenantlock_storage::Database;
use tenantlock_tenant::BASE_PLATFORM_DOMAIN;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tenantlock-server")]
#[command(about = "Multi-tenant license activation and tenant routing server")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// SQLite database path, or ":memory:"
    #[arg(short, long, default_value = "tenantlock.db")]
    database: PathBuf,

    /// Base platform domain written on first start if none is configured
    #[arg(long, default_value = "localhost:5173")]
    base_domain: String,

    /// Bearer token required by admin routes
    #[arg(long, env = "TENANTLOCK_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.to_string())),
        )
        .with_target(false)
        .compact()
        .init();

    info!("tenantlock server starting...");
    anyhow::ensure!(!args.admin_token.trim().is_empty(), "admin token must not be empty");

    let db = if args.database.as_os_str() == ":memory:" {
        Database::open_in_memory().context("Failed to open in-memory database")?
    } else {
        Database::open(&args.database)
            .with_context(|| format!("Failed to open database {}", args.database.display()))?
    };

    let state = Arc::new(AppState::new(db, args.admin_token.trim()));
    state
        .config
        .seed_default(
            BASE_PLATFORM_DOMAIN,
            &args.base_domain,
            Some("Base domain tenant subdomains are served under"),
        )
        .context("Failed to seed platform configuration")?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;

    println!("\n========================================");
    println!("  tenantlock server running");
    println!("========================================");
    println!("  HTTP Port: {}", args.port);
    println!("  Database:  {}", args.database.display());
    println!("========================================\n");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("tenantlock server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
