//! Bookline server binary.
//!
//! Serves the availability/booking API over HTTP. All cross-request
//! coordination happens through the database's transactional guarantees, so
//! multiple replicas may share one database file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use bookline_server::db::Database;
use bookline_server::http::{build_router, AppState};
use bookline_server::telemetry::init_tracing;
use bookline_server::webhook::WebhookSender;

#[derive(Parser, Debug)]
#[command(name = "bookline-server")]
#[command(version, about = "Bookline availability & booking service")]
struct Args {
    /// TCP bind address
    #[arg(long, default_value = "127.0.0.1:8080", env = "BOOKLINE_ADDR")]
    addr: SocketAddr,

    /// Database file path
    #[arg(long, default_value = "bookline.db", env = "BOOKLINE_DB_PATH")]
    db_path: PathBuf,

    /// Webhook delivery timeout in seconds
    #[arg(long, default_value_t = 5, env = "BOOKLINE_WEBHOOK_TIMEOUT")]
    webhook_timeout: u64,

    /// Emit JSON log lines instead of the human-readable format
    #[arg(long, env = "BOOKLINE_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("bookline_server=info", args.log_json);

    let db = Database::open(&args.db_path)
        .await
        .context("opening database")?;

    let state = AppState {
        db,
        webhooks: WebhookSender::new(Duration::from_secs(args.webhook_timeout)),
    };

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .context("binding listener")?;
    info!(addr = %args.addr, "bookline server listening");

    axum::serve(listener, build_router(state))
        .await
        .context("serving")?;

    Ok(())
}
