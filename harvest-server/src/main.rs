//! HarvestHub development server.
//!
//! Serves the HTTP API over an in-memory document store, optionally seeded
//! from a JSON file of the form `{"farmers": [...], "traders": [...]}`.
//! One-time codes are not delivered anywhere; they are written to the log.
//!
//! Usage:
//!   harvest-server --port 8080 --seed seed.json

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use harvest_core::{
    CoreConfig, CoreServices, MemoryVerifier, PhoneVerifier, VerificationId, VerifierError,
};
use harvest_server::{AppState, build_router};
use harvest_store::MemoryStore;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "harvest-server")]
#[command(about = "HarvestHub HTTP API over an in-memory store")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// JSON file to seed the store from
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Records returned by district listings when no limit is given
    #[arg(long, default_value = "5")]
    popular_limit: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Memory verifier that logs each issued code.
struct LoggedVerifier {
    inner: MemoryVerifier,
}

#[async_trait]
impl PhoneVerifier for LoggedVerifier {
    async fn send_code(&self, phone_number: &str) -> Result<VerificationId, VerifierError> {
        let id = self.inner.send_code(phone_number).await?;
        if let Some(code) = self.inner.issued_code(&id) {
            info!("One-time code for {}: {} ({})", phone_number, code, id);
        }
        Ok(id)
    }

    async fn confirm(
        &self,
        id: &VerificationId,
        code: &str,
    ) -> Result<Option<String>, VerifierError> {
        self.inner.confirm(id, code).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("HarvestHub server starting...");
    let store = match &args.seed {
        Some(path) => load_seed(path)?,
        None => MemoryStore::new(),
    };

    let config = CoreConfig {
        popular_limit: args.popular_limit,
        ..CoreConfig::default()
    };
    let verifier = LoggedVerifier {
        inner: MemoryVerifier::new(config.code_length),
    };
    let services = CoreServices::new(Arc::new(store), Arc::new(verifier), config);
    let state = Arc::new(AppState::new(services));
    let app = build_router(state.clone());

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server failed")?;

    state.services.shutdown();
    info!("HarvestHub server stopped");
    Ok(())
}

fn load_seed(path: &PathBuf) -> Result<MemoryStore> {
    info!("Seeding store from {:?}", path);
    let text = fs::read_to_string(path).context("Failed to read seed file")?;
    let seed: serde_json::Value = serde_json::from_str(&text).context("Seed file is not JSON")?;
    MemoryStore::from_seed(seed).context("Failed to load seed")
}
