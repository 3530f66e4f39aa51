//! Drawing-instruction interpreter and whiteboard session store.

pub mod api;
pub mod config;
pub mod interpret;
pub mod shapes;
pub mod store;

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::{router, AppState};
use crate::config::Config;
use crate::interpret::{Interpreter, LlmClient};
use crate::store::{DocumentStore, FileStore, MemoryStore};

const DEFAULT_LOG_FILTER: &str = "drawboard=info,drawboard_lib=info,tower_http=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Assembles the shared handler state from configuration.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let llm = LlmClient::from_config(&config.model).context("Failed to create model client")?;

    let store: Arc<dyn DocumentStore> = match &config.server.store_dir {
        Some(dir) => {
            let store = FileStore::open(dir)
                .await
                .with_context(|| format!("Failed to open board store at {}", dir.display()))?;
            info!(root = %store.root().display(), "Using file board store");
            Arc::new(store)
        }
        None => {
            info!("Using in-memory board store");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(AppState {
        interpreter: Arc::new(Interpreter::new(llm)),
        store,
        max_prompt_length: config.server.max_prompt_length,
    })
}

pub async fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    info!(model = ?config.model, "Configuration loaded");

    let state = build_state(&config).await?;
    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_state_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.server.store_dir = Some(dir.path().join("boards"));

        let state = build_state(&config).await.unwrap();
        assert_eq!(state.store.name(), "file");
        assert!(dir.path().join("boards").is_dir());
    }

    #[tokio::test]
    async fn builds_state_in_memory_by_default() {
        let state = build_state(&Config::default()).await.unwrap();
        assert_eq!(state.store.name(), "memory");
        assert_eq!(state.max_prompt_length, 10_000);
    }
}
