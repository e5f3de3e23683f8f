use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use tracing::{info, warn};

use crate::auth::{ServerAuthConfig, ServerState};
use crate::errors::StartupError;
use crate::routes;
use service::{
    chat::{openai::{OpenAiChatClient, OpenAiChatConfig}, ChatCompleter},
    file::memory_store::FileMemoryStore,
    memory::MemoryStore,
    runtime,
};

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Build the chat client when an API key is configured.
fn build_chat(cfg: &AppConfig) -> Result<Option<Arc<dyn ChatCompleter>>, StartupError> {
    let Some(api_key) = cfg.chat.api_key.clone() else {
        info!("no chat api key configured; /chat will answer 503");
        return Ok(None);
    };
    let client = OpenAiChatClient::new(OpenAiChatConfig {
        api_base: cfg.chat.api_base.clone(),
        api_key,
        model: cfg.chat.model.clone(),
        timeout: Duration::from_secs(cfg.chat.timeout_secs),
    })
    .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    info!(api_base = %cfg.chat.api_base, model = %cfg.chat.model, "chat completion enabled");
    Ok(Some(Arc::new(client)))
}

/// Assemble shared state from validated configuration.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    runtime::ensure_env(&cfg.memory.file)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let memory: Arc<dyn MemoryStore> = FileMemoryStore::new(&cfg.memory.file)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    if cfg.auth.secret().is_none() {
        warn!("no API key configured; memory and chat routes are unauthenticated");
    }

    Ok(ServerState {
        auth: ServerAuthConfig { api_key: cfg.auth.secret().map(str::to_string) },
        memory,
        chat: build_chat(cfg)?,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: build the app from validated config and serve until Ctrl+C.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, memory_file = %cfg.memory.file, "starting noah engine");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_without_secrets_disables_auth_and_chat() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("noah_startup_{}", uuid::Uuid::new_v4()));
        let mut cfg = AppConfig::default();
        cfg.memory.file = dir.join("memory.json").to_string_lossy().into_owned();

        let state = build_state(&cfg).await?;
        assert!(state.auth.api_key.is_none());
        assert!(state.chat.is_none());
        assert!(state.memory.list().await?.is_empty());
        assert!(tokio::fs::metadata(&cfg.memory.file).await.is_ok());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[test]
    fn bad_host_is_invalid_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
