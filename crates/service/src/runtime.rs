//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the memory file's directory exists.
pub async fn ensure_env(memory_file: &str) -> anyhow::Result<()> {
    common::env::ensure_env(memory_file).await
}
