use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Location of the JSON file backing the memory store.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_file")]
    pub file: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { file: default_memory_file() }
    }
}

/// Shared secret checked against the `X-API-Key` header.
/// `None` (or blank) disables the check.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_memory_file() -> String { "data/memory.json".into() }
fn default_api_base() -> String { "https://api.openai.com/v1".into() }
fn default_model() -> String { "gpt-4o-mini".into() }
fn default_timeout() -> u64 { 30 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is missing, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_from_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_from_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source. Blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(file) = get("MEMORY_FILE") {
            self.memory.file = file;
        }
        if let Some(key) = get("NOAH_API_KEY") {
            self.auth.api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.chat.api_key = Some(key);
        }
        if let Some(base) = get("OPENAI_API_BASE") {
            self.chat.api_base = base;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.chat.model = model;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.memory.validate()?;
        self.auth.normalize();
        self.chat.normalize_and_validate()?;
        Ok(())
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .map(|e| e.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl MemoryConfig {
    fn validate(&self) -> Result<()> {
        if self.file.trim().is_empty() {
            return Err(anyhow!("memory.file must not be empty"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn normalize(&mut self) {
        if self.api_key.as_deref().map(str::trim).map_or(false, str::is_empty) {
            self.api_key = None;
        }
    }

    /// The configured shared secret, if authentication is enabled.
    pub fn secret(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl ChatConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        if self.api_key.as_deref().map(str::trim).map_or(false, str::is_empty) {
            self.api_key = None;
        }
        let base = self.api_base.trim().trim_end_matches('/').to_string();
        let lower = base.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("chat.api_base must start with http:// or https://"));
        }
        self.api_base = base;
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("chat.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_partial_toml_with_defaults() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [auth]
            api_key = "s3cret"
            "#,
        )?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.memory.file, "data/memory.json");
        assert_eq!(cfg.auth.secret(), Some("s3cret"));
        assert_eq!(cfg.chat.model, "gpt-4o-mini");
        assert!(cfg.chat.api_key.is_none());
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let vars: HashMap<&str, &str> = [
            ("SERVER_PORT", "7001"),
            ("MEMORY_FILE", "/tmp/noah.json"),
            ("NOAH_API_KEY", "from-env"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.apply_env_with(|name| vars.get(name).map(|v| v.to_string()));
        cfg.normalize_and_validate()?;

        assert_eq!(cfg.server.port, 7001);
        assert_eq!(cfg.memory.file, "/tmp/noah.json");
        assert_eq!(cfg.auth.secret(), Some("from-env"));
        assert_eq!(cfg.chat.api_key.as_deref(), Some("sk-test"));
        // blank values are ignored
        assert_eq!(cfg.chat.model, "gpt-4o-mini");
        Ok(())
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.chat.api_base = "ftp://example.com".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.memory.file = " ".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_secret_disables_auth() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.auth.api_key = Some("   ".into());
        cfg.server.host = "".into();
        cfg.chat.api_base = "https://llm.example.com/v1/".into();
        cfg.normalize_and_validate()?;
        assert!(cfg.auth.secret().is_none());
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.chat.api_base, "https://llm.example.com/v1");
        Ok(())
    }

    #[test]
    fn load_from_missing_file_is_not_found() {
        let path = std::env::temp_dir().join(format!("noah_cfg_{}.toml", uuid::Uuid::new_v4()));
        let err = load_from_file(&path.to_string_lossy()).unwrap_err();
        assert!(is_not_found(&err));
    }
}
