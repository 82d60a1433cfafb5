use anyhow::Context as _;
use createmate_llm::{ModelConfig, RetryPolicy};
use createmate_orchestrator::{AgentSeeds, RuntimeConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Contents of `createmate.toml`.
#[derive(Debug, Deserialize)]
pub struct CreateMateConfig {
    /// Model provider and credentials.
    #[serde(default = "default_model")]
    pub model: ModelConfig,
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Where documents are persisted.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Seed phrases for every agent address.
    #[serde(default)]
    pub agents: AgentSeeds,
    /// Bus and worker tuning.
    #[serde(default)]
    pub runtime: RuntimeOptions,
}

/// REST API listener.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Keep documents in memory only.
    Memory,
    /// One JSON file per collection under `data_dir`.
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            other => anyhow::bail!("Unknown storage backend '{other}' (expected memory or file)"),
        }
    }
}

/// Document store settings.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Which backend to open.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Directory used by the file backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

/// Runtime options exposed in the config file.
#[derive(Debug, Deserialize)]
pub struct RuntimeOptions {
    /// Seconds the REST API waits for the coordinator.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// Pending envelopes each mailbox can hold.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Run generated posts through the title and paragraph formatter.
    #[serde(default)]
    pub format_output: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            query_timeout_secs: default_query_timeout_secs(),
            mailbox_capacity: default_mailbox_capacity(),
            format_output: false,
        }
    }
}

fn default_model() -> ModelConfig {
    ModelConfig::gemini("")
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_query_timeout_secs() -> u64 {
    RuntimeConfig::default().query_timeout_secs
}

fn default_mailbox_capacity() -> usize {
    RuntimeConfig::default().mailbox_capacity
}

impl CreateMateConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read `path`, falling back to defaults when the file does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Self::from_toml("");
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    /// Apply environment overrides. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.model.api_key = key;
        }
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("API_PORT must be a port number, got '{port}'"))?;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }

        let max_retries = lookup("MAX_RETRIES")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("MAX_RETRIES must be a non-negative integer")?;
        let retry_delay = lookup("RETRY_DELAY")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("RETRY_DELAY must be a whole number of seconds")?;
        if max_retries.is_some() || retry_delay.is_some() {
            let policy = self.model.retry_policy.get_or_insert_with(RetryPolicy::default);
            if let Some(n) = max_retries {
                policy.max_retries = n;
            }
            if let Some(secs) = retry_delay {
                policy.backoff_base_ms = secs.saturating_mul(1000);
                policy.backoff_max_ms = policy.backoff_max_ms.max(policy.backoff_base_ms);
            }
        }

        let seeds = [
            ("MAIN_COORDINATOR_SEED", &mut self.agents.coordinator),
            ("SCHEDULING_AGENT_SEED", &mut self.agents.scheduler),
            ("TOPIC_SUGGESTION_AGENT_SEED", &mut self.agents.topics),
            ("CONTENT_GENERATION_AGENT_SEED", &mut self.agents.content),
            ("STORAGE_AGENT_SEED", &mut self.agents.storage),
        ];
        for (var, seed) in seeds {
            if let Some(value) = lookup(var) {
                *seed = value;
            }
        }
        Ok(())
    }

    /// The orchestrator runtime settings derived from this config.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            seeds: self.agents.clone(),
            query_timeout_secs: self.runtime.query_timeout_secs,
            mailbox_capacity: self.runtime.mailbox_capacity,
            format_output: self.runtime.format_output,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use createmate_llm::LlmProvider;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = CreateMateConfig::from_toml("").unwrap();
        assert_eq!(config.model.provider, LlmProvider::Gemini);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.runtime.query_timeout_secs, 30);
        assert_eq!(config.agents, AgentSeeds::default());
    }

    #[test]
    fn test_full_config() {
        let raw = r#"
[model]
provider = "groq"
model_id = "llama-3.3-70b-versatile"
api_key = "gsk"

[server]
port = 9000
cors_origins = ["http://localhost:3000"]

[storage]
backend = "memory"

[agents]
storage = "my_storage_seed"

[runtime]
format_output = true
query_timeout_secs = 10
"#;
        let config = CreateMateConfig::from_toml(raw).unwrap();
        assert_eq!(config.model.provider, LlmProvider::Groq);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.agents.storage, "my_storage_seed");
        assert_eq!(config.agents.coordinator, "main_coordinator_secret_seed_phrase");

        let runtime = config.runtime_config();
        assert!(runtime.format_output);
        assert_eq!(runtime.query_timeout_secs, 10);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CreateMateConfig::from_toml("").unwrap();
        config
            .apply_env(env(&[
                ("GEMINI_API_KEY", "AIza-test"),
                ("API_PORT", "8080"),
                ("STORAGE_BACKEND", "memory"),
                ("MAX_RETRIES", "5"),
                ("RETRY_DELAY", "5"),
                ("SCHEDULING_AGENT_SEED", "custom"),
            ]))
            .unwrap();

        assert_eq!(config.model.api_key, "AIza-test");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        let policy = config.model.retry_policy.unwrap();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.backoff_base_ms, 5000);
        assert!(policy.backoff_max_ms >= 5000);
        assert_eq!(config.agents.scheduler, "custom");
    }

    #[test]
    fn test_bad_env_values_rejected() {
        let mut config = CreateMateConfig::from_toml("").unwrap();
        assert!(config.apply_env(env(&[("API_PORT", "eighty")])).is_err());
        assert!(config.apply_env(env(&[("STORAGE_BACKEND", "mongo")])).is_err());
        assert!(config.apply_env(env(&[("MAX_RETRIES", "-1")])).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CreateMateConfig::load(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[tokio::test]
    async fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("createmate.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"").unwrap();
        let err = CreateMateConfig::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
