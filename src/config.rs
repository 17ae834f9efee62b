use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_HOST_BASE: &str = "http://localhost:3000/api/v1";
const DEFAULT_COMPLETION_BASE: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BIND: &str = "0.0.0.0:8082";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Host API token missing (set GITEA_TOKEN or mount /run/secrets/gitea_token)")]
    MissingHostToken,
}

/// Top-level configuration loaded from .pr-reviewer.toml.
///
/// All fields are optional. Secrets are normally supplied through the
/// environment or mounted secret files rather than written here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. "0.0.0.0:8082"
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    /// REST API root of the git-hosting server, e.g. "https://git.example.com/api/v1"
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret configured on the webhook. Empty means unsigned deliveries are accepted.
    pub secret: Option<String>,
    pub secret_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_key_file: Option<PathBuf>,
}

/// Values resolved for a single request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host_base_url: String,
    pub host_token: String,
    pub webhook_secret: String,
    pub completion_base_url: String,
    pub model: String,
    pub completion_api_key: Option<String>,
}

/// Source of [`Settings`]. Implementations may re-read secrets on every call.
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> Result<Settings, ConfigError>;
}

impl SettingsProvider for Config {
    fn settings(&self) -> Result<Settings, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }
}

impl Config {
    /// Load configuration from .pr-reviewer.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-reviewer.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve every value: environment first, then this file's values,
    /// then secret files.
    pub fn resolve_with<F>(&self, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| non_empty(env(name).as_deref());

        let host_token = env("GITEA_TOKEN")
            .or_else(|| non_empty(self.host.token.as_deref()))
            .or_else(|| read_secret(self.host.token_file.as_deref()))
            .or_else(|| read_secret(Some(Path::new("/run/secrets/gitea_token"))))
            .ok_or(ConfigError::MissingHostToken)?;

        let webhook_secret = env("WEBHOOK_SECRET")
            .or_else(|| non_empty(self.webhook.secret.as_deref()))
            .or_else(|| read_secret(self.webhook.secret_file.as_deref()))
            .or_else(|| read_secret(Some(Path::new("/run/secrets/webhook_secret"))))
            .unwrap_or_default();

        let completion_api_key = env("OPENAI_API_KEY")
            .or_else(|| non_empty(self.completion.api_key.as_deref()))
            .or_else(|| read_secret(self.completion.api_key_file.as_deref()))
            .or_else(|| read_secret(Some(Path::new("/run/secrets/openai_api_key"))));

        let host_base_url = env("GITEA_BASE")
            .or_else(|| non_empty(self.host.base_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_HOST_BASE.to_string());

        let completion_base_url = env("OPENAI_BASE")
            .or_else(|| non_empty(self.completion.base_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_COMPLETION_BASE.to_string());

        let model = env("OPENAI_MODEL")
            .or_else(|| non_empty(self.completion.model.as_deref()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Settings {
            host_base_url: host_base_url.trim_end_matches('/').to_string(),
            host_token,
            webhook_secret,
            completion_base_url: completion_base_url.trim_end_matches('/').to_string(),
            model,
            completion_api_key,
        })
    }

    pub fn bind(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read a mounted secret file. Missing or empty files count as absent.
fn read_secret(path: Option<&Path>) -> Option<String> {
    let contents = fs::read_to_string(path?).ok()?;
    non_empty(Some(&contents))
}
