use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required env var: {0}")]
    MissingEnv(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub neynar: NeynarConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NeynarConfig {
    /// Neynar REST API base URL
    #[serde(default = "default_neynar_url")]
    pub base_url: String,
    /// API key - only ever loaded from env NEYNAR_API_KEY; a key in the
    /// config file is ignored.
    #[serde(skip)]
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Max addresses per bulk lookup request (the API's batch limit).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Max chunk requests in flight for a single resolve call.
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_neynar_url() -> String {
    "https://api.neynar.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_chunk_size() -> usize {
    50
}
fn default_max_concurrent_chunks() -> usize {
    4
}
fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NeynarConfig {
    fn default() -> Self {
        Self {
            base_url: default_neynar_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables for secrets.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Load a default config with env-only settings (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::parse("")?;
        config.with_env(|key| std::env::var(key).ok())
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(contents)?;
        config.resolver.chunk_size = config.resolver.chunk_size.max(1);
        config.resolver.max_concurrent_chunks = config.resolver.max_concurrent_chunks.max(1);
        Ok(config)
    }

    /// Overlay secrets and deployment settings from the environment, failing
    /// if the API key is still missing.
    fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = var("NEYNAR_API_KEY") {
            self.neynar.api_key = key;
        }
        if let Some(url) = var("NEYNAR_BASE_URL") {
            self.neynar.base_url = url;
        }
        if let Some(addr) = var("LAUNCHPAD_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.neynar.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnv("NEYNAR_API_KEY".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.neynar.base_url, "https://api.neynar.com");
        assert_eq!(config.neynar.timeout_secs, 10);
        assert_eq!(config.resolver.chunk_size, 50);
        assert_eq!(config.resolver.max_concurrent_chunks, 4);
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_file_and_clamping() {
        let config = Config::parse(
            r#"
            [resolver]
            chunk_size = 0

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.resolver.chunk_size, 1);
        assert_eq!(config.resolver.max_concurrent_chunks, 4);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let config = Config::parse("").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnv(ref name)) if name == "NEYNAR_API_KEY"
        ));

        let config = Config::parse("").unwrap();
        let result = config.with_env(|_| None);
        assert!(matches!(result, Err(ConfigError::MissingEnv(_))));
    }

    #[test]
    fn test_api_key_in_file_is_ignored() {
        let config = Config::parse("[neynar]\napi_key = \"NEYNAR_DEV\"").unwrap();
        assert!(config.neynar.api_key.is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overlays_file_settings() {
        let env = |key: &str| match key {
            "NEYNAR_API_KEY" => Some("NEYNAR_DEV".to_string()),
            "NEYNAR_BASE_URL" => Some("http://127.0.0.1:8080".to_string()),
            "LAUNCHPAD_BIND_ADDR" => Some("127.0.0.1:4000".to_string()),
            _ => None,
        };
        let config = Config::parse("[neynar]\nbase_url = \"https://file.example\"")
            .unwrap()
            .with_env(env)
            .unwrap();
        assert_eq!(config.neynar.api_key, "NEYNAR_DEV");
        assert_eq!(config.neynar.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.server.bind_addr, "127.0.0.1:4000");

        // Without NEYNAR_BASE_URL the file value stands.
        let config = Config::parse("[neynar]\nbase_url = \"https://file.example\"")
            .unwrap()
            .with_env(|key| (key == "NEYNAR_API_KEY").then(|| "NEYNAR_DEV".to_string()))
            .unwrap();
        assert_eq!(config.neynar.base_url, "https://file.example");
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(
            Config::parse("[resolver\nchunk_size = "),
            Err(ConfigError::Parse(_))
        ));
    }
}
