use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file searched for next to the binary when no --config is given.
pub const DEFAULT_CONFIG_PATH: &str = "opora.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Gemini API key; the GEMINI_API_KEY / GOOGLE_API_KEY env vars win
    /// when this is unset.
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// History bound per session; oldest turns are evicted first.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    /// Prior turns sent to the backend as context.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Optional TOML rule-set file replacing the built-in crisis rules.
    pub path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_turns() -> usize {
    20
}

fn default_context_turns() -> usize {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            context_turns: default_context_turns(),
        }
    }
}

impl Config {
    /// Load from an explicit path (must exist), or from `opora.toml` in the
    /// working directory, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::from_file(explicit),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::io::Write;

    #[test]
    fn defaults_match_the_deployment() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.backend.model, "gemini-1.5-flash");
        assert!((config.backend.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.session.max_turns, 20);
        assert_eq!(config.session.context_turns, 10);
        assert!(config.rules.path.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 8080

[backend]
model = "gemini-pro"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.backend.model, "gemini-pro");
        assert_eq!(config.session.max_turns, 20);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        assert!(Config::load(Some(std::path::Path::new("/nonexistent/opora.toml"))).is_err());
    }
}
