//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model: ModelConfig,
    pub server: ServerConfig,
}

/// Everything the model client needs. A `None` key disables the model path.
#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_prompt_length: usize,
    /// Directory for board documents; in-memory when unset.
    pub store_dir: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 20,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            max_prompt_length: 10_000,
            store_dir: None,
        }
    }
}

// Keeps the credential out of logs.
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Reads the process environment; load `.env` beforehand if wanted.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let model = ModelConfig {
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model.model),
            api_url: get("GEMINI_API_URL").unwrap_or(defaults.model.api_url),
            timeout_seconds: positive_or(
                "MODEL_TIMEOUT_SECONDS",
                parse_or(
                    "MODEL_TIMEOUT_SECONDS",
                    get("MODEL_TIMEOUT_SECONDS"),
                    defaults.model.timeout_seconds,
                ),
                defaults.model.timeout_seconds,
            ),
        };

        let server = ServerConfig {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.server.bind_addr),
            max_prompt_length: parse_or(
                "MAX_PROMPT_LENGTH",
                get("MAX_PROMPT_LENGTH"),
                defaults.server.max_prompt_length,
            ),
            store_dir: get("BOARD_STORE_DIR").map(PathBuf::from),
        };

        if model.api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; prompts will use the rule-based interpreter only");
        }

        Self { model, server }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "Unparseable setting, using default");
                default
            }
        },
    }
}

// A zero timeout would fail every model call before it starts.
fn positive_or(key: &str, value: u64, default: u64) -> u64 {
    if value == 0 {
        warn!(key, default, "Setting must be positive, using default");
        return default;
    }
    value
}
