//! Configuration handling for both utilities.
//!
//! Values come from environment variables (a `.env` file is loaded by the
//! binaries before calling [`Config::from_env`]) and fall back to the
//! public endpoints of the services we talk to. CLI flags override the
//! environment through the `with_*` builders.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Environment variable names.
pub const ENV_RAPID_API_KEY: &str = "RAPID_API_KEY";
pub const ENV_RAPID_API_HOST: &str = "RAPID_API_HOST";
pub const ENV_ARTICLE_API_URL: &str = "ARTICLE_API_URL";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const ENV_CLEAN_MODEL: &str = "CLEAN_MODEL";
pub const ENV_HTTP_MAX_ATTEMPTS: &str = "HTTP_MAX_ATTEMPTS";
pub const ENV_HTTP_BASE_BACKOFF_MS: &str = "HTTP_BASE_BACKOFF_MS";

const DEFAULT_RAPID_API_HOST: &str = "article-extractor2.p.rapidapi.com";
const DEFAULT_ARTICLE_API_URL: &str = "https://article-extractor2.p.rapidapi.com/article/parse";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_CLEAN_MODEL: &str = "claude-3-5-haiku-20241022";
const DEFAULT_HTTP_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_HTTP_BASE_BACKOFF_MS: u64 = 500;

/// Retry policy applied to calls against the extraction API and the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_HTTP_BASE_BACKOFF_MS),
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    rapid_api_key: Option<String>,
    rapid_api_host: String,
    article_api_url: String,
    anthropic_api_key: Option<String>,
    anthropic_base_url: String,
    clean_model: String,
    retry: RetryPolicy,
}

impl Config {
    /// Load from environment variables, falling back to the public defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_attempts = parse_var(ENV_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_HTTP_MAX_ATTEMPTS,
                reason: "must be at least 1".to_string(),
            });
        }
        let base_backoff_ms = parse_var(ENV_HTTP_BASE_BACKOFF_MS, DEFAULT_HTTP_BASE_BACKOFF_MS)?;

        Ok(Self {
            rapid_api_key: non_empty_var(ENV_RAPID_API_KEY),
            rapid_api_host: env::var(ENV_RAPID_API_HOST)
                .unwrap_or_else(|_| DEFAULT_RAPID_API_HOST.to_string()),
            article_api_url: env::var(ENV_ARTICLE_API_URL)
                .unwrap_or_else(|_| DEFAULT_ARTICLE_API_URL.to_string()),
            anthropic_api_key: non_empty_var(ENV_ANTHROPIC_API_KEY),
            anthropic_base_url: env::var(ENV_ANTHROPIC_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            clean_model: env::var(ENV_CLEAN_MODEL)
                .unwrap_or_else(|_| DEFAULT_CLEAN_MODEL.to_string()),
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(base_backoff_ms),
            },
        })
    }

    /// Override the RapidAPI key (e.g. from `--api-key`). `None` keeps the
    /// environment value.
    pub fn with_rapid_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.rapid_api_key = Some(key);
        }
        self
    }

    pub fn with_anthropic_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.anthropic_api_key = Some(key);
        }
        self
    }

    pub fn with_clean_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.clean_model = model;
        }
        self
    }

    pub fn with_article_api_url(mut self, url: impl Into<String>) -> Self {
        self.article_api_url = url.into();
        self
    }

    pub fn with_anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.anthropic_base_url = url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn rapid_api_key(&self) -> Option<&str> {
        self.rapid_api_key.as_deref()
    }

    /// The RapidAPI key, or an error naming both ways to provide it.
    pub fn require_rapid_api_key(&self) -> Result<&str, ConfigError> {
        self.rapid_api_key().ok_or(ConfigError::Missing {
            what: "RapidAPI key",
            hint: "set RAPID_API_KEY or pass --api-key",
        })
    }

    pub fn rapid_api_host(&self) -> &str {
        &self.rapid_api_host
    }
    pub fn article_api_url(&self) -> &str {
        &self.article_api_url
    }

    pub fn anthropic_api_key(&self) -> Option<&str> {
        self.anthropic_api_key.as_deref()
    }

    pub fn require_anthropic_api_key(&self) -> Result<&str, ConfigError> {
        self.anthropic_api_key().ok_or(ConfigError::Missing {
            what: "Anthropic API key",
            hint: "set ANTHROPIC_API_KEY",
        })
    }

    pub fn anthropic_base_url(&self) -> &str {
        &self.anthropic_base_url
    }
    /// Model used by the clean utility.
    pub fn clean_model(&self) -> &str {
        &self.clean_model
    }
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

impl Default for Config {
    /// Public defaults with no keys (mirrors `from_env` with an empty
    /// environment).
    fn default() -> Self {
        Self {
            rapid_api_key: None,
            rapid_api_host: DEFAULT_RAPID_API_HOST.to_string(),
            article_api_url: DEFAULT_ARTICLE_API_URL.to_string(),
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            clean_model: DEFAULT_CLEAN_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                field: key,
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building or consulting a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{what} is required: {hint}")]
    Missing {
        what: &'static str,
        hint: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_RAPID_API_KEY,
            ENV_RAPID_API_HOST,
            ENV_ARTICLE_API_URL,
            ENV_ANTHROPIC_API_KEY,
            ENV_ANTHROPIC_BASE_URL,
            ENV_CLEAN_MODEL,
            ENV_HTTP_MAX_ATTEMPTS,
            ENV_HTTP_BASE_BACKOFF_MS,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.rapid_api_key().is_none());
        assert_eq!(cfg.rapid_api_host(), DEFAULT_RAPID_API_HOST);
        assert_eq!(cfg.clean_model(), DEFAULT_CLEAN_MODEL);
        assert_eq!(cfg.retry().max_attempts, 3);
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_RAPID_API_KEY, "rapid-key");
            env::set_var(ENV_ANTHROPIC_API_KEY, "anthropic-key");
            env::set_var(ENV_CLEAN_MODEL, "claude-test");
            env::set_var(ENV_HTTP_MAX_ATTEMPTS, "5");
            env::set_var(ENV_HTTP_BASE_BACKOFF_MS, "10");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.rapid_api_key(), Some("rapid-key"));
        assert_eq!(cfg.anthropic_api_key(), Some("anthropic-key"));
        assert_eq!(cfg.clean_model(), "claude-test");
        assert_eq!(cfg.retry().max_attempts, 5);
        assert_eq!(cfg.retry().base_delay, Duration::from_millis(10));
        clear_env();
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_HTTP_MAX_ATTEMPTS, "lots");
        }
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: ENV_HTTP_MAX_ATTEMPTS,
                ..
            }
        ));

        unsafe {
            env::set_var(ENV_HTTP_MAX_ATTEMPTS, "0");
        }
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    fn cli_key_wins_over_env() {
        let cfg = Config::default().with_rapid_api_key(Some("from-flag".into()));
        assert_eq!(cfg.require_rapid_api_key().unwrap(), "from-flag");

        let cfg = Config::default().with_rapid_api_key(None);
        let err = cfg.require_rapid_api_key().unwrap_err();
        assert!(err.to_string().contains("RAPID_API_KEY"));
    }
}
