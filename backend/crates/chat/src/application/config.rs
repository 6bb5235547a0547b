//! Application Configuration
//!
//! Per-session policy ([`ChatConfig`]) and the memoized API configuration
//! loader ([`ApiConfigLoader`]).

use kernel::error::app_error::{AppError, AppResult, OptionExt, ResultExt};
use kernel::error::kind::ErrorKind;
use moka::sync::Cache;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::history::DEFAULT_MAX_HISTORY;
use crate::domain::value_objects::{ApiConfig, MAX_INPUT_LENGTH, MIN_INPUT_LENGTH, Temperature};

/// Default completion endpoint
pub const DEFAULT_API_URL: &str = "https://api.grok.x.ai/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "grok-2-latest";

/// Fixed system persona
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// How long a resolved API configuration is reused
pub const API_CONFIG_TTL: Duration = Duration::from_secs(3600);

/// Chat session configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Rate limit: max requests per minute
    pub minute_limit: u32,
    /// Rate limit: max requests per hour
    pub hour_limit: u32,
    /// Conversation entries kept per session
    pub max_history: usize,
    /// Sampling temperature sent with every request
    pub temperature: Temperature,
    /// Upper bound on one upstream call
    pub request_timeout: Duration,
    /// System message prepended to every query
    pub system_prompt: String,
    /// Input length bounds (characters)
    pub min_input_length: usize,
    pub max_input_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            minute_limit: platform::rate_limit::DEFAULT_MINUTE_LIMIT,
            hour_limit: platform::rate_limit::DEFAULT_HOUR_LIMIT,
            max_history: DEFAULT_MAX_HISTORY,
            temperature: Temperature::DEFAULT,
            request_timeout: Duration::from_secs(30),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            min_input_length: MIN_INPUT_LENGTH,
            max_input_length: MAX_INPUT_LENGTH,
        }
    }
}

impl ChatConfig {
    /// Load overrides from `CHAT_*` environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let temperature = match lookup("CHAT_TEMPERATURE") {
            Some(raw) => {
                let value = parse_value::<f32>("CHAT_TEMPERATURE", &raw)?;
                Temperature::new(value).ok_or_app_err(
                    ErrorKind::BadRequest,
                    format!(
                        "CHAT_TEMPERATURE must be between {} and {}",
                        Temperature::MIN,
                        Temperature::MAX
                    ),
                )?
            }
            None => defaults.temperature,
        };

        Ok(Self {
            minute_limit: parse_or(&lookup, "CHAT_MINUTE_LIMIT", defaults.minute_limit)?,
            hour_limit: parse_or(&lookup, "CHAT_HOUR_LIMIT", defaults.hour_limit)?,
            max_history: parse_or(&lookup, "CHAT_MAX_HISTORY", defaults.max_history)?,
            temperature,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CHAT_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            ..defaults
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .map_app_err(ErrorKind::BadRequest, format!("Invalid value for {}: {:?}", key, raw))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

// ============================================================================
// API configuration
// ============================================================================

/// Resolve the API configuration from `GROK_*` environment variables
pub fn api_config_from_env() -> AppResult<ApiConfig> {
    api_config_from_lookup(|key| std::env::var(key).ok())
}

/// Resolve the API configuration through an arbitrary key lookup
pub fn api_config_from_lookup<F>(lookup: F) -> AppResult<ApiConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let api_key = non_empty("GROK_API_KEY")
        .ok_or_app_err(
            ErrorKind::InternalServerError,
            "API key not found in environment variables",
        )
        .map_err(|e| e.with_action("Set GROK_API_KEY in the environment or a .env file"))?;
    let api_url = non_empty("GROK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let model = non_empty("GROK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

    tracing::debug!(api_url = %api_url, model = %model, "API configuration resolved");
    Ok(ApiConfig::new(api_key, api_url, model))
}

type ConfigSource = dyn Fn() -> AppResult<ApiConfig> + Send + Sync;

/// Memoizing wrapper around an API configuration source
///
/// Invalidation policy: a resolved value is reused for the TTL
/// (one hour by default), then the source is consulted again.
/// Failed resolutions are never cached.
#[derive(Clone)]
pub struct ApiConfigLoader {
    source: Arc<ConfigSource>,
    cache: Cache<(), ApiConfig>,
}

impl ApiConfigLoader {
    pub fn new<F>(source: F) -> Self
    where
        F: Fn() -> AppResult<ApiConfig> + Send + Sync + 'static,
    {
        Self::with_ttl(source, API_CONFIG_TTL)
    }

    pub fn with_ttl<F>(source: F, ttl: Duration) -> Self
    where
        F: Fn() -> AppResult<ApiConfig> + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Loader backed by the process environment
    pub fn from_env() -> Self {
        Self::new(api_config_from_env)
    }

    /// Loader that always yields the given configuration
    pub fn fixed(config: ApiConfig) -> Self {
        Self::new(move || Ok(config.clone()))
    }

    /// Cached configuration, resolving it if absent or expired
    pub fn load(&self) -> AppResult<ApiConfig> {
        self.cache
            .try_get_with((), || (self.source)())
            .map_err(|err: Arc<AppError>| {
                let mut app_err = AppError::new(err.kind(), err.message().to_owned());
                if let Some(action) = err.action() {
                    app_err = app_err.with_action(action.to_owned());
                }
                app_err.with_source(err)
            })
    }

    /// Drop the cached value so the next load hits the source
    pub fn invalidate(&self) {
        self.cache.invalidate(&());
    }
}

impl std::fmt::Debug for ApiConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfigLoader")
            .field("cached", &self.cache.contains_key(&()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_chat_config_defaults() {
        let config = ChatConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.minute_limit, 10);
        assert_eq!(config.hour_limit, 100);
        assert_eq!(config.max_history, 50);
        assert_eq!(config.temperature, Temperature::DEFAULT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.system_prompt, "You are a helpful AI assistant.");
    }

    #[test]
    fn test_chat_config_overrides() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("CHAT_MINUTE_LIMIT", "5"),
            ("CHAT_HOUR_LIMIT", " 20 "),
            ("CHAT_MAX_HISTORY", "10"),
            ("CHAT_TEMPERATURE", "0.2"),
            ("CHAT_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.minute_limit, 5);
        assert_eq!(config.hour_limit, 20);
        assert_eq!(config.max_history, 10);
        assert_eq!(config.temperature.value(), 0.2);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_chat_config_rejects_garbage() {
        let err = ChatConfig::from_lookup(lookup_from(&[("CHAT_MINUTE_LIMIT", "ten")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(err.message().contains("CHAT_MINUTE_LIMIT"));

        let err = ChatConfig::from_lookup(lookup_from(&[("CHAT_TEMPERATURE", "9.5")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_api_config_defaults() {
        let config = api_config_from_lookup(lookup_from(&[("GROK_API_KEY", "xai-123")])).unwrap();
        assert_eq!(config.api_key(), "xai-123");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_api_config_missing_key() {
        let err = api_config_from_lookup(lookup_from(&[("GROK_API_KEY", "  ")])).unwrap_err();
        assert!(err.is_server_error());
        assert!(err.action().is_some());
    }

    #[test]
    fn test_loader_memoizes_within_ttl() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = ApiConfigLoader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ApiConfig::new("k", "http://localhost", "m"))
        });

        loader.load().unwrap();
        loader.load().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        loader.invalidate();
        loader.load().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_loader_reloads_after_ttl() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = ApiConfigLoader::with_ttl(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ApiConfig::new("k", "http://localhost", "m"))
            },
            Duration::from_millis(20),
        );

        loader.load().unwrap();
        std::thread::sleep(Duration::from_millis(60));
        loader.load().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_loader_does_not_cache_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = ApiConfigLoader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AppError::internal("API key not found").with_action("Set GROK_API_KEY"))
        });

        let err = loader.load().unwrap_err();
        assert_eq!(err.action(), Some("Set GROK_API_KEY"));
        assert!(loader.load().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_loader_failure_keeps_cause() {
        let loader = ApiConfigLoader::new(|| {
            let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
            Err(AppError::internal("Failed to read API configuration").with_source(io_err))
        });

        let err = loader.load().unwrap_err();
        assert_eq!(err.message(), "Failed to read API configuration");

        let root = std::iter::successors(std::error::Error::source(&err), |&e| e.source()).last();
        assert_eq!(root.map(ToString::to_string).as_deref(), Some("no such file"));
    }
}
