//! Configuration loading for giftai.
//!
//! Configuration comes from two places: an optional TOML file and the process
//! environment (including a `.env` file loaded by the binary). Credentials
//! missing from the file fall back to their conventional environment
//! variables, so a deployment with only environment variables needs no file.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Default chat model for the Groq provider.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
/// Default chat model for the Gemini provider.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Root configuration structure.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:5000")
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Directory holding the web client (`index.html`, `script.js`, ...)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_listen() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
        }
    }
}

/// API key wrapper that redacts in Debug/Display/Serialize and zeroizes on drop.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Access the raw key value. Every call site is auditable via `grep expose_secret`.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ApiKey::from)
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

/// How a credential was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Literal string in the config file
    Literal,
    /// Config value contained ${VAR} references expanded from environment
    EnvExpanded,
    /// Read from the conventional env var (holds var name)
    Convention(String),
    /// No usable value
    None,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Literal => write!(f, "config-literal"),
            KeySource::EnvExpanded => write!(f, "env-expanded"),
            KeySource::Convention(var) => write!(f, "convention ({})", var),
            KeySource::None => write!(f, "none"),
        }
    }
}

/// Credentials and endpoints for every upstream provider.
///
/// A `None` credential disables that provider for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub gemini_api_key: Option<ApiKey>,
    pub groq_api_key: Option<ApiKey>,
    pub freepik_api_key: Option<ApiKey>,
    pub veo_api_key: Option<ApiKey>,
    pub kling_access_key: Option<ApiKey>,
    pub kling_secret_key: Option<ApiKey>,
    pub groq_model: String,
    pub gemini_model: String,
    /// Base URL of the OpenAI-compatible Groq API
    pub groq_url: String,
    /// Base URL of the Gemini generative language API
    pub gemini_url: String,
    pub freepik_url: String,
    pub pollinations_url: String,
    /// Timeout for the Freepik image call, in seconds
    pub image_timeout_secs: u64,
}

fn default_groq_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_freepik_url() -> String {
    "https://api.freepik.com".to_string()
}

fn default_pollinations_url() -> String {
    "https://image.pollinations.ai".to_string()
}

fn default_image_timeout_secs() -> u64 {
    10
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            groq_api_key: None,
            freepik_api_key: None,
            veo_api_key: None,
            kling_access_key: None,
            kling_secret_key: None,
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            groq_url: default_groq_url(),
            gemini_url: default_gemini_url(),
            freepik_url: default_freepik_url(),
            pollinations_url: default_pollinations_url(),
            image_timeout_secs: default_image_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{var}' not set for '{key}': {message}")]
    EnvVar {
        var: String,
        key: String,
        message: String,
    },
}

/// Raw provider section deserialized directly from TOML.
/// Credential values may contain `${VAR}` references not yet expanded.
#[derive(Debug, Default, Deserialize)]
pub struct RawProvidersConfig {
    gemini_api_key: Option<String>,
    groq_api_key: Option<String>,
    freepik_api_key: Option<String>,
    veo_api_key: Option<String>,
    kling_access_key: Option<String>,
    kling_secret_key: Option<String>,
    groq_model: Option<String>,
    gemini_model: Option<String>,
    #[serde(default = "default_groq_url")]
    groq_url: String,
    #[serde(default = "default_gemini_url")]
    gemini_url: String,
    #[serde(default = "default_freepik_url")]
    freepik_url: String,
    #[serde(default = "default_pollinations_url")]
    pollinations_url: String,
    #[serde(default = "default_image_timeout_secs")]
    image_timeout_secs: u64,
}

/// Raw configuration deserialized directly from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    providers: Option<RawProvidersConfig>,
    #[serde(default)]
    logging: LoggingConfig,
}

/// Expand all `${VAR}` references in a string using a custom lookup function.
///
/// Fails on the first missing variable, unclosed `${`, or empty variable name.
fn expand_env_vars_with<F>(input: &str, key: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after.find('}').ok_or_else(|| ConfigError::EnvVar {
            var: "<unclosed>".to_string(),
            key: key.to_string(),
            message: format!("Unclosed '${{' in config value for '{}'", key),
        })?;

        let var_name = &after[..end];
        if var_name.is_empty() {
            return Err(ConfigError::EnvVar {
                var: String::new(),
                key: key.to_string(),
                message: "Empty variable name in '${}' reference".to_string(),
            });
        }

        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVar {
            var: var_name.to_string(),
            key: key.to_string(),
            message: format!("Environment variable '{}' is not set", var_name),
        })?;

        result.push_str(&value);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Resolve one credential from its config value or conventional env var.
///
/// Values are trimmed; an empty result counts as absent.
fn resolve_key<F>(
    key: &str,
    env_var: &str,
    raw: Option<String>,
    lookup: &F,
) -> Result<(Option<ApiKey>, KeySource), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (value, source) = match raw {
        Some(raw) if raw.contains("${") => {
            (expand_env_vars_with(&raw, key, lookup)?, KeySource::EnvExpanded)
        }
        Some(raw) => (raw, KeySource::Literal),
        None => match lookup(env_var) {
            Some(value) => (value, KeySource::Convention(env_var.to_string())),
            None => return Ok((None, KeySource::None)),
        },
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok((None, KeySource::None));
    }
    Ok((Some(ApiKey::from(trimmed)), source))
}

/// Non-secret setting with the same env fallback as credentials.
fn resolve_setting<F>(raw: Option<String>, env_var: &str, default: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    raw.or_else(|| lookup(env_var))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Convert raw (deserialized) config to the final config.
    ///
    /// Returns the config and how each credential was resolved.
    pub fn from_raw_with<F>(
        raw: RawConfig,
        lookup: F,
    ) -> Result<(Self, Vec<(String, KeySource)>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rp = raw.providers.unwrap_or_else(|| RawProvidersConfig {
            groq_url: default_groq_url(),
            gemini_url: default_gemini_url(),
            freepik_url: default_freepik_url(),
            pollinations_url: default_pollinations_url(),
            image_timeout_secs: default_image_timeout_secs(),
            ..Default::default()
        });

        let mut key_sources = Vec::with_capacity(6);
        let mut key = |name: &str, env_var: &str, value: Option<String>| {
            let (api_key, source) = resolve_key(name, env_var, value, &lookup)?;
            key_sources.push((name.to_string(), source));
            Ok::<_, ConfigError>(api_key)
        };

        let gemini_api_key = key("gemini_api_key", "GEMINI_API_KEY", rp.gemini_api_key)?;
        let groq_api_key = key("groq_api_key", "GROQ_API_KEY", rp.groq_api_key)?;
        let freepik_api_key = key("freepik_api_key", "FREEPIK_API_KEY", rp.freepik_api_key)?;
        let veo_api_key = key("veo_api_key", "VEO_API_KEY", rp.veo_api_key)?;
        let kling_access_key = key("kling_access_key", "KLING_ACCESS_KEY", rp.kling_access_key)?;
        let kling_secret_key = key("kling_secret_key", "KLING_SECRET_KEY", rp.kling_secret_key)?;

        let providers = ProvidersConfig {
            gemini_api_key,
            groq_api_key,
            freepik_api_key,
            veo_api_key,
            kling_access_key,
            kling_secret_key,
            groq_model: resolve_setting(rp.groq_model, "GROQ_MODEL", DEFAULT_GROQ_MODEL, &lookup),
            gemini_model: resolve_setting(
                rp.gemini_model,
                "GEMINI_MODEL",
                DEFAULT_GEMINI_MODEL,
                &lookup,
            ),
            groq_url: rp.groq_url,
            gemini_url: rp.gemini_url,
            freepik_url: rp.freepik_url,
            pollinations_url: rp.pollinations_url,
            image_timeout_secs: rp.image_timeout_secs,
        };

        let config = Config {
            server: raw.server,
            providers,
            logging: raw.logging,
        };
        config.validate()?;

        Ok((config, key_sources))
    }

    /// Parse a TOML string, resolving env references through `lookup`.
    pub fn parse_str_with<F>(
        content: &str,
        lookup: F,
    ) -> Result<(Self, Vec<(String, KeySource)>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = toml::from_str(content)?;
        Self::from_raw_with(raw, lookup)
    }

    /// Build the configuration from the process environment alone.
    pub fn from_env() -> Result<(Self, Vec<(String, KeySource)>), ConfigError> {
        Self::from_raw_with(RawConfig::default(), |name| std::env::var(name).ok())
    }

    /// Load a TOML file with `${VAR}` expansion and env fallbacks.
    pub fn from_file_with_env(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Vec<(String, KeySource)>), ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::parse_str_with(&content, |name| std::env::var(name).ok())
    }

    /// Load from `path` when given, otherwise from the environment.
    pub fn load(path: Option<&str>) -> Result<(Self, Vec<(String, KeySource)>), ConfigError> {
        match path {
            Some(path) => Self::from_file_with_env(path),
            None => Self::from_env(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.providers;
        for (name, url) in [
            ("groq_url", &p.groq_url),
            ("gemini_url", &p.gemini_url),
            ("freepik_url", &p.freepik_url),
            ("pollinations_url", &p.pollinations_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Validation(format!("'{}' is empty", name)));
            }
        }

        if p.image_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "image_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
