//! Runtime configuration.
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no file)
//! is a valid configuration:
//!
//! ```yaml
//! provider: openrouter
//! model: openrouter/quasar-alpha
//! timeout: 45s
//! default_out_of: 10
//! on_transport_failure: record   # or: skip
//! rubric_cache:
//!   max_entries: 1024
//!   ttl: 1h
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use rubricate_core::DEFAULT_OUT_OF;

use crate::cache::RubricCache;
use crate::fallback::TransportFallback;
use crate::providers::{CompletionConfig, LlmProvider, ProviderError, ProviderRegistry};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Bounds for the rubric memo cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RubricCacheConfig {
    pub max_entries: u64,

    #[serde(with = "humantime_duration")]
    pub ttl: Duration,
}

impl Default for RubricCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_024,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Settings for the AI gateway and grading loop.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Registered provider type
    pub provider: String,

    pub model: String,

    /// Override the provider's API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Falls back to the provider's environment variable when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Bounded wait per AI call
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Grading denominator for rubrics with no point markers
    pub default_out_of: i64,

    pub on_transport_failure: TransportFallback,

    pub rubric_cache: RubricCacheConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let completion = CompletionConfig::default();
        Self {
            provider: "openrouter".to_string(),
            model: completion.model,
            base_url: None,
            api_key: None,
            timeout: completion.timeout,
            max_tokens: None,
            temperature: None,
            default_out_of: DEFAULT_OUT_OF,
            on_transport_failure: TransportFallback::default(),
            rubric_cache: RubricCacheConfig::default(),
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("default_out_of", &self.default_out_of)
            .field("on_transport_failure", &self.on_transport_failure)
            .field("rubric_cache", &self.rubric_cache)
            .finish()
    }
}

impl RuntimeConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_yaml_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("provider must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".into()));
        }
        if self.default_out_of <= 0 {
            return Err(ConfigError::Invalid(format!(
                "default_out_of must be positive, got {}",
                self.default_out_of
            )));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "temperature must be within 0.0..=2.0, got {}",
                    t
                )));
            }
        }
        Ok(())
    }

    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
        }
    }

    /// Options handed to the provider factory.
    pub fn provider_options(&self) -> JsonValue {
        let mut options = serde_json::Map::new();
        if let Some(key) = &self.api_key {
            options.insert("api_key".into(), JsonValue::String(key.clone()));
        }
        if let Some(url) = &self.base_url {
            options.insert("base_url".into(), JsonValue::String(url.clone()));
        }
        JsonValue::Object(options)
    }

    /// Validate provider options and build the configured provider.
    pub fn create_provider(
        &self,
        registry: &ProviderRegistry,
    ) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        let options = self.provider_options();
        registry.validate(&self.provider, &options)?;
        Ok(registry.create(&self.provider, &options)?)
    }

    pub fn rubric_cache(&self) -> RubricCache {
        RubricCache::new(self.rubric_cache.max_entries, self.rubric_cache.ttl)
    }
}

/// `Duration` as a humantime string such as `45s` or `1h 30m`.
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
