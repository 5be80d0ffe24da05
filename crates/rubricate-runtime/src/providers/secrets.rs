//! Credential handling for AI providers.
//!
//! API keys are wrapped in [`ApiCredential`] as soon as they are read, so
//! they cannot end up in logs through `Debug` or `Display`. The raw value is
//! only reachable through [`ApiCredential::expose`], at the point where the
//! request header is set.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The runtime config file
    Config,
    /// An environment variable
    Environment,
    /// Passed in by the caller
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Config => "config file",
            CredentialSource::Environment => "environment",
            CredentialSource::Programmatic => "caller",
        })
    }
}

/// A redacting API credential.
pub struct ApiCredential {
    secret: SecretString,
    source: CredentialSource,
    label: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, label: &'static str) -> Self {
        Self {
            secret: SecretString::from(value.into()),
            source,
            label,
        }
    }

    /// Read `options[key]`, or the `env_var` environment variable when the
    /// option is absent.
    pub fn from_config_or_env(
        options: &JsonValue,
        key: &str,
        env_var: &str,
        label: &'static str,
    ) -> Result<Self, ProviderError> {
        let found = options[key]
            .as_str()
            .map(|v| (v.to_string(), CredentialSource::Config))
            .or_else(|| {
                std::env::var(env_var)
                    .ok()
                    .map(|v| (v, CredentialSource::Environment))
            });

        match found {
            Some((value, source)) => Ok(Self::new(value, source, label)),
            None => Err(ProviderError::NotConfigured(format!(
                "{label} missing: add '{key}' to the config file or export {env_var}"
            ))),
        }
    }

    /// Whether [`ApiCredential::from_config_or_env`] would succeed.
    pub fn is_available(options: &JsonValue, key: &str, env_var: &str) -> bool {
        options.get(key).is_some_and(JsonValue::is_string) || std::env::var_os(env_var).is_some()
    }

    /// The raw value. Use only when building the request.
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiCredential")
            .field(&self.label)
            .field(&self.source)
            .field(&"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, [REDACTED])", self.label, self.source)
    }
}
