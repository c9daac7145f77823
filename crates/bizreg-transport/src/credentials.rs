// crates/bizreg-transport/src/credentials.rs
// ============================================================================
// Module: Bizreg Credential Providers
// Description: Static and environment-backed gateway credential providers.
// Purpose: Supply the gateway URL and optional API key once per batch.
// Dependencies: bizreg-core
// ============================================================================

//! ## Overview
//! [`StaticCredentials`] wraps fixed values. [`EnvCredentials`] reads the
//! gateway URL and API key from environment variables, with explicit
//! overrides taking precedence so callers and tests never mutate the process
//! environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;

use bizreg_core::CredentialError;
use bizreg_core::CredentialProvider;
use bizreg_core::GatewayCredentials;
use bizreg_core::GatewayUrl;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the gateway base URL.
pub const GATEWAY_URL_ENV: &str = "BIZREG_GATEWAY_URL";

/// Environment variable holding the gateway API key.
pub const API_KEY_ENV: &str = "BIZREG_API_KEY";

/// Gateway URL used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3100";

// ============================================================================
// SECTION: Static Credentials
// ============================================================================

/// Credential provider returning fixed credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Credentials returned on every call.
    credentials: GatewayCredentials,
}

impl StaticCredentials {
    /// Creates a provider from a URL and optional key.
    #[must_use]
    pub fn new(gateway_url: impl AsRef<str>, api_key: Option<String>) -> Self {
        Self {
            credentials: GatewayCredentials::new(GatewayUrl::new(gateway_url), api_key),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<GatewayCredentials, CredentialError> {
        Ok(self.credentials.clone())
    }
}

// ============================================================================
// SECTION: Environment Credentials
// ============================================================================

/// Variable names and fallbacks for [`EnvCredentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvCredentialsConfig {
    /// Variable holding the gateway URL.
    pub url_var: String,
    /// Variable holding the API key.
    pub api_key_var: String,
    /// URL used when the variable is unset or blank.
    pub default_url: String,
    /// Values consulted before the process environment.
    pub overrides: BTreeMap<String, String>,
}

impl Default for EnvCredentialsConfig {
    fn default() -> Self {
        Self {
            url_var: GATEWAY_URL_ENV.to_string(),
            api_key_var: API_KEY_ENV.to_string(),
            default_url: DEFAULT_GATEWAY_URL.to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Credential provider backed by environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvCredentials {
    /// Variable names, fallbacks, and overrides.
    config: EnvCredentialsConfig,
}

impl EnvCredentials {
    /// Creates a provider from explicit settings.
    #[must_use]
    pub const fn new(config: EnvCredentialsConfig) -> Self {
        Self {
            config,
        }
    }

    /// Looks up a variable, preferring overrides over the process environment.
    fn lookup(&self, name: &str) -> Result<Option<String>, CredentialError> {
        if let Some(value) = self.config.overrides.get(name) {
            return Ok(Some(value.clone()));
        }
        match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(CredentialError::Unavailable(format!("{name} is not valid unicode")))
            }
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<GatewayCredentials, CredentialError> {
        let url = self
            .lookup(&self.config.url_var)?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.config.default_url.clone());
        let api_key = self.lookup(&self.config.api_key_var)?;
        Ok(GatewayCredentials::new(GatewayUrl::new(url), api_key))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use std::collections::BTreeMap;

    use bizreg_core::CredentialProvider;

    use super::EnvCredentials;
    use super::EnvCredentialsConfig;
    use super::StaticCredentials;

    fn unique_vars() -> EnvCredentialsConfig {
        EnvCredentialsConfig {
            url_var: "BIZREG_TEST_UNSET_URL_7F3A".to_string(),
            api_key_var: "BIZREG_TEST_UNSET_KEY_7F3A".to_string(),
            ..EnvCredentialsConfig::default()
        }
    }

    #[test]
    fn env_credentials_fall_back_to_default_url_and_anonymous() {
        let creds = EnvCredentials::new(unique_vars()).credentials().unwrap();
        assert_eq!(creds.gateway_url.as_str(), "http://localhost:3100");
        assert!(creds.is_anonymous());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = unique_vars();
        config.overrides = BTreeMap::from([
            (config.url_var.clone(), "https://gw.example.pl/".to_string()),
            (config.api_key_var.clone(), " key-123 ".to_string()),
        ]);
        let creds = EnvCredentials::new(config).credentials().unwrap();
        assert_eq!(creds.gateway_url.as_str(), "https://gw.example.pl");
        assert_eq!(creds.api_key(), Some("key-123"));
    }

    #[test]
    fn blank_override_url_uses_default() {
        let mut config = unique_vars();
        config.overrides = BTreeMap::from([(config.url_var.clone(), "  ".to_string())]);
        let creds = EnvCredentials::new(config).credentials().unwrap();
        assert_eq!(creds.gateway_url.as_str(), "http://localhost:3100");
    }

    #[test]
    fn static_credentials_redact_key_in_debug() {
        let provider = StaticCredentials::new("http://gw", Some("top-secret".to_string()));
        let creds = provider.credentials().unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("redacted"));
    }
}
