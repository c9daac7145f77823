// crates/bizreg-config/src/config.rs
// ============================================================================
// Module: Bizreg Configuration
// Description: Configuration loading and validation for the bizreg client.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: bizreg-core, bizreg-transport, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `BIZREG_CONFIG`, then `bizreg.toml` in
//! the working directory. An explicitly named file must exist; a missing
//! default file yields the built-in defaults.
//! Security posture: config inputs are untrusted and the API key is never
//! echoed in error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use bizreg_core::GatewayUrl;
use bizreg_transport::API_KEY_ENV;
use bizreg_transport::DEFAULT_GATEWAY_URL;
use bizreg_transport::DEFAULT_MAX_RESPONSE_BYTES;
use bizreg_transport::DEFAULT_TIMEOUT_MS;
use bizreg_transport::DEFAULT_USER_AGENT;
use bizreg_transport::GATEWAY_URL_ENV;
use bizreg_transport::HttpTransportConfig;
use bizreg_transport::StaticCredentials;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "bizreg.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "BIZREG_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 120_000;
/// Upper bound for `http.max_response_bytes`.
pub const MAX_RESPONSE_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Maximum user agent length.
pub const MAX_USER_AGENT_LENGTH: usize = 256;
/// Maximum gateway URL length.
pub const MAX_URL_LENGTH: usize = 2048;
/// Maximum environment variable name length.
pub const MAX_ENV_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level bizreg configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BizregConfig {
    /// Gateway location and credentials.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Batch execution settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl BizregConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http.validate()?;
        self.gateway.validate(self.http.allow_http)?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the transport settings derived from `[http]`.
    #[must_use]
    pub fn http_transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            timeout_ms: self.http.timeout_ms,
            user_agent: self.http.user_agent.clone(),
            max_response_bytes: self.http.max_response_bytes,
            allow_http: self.http.allow_http,
        }
    }

    /// Resolves gateway credentials from the config and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resolved gateway URL is invalid.
    pub fn resolve_credentials(&self) -> Result<StaticCredentials, ConfigError> {
        self.resolve_credentials_with(|name| env::var(name).ok())
    }

    /// Resolves gateway credentials using a caller-supplied variable lookup.
    ///
    /// The gateway URL comes from `gateway.url`, then `BIZREG_GATEWAY_URL`,
    /// then the local default. The API key comes from `gateway.api_key`, then
    /// the variable named by `gateway.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resolved gateway URL is invalid,
    /// including the built-in default when `http.allow_http` is false.
    pub fn resolve_credentials_with<F>(&self, lookup: F) -> Result<StaticCredentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match non_blank(self.gateway.url.as_deref()) {
            Some(url) => url.to_string(),
            None => lookup(GATEWAY_URL_ENV)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
        };
        validate_gateway_url(&url, self.http.allow_http)?;
        let api_key = match non_blank(self.gateway.api_key.as_deref()) {
            Some(key) => Some(key.to_string()),
            None => lookup(self.gateway.api_key_env()),
        };
        Ok(StaticCredentials::new(url, api_key))
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Gateway base URL; falls back to `BIZREG_GATEWAY_URL`, then the local default.
    #[serde(default)]
    pub url: Option<String>,
    /// Literal API key; takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl GatewayConfig {
    /// Returns the environment variable holding the API key.
    #[must_use]
    pub fn api_key_env(&self) -> &str {
        non_blank(self.api_key_env.as_deref()).unwrap_or(API_KEY_ENV)
    }

    /// Returns the configured base URL, normalized.
    #[must_use]
    pub fn gateway_url(&self) -> Option<GatewayUrl> {
        non_blank(self.url.as_deref()).map(GatewayUrl::new)
    }

    /// Validates gateway settings.
    fn validate(&self, allow_http: bool) -> Result<(), ConfigError> {
        if let Some(url) = non_blank(self.url.as_deref()) {
            validate_gateway_url(url, allow_http)?;
        }
        if let Some(name) = &self.api_key_env {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(
                    "gateway.api_key_env must be non-empty".to_string(),
                ));
            }
            if trimmed.len() > MAX_ENV_NAME_LENGTH
                || !trimmed.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
            {
                return Err(ConfigError::Invalid(
                    "gateway.api_key_env must be a valid environment variable name".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Permit cleartext `http://` gateway URLs.
    #[serde(default = "default_allow_http")]
    pub allow_http: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            max_response_bytes: default_max_response_bytes(),
            allow_http: default_allow_http(),
        }
    }
}

impl HttpConfig {
    /// Validates HTTP settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "http.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "http.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        let agent = self.user_agent.trim();
        if agent.is_empty() {
            return Err(ConfigError::Invalid("http.user_agent must be non-empty".to_string()));
        }
        if agent.len() > MAX_USER_AGENT_LENGTH || agent.chars().any(char::is_control) {
            return Err(ConfigError::Invalid(
                "http.user_agent must be printable and at most 256 bytes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Batch execution configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Convert record failures into error output records.
    #[serde(default)]
    pub continue_on_fail: bool,
}

/// Audit log configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// JSON-lines audit log path; `None` disables the audit log.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Returns the audit log path, if configured.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        non_blank(self.path.as_deref()).map(Path::new)
    }

    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Cleartext gateways are allowed by default for local deployments.
const fn default_allow_http() -> bool {
    true
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from caller or environment defaults.
///
/// The flag is true when the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a gateway base URL.
fn validate_gateway_url(value: &str, allow_http: bool) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(ConfigError::Invalid("gateway.url exceeds max length".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|err| ConfigError::Invalid(format!("gateway.url is invalid: {err}")))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(ConfigError::Invalid(
                "gateway.url must use https when http.allow_http is false".to_string(),
            ));
        }
        _ => {
            return Err(ConfigError::Invalid(
                "gateway.url must start with http:// or https://".to_string(),
            ));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid("gateway.url must include a host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Invalid(
            "gateway.url must not contain a query or fragment".to_string(),
        ));
    }
    Ok(())
}

/// Returns the trimmed value when it is present and non-blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
