//! Process configuration and credential resolution.
//!
//! Settings are layered with the `config` crate (files, then `GATEWAY_*` environment
//! variables). Provider credentials then go through [`ProviderCredentials::resolve`],
//! which falls back to the `EGOSMS_*` variables and finally to [`DEFAULT_SENDER`].

use std::env;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use phonenumber::country;
use serde::Deserialize;

use crate::client::EgoSmsError;
use crate::domain::ValidationError;
use crate::gateway::NumberPolicy;

pub const ENV_USERNAME: &str = "EGOSMS_USERNAME";
pub const ENV_PASSWORD: &str = "EGOSMS_PASSWORD";
pub const ENV_SENDER: &str = "EGOSMS_SENDER";

/// Sender name used when neither the store nor the environment provides one.
pub const DEFAULT_SENDER: &str = "CareVax";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("unknown region code: {0}")]
    UnknownRegion(String),

    #[error("invalid setting: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to build provider client: {0}")]
    Client(#[from] EgoSmsError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sms: SmsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,
    /// Listen port (default: 8080, or `PORT` when set)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

/// The `sms` section: the configuration store for provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: Option<String>,
    pub plain_endpoint: Option<String>,
    pub json_endpoint: Option<String>,
    /// Whole-request timeout; the HTTP client default applies when unset.
    pub timeout_seconds: Option<u64>,
    /// Parse and normalize recipients before sending.
    pub strict_numbers: bool,
    /// Region assumed for numbers without a country prefix (strict mode only).
    pub default_region: String,
    pub max_recipients: Option<usize>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            sender: None,
            plain_endpoint: None,
            json_endpoint: None,
            timeout_seconds: None,
            strict_numbers: false,
            default_region: "UG".to_owned(),
            max_recipients: None,
        }
    }
}

impl SmsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn number_policy(&self) -> Result<NumberPolicy, ConfigError> {
        if !self.strict_numbers {
            return Ok(NumberPolicy::Passthrough);
        }
        let region = self
            .default_region
            .trim()
            .to_ascii_uppercase()
            .parse::<country::Id>()
            .map_err(|_| ConfigError::UnknownRegion(self.default_region.clone()))?;
        Ok(NumberPolicy::Strict {
            default_region: region,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (default: info)
    pub level: String,
    /// `pretty` or `json` (default: pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/*` files and `GATEWAY_*` environment variables.
    ///
    /// Nested keys use `__`, e.g. `GATEWAY_SMS__USERNAME` sets `sms.username`.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// First candidate that is present and not blank.
pub fn resolve_setting<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Provider credentials after resolution. Read-only for the life of the process.
///
/// `username` and `password` may be empty here; the gateway refuses to send until they are set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("sender", &self.sender)
            .finish()
    }
}

impl ProviderCredentials {
    /// Resolve each setting as store → environment → default.
    pub fn resolve<F>(store: &SmsConfig, env_lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = resolve_setting([store.username.clone(), env_lookup(ENV_USERNAME)]);
        let password = resolve_setting([store.password.clone(), env_lookup(ENV_PASSWORD)]);
        let sender = resolve_setting([
            store.sender.clone(),
            env_lookup(ENV_SENDER),
            Some(DEFAULT_SENDER.to_owned()),
        ]);

        Self {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
            sender: sender.unwrap_or_else(|| DEFAULT_SENDER.to_owned()),
        }
    }

    /// [`ProviderCredentials::resolve`] against the process environment.
    pub fn from_env(store: &SmsConfig) -> Self {
        Self::resolve(store, |key| env::var(key).ok())
    }

    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}
