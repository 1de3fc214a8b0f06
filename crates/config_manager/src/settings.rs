//! Relay configuration loading.
//!
//! The relay is configured with a single TOML file. Values that commonly differ
//! between deployments (port, chat webhook URL, OAuth credentials) can be
//! overridden without editing the file via [`ConfigOverrides`].
//!
//! # Example TOML Configuration
//!
//! ```toml
//! channel_url = "https://hooks.slack.com/services/T000/B000/XXXX"
//! signature_source = "canonical"
//!
//! [server]
//! port = 3009
//!
//! [oauth]
//! client_id = "1234.5678"
//! client_secret = "abcd"
//!
//! [[hosts]]
//! name = "github"
//! secret = "s3cr3t"
//! logo = "https://example.com/github.png"
//! ```

use std::{fs, path::Path};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::registry::{HostEntry, HostRegistry};

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "hook-relay.toml";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3009;

/// Default OAuth access endpoint of the chat platform
pub const DEFAULT_OAUTH_ACCESS_URL: &str = "https://slack.com/api/oauth.access";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_OUTBOUND_TIMEOUT_SECONDS: u64 = 10;

/// Which bytes a webhook signature is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureSource {
    /// Compact JSON re-serialisation of the parsed body, keys in original order.
    #[default]
    Canonical,

    /// The request body exactly as received.
    Raw,
}

/// Log output format of the binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Timeout for calls to the chat backend and the OAuth endpoint
    #[serde(default = "default_outbound_timeout")]
    pub outbound_timeout_seconds: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_format: LogFormat::default(),
            outbound_timeout_seconds: default_outbound_timeout(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_outbound_timeout() -> u64 {
    DEFAULT_OUTBOUND_TIMEOUT_SECONDS
}

/// Credentials of the chat application used for the OAuth code exchange.
#[derive(Debug)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: SecretString,
    pub access_url: String,
}

/// Values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub channel_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Raw file layout, before validation.
#[derive(Debug, Default, Deserialize)]
struct RelayConfigFile {
    channel_url: Option<String>,

    #[serde(default)]
    signature_source: SignatureSource,

    #[serde(default)]
    server: ServerSettings,

    #[serde(default)]
    oauth: OAuthFile,

    #[serde(default)]
    hosts: Vec<HostEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct OAuthFile {
    client_id: Option<String>,
    client_secret: Option<String>,
    access_url: Option<String>,
}

/// Complete, validated relay configuration.
///
/// Built once at start-up and shared read-only by all requests.
#[derive(Debug)]
pub struct RelayConfig {
    /// Incoming webhook URL of the chat channel
    pub channel_url: String,

    pub signature_source: SignatureSource,

    pub server: ServerSettings,

    /// `None` when no OAuth client is configured
    pub oauth: Option<OAuthSettings>,

    pub registry: HostRegistry,
}

impl RelayConfig {
    /// Loads configuration from a TOML file and applies the overrides.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::FileNotFound` if the file does not exist
    /// - `ConfigurationError::FileAccessError` if it cannot be read
    /// - any error of [`RelayConfig::from_toml_str`]
    pub fn load(path: &Path, overrides: &ConfigOverrides) -> ConfigurationResult<Self> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigurationError::FileAccessError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml_str(&content, overrides)?;

        info!(
            hosts = ?config.registry.names(),
            oauth = config.oauth.is_some(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Parses configuration from TOML text and applies the overrides.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::ParseError` for invalid TOML or unexpected types
    /// - `ConfigurationError::RequiredConfigMissing` when no chat webhook URL
    ///   is configured or the registry is empty
    /// - `ConfigurationError::InvalidConfiguration` for malformed URLs or hosts
    /// - `ConfigurationError::DuplicateHost` for repeated host names
    pub fn from_toml_str(content: &str, overrides: &ConfigOverrides) -> ConfigurationResult<Self> {
        let file: RelayConfigFile =
            toml::from_str(content).map_err(|e| ConfigurationError::ParseError {
                reason: e.to_string(),
            })?;

        let channel_url = overrides
            .channel_url
            .clone()
            .or(file.channel_url)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigurationError::RequiredConfigMissing {
                key: "channel_url".to_string(),
            })?;
        validate_absolute_url("channel_url", &channel_url)?;

        let mut server = file.server;
        if let Some(host) = &overrides.host {
            server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            server.port = port;
        }

        let oauth = build_oauth(file.oauth, overrides)?;

        if file.hosts.is_empty() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "hosts".to_string(),
            });
        }
        let registry = HostRegistry::from_entries(file.hosts)?;

        Ok(Self {
            channel_url: channel_url.trim().to_string(),
            signature_source: file.signature_source,
            server,
            oauth,
            registry,
        })
    }
}

fn build_oauth(
    file: OAuthFile,
    overrides: &ConfigOverrides,
) -> ConfigurationResult<Option<OAuthSettings>> {
    let client_id = overrides.client_id.clone().or(file.client_id);
    let client_secret = overrides.client_secret.clone().or(file.client_secret);

    match (client_id, client_secret) {
        (None, None) => Ok(None),
        (Some(client_id), Some(client_secret)) => {
            let access_url = file
                .access_url
                .unwrap_or_else(|| DEFAULT_OAUTH_ACCESS_URL.to_string());
            validate_absolute_url("oauth.access_url", &access_url)?;

            Ok(Some(OAuthSettings {
                client_id,
                client_secret: SecretString::from(client_secret),
                access_url,
            }))
        }
        (Some(_), None) => Err(ConfigurationError::RequiredConfigMissing {
            key: "oauth.client_secret".to_string(),
        }),
        (None, Some(_)) => Err(ConfigurationError::RequiredConfigMissing {
            key: "oauth.client_id".to_string(),
        }),
    }
}

fn validate_absolute_url(field: &str, value: &str) -> ConfigurationResult<()> {
    Url::parse(value.trim())
        .map(|_| ())
        .map_err(|e| ConfigurationError::InvalidConfiguration {
            field: field.to_string(),
            reason: e.to_string(),
        })
}
