//! Registry of webhook source hosts.
//!
//! Every webhook the relay accepts must come from a host listed here. A host
//! entry carries the shared secret used to verify request signatures and the
//! presentation metadata used when rendering chat messages.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

/// Canonical name of the Bitbucket Server host.
///
/// This is the only host whose payloads are rendered by the Bitbucket Server
/// adapter and whose signatures use HMAC-SHA256.
pub const BITBUCKET_SERVER_HOST: &str = "bitbucket-server";

/// Classification of a host that decides how its webhooks are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// GitHub, Coding.net, Bitbucket Cloud and any other GitHub-style host.
    Generic,

    /// Bitbucket Server (Bitbucket Data Center).
    BitbucketServer,
}

impl HostKind {
    /// Derives the host kind from a canonical (lowercase) host name.
    pub fn from_name(name: &str) -> Self {
        if name == BITBUCKET_SERVER_HOST {
            HostKind::BitbucketServer
        } else {
            HostKind::Generic
        }
    }
}

/// A host entry as it appears in the configuration file.
///
/// ```toml
/// [[hosts]]
/// name = "bitbucket-server"
/// secret = "s3cr3t"
/// logo = "https://example.com/bitbucket.png"
/// bitbucket_url = "https://bitbucket.example.com"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostEntry {
    /// Host name, compared case-insensitively with the identified host.
    pub name: String,

    /// Shared secret used for webhook signatures.
    pub secret: String,

    /// Logo shown next to messages from this host.
    #[serde(default)]
    pub logo: String,

    /// Base URL of a Bitbucket Server instance.
    #[serde(default)]
    pub bitbucket_url: Option<String>,

    /// Base URL used for repository links. Falls back to `bitbucket_url`.
    #[serde(default)]
    pub repo_url: Option<String>,
}

/// A validated, immutable host configuration.
#[derive(Debug)]
pub struct HostConfig {
    name: String,
    secret: SecretString,
    logo: String,
    bitbucket_url: Option<String>,
    repo_url: Option<String>,
    kind: HostKind,
}

impl HostConfig {
    /// Creates a host with the given name and secret and no presentation
    /// metadata.
    ///
    /// The name is trimmed and lowercased.
    pub fn new(name: impl AsRef<str>, secret: impl Into<String>) -> Self {
        let name = name.as_ref().trim().to_lowercase();
        let kind = HostKind::from_name(&name);
        Self {
            name,
            secret: SecretString::from(secret.into()),
            logo: String::new(),
            bitbucket_url: None,
            repo_url: None,
            kind,
        }
    }

    /// Sets the logo reference.
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Sets the Bitbucket Server base URL.
    pub fn with_bitbucket_url(mut self, url: impl AsRef<str>) -> Self {
        self.bitbucket_url = Some(trim_base_url(url.as_ref()));
        self
    }

    /// Sets the repository link base URL.
    pub fn with_repo_url(mut self, url: impl AsRef<str>) -> Self {
        self.repo_url = Some(trim_base_url(url.as_ref()));
        self
    }

    /// Validates a configuration file entry and converts it into a host.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfiguration` when the name or the
    /// secret is empty, or when one of the URLs is not an absolute URL.
    pub fn from_entry(index: usize, entry: HostEntry) -> ConfigurationResult<Self> {
        if entry.name.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: format!("hosts[{index}].name"),
                reason: "host name cannot be empty".to_string(),
            });
        }

        if entry.secret.is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: format!("hosts[{index}].secret"),
                reason: "host secret cannot be empty".to_string(),
            });
        }

        let mut host = HostConfig::new(&entry.name, entry.secret).with_logo(entry.logo);

        if let Some(url) = entry.bitbucket_url.filter(|u| !u.trim().is_empty()) {
            validate_url(&format!("hosts[{index}].bitbucket_url"), &url)?;
            host = host.with_bitbucket_url(url);
        }

        if let Some(url) = entry.repo_url.filter(|u| !u.trim().is_empty()) {
            validate_url(&format!("hosts[{index}].repo_url"), &url)?;
            host = host.with_repo_url(url);
        }

        Ok(host)
    }

    /// Canonical lowercase host name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared signing secret.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Secret bytes used as HMAC key.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    pub fn logo(&self) -> &str {
        &self.logo
    }

    pub fn bitbucket_url(&self) -> Option<&str> {
        self.bitbucket_url.as_deref()
    }

    pub fn repo_url(&self) -> Option<&str> {
        self.repo_url.as_deref()
    }

    /// Base URL for deep links into the host's web UI.
    ///
    /// `repo_url` wins over `bitbucket_url`; `None` when neither is set.
    pub fn link_base(&self) -> Option<&str> {
        self.repo_url().or(self.bitbucket_url())
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }
}

/// The static set of hosts the relay accepts webhooks from.
///
/// Host names are unique, so a lookup matches at most one entry.
#[derive(Debug, Default)]
pub struct HostRegistry {
    hosts: Vec<HostConfig>,
}

impl HostRegistry {
    /// Creates a registry from already validated hosts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateHost` if two hosts share a name.
    pub fn new(hosts: Vec<HostConfig>) -> ConfigurationResult<Self> {
        for (i, host) in hosts.iter().enumerate() {
            if hosts[..i].iter().any(|other| other.name == host.name) {
                return Err(ConfigurationError::DuplicateHost {
                    name: host.name.clone(),
                });
            }
        }

        debug!(host_count = hosts.len(), "Host registry created");
        Ok(Self { hosts })
    }

    /// Creates a registry from configuration file entries.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of any entry, or
    /// `ConfigurationError::DuplicateHost`.
    pub fn from_entries(entries: Vec<HostEntry>) -> ConfigurationResult<Self> {
        let hosts = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| HostConfig::from_entry(i, entry))
            .collect::<ConfigurationResult<Vec<_>>>()?;
        Self::new(hosts)
    }

    /// Finds the host registered under `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<&HostConfig> {
        let wanted = name.to_lowercase();
        self.hosts.iter().find(|host| host.name == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostConfig> {
        self.hosts.iter()
    }

    /// Names of all registered hosts, in configuration order.
    pub fn names(&self) -> Vec<&str> {
        self.hosts.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

fn validate_url(field: &str, value: &str) -> ConfigurationResult<()> {
    Url::parse(value.trim())
        .map(|_| ())
        .map_err(|e| ConfigurationError::InvalidConfiguration {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
