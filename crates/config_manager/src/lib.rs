//! Configuration management for the hook relay.
//!
//! This crate owns everything that is loaded once at process start and never
//! mutated afterwards:
//!
//! - the [`HostRegistry`], the static list of webhook sources the relay accepts,
//!   each with its shared signing secret and presentation metadata
//! - the [`RelayConfig`], which bundles the registry with the chat webhook URL,
//!   the OAuth client credentials and the server settings
//!
//! Configuration is read from a TOML file and can be partially overridden by
//! [`ConfigOverrides`] (usually populated from command-line flags and
//! environment variables by the binary).

pub mod errors;
pub mod registry;
pub mod settings;

pub use errors::{ConfigurationError, ConfigurationResult};
pub use registry::{HostConfig, HostEntry, HostKind, HostRegistry, BITBUCKET_SERVER_HOST};
pub use settings::{
    ConfigOverrides, LogFormat, OAuthSettings, RelayConfig, ServerSettings, SignatureSource,
    DEFAULT_CONFIG_FILENAME, DEFAULT_OAUTH_ACCESS_URL, DEFAULT_PORT,
};
