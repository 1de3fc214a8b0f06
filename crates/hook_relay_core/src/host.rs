//! Identification of the webhook source from the `User-Agent` header.
//!
//! Known user agents:
//!
//! | Host | User agent | Name |
//! |------|------------|------|
//! | GitHub | `GitHub-Hookshot/1a2b3c` | `GitHub` |
//! | Coding.net | `Coding.net Hook` | `Coding.net` |
//! | Bitbucket Cloud | `Bitbucket-Webhooks/2.0` | `bitbucket-cloud` |
//! | Bitbucket Server | `Atlassian HttpClient 0.23.0 / Bitbucket-5.15.0 (5015000) / Default` | `bitbucket-server` |
//!
//! The returned name is matched case-insensitively against the host registry.
//! The heuristic never fails: unrecognised agents yield a name that simply
//! has no registry entry.

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;

/// Name returned for Bitbucket Cloud user agents.
pub const BITBUCKET_CLOUD: &str = "bitbucket-cloud";

/// Name returned for Bitbucket Server user agents.
pub const BITBUCKET_SERVER: &str = config_manager::BITBUCKET_SERVER_HOST;

/// Derives a host name from a `User-Agent` header value.
pub fn identify_host(user_agent: &str) -> String {
    let mut name = user_agent.split('-').next().unwrap_or_default();

    if name == "Bitbucket" {
        return BITBUCKET_CLOUD.to_string();
    }

    if position_after_start(name, '.') && !name.contains('/') {
        name = name.split(' ').next().unwrap_or_default();
    }

    if position_after_start(name, '/') {
        let product = name.split('/').nth(1).unwrap_or_default().trim();
        if product == "Bitbucket" {
            return BITBUCKET_SERVER.to_string();
        }
        return product.to_string();
    }

    name.to_string()
}

/// True when `c` occurs in `s` somewhere other than the very first byte.
fn position_after_start(s: &str, c: char) -> bool {
    s.find(c).is_some_and(|i| i > 0)
}
