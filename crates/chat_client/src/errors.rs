//! Error types for chat client operations.
//!
//! This module defines the errors that can occur when talking to the chat
//! platform: posting a message to an incoming webhook or exchanging an OAuth
//! code for an access token.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during chat client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use chat_client::Error;
///
/// match client.post_message(&message).await {
///     Ok(()) => println!("Message delivered"),
///     Err(Error::UnexpectedStatus { status, .. }) => eprintln!("Chat backend answered {status}"),
///     Err(err) => eprintln!("Other error: {err}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP client could not be constructed.
    #[error("Failed to initialize HTTP client: {0}")]
    ClientInit(String),

    /// The configured URL is not a valid absolute URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be sent or no response was received.
    ///
    /// Covers DNS failures, refused connections and timeouts.
    #[error("Request to chat backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The chat backend answered with a non-success status code.
    #[error("Chat backend returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("Failed to deserialize chat backend response: {0}")]
    Deserialization(#[from] serde_json::Error),
}
