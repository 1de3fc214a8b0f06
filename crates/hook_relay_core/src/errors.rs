use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Reasons a webhook is refused before anything is forwarded.
///
/// Payload shapes an adapter does not understand are not errors; they are
/// rendered as a minimal attachment instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The user agent did not resolve to a registered host.
    #[error("Unrecognized webhook source '{name}'")]
    UnrecognizedHost { name: String },

    /// The signature header does not match the payload.
    #[error("Invalid signature")]
    SignatureMismatch,

    /// The request body is not JSON.
    #[error("Malformed webhook payload: {reason}")]
    MalformedPayload { reason: String },
}
