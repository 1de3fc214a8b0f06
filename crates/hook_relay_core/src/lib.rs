//! Hook relay core
//!
//! Turns an inbound repository-host webhook into a chat message:
//!
//! 1. [`host::identify_host`] derives the source host from the user agent
//! 2. the host is looked up in the [`config_manager::HostRegistry`]
//! 3. [`signature::verify`] checks the optional HMAC signature header
//! 4. ping payloads are acknowledged without rendering
//! 5. an [`adapters::Adapter`] chosen by [`config_manager::HostKind`] renders
//!    the payload into chat attachments
//!
//! The [`dispatcher::Dispatcher`] drives these steps. It performs no I/O;
//! delivering the resulting [`chat_client::ChatMessage`] is left to the caller.

pub mod adapters;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod host;
pub mod signature;

pub use adapters::{Adapter, BitbucketServerAdapter, GenericHostAdapter, MessageAdapter};
pub use dispatcher::{Dispatch, Dispatcher, InboundWebhook};
pub use errors::DispatchError;
pub use host::identify_host;
pub use signature::{SignatureAlgorithm, SIGNATURE_HEADERS};
