//! HMAC signature verification for webhook payloads.
//!
//! Hosts sign the payload with the shared secret and send the result as
//! `<algorithm>=<lowercase hex digest>`. Bitbucket Server uses SHA-256,
//! every other host SHA-1.

use config_manager::{HostConfig, HostKind};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::errors::DispatchError;

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Signature headers in lookup order. The first one present wins.
pub const SIGNATURE_HEADERS: [&str; 2] = ["x-hub-signature", "x-coding-signature"];

/// Digest used to sign a host's payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn for_kind(kind: HostKind) -> Self {
        match kind {
            HostKind::BitbucketServer => SignatureAlgorithm::Sha256,
            HostKind::Generic => SignatureAlgorithm::Sha1,
        }
    }

    /// Prefix that precedes the hex digest in the header value.
    pub fn prefix(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1=",
            SignatureAlgorithm::Sha256 => "sha256=",
        }
    }
}

/// Computes the header value a host would send for `payload`.
pub fn compute_signature(algorithm: SignatureAlgorithm, secret: &[u8], payload: &[u8]) -> String {
    let digest = match algorithm {
        SignatureAlgorithm::Sha1 => hmac_digest::<HmacSha1>(secret, payload),
        SignatureAlgorithm::Sha256 => hmac_digest::<HmacSha256>(secret, payload),
    };

    format!("{}{}", algorithm.prefix(), hex::encode(digest.unwrap_or_default()))
}

/// Checks a signature header value against the host's secret.
///
/// The header must be the exact prefix followed by the lowercase hex digest.
/// The digest comparison runs in constant time.
pub fn verify(host: &HostConfig, signed: &[u8], header_value: &str) -> Result<(), DispatchError> {
    let algorithm = SignatureAlgorithm::for_kind(host.kind());

    let hex_digest = header_value
        .strip_prefix(algorithm.prefix())
        .ok_or(DispatchError::SignatureMismatch)?;

    // Uppercase hex decodes fine but is not what hosts send.
    if hex_digest.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(DispatchError::SignatureMismatch);
    }

    let expected = hex::decode(hex_digest).map_err(|_| DispatchError::SignatureMismatch)?;

    let verified = match algorithm {
        SignatureAlgorithm::Sha1 => hmac_matches::<HmacSha1>(host.secret_bytes(), signed, &expected),
        SignatureAlgorithm::Sha256 => {
            hmac_matches::<HmacSha256>(host.secret_bytes(), signed, &expected)
        }
    };

    if verified {
        Ok(())
    } else {
        Err(DispatchError::SignatureMismatch)
    }
}

fn hmac_digest<M: Mac + KeyInit>(secret: &[u8], payload: &[u8]) -> Option<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(secret).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

fn hmac_matches<M: Mac + KeyInit>(secret: &[u8], payload: &[u8], expected: &[u8]) -> bool {
    match <M as KeyInit>::new_from_slice(secret) {
        Ok(mut mac) => {
            mac.update(payload);
            mac.verify_slice(expected).is_ok()
        }
        Err(_) => false,
    }
}
