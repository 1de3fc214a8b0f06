use super::*;

const PAYLOAD: &[u8] = br#"{"a":1}"#;
const SHA1_SIGNATURE: &str = "sha1=c64d87a91faebeb6857cfd112ed67e2268ef084c";
const SHA256_SIGNATURE: &str =
    "sha256=bf1e6501b7fa928ec2391fea9dd90af3c9ad1b7b1ef6ff319c25940cec746bf8";

fn github() -> HostConfig {
    HostConfig::new("github", "topsecret")
}

fn bitbucket_server() -> HostConfig {
    HostConfig::new("bitbucket-server", "topsecret")
}

#[test]
fn test_algorithm_follows_host_kind() {
    assert_eq!(
        SignatureAlgorithm::for_kind(HostKind::Generic),
        SignatureAlgorithm::Sha1
    );
    assert_eq!(
        SignatureAlgorithm::for_kind(HostKind::BitbucketServer),
        SignatureAlgorithm::Sha256
    );
}

#[test]
fn test_compute_signature_sha1() {
    assert_eq!(
        compute_signature(SignatureAlgorithm::Sha1, b"topsecret", PAYLOAD),
        SHA1_SIGNATURE
    );
}

#[test]
fn test_compute_signature_sha256() {
    assert_eq!(
        compute_signature(SignatureAlgorithm::Sha256, b"topsecret", PAYLOAD),
        SHA256_SIGNATURE
    );
}

#[test]
fn test_verify_accepts_matching_sha1() {
    assert_eq!(verify(&github(), PAYLOAD, SHA1_SIGNATURE), Ok(()));
}

#[test]
fn test_verify_accepts_matching_sha256_for_bitbucket_server() {
    assert_eq!(verify(&bitbucket_server(), PAYLOAD, SHA256_SIGNATURE), Ok(()));
}

#[test]
fn test_verify_rejects_single_flipped_digit() {
    let tampered = SHA1_SIGNATURE.replace("c64d", "c64e");

    assert_eq!(
        verify(&github(), PAYLOAD, &tampered),
        Err(DispatchError::SignatureMismatch)
    );
}

#[test]
fn test_verify_rejects_wrong_algorithm_prefix() {
    // A valid SHA-1 digest does not satisfy a SHA-256 host
    assert_eq!(
        verify(&bitbucket_server(), PAYLOAD, SHA1_SIGNATURE),
        Err(DispatchError::SignatureMismatch)
    );
    assert_eq!(
        verify(&github(), PAYLOAD, SHA256_SIGNATURE),
        Err(DispatchError::SignatureMismatch)
    );
}

#[test]
fn test_verify_rejects_uppercase_hex() {
    let upper = format!("sha1={}", "C64D87A91FAEBEB6857CFD112ED67E2268EF084C");

    assert_eq!(
        verify(&github(), PAYLOAD, &upper),
        Err(DispatchError::SignatureMismatch)
    );
}

#[test]
fn test_verify_rejects_garbage() {
    for header in ["", "sha1=", "sha1=zz", "c64d87a91faebeb6857cfd112ed67e2268ef084c"] {
        assert_eq!(
            verify(&github(), PAYLOAD, header),
            Err(DispatchError::SignatureMismatch),
            "header {header:?} should be rejected"
        );
    }
}

#[test]
fn test_verify_is_sensitive_to_payload_bytes() {
    // Same JSON value, different whitespace
    assert_eq!(
        verify(&github(), br#"{"a": 1}"#, SHA1_SIGNATURE),
        Err(DispatchError::SignatureMismatch)
    );
}

#[test]
fn test_verify_uses_host_secret() {
    let other = HostConfig::new("github", "not-the-secret");

    assert_eq!(
        verify(&other, PAYLOAD, SHA1_SIGNATURE),
        Err(DispatchError::SignatureMismatch)
    );
}
