//! PKCE (RFC 7636) helpers for the OAuth2 Authorization Code login path.

use base64::{engine::general_purpose, Engine};
use error_stack::Report;
use serde::Serialize;

use crate::error::SigningError;
use crate::redaction::Redacted;
use crate::request_signing::CryptoProvider;

/// Random bytes behind a code verifier; encodes to 86 base64url characters.
pub const CODE_VERIFIER_BYTES: usize = 64;

/// Random bytes behind the `state` parameter.
pub const STATE_BYTES: usize = 32;

pub const CODE_CHALLENGE_METHOD: &str = "S256";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PkcePair {
    /// Kept by the client until the token exchange.
    #[serde(serialize_with = "serialize_exposed")]
    pub code_verifier: Redacted<String>,
    pub code_challenge: String,
}

fn serialize_exposed<S: serde::Serializer>(
    value: &Redacted<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.expose())
}

/// Base64url (unpadded) encoding of `len` random bytes.
///
/// # Errors
///
/// Returns [`SigningError::Signing`] if the random source fails.
pub fn generate_random_string<P: CryptoProvider + ?Sized>(
    provider: &P,
    len: usize,
) -> Result<String, Report<SigningError>> {
    let mut bytes = vec![0u8; len];
    provider.fill_random(&mut bytes)?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// `base64url(SHA-256(verifier))`, the S256 challenge.
pub fn compute_code_challenge<P: CryptoProvider + ?Sized>(provider: &P, verifier: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(provider.sha256(verifier.as_bytes()))
}

/// # Errors
///
/// Returns [`SigningError::Signing`] if the random source fails.
pub fn generate_code_verifier_and_challenge<P: CryptoProvider + ?Sized>(
    provider: &P,
) -> Result<PkcePair, Report<SigningError>> {
    let code_verifier = generate_random_string(provider, CODE_VERIFIER_BYTES)?;
    let code_challenge = compute_code_challenge(provider, &code_verifier);
    Ok(PkcePair {
        code_verifier: Redacted::new(code_verifier),
        code_challenge,
    })
}

/// # Errors
///
/// Returns [`SigningError::Signing`] if the random source fails.
pub fn generate_state<P: CryptoProvider + ?Sized>(
    provider: &P,
) -> Result<String, Report<SigningError>> {
    generate_random_string(provider, STATE_BYTES)
}

/// The OpenID `Nonce` sent on the authorization request.
///
/// # Errors
///
/// Returns [`SigningError::Signing`] if the random source fails.
pub fn generate_auth_nonce<P: CryptoProvider + ?Sized>(
    provider: &P,
) -> Result<String, Report<SigningError>> {
    generate_random_string(provider, STATE_BYTES)
}
