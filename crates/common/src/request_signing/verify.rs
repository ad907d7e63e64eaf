//! Signature verification, mirroring the identity server's check.
//!
//! Lets a deployment confirm that a configured key pair and path prefix
//! produce envelopes the server will accept, without a round trip.

use base64::{engine::general_purpose, Engine};
use error_stack::{Report, ResultExt};
use rsa::pkcs8::DecodePublicKey;
use rsa::pss::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde_json::Value;
use sha2::Sha256;

use crate::constants::PSS_SALT_LEN;
use crate::error::SigningError;

use super::digest::{build_canonical_string, compute_body_hash, CanonicalInputs, CanonicalString};
use super::envelope::SignedEnvelope;
use super::provider::{CryptoProvider, RustCryptoProvider};

/// Verifies RSA-PSS/SHA-256 signatures against an SPKI public key.
pub struct SignatureVerifier<P: CryptoProvider = RustCryptoProvider> {
    provider: P,
    key: VerifyingKey<Sha256>,
    signature_len: usize,
}

impl SignatureVerifier<RustCryptoProvider> {
    /// Loads a `-----BEGIN PUBLIC KEY-----` PEM.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::KeyImport`] if the PEM is not an RSA SPKI key.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, Report<SigningError>> {
        Self::with_provider(RustCryptoProvider, pem)
    }
}

impl<P: CryptoProvider> SignatureVerifier<P> {
    /// Loads a public key PEM and hashes bodies through `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::KeyImport`] if the PEM is not an RSA SPKI key.
    pub fn with_provider(provider: P, pem: &str) -> Result<Self, Report<SigningError>> {
        let public_key = RsaPublicKey::from_public_key_pem(pem.trim()).map_err(|e| {
            Report::new(SigningError::KeyImport {
                message: format!("Failed to parse RSA public key: {}", e),
            })
        })?;
        let signature_len = public_key.size();

        Ok(Self {
            provider,
            key: VerifyingKey::<Sha256>::new_with_salt_len(public_key, PSS_SALT_LEN),
            signature_len,
        })
    }

    /// Checks `signature_b64` over `canonical`.
    ///
    /// A well-formed signature that does not match yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Signing`] if the signature is not valid base64
    /// or is not exactly as long as the key modulus.
    pub fn verify(
        &self,
        canonical: &CanonicalString,
        signature_b64: &str,
    ) -> Result<bool, Report<SigningError>> {
        let signature_bytes = general_purpose::STANDARD
            .decode(signature_b64)
            .change_context(SigningError::Signing {
                message: "Signature is not valid base64".into(),
            })?;

        if signature_bytes.len() != self.signature_len {
            return Err(Report::new(SigningError::Signing {
                message: format!(
                    "Signature is {} bytes, expected {}",
                    signature_bytes.len(),
                    self.signature_len
                ),
            }));
        }

        let signature = Signature::try_from(signature_bytes.as_slice()).change_context(
            SigningError::Signing {
                message: "Signature has an invalid encoding".into(),
            },
        )?;

        Ok(self.key.verify(canonical.as_bytes(), &signature).is_ok())
    }

    /// Rebuilds the canonical string from request parts and checks the envelope.
    ///
    /// Returns `Ok(false)` if the body hash in the envelope does not match the
    /// body, or if the signature does not verify.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or prefix is unusable, the body cannot be
    /// canonicalized, or the signature is malformed.
    pub fn verify_envelope(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
        key_id: &str,
        envelope: &SignedEnvelope,
        path_prefix: &str,
    ) -> Result<bool, Report<SigningError>> {
        let body_hash = compute_body_hash(&self.provider, body)?;
        if body_hash != envelope.body_hash {
            log::debug!("Body hash mismatch for nonce {}", envelope.nonce);
            return Ok(false);
        }

        let canonical = build_canonical_string(
            &CanonicalInputs {
                timestamp: &envelope.timestamp,
                method,
                url,
                body_hash: &body_hash,
                key_id,
                nonce: &envelope.nonce,
            },
            path_prefix,
        )?;

        self.verify(&canonical, &envelope.signature)
    }
}
