//! Injectable cryptography capability.
//!
//! The digest engine, key importer, signer and nonce generator never reach a
//! process-wide crypto object. They receive a [`CryptoProvider`] from their
//! caller, which lets tests substitute deterministic randomness or failing
//! primitives.

use error_stack::{Report, ResultExt};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

use crate::error::SigningError;

use super::keys::ImportedKey;

/// Cryptographic primitives used by the signing pipeline.
pub trait CryptoProvider: Send + Sync {
    /// SHA-256 of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; 32];

    /// Imports PKCS#8 DER as an RSA key usable only for RSA-PSS/SHA-256 signing.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::KeyImport`] if the DER is malformed or not an RSA key.
    fn import_rsa_pss_key(&self, pkcs8_der: &[u8]) -> Result<ImportedKey, Report<SigningError>>;

    /// Signs `message` with RSA-PSS (SHA-256, 32-byte salt) and returns the raw signature.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Signing`] if the primitive fails.
    fn sign_rsa_pss(
        &self,
        key: &ImportedKey,
        message: &[u8],
    ) -> Result<Vec<u8>, Report<SigningError>>;

    /// Fills `buf` with random bytes suitable for nonces and PKCE secrets.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Signing`] if the random source is unavailable.
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), Report<SigningError>>;
}

/// Default provider backed by `sha2`, `rsa` and the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl CryptoProvider for RustCryptoProvider {
    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn import_rsa_pss_key(&self, pkcs8_der: &[u8]) -> Result<ImportedKey, Report<SigningError>> {
        let private_key = RsaPrivateKey::from_pkcs8_der(pkcs8_der).map_err(|e| {
            Report::new(SigningError::KeyImport {
                message: format!("Not a PKCS#8 RSA private key: {}", e),
            })
        })?;

        Ok(ImportedKey::new(private_key))
    }

    fn sign_rsa_pss(
        &self,
        key: &ImportedKey,
        message: &[u8],
    ) -> Result<Vec<u8>, Report<SigningError>> {
        let signature = key
            .pss_key()
            .try_sign_with_rng(&mut OsRng, message)
            .map_err(|e| {
                Report::new(SigningError::Signing {
                    message: format!("RSA-PSS signing failed: {}", e),
                })
            })?;

        Ok(signature.to_vec())
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<(), Report<SigningError>> {
        OsRng
            .try_fill_bytes(buf)
            .change_context(SigningError::Signing {
                message: "Operating system random source unavailable".into(),
            })
    }
}
