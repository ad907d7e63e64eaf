//! Request envelope builder.
//!
//! [`RequestSigner::sign_manual_request`] is the entry point route handlers
//! use before forwarding a request to the identity server. It runs the whole
//! pipeline (key import, timestamp, nonce, body hash, canonical string,
//! signature) and either returns all four envelope fields or an error.

use std::fmt;

use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_PATH_PREFIX;
use crate::error::SigningError;
use crate::redaction::Redacted;

use super::digest::{build_canonical_string, compute_body_hash, CanonicalInputs};
use super::keys::import_private_key;
use super::nonce::{format_timestamp, nonce};
use super::provider::{CryptoProvider, RustCryptoProvider};
use super::signing::sign;

/// Key material and conventions for signing manual-login requests.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub key_id: String,
    pub private_key_pem: Redacted<String>,
    /// Gateway prefix stripped from the URL path before signing.
    pub path_prefix: String,
}

impl SigningConfig {
    pub fn new(key_id: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            private_key_pem: Redacted::new(private_key_pem.into()),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
        self.path_prefix = path_prefix.into();
        self
    }

    fn ensure_complete(&self) -> Result<(), Report<SigningError>> {
        if self.key_id.trim().is_empty() {
            return Err(Report::new(SigningError::Configuration {
                message: "Signing key id is not configured".into(),
            }));
        }
        if self.private_key_pem.is_empty() {
            return Err(Report::new(SigningError::Configuration {
                message: "Signing private key is not configured".into(),
            }));
        }
        Ok(())
    }
}

/// The values a caller attaches to an outbound request as signature headers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedEnvelope {
    pub timestamp: String,
    pub signature: String,
    pub nonce: String,
    pub body_hash: String,
}

impl fmt::Debug for SignedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedEnvelope")
            .field("timestamp", &self.timestamp)
            .field("signature", &Redacted::new(()))
            .field("nonce", &self.nonce)
            .field("body_hash", &self.body_hash)
            .finish()
    }
}

/// Signs manual-login requests with a configured key.
///
/// Holds no per-request state; every call imports the key afresh and draws
/// its own timestamp and nonce, so one signer can be shared across threads.
pub struct RequestSigner<P: CryptoProvider = RustCryptoProvider> {
    provider: P,
    config: SigningConfig,
    clock: fn() -> DateTime<Utc>,
}

impl RequestSigner<RustCryptoProvider> {
    #[must_use]
    pub fn new(config: SigningConfig) -> Self {
        Self::with_provider(RustCryptoProvider, config)
    }
}

impl<P: CryptoProvider> RequestSigner<P> {
    pub fn with_provider(provider: P, config: SigningConfig) -> Self {
        Self {
            provider,
            config,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock used for `X-Timestamp`.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    #[must_use]
    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Produces the signature envelope for one outbound request.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any pipeline stage:
    /// [`SigningError::Configuration`] for missing key id or key material or
    /// an unusable URL, [`SigningError::KeyImport`] for a bad PEM,
    /// [`SigningError::Canonicalization`] for an unencodable body and
    /// [`SigningError::Signing`] for primitive failures.
    pub fn sign_manual_request(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
    ) -> Result<SignedEnvelope, Report<SigningError>> {
        self.config.ensure_complete()?;

        let key = import_private_key(&self.provider, self.config.private_key_pem.expose())
            .attach(format!("key id: {}", self.config.key_id))?;
        let timestamp = format_timestamp((self.clock)());
        let nonce = nonce(&self.provider)?;
        let body_hash = compute_body_hash(&self.provider, body)?;

        let canonical = build_canonical_string(
            &CanonicalInputs {
                timestamp: &timestamp,
                method,
                url,
                body_hash: &body_hash,
                key_id: &self.config.key_id,
                nonce: &nonce,
            },
            &self.config.path_prefix,
        )?;

        let signature = sign(&self.provider, &key, &canonical)?;

        log::debug!(
            "Signed {} {} with key id {} (nonce {})",
            method.to_ascii_uppercase(),
            url.split('?').next().unwrap_or(url),
            self.config.key_id,
            nonce
        );

        Ok(SignedEnvelope {
            timestamp,
            signature,
            nonce,
            body_hash,
        })
    }
}

/// Signs one request with the default provider.
///
/// # Errors
///
/// See [`RequestSigner::sign_manual_request`].
pub fn sign_manual_request(
    method: &str,
    url: &str,
    body: Option<&Value>,
    config: &SigningConfig,
) -> Result<SignedEnvelope, Report<SigningError>> {
    RequestSigner::new(config.clone()).sign_manual_request(method, url, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_signing::keys::ImportedKey;
    use crate::request_signing::verify::SignatureVerifier;
    use crate::test_support::tests::{
        EC_P256_KEY_PEM, SIGNING_KEY_PEM, SIGNING_PUBLIC_KEY_PEM, TEST_KEY_ID,
    };
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const LOGIN_URL: &str = "https://sso.example.com/api/public/login";

    fn config() -> SigningConfig {
        SigningConfig::new(TEST_KEY_ID, SIGNING_KEY_PEM)
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
    }

    /// Counts how often each primitive is reached.
    #[derive(Default)]
    struct CountingProvider {
        imports: Arc<AtomicUsize>,
        signs: Arc<AtomicUsize>,
    }

    impl CryptoProvider for CountingProvider {
        fn sha256(&self, data: &[u8]) -> [u8; 32] {
            RustCryptoProvider.sha256(data)
        }

        fn import_rsa_pss_key(
            &self,
            pkcs8_der: &[u8],
        ) -> Result<ImportedKey, Report<SigningError>> {
            self.imports.fetch_add(1, Ordering::SeqCst);
            RustCryptoProvider.import_rsa_pss_key(pkcs8_der)
        }

        fn sign_rsa_pss(
            &self,
            key: &ImportedKey,
            message: &[u8],
        ) -> Result<Vec<u8>, Report<SigningError>> {
            self.signs.fetch_add(1, Ordering::SeqCst);
            RustCryptoProvider.sign_rsa_pss(key, message)
        }

        fn fill_random(&self, buf: &mut [u8]) -> Result<(), Report<SigningError>> {
            RustCryptoProvider.fill_random(buf)
        }
    }

    #[test]
    fn test_sign_manual_request_produces_verifiable_envelope() {
        let body = json!({"b": 1, "a": 2});
        let signer = RequestSigner::new(config());

        let envelope = signer
            .sign_manual_request("post", LOGIN_URL, Some(&body))
            .unwrap();

        assert!(envelope.timestamp.ends_with(".000Z"));
        assert_eq!(envelope.nonce.len(), 36);
        assert_eq!(
            envelope.body_hash,
            "02JqwwqH5vemQoIzs8aCmZdoZfpVCOQmfFQVx2r3p3I="
        );

        let verifier = SignatureVerifier::from_public_key_pem(SIGNING_PUBLIC_KEY_PEM).unwrap();
        let verified = verifier
            .verify_envelope("POST", LOGIN_URL, Some(&body), TEST_KEY_ID, &envelope, "/api")
            .unwrap();
        assert!(verified, "envelope should verify against the public key");
    }

    #[test]
    fn test_sign_manual_request_uses_injected_clock() {
        let signer = RequestSigner::new(config()).with_clock(fixed_clock);
        let envelope = signer.sign_manual_request("GET", LOGIN_URL, None).unwrap();
        assert_eq!(envelope.timestamp, "2024-05-01T12:30:45.000Z");
    }

    #[test]
    fn test_sign_manual_request_free_function() {
        let envelope = sign_manual_request("POST", LOGIN_URL, None, &config()).unwrap();
        assert_eq!(
            envelope.body_hash,
            "RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o="
        );
    }

    #[test]
    fn test_each_request_gets_fresh_nonce() {
        let signer = RequestSigner::new(config());
        let first = signer.sign_manual_request("GET", LOGIN_URL, None).unwrap();
        let second = signer.sign_manual_request("GET", LOGIN_URL, None).unwrap();
        assert_ne!(first.nonce, second.nonce);
    }

    #[test]
    fn test_key_is_imported_per_request() {
        let provider = CountingProvider::default();
        let imports = Arc::clone(&provider.imports);
        let signs = Arc::clone(&provider.signs);
        let signer = RequestSigner::with_provider(provider, config());

        signer.sign_manual_request("GET", LOGIN_URL, None).unwrap();
        signer.sign_manual_request("GET", LOGIN_URL, None).unwrap();

        assert_eq!(imports.load(Ordering::SeqCst), 2);
        assert_eq!(signs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_key_id_is_configuration_error() {
        let signer = RequestSigner::new(SigningConfig::new("", SIGNING_KEY_PEM));
        let err = signer
            .sign_manual_request("GET", LOGIN_URL, None)
            .expect_err("empty key id must fail");
        assert!(matches!(
            err.current_context(),
            SigningError::Configuration { .. }
        ));
    }

    #[test]
    fn test_missing_private_key_is_configuration_error() {
        let signer = RequestSigner::new(SigningConfig::new(TEST_KEY_ID, "  "));
        let err = signer
            .sign_manual_request("GET", LOGIN_URL, None)
            .expect_err("empty key must fail");
        assert!(matches!(
            err.current_context(),
            SigningError::Configuration { .. }
        ));
    }

    #[test]
    fn test_wrong_key_type_aborts_before_signing() {
        let provider = CountingProvider::default();
        let signs = Arc::clone(&provider.signs);
        let signer =
            RequestSigner::with_provider(provider, SigningConfig::new(TEST_KEY_ID, EC_P256_KEY_PEM));

        let err = signer
            .sign_manual_request("GET", LOGIN_URL, None)
            .expect_err("EC key must not import");

        assert!(matches!(err.current_context(), SigningError::KeyImport { .. }));
        assert_eq!(signs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prefix_mismatch_aborts_without_signing() {
        let provider = CountingProvider::default();
        let signs = Arc::clone(&provider.signs);
        let signer = RequestSigner::with_provider(provider, config());

        let result =
            signer.sign_manual_request("POST", "https://sso.example.com/public/me/refresh-token", None);

        assert!(result.is_err());
        assert_eq!(signs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_custom_path_prefix() {
        let signer = RequestSigner::new(config().with_path_prefix("/gateway/v1"));
        let envelope = signer
            .sign_manual_request("GET", "https://sso.example.com/gateway/v1/public/me", None)
            .unwrap();

        let verifier = SignatureVerifier::from_public_key_pem(SIGNING_PUBLIC_KEY_PEM).unwrap();
        assert!(verifier
            .verify_envelope(
                "GET",
                "https://sso.example.com/gateway/v1/public/me",
                None,
                TEST_KEY_ID,
                &envelope,
                "/gateway/v1",
            )
            .unwrap());
    }

    #[test]
    fn test_signer_is_shareable_across_threads() {
        let signer = Arc::new(RequestSigner::new(config()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let signer = Arc::clone(&signer);
                std::thread::spawn(move || {
                    signer
                        .sign_manual_request("GET", LOGIN_URL, None)
                        .map(|envelope| envelope.nonce)
                        .map_err(|e| format!("{e:?}"))
                })
            })
            .collect();

        let mut nonces: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        nonces.sort();
        nonces.dedup();
        assert_eq!(nonces.len(), 4);
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let signer_config = config();
        let rendered = format!("{signer_config:?}");
        assert!(!rendered.contains("BEGIN PRIVATE KEY"));

        let envelope = RequestSigner::new(config())
            .sign_manual_request("GET", LOGIN_URL, None)
            .unwrap();
        let rendered = format!("{envelope:?}");
        assert!(!rendered.contains(&envelope.signature));
        assert!(rendered.contains(&envelope.nonce));
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let envelope = SignedEnvelope {
            timestamp: "2024-05-01T12:30:45.000Z".into(),
            signature: "c2ln".into(),
            nonce: "n".into(),
            body_hash: "h".into(),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["bodyHash"], "h");
        assert_eq!(value["timestamp"], "2024-05-01T12:30:45.000Z");
    }
}
