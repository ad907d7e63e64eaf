//! PEM private key import.
//!
//! Keys arrive as PKCS#8 PEM text, usually from configuration or an
//! environment variable. The armour is stripped, the body base64-decoded and
//! the DER handed to the [`CryptoProvider`] for import.

use std::fmt;

use base64::{engine::general_purpose, Engine};
use error_stack::{Report, ResultExt};
use rsa::pss::SigningKey;
use rsa::RsaPrivateKey;
use sha2::Sha256;

use crate::constants::PSS_SALT_LEN;
use crate::error::SigningError;

use super::provider::CryptoProvider;

const PEM_LABEL: &str = "PRIVATE KEY";

/// An RSA key that can only produce RSA-PSS/SHA-256 signatures.
///
/// There is no accessor for the private or public components, no decrypt
/// operation and no serialization. `Debug` never prints key material.
pub struct ImportedKey {
    inner: SigningKey<Sha256>,
}

impl ImportedKey {
    pub(crate) fn new(private_key: RsaPrivateKey) -> Self {
        Self {
            inner: SigningKey::<Sha256>::new_with_salt_len(private_key, PSS_SALT_LEN),
        }
    }

    pub(crate) fn pss_key(&self) -> &SigningKey<Sha256> {
        &self.inner
    }
}

impl fmt::Debug for ImportedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportedKey")
            .field("algorithm", &"RSA-PSS/SHA-256")
            .field("usage", &"sign")
            .finish_non_exhaustive()
    }
}

/// Parses a PKCS#8 PEM private key into a signing handle.
///
/// Literal `\n` escape sequences are accepted as line breaks, since keys
/// pasted into single-line environment variables often carry them.
///
/// # Errors
///
/// Returns [`SigningError::KeyImport`] if the armour is missing or carries a
/// label other than `PRIVATE KEY`, if the body is not valid base64, or if the
/// decoded key is not an RSA PKCS#8 key.
pub fn import_private_key<P: CryptoProvider + ?Sized>(
    provider: &P,
    pem: &str,
) -> Result<ImportedKey, Report<SigningError>> {
    let body = pem_body(pem)?;

    let der = general_purpose::STANDARD
        .decode(body.as_bytes())
        .change_context(SigningError::KeyImport {
            message: "PEM body is not valid base64".into(),
        })?;

    provider
        .import_rsa_pss_key(&der)
        .attach("while importing PKCS#8 private key")
}

fn pem_body(pem: &str) -> Result<String, Report<SigningError>> {
    let normalized = pem.replace("\\r", "").replace("\\n", "\n");
    let text = normalized.trim();

    let begin = text.find("-----BEGIN ").ok_or_else(|| {
        Report::new(SigningError::KeyImport {
            message: "Missing PEM BEGIN line".into(),
        })
    })?;
    let after_begin = &text[begin + "-----BEGIN ".len()..];
    let label_end = after_begin.find("-----").ok_or_else(|| {
        Report::new(SigningError::KeyImport {
            message: "Malformed PEM BEGIN line".into(),
        })
    })?;
    let label = &after_begin[..label_end];
    if label != PEM_LABEL {
        return Err(Report::new(SigningError::KeyImport {
            message: format!("Expected PEM label '{}', found '{}'", PEM_LABEL, label),
        }));
    }

    let footer = format!("-----END {}-----", PEM_LABEL);
    let content = &after_begin[label_end + "-----".len()..];
    let end = content.find(&footer).ok_or_else(|| {
        Report::new(SigningError::KeyImport {
            message: "Missing PEM END line".into(),
        })
    })?;

    Ok(content[..end]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect())
}
