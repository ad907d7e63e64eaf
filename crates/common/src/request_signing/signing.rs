//! RSA-PSS signing of canonical strings.

use base64::{engine::general_purpose, Engine};
use error_stack::{Report, ResultExt};

use crate::error::SigningError;

use super::digest::CanonicalString;
use super::keys::ImportedKey;
use super::provider::CryptoProvider;

/// Signs the UTF-8 bytes of `canonical` and returns standard base64.
///
/// PSS is randomized, so two calls over the same input produce different
/// signatures that both verify.
///
/// # Errors
///
/// Returns [`SigningError::Signing`] if the signing primitive fails.
pub fn sign<P: CryptoProvider + ?Sized>(
    provider: &P,
    key: &ImportedKey,
    canonical: &CanonicalString,
) -> Result<String, Report<SigningError>> {
    let signature = provider
        .sign_rsa_pss(key, canonical.as_bytes())
        .attach("while signing canonical string")?;

    if signature.is_empty() {
        return Err(Report::new(SigningError::Signing {
            message: "Signing primitive returned an empty signature".into(),
        }));
    }

    Ok(general_purpose::STANDARD.encode(signature))
}
