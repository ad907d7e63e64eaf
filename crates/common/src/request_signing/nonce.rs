//! Replay-resistance primitives: second-precision timestamps and UUID v4 nonces.

use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use uuid::Builder;

use crate::error::SigningError;

use super::provider::CryptoProvider;

/// Current UTC time as ISO-8601 with the milliseconds forced to `000`.
#[must_use]
pub fn timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Formats `at` as `YYYY-MM-DDTHH:MM:SS.000Z`, discarding sub-second precision.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    format!("{}.000Z", at.format("%Y-%m-%dT%H:%M:%S"))
}

/// A fresh UUID v4 string drawn from the provider's random source.
///
/// # Errors
///
/// Returns [`SigningError::Signing`] if the random source fails.
pub fn nonce<P: CryptoProvider + ?Sized>(provider: &P) -> Result<String, Report<SigningError>> {
    let mut bytes = [0u8; 16];
    provider
        .fill_random(&mut bytes)
        .attach("while generating request nonce")?;

    Ok(Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string())
}
