//! Log-safe wrappers for secret values.
//!
//! Private keys, API keys, client secrets and signatures must never reach a
//! log sink in cleartext. [`Redacted`] hides a value behind its `Debug` and
//! `Display` impls, and [`RedactedHeaders`] renders a header map with the
//! sensitive values masked.

use std::fmt;

use http::header::{HeaderMap, HeaderName, AUTHORIZATION, COOKIE, SET_COOKIE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{HEADER_API_KEY, HEADER_X_SIGNATURE};

const REDACTED: &str = "[REDACTED]";

/// A value that prints as `[REDACTED]`.
///
/// The inner value is only reachable through [`Redacted::expose`], so every
/// read of a secret is explicit at the call site.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Redacted<T>(T);

impl<T> Redacted<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl Redacted<String> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<T> From<T> for Redacted<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Redacted<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self)
    }
}

/// Serializes as the redaction marker, so validation reports and other
/// serialized diagnostics never carry the secret.
impl<T> Serialize for Redacted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// Returns true for headers whose values are credentials.
#[must_use]
pub fn is_sensitive_header(name: &HeaderName) -> bool {
    *name == HEADER_API_KEY
        || *name == HEADER_X_SIGNATURE
        || *name == AUTHORIZATION
        || *name == COOKIE
        || *name == SET_COOKIE
}

/// Display adapter that prints a header map with credentials masked.
pub struct RedactedHeaders<'a>(pub &'a HeaderMap);

impl fmt::Display for RedactedHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if is_sensitive_header(name) {
                write!(f, "{}: {}", name, REDACTED)?;
            } else {
                write!(f, "{}: {}", name, value.to_str().unwrap_or("<binary>"))?;
            }
        }
        f.write_str("}")
    }
}
