//! Body hashing and canonical string assembly.
//!
//! The canonical string is the exact byte sequence that gets signed. Its
//! layout is a wire contract with the identity server, which rebuilds it from
//! the received request and headers:
//!
//! ```text
//! <timestamp>\n<METHOD>\n<scheme>://<host>\n<path-without-prefix><?query>\n<keyId>\n<bodyHash>\n<nonce>
//! ```

use std::fmt;

use base64::{engine::general_purpose, Engine};
use error_stack::{Report, ResultExt};
use http::Method;
use serde_json::Value;
use url::Url;

use crate::error::SigningError;

use super::canonical::canonicalize;
use super::provider::CryptoProvider;

/// Number of newline-separated fields in a canonical string.
pub const CANONICAL_FIELD_COUNT: usize = 7;

/// Hashes the canonical form of `body` and returns standard base64 of the digest.
///
/// # Errors
///
/// Returns [`SigningError::Canonicalization`] if the body cannot be canonicalized.
pub fn compute_body_hash<P: CryptoProvider + ?Sized>(
    provider: &P,
    body: Option<&Value>,
) -> Result<String, Report<SigningError>> {
    let canonical = canonicalize(body)?;
    let digest = provider.sha256(canonical.as_bytes());
    Ok(general_purpose::STANDARD.encode(digest))
}

/// The request fields covered by a signature.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalInputs<'a> {
    pub timestamp: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub body_hash: &'a str,
    pub key_id: &'a str,
    pub nonce: &'a str,
}

/// The newline-joined string that is signed and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalString(String);

impl CanonicalString {
    /// Accepts an already assembled canonical string, e.g. one captured from
    /// a server log, after checking it has the expected field count.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Configuration`] if the string does not have
    /// exactly [`CANONICAL_FIELD_COUNT`] newline-separated fields.
    pub fn parse(raw: &str) -> Result<Self, Report<SigningError>> {
        let count = raw.split('\n').count();
        if count != CANONICAL_FIELD_COUNT || raw.contains('\r') {
            return Err(Report::new(SigningError::Configuration {
                message: format!(
                    "Canonical string must have {} fields, found {}",
                    CANONICAL_FIELD_COUNT, count
                ),
            }));
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The seven fields in wire order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.0.split('\n').collect()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the canonical string for a request.
///
/// `path_prefix` is the gateway prefix the identity server strips before
/// verification (usually `/api`). The URL path must start with it at a
/// segment boundary; an empty prefix leaves the path untouched.
///
/// # Errors
///
/// Returns [`SigningError::Configuration`] if the URL cannot be parsed, has
/// no host, does not start with `path_prefix`, if the method is not a valid
/// HTTP method, or if any field contains a newline.
pub fn build_canonical_string(
    inputs: &CanonicalInputs<'_>,
    path_prefix: &str,
) -> Result<CanonicalString, Report<SigningError>> {
    let method = Method::from_bytes(inputs.method.to_ascii_uppercase().as_bytes())
        .change_context(SigningError::Configuration {
            message: format!("Invalid HTTP method '{}'", inputs.method),
        })?;

    let url = Url::parse(inputs.url).change_context(SigningError::Configuration {
        message: format!("Invalid request URL '{}'", inputs.url),
    })?;
    let host = url.host_str().ok_or_else(|| {
        Report::new(SigningError::Configuration {
            message: format!("Request URL '{}' has no host", inputs.url),
        })
    })?;
    let authority = format!("{}://{}", url.scheme(), host);

    let path = strip_path_prefix(url.path(), path_prefix)?;
    let path_and_query = match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    };

    let fields = [
        inputs.timestamp,
        method.as_str(),
        authority.as_str(),
        path_and_query.as_str(),
        inputs.key_id,
        inputs.body_hash,
        inputs.nonce,
    ];

    if let Some(field) = fields.iter().find(|f| f.contains(['\n', '\r'])) {
        return Err(Report::new(SigningError::Configuration {
            message: "Canonical string fields must not contain line breaks".into(),
        })
        .attach(format!("offending field length: {}", field.len())));
    }

    Ok(CanonicalString(fields.join("\n")))
}

fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> Result<&'a str, Report<SigningError>> {
    if prefix.is_empty() {
        return Ok(path);
    }

    let rest = path.strip_prefix(prefix).ok_or_else(|| {
        Report::new(SigningError::Configuration {
            message: format!("Path '{}' does not start with prefix '{}'", path, prefix),
        })
    })?;

    if !prefix.ends_with('/') && !rest.is_empty() && !rest.starts_with('/') {
        return Err(Report::new(SigningError::Configuration {
            message: format!(
                "Path '{}' does not start with prefix '{}' at a segment boundary",
                path, prefix
            ),
        }));
    }

    Ok(rest)
}
