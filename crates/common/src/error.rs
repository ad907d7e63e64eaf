//! Error types for request signing.
//!
//! Every failure in the signing pipeline is reported as a
//! [`Report<SigningError>`](error_stack::Report). None of these errors are
//! recoverable at this layer: the caller decides how to surface them
//! (typically as an HTTP 500). Messages never include key material, request
//! bodies or signatures.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum SigningError {
    /// The request body could not be turned into canonical JSON.
    #[display("Canonicalization error: {message}")]
    Canonicalization { message: String },

    /// The PEM private key is malformed or not an RSA PKCS#8 key.
    #[display("Key import error: {message}")]
    KeyImport { message: String },

    /// The cryptographic primitive failed while signing or generating randomness.
    #[display("Signing error: {message}")]
    Signing { message: String },

    /// Missing key id or key material, bad URL, or a path that does not carry
    /// the configured prefix.
    #[display("Configuration error: {message}")]
    Configuration { message: String },
}
