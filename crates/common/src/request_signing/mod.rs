//! Request signing for the SSO manual-login path.
//!
//! Outbound requests to the identity server carry an RSA-PSS signature over a
//! canonical string built from the request method, URL, key id, body hash,
//! timestamp and nonce. This module provides body canonicalization, hashing,
//! key import, signing, the signature envelope and headers, and a verifier
//! that mirrors the server's check.

pub mod canonical;
pub mod digest;
pub mod envelope;
pub mod headers;
pub mod keys;
pub mod nonce;
pub mod provider;
pub mod signing;
pub mod verify;

pub use canonical::*;
pub use digest::*;
pub use envelope::*;
pub use headers::*;
pub use keys::*;
pub use nonce::*;
pub use provider::*;
pub use signing::*;
pub use verify::*;
