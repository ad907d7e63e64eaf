//! Common functionality for the SSO client.
//!
//! This crate holds the request-signing core used by route handlers that
//! forward manual-login calls to the identity server, plus the PKCE helpers
//! and settings shared with the command-line tool.
//!
//! # Modules
//!
//! - [`constants`]: Header names and protocol constants
//! - [`error`]: Error types for the signing pipeline
//! - [`pkce`]: PKCE code verifier, challenge and state generation
//! - [`redaction`]: Log-safe wrappers for secrets
//! - [`request_signing`]: Canonicalization, hashing, RSA-PSS signing and verification
//! - [`settings`]: Configuration management and validation
//! - [`test_support`]: Testing fixtures

pub mod constants;
pub mod error;
pub mod pkce;
pub mod redaction;
pub mod request_signing;
pub mod settings;
