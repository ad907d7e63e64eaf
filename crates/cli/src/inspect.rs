//! Commands that need no signing credentials.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use sso_client_common::pkce::{
    generate_auth_nonce, generate_code_verifier_and_challenge, generate_state,
    CODE_CHALLENGE_METHOD,
};
use sso_client_common::request_signing::{
    build_canonical_string, compute_body_hash, CanonicalInputs, CanonicalString,
    RustCryptoProvider, SignatureVerifier,
};

use crate::config::{load_settings, read_pem};
use crate::error::CliError;
use crate::sign::parse_body;

pub struct CanonicalArgs<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub body: Option<&'a str>,
    pub timestamp: &'a str,
    pub nonce: &'a str,
    pub key_id: &'a str,
    pub prefix: &'a str,
}

pub(crate) fn canonical_string(args: &CanonicalArgs<'_>) -> Result<CanonicalString, CliError> {
    let body = parse_body(args.body)?;
    let body_hash = compute_body_hash(&RustCryptoProvider, body.as_ref())?;

    let canonical = build_canonical_string(
        &CanonicalInputs {
            timestamp: args.timestamp,
            method: args.method,
            url: args.url,
            body_hash: &body_hash,
            key_id: args.key_id,
            nonce: args.nonce,
        },
        args.prefix,
    )?;
    Ok(canonical)
}

pub fn canonical(args: &CanonicalArgs<'_>) -> Result<(), CliError> {
    println!("{}", canonical_string(args)?);
    Ok(())
}

pub fn body_hash(body: Option<&str>) -> Result<(), CliError> {
    let body = parse_body(body)?;
    println!("{}", compute_body_hash(&RustCryptoProvider, body.as_ref())?);
    Ok(())
}

pub(crate) fn verify_signature(
    public_key_pem: &str,
    canonical: &str,
    signature: &str,
) -> Result<(), CliError> {
    let verifier = SignatureVerifier::from_public_key_pem(public_key_pem)?;
    // Editors usually leave a trailing newline; the nonce is always the last field.
    let canonical = CanonicalString::parse(canonical.trim_end_matches(['\r', '\n']))?;

    if verifier.verify(&canonical, signature.trim())? {
        Ok(())
    } else {
        Err(CliError::Verification(
            "Signature does not match canonical string".into(),
        ))
    }
}

pub fn verify(public_key: &Path, canonical_file: &Path, signature: &str) -> Result<(), CliError> {
    let public_key_pem = read_pem(public_key)?;
    let canonical = fs::read_to_string(canonical_file)?;

    verify_signature(&public_key_pem, &canonical, signature)?;

    println!("Signature is valid");
    Ok(())
}

/// PKCE values for a new login, plus the authorization URL when settings
/// are supplied.
pub(crate) fn pkce_output(config: Option<&Path>) -> Result<Value, CliError> {
    let pair = generate_code_verifier_and_challenge(&RustCryptoProvider)?;
    let state = generate_state(&RustCryptoProvider)?;
    let nonce = generate_auth_nonce(&RustCryptoProvider)?;

    let mut output = json!({
        "codeVerifier": pair.code_verifier.expose(),
        "codeChallenge": pair.code_challenge,
        "codeChallengeMethod": CODE_CHALLENGE_METHOD,
        "state": state,
        "nonce": nonce,
    });

    if let Some(config) = config {
        let settings = load_settings(config)?;
        let url = settings.authorization_url(&pair, &state, &nonce)?;
        output["authorizationUrl"] = Value::String(url);
    }
    Ok(output)
}

pub fn pkce(config: Option<&Path>) -> Result<(), CliError> {
    let output = pkce_output(config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
