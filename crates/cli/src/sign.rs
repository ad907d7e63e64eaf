//! Commands that sign with the configured key.

use std::path::Path;

use http::header::HeaderMap;
use serde_json::{json, Map, Value};
use sso_client_common::redaction::RedactedHeaders;
use sso_client_common::request_signing::{RequestSigner, SignatureVerifier};
use sso_client_common::settings::Settings;

use crate::config::{load_settings, read_pem};
use crate::error::CliError;
use crate::OutputFormat;

const REDACTED: &str = "[REDACTED]";

/// Path signed by `self-test`; matches the manual-login endpoint.
const SELF_TEST_PATH: &str = "/api/public/login";

pub(crate) fn parse_body(body: Option<&str>) -> Result<Option<Value>, CliError> {
    body.map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(CliError::from)
}

/// Sign one request and build the full outbound header set.
pub(crate) fn signed_headers(
    settings: &Settings,
    method: &str,
    path: &str,
    body: Option<&Value>,
) -> Result<HeaderMap, CliError> {
    let signer = RequestSigner::new(settings.signing_config());
    let url = settings.public_endpoint(path);
    let envelope = signer.sign_manual_request(method, &url, body)?;

    log::info!("Signed {} {} with key '{}'", method, url, signer.key_id());

    let headers = settings
        .manual_auth_headers()
        .build(&envelope, signer.key_id())?;
    log::debug!("Outbound headers: {}", RedactedHeaders(&headers));
    Ok(headers)
}

/// Render headers for output. Values marked sensitive are masked unless
/// `show_secrets` is set.
pub(crate) fn render_headers(
    headers: &HeaderMap,
    format: OutputFormat,
    show_secrets: bool,
) -> Result<String, CliError> {
    let mut entries = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        let text = if value.is_sensitive() && !show_secrets {
            REDACTED
        } else {
            value
                .to_str()
                .map_err(|e| CliError::Input(format!("Header {} is not printable: {}", name, e)))?
        };
        entries.push((name.as_str(), text));
    }

    let output = match format {
        OutputFormat::Text => entries
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let map: Map<String, Value> = entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            serde_json::to_string_pretty(&Value::Object(map))?
        }
    };
    Ok(output)
}

pub fn sign(
    config: &Path,
    method: &str,
    path: &str,
    body: Option<&str>,
    format: OutputFormat,
    show_secrets: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let body = parse_body(body)?;
    let headers = signed_headers(&settings, method, path, body.as_ref())?;

    println!("{}", render_headers(&headers, format, show_secrets)?);
    Ok(())
}

/// Sign a sample login request and check it against `public_key`.
pub(crate) fn run_self_test(settings: &Settings, public_key_pem: &str) -> Result<(), CliError> {
    let verifier = SignatureVerifier::from_public_key_pem(public_key_pem)?;
    let signer = RequestSigner::new(settings.signing_config());

    let url = settings.public_endpoint(SELF_TEST_PATH);
    let body = json!({ "identifier": "self-test" });
    let envelope = signer.sign_manual_request("POST", &url, Some(&body))?;

    let valid = verifier.verify_envelope(
        "POST",
        &url,
        Some(&body),
        signer.key_id(),
        &envelope,
        &signer.config().path_prefix,
    )?;

    if !valid {
        return Err(CliError::Verification(format!(
            "Public key does not match private key '{}'",
            signer.key_id()
        )));
    }
    Ok(())
}

pub fn self_test(config: &Path, public_key: &Path) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let public_key_pem = read_pem(public_key)?;

    run_self_test(&settings, &public_key_pem)?;

    println!("Self-test passed");
    println!("  Key id: {}", settings.manual_auth.key_id);
    println!("  Signed URL: {}", settings.public_endpoint(SELF_TEST_PATH));
    Ok(())
}
