//! Settings loading for commands that sign with configured credentials.
//!
//! Configuration is loaded from TOML files and merged with environment variables
//! prefixed with `SSO_CLIENT__`. For example, `SSO_CLIENT__MANUAL_AUTH__KEY_ID`
//! will override `manual_auth.key_id` in the TOML file.

use std::fs;
use std::path::Path;

use sso_client_common::settings::Settings;

use crate::error::CliError;

/// Load configuration from a TOML file and merge environment overrides.
pub(crate) fn load_settings(file: &Path) -> Result<Settings, CliError> {
    let content = fs::read_to_string(file)?;

    log::debug!("Loading config from: {}", file.display());
    log::debug!("Environment variables with SSO_CLIENT__ prefix will be merged");

    let settings = Settings::from_toml(&content)
        .map_err(|e| CliError::Config(format!("Failed to load {}: {:?}", file.display(), e)))?;

    log::debug!(
        "Loaded settings for app '{}' with key id '{}'",
        settings.manual_auth.app_identifier,
        settings.manual_auth.key_id
    );

    Ok(settings)
}

/// Read a PEM file, trimming surrounding whitespace.
pub(crate) fn read_pem(file: &Path) -> Result<String, CliError> {
    let content = fs::read_to_string(file)?;
    Ok(content.trim().to_string())
}
