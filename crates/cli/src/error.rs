//! CLI error types.

use std::fmt;

use error_stack::Report;
use sso_client_common::error::SigningError;

#[derive(Debug)]
pub enum CliError {
    /// Configuration file error
    Config(String),
    /// Signing pipeline error
    Signing(String),
    /// Malformed command-line input
    Input(String),
    /// Signature did not verify
    Verification(String),
    /// IO error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Signing(msg) => write!(f, "Signing failed: {}", msg),
            CliError::Input(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Verification(msg) => write!(f, "Verification failed: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Input(format!("Body is not valid JSON: {}", err))
    }
}

impl From<Report<SigningError>> for CliError {
    fn from(report: Report<SigningError>) -> Self {
        log::debug!("{:?}", report);
        match report.current_context() {
            SigningError::Configuration { .. } => CliError::Config(report.to_string()),
            _ => CliError::Signing(report.to_string()),
        }
    }
}
