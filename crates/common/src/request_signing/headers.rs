//! Outbound header sets for signed requests to the identity server.

use error_stack::{Report, ResultExt};
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::constants::{
    HEADER_API_KEY, HEADER_X_APP_IDENTIFIER, HEADER_X_KEY_ID, HEADER_X_NONCE,
    HEADER_X_PASS_SOURCE, HEADER_X_SIGNATURE, HEADER_X_TIMESTAMP, HEADER_X_USERNAME_SOURCE,
};
use crate::error::SigningError;
use crate::redaction::Redacted;

use super::envelope::SignedEnvelope;

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, Report<SigningError>> {
    HeaderValue::from_str(value).change_context(SigningError::Configuration {
        message: format!("Value for header '{}' is not a valid header value", name),
    })
}

impl SignedEnvelope {
    /// The four signature headers: `X-Timestamp`, `X-Signature`, `X-Key-Id`, `X-Nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Configuration`] if `key_id` contains characters
    /// that are not allowed in a header value.
    pub fn signature_headers(&self, key_id: &str) -> Result<HeaderMap, Report<SigningError>> {
        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(HEADER_X_TIMESTAMP, header_value(&HEADER_X_TIMESTAMP, &self.timestamp)?);
        headers.insert(HEADER_X_SIGNATURE, header_value(&HEADER_X_SIGNATURE, &self.signature)?);
        headers.insert(HEADER_X_KEY_ID, header_value(&HEADER_X_KEY_ID, key_id)?);
        headers.insert(HEADER_X_NONCE, header_value(&HEADER_X_NONCE, &self.nonce)?);
        Ok(headers)
    }
}

/// Identification headers sent alongside the signature on manual-auth calls.
#[derive(Debug, Clone)]
pub struct ManualAuthHeaders {
    pub app_identifier: String,
    pub api_key: Redacted<String>,
    pub username_source: Option<String>,
    pub pass_source: Option<String>,
}

impl ManualAuthHeaders {
    pub fn new(app_identifier: impl Into<String>, api_key: Redacted<String>) -> Self {
        Self {
            app_identifier: app_identifier.into(),
            api_key,
            username_source: None,
            pass_source: None,
        }
    }

    #[must_use]
    pub fn with_username_source(mut self, source: impl Into<String>) -> Self {
        self.username_source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_pass_source(mut self, source: impl Into<String>) -> Self {
        self.pass_source = Some(source.into());
        self
    }

    /// Full header set for a signed JSON request.
    ///
    /// Empty username or password sources are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Configuration`] if any value cannot be used as
    /// a header value.
    pub fn build(
        &self,
        envelope: &SignedEnvelope,
        key_id: &str,
    ) -> Result<HeaderMap, Report<SigningError>> {
        let mut headers = envelope.signature_headers(key_id)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HEADER_X_APP_IDENTIFIER,
            header_value(&HEADER_X_APP_IDENTIFIER, &self.app_identifier)?,
        );

        let mut api_key = header_value(&HEADER_API_KEY, self.api_key.expose())?;
        api_key.set_sensitive(true);
        headers.insert(HEADER_API_KEY, api_key);

        if let Some(source) = self.username_source.as_deref().filter(|s| !s.is_empty()) {
            headers.insert(
                HEADER_X_USERNAME_SOURCE,
                header_value(&HEADER_X_USERNAME_SOURCE, source)?,
            );
        }
        if let Some(source) = self.pass_source.as_deref().filter(|s| !s.is_empty()) {
            headers.insert(
                HEADER_X_PASS_SOURCE,
                header_value(&HEADER_X_PASS_SOURCE, source)?,
            );
        }

        Ok(headers)
    }
}
