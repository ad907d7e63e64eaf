use http::header::HeaderName;

pub const HEADER_X_TIMESTAMP: HeaderName = HeaderName::from_static("x-timestamp");
pub const HEADER_X_SIGNATURE: HeaderName = HeaderName::from_static("x-signature");
pub const HEADER_X_KEY_ID: HeaderName = HeaderName::from_static("x-key-id");
pub const HEADER_X_NONCE: HeaderName = HeaderName::from_static("x-nonce");
pub const HEADER_X_APP_IDENTIFIER: HeaderName = HeaderName::from_static("x-app-identifier");
pub const HEADER_API_KEY: HeaderName = HeaderName::from_static("apikey");
pub const HEADER_X_USERNAME_SOURCE: HeaderName = HeaderName::from_static("x-username-source");
pub const HEADER_X_PASS_SOURCE: HeaderName = HeaderName::from_static("x-pass-source");

/// Path prefix the identity server's gateway strips before verifying.
pub const DEFAULT_PATH_PREFIX: &str = "/api";

/// Username source sent with manual login when the caller does not pick one.
pub const DEFAULT_USERNAME_SOURCE: &str = "npk";

/// Salt length for RSA-PSS. Signer and verifier must agree on it.
pub const PSS_SALT_LEN: usize = 32;

/// Authorization endpoint path on the public SSO base URL.
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";

/// Token endpoint path on the SSO backend URL.
pub const TOKEN_PATH: &str = "/public/oauth/token";
