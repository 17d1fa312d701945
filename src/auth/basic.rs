use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

use crate::{config::AuthConfig, error::ApiError, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingHeader,
    #[error("Authorization header must be a Basic auth")]
    WrongScheme,
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// The `user:pass` bytes carried by a `Basic` authorization header.
#[derive(Debug, PartialEq, Eq)]
struct Credentials(Vec<u8>);

impl Credentials {
    /// Accepts both `Basic user:pass` and the RFC 7617 `Basic base64(user:pass)`.
    /// Base64 never contains `:`, so a colon selects the literal form. Header
    /// bytes are taken as-is, they need not be ASCII.
    fn from_header(value: Option<&[u8]>) -> Result<Self, AuthError> {
        let value = value
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingHeader)?;
        let encoded = value.strip_prefix(b"Basic ").ok_or(AuthError::WrongScheme)?;

        if encoded.contains(&b':') {
            return Ok(Self(encoded.to_vec()));
        }

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| AuthError::InvalidCredentials)?;
        if !decoded.contains(&b':') {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Self(decoded))
    }

    /// Compares the whole `user:pass` string, so either half may contain `:`.
    fn matches(&self, expected: &AuthConfig) -> bool {
        let want = format!("{}:{}", expected.username, expected.password);
        self.0.as_slice().ct_eq(want.as_bytes()).into()
    }
}

/// Rejects the request with 401 unless it carries the configured credentials.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|h| h.as_bytes());

    let credentials = Credentials::from_header(header).map_err(|e| {
        warn!(error = %e, "rejected authorization header");
        e
    })?;

    if !credentials.matches(&state.config.auth) {
        warn!("invalid credentials");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(username: &str, password: &str) -> AuthConfig {
        AuthConfig {
            username: username.into(),
            password: password.into(),
        }
    }

    fn parse(header: &str) -> Result<Credentials, AuthError> {
        Credentials::from_header(Some(header.as_bytes()))
    }

    #[test]
    fn literal_form_is_accepted() {
        let c = parse("Basic admin:s3cret").unwrap();
        assert_eq!(c, Credentials(b"admin:s3cret".to_vec()));
        assert!(c.matches(&expected("admin", "s3cret")));
    }

    #[test]
    fn base64_form_is_accepted() {
        let header = format!("Basic {}", STANDARD.encode("admin:s3cret"));
        assert!(parse(&header).unwrap().matches(&expected("admin", "s3cret")));
    }

    #[test]
    fn colons_on_either_side_are_allowed() {
        assert!(parse("Basic admin:a:b").unwrap().matches(&expected("admin", "a:b")));
        assert!(parse("Basic ad:min:pw").unwrap().matches(&expected("ad:min", "pw")));
    }

    #[test]
    fn non_ascii_credentials_match_byte_for_byte() {
        let config = expected("jürgen", "sécret");
        assert!(parse("Basic jürgen:sécret").unwrap().matches(&config));

        let header = format!("Basic {}", STANDARD.encode("jürgen:sécret"));
        assert!(parse(&header).unwrap().matches(&config));

        assert!(!parse("Basic jurgen:secret").unwrap().matches(&config));
    }

    #[test]
    fn missing_or_empty_header() {
        assert_eq!(Credentials::from_header(None), Err(AuthError::MissingHeader));
        assert_eq!(parse(""), Err(AuthError::MissingHeader));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(parse("Bearer abc.def"), Err(AuthError::WrongScheme));
        assert_eq!(parse("basic admin:s3cret"), Err(AuthError::WrongScheme));
        assert_eq!(parse("Bäsic admin:s3cret"), Err(AuthError::WrongScheme));
    }

    #[test]
    fn garbage_payload_is_invalid_credentials() {
        assert_eq!(parse("Basic !!!"), Err(AuthError::InvalidCredentials));
        // valid base64 but no colon inside
        let header = format!("Basic {}", STANDARD.encode("adminonly"));
        assert_eq!(parse(&header), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn wrong_half_does_not_match() {
        let config = expected("admin", "s3cret");
        assert!(!parse("Basic admin:guess").unwrap().matches(&config));
        assert!(!parse("Basic root:s3cret").unwrap().matches(&config));
        assert!(!parse("Basic admin:s3cret ").unwrap().matches(&config));
    }
}
