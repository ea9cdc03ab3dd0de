//! Caller identity.
//!
//! Token verification happens upstream. The verified user reaches the gateway in the
//! `X-Auth-User` header as base64-encoded JSON, which [`identity_middleware`] decodes
//! once per request into a [`RequestIdentity`] request extension.

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use filegate_core::models::{RequestIdentity, UserIdentity};
use filegate_core::AppError;

use crate::constants::AUTH_USER_HEADER;
use crate::error::HttpAppError;

/// Decode the forwarded identity. No header means anonymous; a header that does not
/// decode to a user is rejected rather than silently downgraded.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<RequestIdentity, AppError> {
    let Some(value) = headers.get(AUTH_USER_HEADER) else {
        return Ok(RequestIdentity::Anonymous);
    };

    let encoded = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("identity header is not ASCII".to_string()))?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::Unauthorized("identity header is not valid base64".to_string()))?;
    let user: UserIdentity = serde_json::from_slice(&decoded)
        .map_err(|e| AppError::Unauthorized(format!("identity header is malformed: {}", e)))?;

    if user.id.trim().is_empty() {
        return Err(AppError::Unauthorized("identity has an empty id".to_string()));
    }

    Ok(RequestIdentity::User(user))
}

pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    match identity_from_headers(request.headers()) {
        Ok(identity) => {
            if let Some(user) = identity.user() {
                tracing::debug!(user_id = %user.id, is_admin = user.is_admin, "Identity attached");
            }
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => HttpAppError(err).into_response(),
    }
}

fn identity_from_parts(parts: &Parts) -> Result<RequestIdentity, AppError> {
    match parts.extensions.get::<RequestIdentity>() {
        Some(identity) => Ok(identity.clone()),
        None => identity_from_headers(&parts.headers),
    }
}

/// Conditional authentication: anonymous callers are allowed.
#[derive(Debug, Clone)]
pub struct Identity(pub RequestIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity(identity_from_parts(parts)?))
    }
}

/// Required authentication: anonymous callers get a 401 before any backend call.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity_from_parts(parts)? {
            RequestIdentity::User(user) => Ok(AuthenticatedUser(user)),
            RequestIdentity::Anonymous => Err(HttpAppError(AppError::Unauthorized(
                "authentication required".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_USER_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        let identity = identity_from_headers(&HeaderMap::new()).unwrap();
        assert_eq!(identity, RequestIdentity::Anonymous);
    }

    #[test]
    fn decodes_forwarded_user() {
        let encoded = STANDARD.encode(r#"{"id":"bob","alias":"bobby","isAdmin":true,"attributes":{"models":3}}"#);
        let identity = identity_from_headers(&headers_with(&encoded)).unwrap();
        let user = identity.user().unwrap();
        assert_eq!(user.id, "bob");
        assert_eq!(user.alias.as_deref(), Some("bobby"));
        assert!(user.is_admin);
        assert_eq!(user.remaining_models(), Some(3));
    }

    #[test]
    fn garbage_header_is_unauthorized() {
        let err = identity_from_headers(&headers_with("not base64!")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let encoded = STANDARD.encode(r#"{"alias":"no-id"}"#);
        let err = identity_from_headers(&headers_with(&encoded)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn blank_id_is_unauthorized() {
        let encoded = STANDARD.encode(r#"{"id":"  "}"#);
        assert!(identity_from_headers(&headers_with(&encoded)).is_err());
    }
}
