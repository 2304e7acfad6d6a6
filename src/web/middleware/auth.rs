//! Session authentication.
//!
//! A session is a signed JWT carried in the `filebox_session` cookie, or in
//! an `Authorization: Bearer` header for non-browser clients.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::web::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "filebox_session";

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Username.
    pub username: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

/// Keys and settings for issuing and checking session tokens.
#[derive(Clone)]
pub struct JwtState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// Session lifetime in seconds.
    pub expiry_secs: u64,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to create session")
        })
    }

    /// Decode and validate a session token.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("JWT validation failed: {}", e);
                None
            }
        }
    }
}

/// Find the session token: Bearer header first, then the cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Resolve the claims of the current request, if it carries a valid session.
fn session_claims(parts: &Parts) -> Result<Option<SessionClaims>, ApiError> {
    let jwt_state = parts
        .extensions
        .get::<Arc<JwtState>>()
        .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

    Ok(session_token(parts).and_then(|token| jwt_state.verify(&token)))
}

/// Extractor for authenticated users.
///
/// Requests without a valid session are redirected to the login page.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    /// The authenticated user's id.
    pub fn user_id(&self) -> i64 {
        self.0.sub
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_claims(parts).map_err(IntoResponse::into_response)? {
            Some(claims) => Ok(AuthUser(claims)),
            None => Err(Redirect::to(LOGIN_PATH).into_response()),
        }
    }
}

/// Optional authentication extractor.
///
/// Similar to AuthUser but doesn't fail if no session is present.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(session_claims(parts)?))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn parts_with(header: (axum::http::HeaderName, &str), state: Arc<JwtState>) -> Parts {
        let request = Request::builder()
            .uri("/files")
            .header(header.0, header.1)
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        parts.extensions.insert(state);
        parts
    }

    #[test]
    fn test_issue_and_verify() {
        let state = JwtState::new("test-secret", 3600);

        let token = state.issue(7, "alice").unwrap();
        let claims = state.verify(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token() {
        let state = JwtState::new("test-secret", 3600);
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: 1,
            username: "alice".to_string(),
            iat: (now - 7200) as u64,
            exp: (now - 3600) as u64,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(state.verify(&token).is_none());
    }

    #[test]
    fn test_invalid_secret() {
        let token = JwtState::new("secret1", 3600).issue(1, "alice").unwrap();
        assert!(JwtState::new("secret2", 3600).verify(&token).is_none());
    }

    #[test]
    fn test_session_token_from_cookie() {
        let state = Arc::new(JwtState::new("s", 3600));
        let token = state.issue(3, "bob").unwrap();
        let cookie = format!("other=1; {}={}", SESSION_COOKIE, token);

        let parts = parts_with((COOKIE, &cookie), state);
        let claims = session_claims(&parts).unwrap().unwrap();
        assert_eq!(claims.sub, 3);
    }

    #[test]
    fn test_session_token_from_bearer() {
        let state = Arc::new(JwtState::new("s", 3600));
        let token = state.issue(4, "carol").unwrap();
        let header = format!("Bearer {}", token);

        let parts = parts_with((AUTHORIZATION, &header), state);
        let claims = session_claims(&parts).unwrap().unwrap();
        assert_eq!(claims.sub, 4);
    }

    #[test]
    fn test_garbage_token_is_no_session() {
        let state = Arc::new(JwtState::new("s", 3600));
        let parts = parts_with((AUTHORIZATION, "Bearer not-a-jwt"), state);
        assert!(session_claims(&parts).unwrap().is_none());
    }
}
