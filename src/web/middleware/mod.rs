//! Middleware for the HTTP surface.

pub mod auth;

pub use auth::{
    jwt_auth, AuthUser, JwtState, OptionalAuthUser, SessionClaims, LOGIN_PATH, SESSION_COOKIE,
};
