//! Business logic services

pub mod auth;

pub use auth::{gravatar_url, normalize_email, AuthConfig, AuthError, AuthService, TokenClaims};
