//! Authentication service for account creation and sign-in
//!
//! Provides:
//! - User sign-up with bcrypt password hashing and gravatar derivation
//! - Sign-in by username or email
//! - Stateless JWT issuance (single claim: the user id; no expiry, no
//!   server-side session storage)

use bcrypt::DEFAULT_COST;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{CreateUser, Database};

/// Claims embedded in issued tokens. The user id is the only claim; tokens
/// are self-verifying and never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
}

/// Failures surfaced by the auth service.
///
/// Account-creation and sign-in failures deliberately carry generic messages:
/// neither reveals which constraint fired nor whether an account exists.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Error creating account")]
    AccountCreation,
    #[error("Error signing in")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

/// Trim and lowercase an email address. Applied on sign-up before storage
/// and on sign-in before lookup, so the same mailbox always matches.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derive a gravatar URL from a normalized email. Deterministic: the same
/// mailbox yields the same avatar regardless of casing or whitespace.
pub fn gravatar_url(email: &str) -> String {
    format!(
        "https://www.gravatar.com/avatar/{:x}",
        md5::compute(email.as_bytes())
    )
}

impl AuthService {
    /// Create a new auth service
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create a new account and return a signed token for it.
    ///
    /// The email is normalized before deriving the avatar so that later
    /// sign-ins with different casing still resolve to this account. Any
    /// store failure (duplicate username or email included) maps to the
    /// generic [AuthError::AccountCreation].
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let avatar_url = gravatar_url(&email);
        let password_hash = self.hash_password(password.to_string()).await?;

        let user = match self
            .db
            .users()
            .create(CreateUser {
                username: username.to_string(),
                email,
                password_hash,
                avatar_url,
            })
            .await
        {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(username, error = %e, "Account creation failed");
                return Err(AuthError::AccountCreation);
            }
        };

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
        self.issue_token(&user.id)
    }

    /// Authenticate by email or username plus password, returning a signed
    /// token. Email takes precedence when both are supplied. Unknown account
    /// and wrong password fail with the identical message so responses carry
    /// no account-existence oracle.
    pub async fn sign_in(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<String, AuthError> {
        let users = self.db.users();

        let mut user = None;
        if let Some(email) = email {
            user = users.get_by_email(&normalize_email(email)).await?;
        }
        if user.is_none() {
            if let Some(username) = username {
                user = users.get_by_username(username).await?;
            }
        }

        let user = user.ok_or(AuthError::InvalidCredentials)?;

        if !self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, username = %user.username, "User signed in");
        self.issue_token(&user.id)
    }

    /// Sign a token embedding the user id as its only claim
    pub fn issue_token(&self, user_id: &str) -> Result<String, AuthError> {
        let claims = TokenClaims {
            id: user_id.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    /// Hash a password with bcrypt on a blocking thread. Bcrypt is CPU-bound
    /// and must not stall unrelated requests on the async runtime.
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let cost = self.config.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Hashing task failed: {}", e))?
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash)
    }

    /// Verify a password against a stored hash on a blocking thread
    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Verification task failed: {}", e))?
            .map_err(|e| anyhow::anyhow!("Failed to verify password: {}", e))?;
        Ok(valid)
    }
}
