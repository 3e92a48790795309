//! GraphQL sign-up and sign-in mutations
//!
//! Neither requires authentication. Both return a signed token embedding the
//! user id; the client sends it back in the Authorization header.

use super::prelude::*;
use crate::services::AuthService;

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Create a new account and return a signed token for it.
    ///
    /// The email is normalized (trimmed, lowercased) before storage; the
    /// avatar is derived from the normalized email. Duplicate usernames or
    /// emails fail with a generic message.
    async fn sign_up(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
    ) -> Result<String> {
        let auth = ctx.data_unchecked::<AuthService>();
        auth.sign_up(&username, &email, &password)
            .await
            .map_err(auth_error_to_graphql)
    }

    /// Authenticate with username or email plus password, returning a signed
    /// token. Email takes precedence when both are given. Unknown accounts
    /// and wrong passwords fail with the same message.
    async fn sign_in(
        &self,
        ctx: &Context<'_>,
        username: Option<String>,
        email: Option<String>,
        password: String,
    ) -> Result<String> {
        let auth = ctx.data_unchecked::<AuthService>();
        auth.sign_in(username.as_deref(), email.as_deref(), &password)
            .await
            .map_err(|e| {
                tracing::warn!(
                    username = username.as_deref().unwrap_or(""),
                    error = %e,
                    "Sign in failed"
                );
                auth_error_to_graphql(e)
            })
    }
}
