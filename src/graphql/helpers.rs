// Helper functions shared across GraphQL query/mutation modules.

use async_graphql::ErrorExtensions;

use crate::db::{BookRecord, UserRecord};
use crate::graphql::types::{Book, User};
use crate::services::AuthError;

/// Convert a BookRecord from the database to a GraphQL Book type
pub(crate) fn book_record_to_graphql(r: BookRecord) -> Book {
    Book {
        id: r.id,
        title: r.title,
        favorite_count: r.favorite_count,
        created_at: r.created_at,
        updated_at: r.updated_at,
        author_id: r.author_id,
        favorited_by_ids: r.favorited_by,
    }
}

/// Convert a UserRecord from the database to a GraphQL User type.
/// The password hash never leaves the db layer through this path.
pub(crate) fn user_record_to_graphql(r: UserRecord) -> User {
    User {
        id: r.id,
        username: r.username,
        email: r.email,
        avatar_url: r.avatar_url,
        created_at: r.created_at,
    }
}

/// Authentication failure: no caller where one is required
pub(crate) fn authentication_error(message: impl Into<String>) -> async_graphql::Error {
    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", "UNAUTHENTICATED"))
}

/// Authorization failure: the caller is authenticated but not the author
pub(crate) fn forbidden_error(message: impl Into<String>) -> async_graphql::Error {
    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", "FORBIDDEN"))
}

/// The target entity does not exist
pub(crate) fn not_found_error(message: impl Into<String>) -> async_graphql::Error {
    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", "NOT_FOUND"))
}

/// Map an auth service failure to a GraphQL error. Credential failures get
/// the UNAUTHENTICATED code; everything else keeps its message only, so no
/// internal detail leaks through account creation.
pub(crate) fn auth_error_to_graphql(e: AuthError) -> async_graphql::Error {
    match e {
        AuthError::InvalidCredentials => authentication_error(e.to_string()),
        AuthError::AccountCreation | AuthError::Internal(_) => {
            async_graphql::Error::new(e.to_string())
        }
    }
}
