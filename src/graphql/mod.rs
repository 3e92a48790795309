//! GraphQL API
//!
//! This module provides the whole API surface: queries and mutations over
//! books and users, built with async-graphql. The caller identity is derived
//! from the Authorization header before execution and threaded into the
//! request data; resolvers never reach for global state.

pub mod auth;
pub mod helpers;
pub mod mutations;
pub mod pagination;
pub mod queries;
mod schema;
pub mod types;

pub use auth::{verify_token, AuthUser};
pub use schema::{build_schema, BookshelfSchema, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH};
