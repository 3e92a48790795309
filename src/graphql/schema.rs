//! GraphQL schema definition
//!
//! Merges the query/mutation modules into the roots and installs the static
//! query-shape defenses: queries deeper than [MAX_QUERY_DEPTH] or scoring
//! above [MAX_QUERY_COMPLEXITY] are rejected before any resolver runs.

use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Database;
use crate::services::AuthService;

use super::mutations::{AuthMutations, BookMutations, FavoriteMutations};
use super::queries::{BookQueries, UserQueries};

/// Maximum query nesting depth
pub const MAX_QUERY_DEPTH: usize = 5;

/// Maximum computed query complexity score
pub const MAX_QUERY_COMPLEXITY: usize = 1000;

/// The GraphQL schema type
pub type BookshelfSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(BookQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(AuthMutations, BookMutations, FavoriteMutations);

/// Build the GraphQL schema with all resolvers and static limits
pub fn build_schema(db: Database, auth: AuthService) -> BookshelfSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(db)
    .data(auth)
    .limit_depth(MAX_QUERY_DEPTH)
    .limit_complexity(MAX_QUERY_COMPLEXITY)
    .finish()
}
