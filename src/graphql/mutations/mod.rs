pub mod auth;
pub mod books;
pub mod favorites;

pub use auth::AuthMutations;
pub use books::BookMutations;
pub use favorites::FavoriteMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::db::Database;
    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::helpers::*;
    pub(crate) use crate::graphql::types::*;
}
