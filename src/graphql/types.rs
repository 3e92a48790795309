//! GraphQL object types
//!
//! Relation fields (Book.author, Book.favoritedBy, User.books,
//! User.favorites) are resolved lazily against the database via
//! ComplexObject resolvers; the flat fields come straight off the records.

use async_graphql::{ComplexObject, Context, Result, SimpleObject};

use crate::db::Database;

use super::helpers::{book_record_to_graphql, user_record_to_graphql};

/// A catalogued book
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Book {
    pub id: String,
    pub title: String,
    /// Number of users who favorited this book; always equals the size of
    /// favoritedBy.
    pub favorite_count: i64,
    pub created_at: String,
    pub updated_at: String,

    #[graphql(skip)]
    pub author_id: String,
    #[graphql(skip)]
    pub favorited_by_ids: Vec<String>,
}

#[ComplexObject]
impl Book {
    /// The user who created this book
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        let db = ctx.data_unchecked::<Database>();
        let record = db
            .users()
            .get_by_id(&self.author_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| async_graphql::Error::new("Author not found"))?;

        Ok(user_record_to_graphql(record))
    }

    /// Users who favorited this book
    async fn favorited_by(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let db = ctx.data_unchecked::<Database>();
        let users = db.users();

        let mut result = Vec::with_capacity(self.favorited_by_ids.len());
        for id in &self.favorited_by_ids {
            if let Some(record) = users
                .get_by_id(id)
                .await
                .map_err(|e| async_graphql::Error::new(e.to_string()))?
            {
                result.push(user_record_to_graphql(record));
            }
        }
        Ok(result)
    }
}

/// A registered account
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Gravatar URL derived from the normalized email
    #[graphql(name = "avatar")]
    pub avatar_url: String,
    pub created_at: String,
}

#[ComplexObject]
impl User {
    /// Books this user authored, newest first
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .books()
            .list_by_author(&self.id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(book_record_to_graphql).collect())
    }

    /// Books this user has favorited, newest first
    async fn favorites(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .books()
            .list_favorited_by(&self.id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(book_record_to_graphql).collect())
    }
}

/// A page of the book feed
#[derive(Debug, Clone, SimpleObject)]
pub struct BookFeed {
    /// Books in this page, newest first
    pub books: Vec<Book>,
    /// Opaque cursor pointing at the last book in this page; pass it back to
    /// fetch the next page. Empty when the page is empty.
    pub cursor: String,
    /// Whether another page exists after this one
    pub has_next_page: bool,
}
