//! GraphQL book mutations
//!
//! Every mutation here is gated: no caller fails with an authentication
//! error before any lookup, and update/delete additionally require the
//! caller to be the book's author.

use super::prelude::*;
use crate::db::CreateBook;

#[derive(Default)]
pub struct BookMutations;

#[Object]
impl BookMutations {
    /// Create a new book authored by the current user
    async fn add_book(&self, ctx: &Context<'_>, title: String) -> Result<Book> {
        let user = ctx
            .try_auth_user()
            .ok_or_else(|| authentication_error("You must sign in to create a new book."))?;
        let db = ctx.data_unchecked::<Database>();

        let record = db
            .books()
            .create(CreateBook {
                title,
                author_id: user.user_id.clone(),
            })
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        tracing::info!(book_id = %record.id, author_id = %user.user_id, "Book created");
        Ok(book_record_to_graphql(record))
    }

    /// Rename a book. Only the author may do this.
    async fn update_book(&self, ctx: &Context<'_>, id: String, title: String) -> Result<Book> {
        let user = ctx
            .try_auth_user()
            .ok_or_else(|| authentication_error("You must sign in to update a book."))?;
        let db = ctx.data_unchecked::<Database>();
        let books = db.books();

        let book = books
            .get_by_id(&id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("Book not found"))?;

        if book.author_id != user.user_id {
            return Err(forbidden_error(
                "You don't have permission to modify the book",
            ));
        }

        let updated = books
            .update_title(&id, &title)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("Book not found"))?;

        tracing::info!(book_id = %id, author_id = %user.user_id, "Book updated");
        Ok(book_record_to_graphql(updated))
    }

    /// Delete a book. Only the author may do this. Returns whether the book
    /// was removed; a store failure during the delete itself is reported as
    /// false rather than an error.
    async fn delete_book(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        let user = ctx
            .try_auth_user()
            .ok_or_else(|| authentication_error("You must sign in to delete a book."))?;
        let db = ctx.data_unchecked::<Database>();
        let books = db.books();

        let book = books
            .get_by_id(&id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("Book not found"))?;

        if book.author_id != user.user_id {
            return Err(forbidden_error(
                "You don't have permissions to delete the book",
            ));
        }

        match books.delete(&id).await {
            Ok(deleted) => {
                tracing::info!(book_id = %id, author_id = %user.user_id, "Book deleted");
                Ok(deleted)
            }
            Err(e) => {
                tracing::warn!(book_id = %id, error = %e, "Book deletion failed");
                Ok(false)
            }
        }
    }
}
