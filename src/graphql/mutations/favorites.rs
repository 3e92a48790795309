//! GraphQL favorite toggling
//!
//! Any authenticated user may favorite any book; authorship is not required.
//! The membership test decides the direction, and the repository adjusts the
//! set and the count in one statement so the pair never drifts apart.

use super::prelude::*;

#[derive(Default)]
pub struct FavoriteMutations;

#[Object]
impl FavoriteMutations {
    /// Add the current user to a book's favorites, or remove them if already
    /// present. Applying it twice returns the book to its original state.
    async fn toggle_favorite(&self, ctx: &Context<'_>, id: String) -> Result<Book> {
        let user = ctx
            .try_auth_user()
            .ok_or_else(|| authentication_error("You must sign in."))?;
        let db = ctx.data_unchecked::<Database>();
        let books = db.books();

        let book = books
            .get_by_id(&id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("Book not found"))?;

        let already_favorited = book.favorited_by.iter().any(|u| u == &user.user_id);
        let updated = if already_favorited {
            books.remove_favorite(&id, &user.user_id).await
        } else {
            books.add_favorite(&id, &user.user_id).await
        }
        .map_err(|e| async_graphql::Error::new(e.to_string()))?
        .ok_or_else(|| not_found_error("Book not found"))?;

        tracing::debug!(
            book_id = %id,
            user_id = %user.user_id,
            favorited = !already_favorited,
            "Favorite toggled"
        );
        Ok(book_record_to_graphql(updated))
    }
}
