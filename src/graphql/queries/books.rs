use super::prelude::*;
use crate::graphql::pagination::{decode_cursor, encode_cursor, FEED_PAGE_SIZE};

#[derive(Default)]
pub struct BookQueries;

#[Object]
impl BookQueries {
    /// All books, newest first
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .books()
            .list_all()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(book_record_to_graphql).collect())
    }

    /// A single book by id
    async fn book(&self, ctx: &Context<'_>, id: String) -> Result<Book> {
        let db = ctx.data_unchecked::<Database>();
        let record = db
            .books()
            .get_by_id(&id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("Book not found"))?;

        Ok(book_record_to_graphql(record))
    }

    /// A page of books, newest first. Pass the cursor from the previous page
    /// to fetch the next one.
    async fn book_feed(&self, ctx: &Context<'_>, cursor: Option<String>) -> Result<BookFeed> {
        let db = ctx.data_unchecked::<Database>();

        let boundary = match cursor.as_deref().filter(|c| !c.is_empty()) {
            Some(c) => {
                Some(decode_cursor(c).ok_or_else(|| async_graphql::Error::new("Invalid cursor"))?)
            }
            None => None,
        };

        // Fetch one extra row to learn whether another page exists.
        let mut records = db
            .books()
            .list_page(
                boundary.as_ref().map(|(c, i)| (c.as_str(), i.as_str())),
                FEED_PAGE_SIZE + 1,
            )
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        let has_next_page = records.len() as i64 > FEED_PAGE_SIZE;
        records.truncate(FEED_PAGE_SIZE as usize);

        let cursor = records
            .last()
            .map(|r| encode_cursor(&r.created_at, &r.id))
            .unwrap_or_default();

        Ok(BookFeed {
            books: records.into_iter().map(book_record_to_graphql).collect(),
            cursor,
            has_next_page,
        })
    }
}
