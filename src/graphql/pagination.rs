//! Cursor encoding for the book feed
//!
//! Cursors are opaque to clients: a base64-encoded `created_at|id` boundary
//! identifying the last book of the previous page. The feed is ordered
//! newest first, so the next page is everything strictly before the boundary.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Number of books per feed page
pub const FEED_PAGE_SIZE: i64 = 10;

/// Encode a page boundary as an opaque cursor
pub fn encode_cursor(created_at: &str, id: &str) -> String {
    BASE64.encode(format!("{created_at}|{id}"))
}

/// Decode a cursor back into its (created_at, id) boundary. Returns None for
/// anything that is not a cursor this server produced.
pub fn decode_cursor(cursor: &str) -> Option<(String, String)> {
    let raw = BASE64.decode(cursor).ok()?;
    let raw = String::from_utf8(raw).ok()?;
    let (created_at, id) = raw.split_once('|')?;
    if created_at.is_empty() || id.is_empty() {
        return None;
    }
    Some((created_at.to_string(), id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = encode_cursor("2026-08-25T12:00:00+00:00", "book-1");
        let (created_at, id) = decode_cursor(&cursor).unwrap();
        assert_eq!(created_at, "2026-08-25T12:00:00+00:00");
        assert_eq!(id, "book-1");
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(decode_cursor("not base64!!").is_none());
    }

    #[test]
    fn test_decode_rejects_missing_separator() {
        let cursor = BASE64.encode("no-separator-here");
        assert!(decode_cursor(&cursor).is_none());
    }
}
