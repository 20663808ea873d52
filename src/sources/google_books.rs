//! Google Books volumes search adapter.

use std::time::Duration;

use serde_json::Value;

use super::http::{request_url, RateLimitedClient};
use super::BookSource;
use crate::config::BookSourceConfig;
use crate::error::SourceError;
use crate::records::BookData;

pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const SOURCE_NAME: &str = "Google Books";

/// Book source backed by the Google Books `volumes` endpoint.
pub struct GoogleBooksSource {
    client: RateLimitedClient,
    base_url: String,
}

impl GoogleBooksSource {
    pub fn new(config: &BookSourceConfig) -> Self {
        Self {
            client: RateLimitedClient::new(
                SOURCE_NAME,
                config.requests_per_second,
                Duration::from_secs(config.timeout_secs),
            ),
            base_url: config.base_url.clone(),
        }
    }

    /// Reads rating data from the first item of a volumes response.
    fn parse_volumes_payload(payload: &Value, title: &str) -> Result<BookData, SourceError> {
        let first_item = payload
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .ok_or_else(|| SourceError::NotFound(format!("{SOURCE_NAME} has no volume for '{title}'")))?;
        let volume_info = first_item.get("volumeInfo");
        let rating = volume_info
            .and_then(|info| info.get("averageRating"))
            .and_then(Value::as_f64);
        let rating_count = volume_info
            .and_then(|info| info.get("ratingsCount"))
            .and_then(Value::as_u64)
            .and_then(|count| u32::try_from(count).ok());
        Ok(BookData {
            rating,
            rating_count,
        })
    }
}

impl BookSource for GoogleBooksSource {
    fn fetch_book(&self, title: &str) -> Result<BookData, SourceError> {
        let url = request_url(&self.base_url, &[("q", title)]);
        let payload = self.client.get_json(&url)?;
        Self::parse_volumes_payload(&payload, title)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::GoogleBooksSource;
    use crate::error::SourceError;

    #[test]
    fn test_parse_volumes_payload_reads_first_item() {
        let payload = json!({
            "totalItems": 2,
            "items": [
                {"volumeInfo": {"title": "Coraline", "averageRating": 4.5, "ratingsCount": 312}},
                {"volumeInfo": {"title": "Coraline (Graphic Novel)", "averageRating": 3.0}}
            ]
        });
        let book = GoogleBooksSource::parse_volumes_payload(&payload, "Coraline")
            .expect("first item should parse");
        assert_eq!(book.rating, Some(4.5));
        assert_eq!(book.rating_count, Some(312));
    }

    #[test]
    fn test_parse_volumes_payload_allows_missing_rating_fields() {
        let payload = json!({"items": [{"volumeInfo": {"title": "Obscure"}}]});
        let book = GoogleBooksSource::parse_volumes_payload(&payload, "Obscure")
            .expect("item without ratings is still a match");
        assert_eq!(book.rating, None);
        assert_eq!(book.rating_count, None);
    }

    #[test]
    fn test_parse_volumes_payload_without_items_is_not_found() {
        let payload = json!({"kind": "books#volumes", "totalItems": 0});
        let result = GoogleBooksSource::parse_volumes_payload(&payload, "Nothing");
        assert!(matches!(result, Err(SourceError::NotFound(_))));

        let empty = json!({"items": []});
        let result = GoogleBooksSource::parse_volumes_payload(&empty, "Nothing");
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }
}
