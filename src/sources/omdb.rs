//! OMDb title lookup adapter.
//!
//! OMDb answers every lookup with HTTP 200 and signals failure through the
//! `Response`/`Error` fields. Numeric fields arrive as strings and use the
//! `"N/A"` sentinel when missing.

use std::time::Duration;

use serde_json::Value;

use super::http::{request_url, RateLimitedClient};
use super::MovieSource;
use crate::config::MovieSourceConfig;
use crate::error::SourceError;
use crate::records::MovieData;

pub const OMDB_URL: &str = "https://www.omdbapi.com/";
const SOURCE_NAME: &str = "OMDb";
const NOT_AVAILABLE: &str = "N/A";

pub struct OmdbSource {
    client: RateLimitedClient,
    base_url: String,
    api_key: String,
}

impl OmdbSource {
    pub fn new(config: &MovieSourceConfig, api_key: String) -> Self {
        Self {
            client: RateLimitedClient::new(
                SOURCE_NAME,
                config.requests_per_second,
                Duration::from_secs(config.timeout_secs),
            ),
            base_url: config.base_url.clone(),
            api_key,
        }
    }

    fn parse_title_payload(payload: &Value, title: &str) -> Result<MovieData, SourceError> {
        let response = payload.get("Response").and_then(Value::as_str);
        if response != Some("True") {
            let message = payload
                .get("Error")
                .and_then(Value::as_str)
                .unwrap_or("no Response flag");
            // Anything other than a plain miss means the request itself was unusable.
            return Err(if message.to_ascii_lowercase().contains("not found") {
                SourceError::NotFound(format!("{SOURCE_NAME} has no film for '{title}': {message}"))
            } else {
                SourceError::Unavailable(format!("{SOURCE_NAME} error for '{title}': {message}"))
            });
        }
        Ok(MovieData {
            rating: parse_rating(payload.get("imdbRating").and_then(Value::as_str)),
            vote_count: parse_votes(payload.get("imdbVotes").and_then(Value::as_str)),
        })
    }
}

/// Parses a 0-10 rating string. The sentinel or junk yields `None`.
pub fn parse_rating(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite() && *rating >= 0.0)
}

/// Parses a vote count such as `"1,234,567"`. The sentinel or junk yields `None`.
pub fn parse_votes(raw: Option<&str>) -> Option<u32> {
    let trimmed = raw?.trim();
    if trimmed.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return None;
    }
    let digits: String = trimmed.chars().filter(|ch| *ch != ',').collect();
    digits.parse::<u32>().ok()
}

impl MovieSource for OmdbSource {
    fn fetch_movie(&self, title: &str) -> Result<MovieData, SourceError> {
        let url = request_url(
            &self.base_url,
            &[("t", title), ("apikey", self.api_key.as_str())],
        );
        let payload = self.client.get_json(&url)?;
        Self::parse_title_payload(&payload, title)
    }
}
