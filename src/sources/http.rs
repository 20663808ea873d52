//! Blocking, rate-limited JSON client shared by the metadata adapters.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use log::debug;
use serde_json::Value;

use crate::error::SourceError;

const USER_AGENT: &str = "adaptation_ledger/0.1.0 (book-to-film adaptation dataset)";
const RATE_LIMIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) struct RateLimitedClient {
    source_name: &'static str,
    http_client: ureq::Agent,
    limiter: DefaultDirectRateLimiter,
    timeout: Duration,
}

impl RateLimitedClient {
    pub(crate) fn new(source_name: &'static str, requests_per_second: u32, timeout: Duration) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .build();
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            source_name,
            http_client,
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
            timeout,
        }
    }

    /// Blocks until the limiter grants a request slot.
    fn wait_for_rate_limit_slot(&self) {
        while self.limiter.check().is_err() {
            std::thread::sleep(RATE_LIMIT_POLL_INTERVAL);
        }
    }

    pub(crate) fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        self.wait_for_rate_limit_slot();
        debug!("{} request: {}", self.source_name, redact_query_secret(url));
        let response = self
            .http_client
            .get(url)
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/json")
            .timeout(self.timeout)
            .call()
            .map_err(|error| classify_ureq_failure(self.source_name, &error))?;
        response.into_json::<Value>().map_err(|error| {
            SourceError::Unavailable(format!(
                "{} returned an invalid JSON response: {error}",
                self.source_name
            ))
        })
    }
}

fn classify_ureq_failure(source_name: &str, error: &ureq::Error) -> SourceError {
    match error {
        ureq::Error::Status(404, _) => SourceError::NotFound(format!("{source_name} returned 404")),
        ureq::Error::Status(code, _) => {
            SourceError::Unavailable(format!("{source_name} returned HTTP {code}"))
        }
        ureq::Error::Transport(transport) => {
            SourceError::Unavailable(format!("{source_name} request failed: {transport}"))
        }
    }
}

/// Appends url-encoded query parameters to `base`.
pub(crate) fn request_url(base: &str, params: &[(&str, &str)]) -> String {
    let mut url = base.trim().to_string();
    if params.is_empty() {
        return url;
    }

    url.push(if url.contains('?') { '&' } else { '?' });
    for (index, (key, value)) in params.iter().enumerate() {
        if index > 0 {
            url.push('&');
        }
        url.push_str(key);
        url.push('=');
        url.push_str(urlencoding::encode(value).as_ref());
    }
    url
}

/// Masks the `apikey` query value so credentials never reach the log.
fn redact_query_secret(url: &str) -> String {
    match url.find("apikey=") {
        Some(start) => {
            let value_start = start + "apikey=".len();
            let value_end = url[value_start..]
                .find('&')
                .map(|offset| value_start + offset)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
