//! HTTP transport for the feed document.

use currency_types::TransportError;

/// Feeds are a few hundred kilobytes; anything near this is not a rate feed.
pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Fetches the raw feed bytes from a fixed URL.
///
/// Time bounds come from the caller: the `reqwest::Client` timeout and whatever
/// deadline the caller wraps around [`fetch`](Self::fetch). Dropping the future
/// aborts the request and returns the connection to the pool.
#[derive(Debug, Clone)]
pub struct FeedTransport {
    client: reqwest::Client,
    url: String,
    max_body: usize,
}

impl FeedTransport {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            max_body: MAX_FEED_SIZE,
        }
    }

    /// Overrides the response body size limit.
    pub fn with_max_body(mut self, limit: usize) -> Self {
        self.max_body = limit;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GETs the feed and returns the body.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Request`] - connection, TLS or body read failure
    /// - [`TransportError::Status`] - any status other than 200 OK
    /// - [`TransportError::TooLarge`] - body larger than the configured limit
    pub async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        read_limited_bytes(response, self.max_body).await
    }
}

async fn read_limited_bytes(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, TransportError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(TransportError::TooLarge { limit });
        }
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?
    {
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(TransportError::TooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
