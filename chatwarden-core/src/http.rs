//! HTTP client abstraction for outbound feed fetches.
//!
//! The reputation refresh loop talks to an external feed through this trait
//! so tests can substitute a mock without real network requests. The default
//! implementation wraps reqwest with a per-request timeout; non-2xx statuses
//! surface as errors so callers can keep their previous cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::Error;

/// A generic trait for making HTTP requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn get(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<String, Self::Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new(request_timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    type Error = Error;

    async fn get(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<String, Self::Error> {
        let mut request = self.client.get(&url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?.error_for_status()?.text().await?;
        Ok(response)
    }
}
