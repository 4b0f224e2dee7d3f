use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use http::{Request, Response};
use realtime::HttpRequest;

/// Outbound HTTP backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct Provider {
    client: reqwest::Client,
}

impl Provider {
    /// Create a provider whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpRequest for Provider {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let (parts, body) = request.into_parts();
        let response = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .with_context(|| format!("requesting {}", parts.uri))?;

        let status = response.status();
        let body = response.bytes().await.context("reading response body")?;
        Response::builder().status(status).body(body).context("building response")
    }
}
