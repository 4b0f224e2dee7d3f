//! # Provider
//!
//! Provider defines external data interfaces for the crate.

use anyhow::Result;
use bytes::Bytes;
use http::{Request, Response};

/// The `HttpRequest` trait defines the behavior for fetching data from a source.
///
/// Implementations return the response as-is: callers decide how to treat
/// non-success status codes.
pub trait HttpRequest: Send + Sync {
    /// Make outbound HTTP request.
    fn fetch(
        &self, request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}
