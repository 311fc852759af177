//! Pluggable HTTP transport.
//!
//! The client never talks to `reqwest` directly; every exchange goes through an
//! [`HttpTransport`], so tests and embedders can swap the backend. The default
//! backend is [`ReqwestTransport`]. Whatever backend is chosen gets wrapped in a
//! [`LoggingTransport`].

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header::HeaderMap};
use url::Url;

use crate::errors::Result;

/// A fully composed outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
}

/// A buffered response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// The entire response body.
    pub body: Vec<u8>,
}

/// Abstract interface for a request/response exchange.
///
/// Implementations must abort promptly when the returned future is dropped;
/// that is how callers cancel in-flight work.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one exchange. Non-success statuses are **not** errors at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Callback receiving one formatted line per request and per response.
pub type LogHook = Arc<dyn Fn(&str) + Send + Sync>;

/// The native Reqwest-based implementation of [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an already configured `reqwest::Client` (cookie store, timeouts, TLS).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut rb = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            rb = rb.body(body);
        }

        let response = rb.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Decorates a transport with `tracing` events and an optional [`LogHook`].
pub struct LoggingTransport {
    inner: Arc<dyn HttpTransport>,
    hook: Option<LogHook>,
}

impl LoggingTransport {
    /// Wrap `inner`, forwarding formatted exchange lines to `hook` when present.
    pub fn new(inner: Arc<dyn HttpTransport>, hook: Option<LogHook>) -> Self {
        Self { inner, hook }
    }

    fn emit(&self, line: &str) {
        if let Some(hook) = &self.hook {
            hook(line);
        }
    }
}

impl fmt::Debug for LoggingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingTransport")
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpTransport for LoggingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method.clone();
        let url = request.url.clone();
        let sent = request.body.as_ref().map_or(0, Vec::len);

        tracing::debug!(%method, %url, bytes = sent, "request");
        self.emit(&format!("--> {method} {url} ({sent} bytes)"));

        let started = Instant::now();
        match self.inner.send(request).await {
            Ok(response) => {
                let elapsed = started.elapsed();
                tracing::debug!(
                    %method,
                    %url,
                    status = response.status.as_u16(),
                    bytes = response.body.len(),
                    ?elapsed,
                    "response"
                );
                self.emit(&format!(
                    "<-- {} {method} {url} ({} bytes, {elapsed:?})",
                    response.status,
                    response.body.len()
                ));
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(%method, %url, error = %e, "request failed");
                self.emit(&format!("<-- ERR {method} {url}: {e}"));
                Err(e)
            }
        }
    }
}
