//! In-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header::HeaderMap};
use serde_json::Value;
use tokio::sync::Notify;

use crate::client::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::errors::Result;

/// Answers listing requests by `items.href`, file downloads by URL path, and
/// anything else as a handshake.
#[derive(Debug)]
pub(crate) struct ScriptedTransport {
    listings: HashMap<String, (StatusCode, Value)>,
    files: HashMap<String, Vec<u8>>,
    handshake_status: StatusCode,
    /// Handshakes wait for one permit on this before replying.
    handshake_gate: Option<Arc<Notify>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            listings: HashMap::new(),
            files: HashMap::new(),
            handshake_status: StatusCode::OK,
            handshake_gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `items` (a JSON array) for listing requests of `href`.
    pub(crate) fn listing(mut self, href: &str, items: Value) -> Self {
        self.listings
            .insert(href.to_string(), (StatusCode::OK, serde_json::json!({ "items": items })));
        self
    }

    /// Serve an arbitrary body for listing requests of `href`.
    pub(crate) fn raw_listing(mut self, href: &str, status: StatusCode, body: Value) -> Self {
        self.listings.insert(href.to_string(), (status, body));
        self
    }

    pub(crate) fn file(mut self, path: &str, body: &[u8]) -> Self {
        self.files.insert(path.to_string(), body.to_vec());
        self
    }

    pub(crate) fn handshake_status(mut self, status: StatusCode) -> Self {
        self.handshake_status = status;
        self
    }

    pub(crate) fn gated_handshake(mut self, gate: Arc<Notify>) -> Self {
        self.handshake_gate = Some(gate);
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn handshakes(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::POST && listing_href(r).is_none())
            .count()
    }

    /// The `items.href` of every listing request, in order.
    pub(crate) fn listed_hrefs(&self) -> Vec<String> {
        self.requests().iter().filter_map(listing_href).collect()
    }
}

fn listing_href(request: &HttpRequest) -> Option<String> {
    let body: Value = serde_json::from_slice(request.body.as_deref()?).ok()?;
    body.get("items")?.get("href")?.as_str().map(str::to_string)
}

fn reply(status: StatusCode, body: Vec<u8>) -> HttpResponse {
    HttpResponse {
        status,
        headers: HeaderMap::new(),
        body,
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if request.method == Method::GET {
            return Ok(match self.files.get(request.url.path()) {
                Some(body) => reply(StatusCode::OK, body.clone()),
                None => reply(StatusCode::NOT_FOUND, Vec::new()),
            });
        }

        match listing_href(&request) {
            Some(href) => Ok(match self.listings.get(&href) {
                Some((status, body)) => reply(*status, serde_json::to_vec(body).unwrap()),
                None => reply(StatusCode::NOT_FOUND, Vec::new()),
            }),
            None => {
                if let Some(gate) = &self.handshake_gate {
                    gate.notified().await;
                }
                Ok(reply(self.handshake_status, b"{}".to_vec()))
            }
        }
    }
}
