//! One-time session handshake.
//!
//! h5ai only hands out the cookies later listing and download requests rely on
//! after a capability request (`langs`, `options`, `setup`, `theme`, `types`).
//! That exchange happens at most once per [`Client`] (and its clones), the first
//! time any operation needs it. Its outcome, success or failure, is settled
//! permanently and shared by every caller.

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tokio::sync::OnceCell;
use url::Url;

use crate::errors::{Error, Result};
use crate::path::containing_dir;
use crate::{Client, util::check_http_status};

/// Once-settled handshake outcome.
///
/// Concurrent first callers wait on the same in-flight handshake. A handshake
/// whose future is dropped before completing leaves the cell unsettled.
#[derive(Debug, Default)]
pub(crate) struct SessionInit {
    outcome: OnceCell<std::result::Result<(), Arc<Error>>>,
}

impl SessionInit {
    /// Run `handshake` unless an outcome is already settled, then return it.
    pub(crate) async fn ensure<F, Fut>(&self, handshake: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let outcome = self
            .outcome
            .get_or_init(|| async { handshake().await.map_err(Arc::new) })
            .await;
        outcome.clone().map_err(Error::Session)
    }

    /// Whether an outcome has been settled.
    pub(crate) fn is_settled(&self) -> bool {
        self.outcome.initialized()
    }
}

impl Client {
    /// Make sure the session handshake for this client has happened.
    ///
    /// `url` may point at a file or a directory; the handshake is sent to its
    /// containing directory. Only the first call's `url` matters.
    pub async fn ensure_session(&self, url: &Url) -> Result<()> {
        self.session.ensure(|| self.handshake(containing_dir(url))).await
    }

    /// Whether the handshake outcome is already known.
    pub fn session_settled(&self) -> bool {
        self.session.is_settled()
    }

    async fn handshake(&self, dir: Url) -> Result<()> {
        tracing::debug!(url = %dir, "session handshake");

        let body = json!({
            "action": "get",
            "langs": true,
            "options": true,
            "setup": true,
            "theme": true,
            "types": true,
        });
        let request = self.build_request(Method::POST, dir.clone(), Some(serde_json::to_vec(&body)?));
        let result = match self.transport.send(request).await {
            Ok(response) => check_http_status(response).map(drop),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::warn!(url = %dir, error = %e, "session handshake failed");
        }
        result
    }
}
