use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::errors::Result;
use crate::path::{as_dir, unescape};
use crate::{Client, Item};

/// Body of an `items` response. Unknown fields are a decode error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListResponse {
    #[serde(default)]
    items: Option<Vec<Item>>,
}

impl Client {
    /// Raw listing for the directory at `paths` (relative to the base URL).
    ///
    /// Entries are returned exactly as the server sent them, hrefs still
    /// percent-encoded, in server order. This includes the directory's own entry
    /// and any unrelated entries h5ai chose to include (typically its ancestors).
    pub async fn list<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<Item>> {
        let resolved = self.href(paths)?;
        self.list_at(resolved.url(), resolved.href(), false).await
    }

    /// Descendants of the directory at `paths`, hrefs percent-decoded.
    ///
    /// Only entries whose decoded href has the directory's decoded href as a
    /// proper prefix are kept.
    ///
    /// ```no_run
    /// # async fn run() -> h5ai::Result<()> {
    /// let client = h5ai::Client::new("https://larsjung.de/h5ai/demo/")?;
    /// let items = client.items(&["file preview/"]).await?;
    /// assert!(items.iter().all(|i| i.href().starts_with("/h5ai/demo/file preview/")));
    /// # Ok(()) }
    /// ```
    pub async fn items<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<Item>> {
        let resolved = self.href(paths)?;
        self.list_at(resolved.url(), resolved.href(), true).await
    }

    /// Ask the server at `target` for the listing of `href`.
    pub(crate) async fn list_at(&self, target: &Url, href: &str, filter: bool) -> Result<Vec<Item>> {
        let target = as_dir(target);
        let body = json!({
            "action": "get",
            "items": {
                "href": href,
                "what": 1,
            },
        });

        let response: ListResponse = self.request(Method::POST, &target, &body).await?;
        let items = response.items.unwrap_or_default();
        tracing::debug!(href, count = items.len(), "listing");

        if !filter {
            return Ok(items);
        }
        descendants(href, items)
    }
}

/// Keep the entries strictly below `href`, replacing every href with its decoded form.
///
/// Every href is decoded, including ones that end up discarded; a malformed one
/// fails the whole listing.
fn descendants(href: &str, items: Vec<Item>) -> Result<Vec<Item>> {
    let parent = unescape(href)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let decoded = unescape(item.href())?;
        if decoded != parent && decoded.starts_with(&parent) {
            tracing::trace!(href = %decoded, "descendant");
            out.push(item.with_href(decoded));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;

    use super::*;
    use crate::errors::{Error, PathError, RequestError};
    use crate::testing::ScriptedTransport;
    use crate::ClientConfig;

    fn client(transport: &Arc<ScriptedTransport>, base: &str) -> Client {
        ClientConfig::new(base)
            .transport(transport.clone())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn items_keeps_direct_children_in_order() {
        let transport = Arc::new(ScriptedTransport::new().listing(
            "/demo/",
            json!([
                { "href": "/demo/a.txt", "managed": false, "size": 5 },
                { "href": "/demo/sub/", "managed": true },
            ]),
        ));
        let items = client(&transport, "https://h.example/demo/")
            .items::<&str>(&[])
            .await
            .unwrap();

        let hrefs: Vec<_> = items.iter().map(Item::href).collect();
        assert_eq!(hrefs, ["/demo/a.txt", "/demo/sub/"]);
        assert_eq!(items[0].file_size(), 5);
        assert!(items[1].is_dir());
    }

    #[tokio::test]
    async fn items_drops_self_and_unrelated_entries() {
        let transport = Arc::new(ScriptedTransport::new().listing(
            "/h5ai/demo/file%20preview/",
            json!([
                { "href": "/h5ai/", "managed": true },
                { "href": "/h5ai/demo/", "managed": true },
                { "href": "/h5ai/demo/file%20preview/", "managed": true, "fetched": true },
                { "href": "/h5ai/demo/file%20preview/text.md", "size": 12, "time": 1000 },
                { "href": "/h5ai/demo/file%20previewer/x" },
            ]),
        ));
        let items = client(&transport, "https://h.example/h5ai/demo/file%20preview/")
            .items::<&str>(&[])
            .await
            .unwrap();

        let hrefs: Vec<_> = items.iter().map(Item::href).collect();
        assert_eq!(hrefs, ["/h5ai/demo/file preview/text.md"]);
    }

    #[tokio::test]
    async fn list_returns_raw_entries() {
        let transport = Arc::new(ScriptedTransport::new().listing(
            "/h5ai/demo/file%20preview/",
            json!([
                { "href": "/h5ai/demo/", "managed": true },
                { "href": "/h5ai/demo/file%20preview/text.md" },
            ]),
        ));
        let items = client(&transport, "https://h.example/h5ai/demo/file preview/")
            .list::<&str>(&[])
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].href(), "/h5ai/demo/file%20preview/text.md");
    }

    #[tokio::test]
    async fn listing_posts_to_directory_url_after_handshake() {
        let transport = Arc::new(ScriptedTransport::new().listing("/demo", json!([])));
        client(&transport, "https://h.example/demo")
            .list::<&str>(&[])
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(transport.handshakes(), 1);
        assert_eq!(requests[1].url.as_str(), "https://h.example/demo/");
        let body: serde_json::Value = serde_json::from_slice(requests[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "action": "get", "items": { "href": "/demo", "what": 1 } }));
    }

    #[tokio::test]
    async fn missing_items_field_is_empty() {
        let transport =
            Arc::new(ScriptedTransport::new().raw_listing("/demo/", StatusCode::OK, json!({})));
        let items = client(&transport, "https://h.example/demo/")
            .items::<&str>(&[])
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn unknown_fields_fail_decoding() {
        let transport = Arc::new(ScriptedTransport::new().raw_listing(
            "/demo/",
            StatusCode::OK,
            json!({ "items": [], "custom": {} }),
        ));
        let err = client(&transport, "https://h.example/demo/")
            .items::<&str>(&[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Request(RequestError::DecodeJson { .. })));

        let transport = Arc::new(ScriptedTransport::new().listing(
            "/demo/",
            json!([{ "href": "/demo/a", "sizeBytes": 1 }]),
        ));
        let err = client(&transport, "https://h.example/demo/")
            .items::<&str>(&[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Request(RequestError::DecodeJson { .. })));
    }

    #[tokio::test]
    async fn non_ok_status_is_an_error() {
        let transport = Arc::new(ScriptedTransport::new().raw_listing(
            "/demo/",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({}),
        ));
        let err = client(&transport, "https://h.example/demo/")
            .items::<&str>(&[])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn malformed_child_href_fails_listing() {
        let items: Vec<Item> =
            serde_json::from_value(json!([{ "href": "/demo/ok" }, { "href": "/elsewhere/%zz" }])).unwrap();
        let err = descendants("/demo/", items).unwrap_err();
        assert!(matches!(err, Error::Path(PathError::MalformedEscape { .. })));
    }

    #[test]
    fn descendants_satisfy_proper_prefix() {
        let items: Vec<Item> = serde_json::from_value(json!([
            { "href": "/d%C3%A9mo/" },
            { "href": "/d%C3%A9mo/x/y" },
            { "href": "/d%C3%A9mo" },
            { "href": "/other/" },
        ]))
        .unwrap();
        let parent = "/d%C3%A9mo/";
        let decoded_parent = unescape(parent).unwrap();
        let kept = descendants(parent, items).unwrap();
        assert_eq!(kept.len(), 1);
        for item in &kept {
            assert_ne!(item.href(), decoded_parent);
            assert!(item.href().starts_with(&decoded_parent));
        }
    }
}
