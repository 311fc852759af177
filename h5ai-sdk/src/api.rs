//! One-shot helpers: build a client for `url` and run a single operation.

use crate::errors::{Error, Result};
use crate::{ClientConfig, Item, WalkControl};

/// Raw listing of the directory at `url`.
///
/// `config` supplies every option but the base URL, which is replaced by `url`.
pub async fn list(url: &str, config: ClientConfig) -> Result<Vec<Item>> {
    config.base_url(url).build()?.list::<&str>(&[]).await
}

/// Descendants of the directory at `url`, hrefs percent-decoded.
///
/// ```no_run
/// # async fn run() -> h5ai::Result<()> {
/// let items = h5ai::items(
///     "https://larsjung.de/h5ai/demo/file%20preview/",
///     h5ai::ClientConfig::default(),
/// )
/// .await?;
/// # Ok(()) }
/// ```
pub async fn items(url: &str, config: ClientConfig) -> Result<Vec<Item>> {
    config.base_url(url).build()?.items::<&str>(&[]).await
}

/// Contents of the file at `url`.
pub async fn get(url: &str, config: ClientConfig) -> Result<Vec<u8>> {
    config.base_url(url).build()?.get::<&str>(&[]).await
}

/// Walk the whole tree below `url`. See [`crate::Client::walk`].
pub async fn walk<F>(url: &str, f: F, config: ClientConfig) -> Result<()>
where
    F: FnMut(&str, Option<&Item>, Option<Error>) -> Result<WalkControl>,
{
    config.base_url(url).build()?.walk("/", f).await
}
