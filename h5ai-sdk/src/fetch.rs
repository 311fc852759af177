use reqwest::Method;

use crate::Client;
use crate::errors::{PathError, Result};
use crate::util::check_http_status;

impl Client {
    /// Download the file at `paths` (relative to the base URL).
    ///
    /// Directory-style paths (trailing `/`) are rejected before any request is
    /// made. The whole body is buffered.
    pub async fn get<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<u8>> {
        let resolved = self.href(paths)?;
        if resolved.is_dir() {
            return Err(PathError::NotAFile {
                url: resolved.to_string(),
            }
            .into());
        }

        self.ensure_session(resolved.url()).await?;

        let request = self.build_request(Method::GET, resolved.into_url(), None);
        let response = check_http_status(self.transport.send(request).await?)?;
        tracing::debug!(bytes = response.body.len(), "downloaded");
        Ok(response.body)
    }
}
