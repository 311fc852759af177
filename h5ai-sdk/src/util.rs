use crate::client::http::HttpResponse;
use crate::errors::{Error, RequestError, Result};

/// Convert anything but `200 OK` into a structured error that includes the server body.
///
/// The body (or, when it is empty or not UTF-8, the canonical reason phrase) is
/// captured as the error message.
pub(crate) fn check_http_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.status == reqwest::StatusCode::OK {
        return Ok(response);
    }

    let status = response.status;
    let message = String::from_utf8(response.body)
        .ok()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string()
        });

    Err(Error::from(RequestError::Server { status, message }))
}
