//! Unified error types for the `h5ai` crate.
//!
//! This module centralizes all failures that can occur while talking to an h5ai
//! server and provides a single top-level [`Error`] enum plus the convenient
//! [`Result`] alias. Errors from lower layers (`reqwest`, `serde_json`, URL
//! parsing) are mapped into structured variants so callers can handle them precisely.
//!
//! Walk control signals (`SkipDir`, `SkipAll`) are deliberately **not** errors;
//! see [`crate::WalkControl`].

use std::sync::Arc;

use thiserror::Error;

// --- Build-Time Error ---

/// Errors that can occur while building a [`crate::Client`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configured base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    /// The configured user agent is not a valid header value.
    #[error("Invalid user agent: {0}")]
    UserAgent(#[from] reqwest::header::InvalidHeaderValue),

    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

// --- The Main Operational Error Enum ---

/// The crate’s top-level error type.
///
/// It groups failures into high-level categories:
/// - [`Error::Request`]: HTTP transport, status and JSON schema issues
/// - [`Error::Path`]: malformed URLs, percent-encoding, or misuse of a path
/// - [`Error::Session`]: the one-time session handshake failed
/// - [`Error::Build`]: construction of the client failed
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request/response failed (transport, server status, JSON).
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// A URL or href could not be resolved or decoded.
    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    /// The session handshake failed. The same failure is returned to every
    /// caller sharing the client; it is never retried.
    #[error("Session handshake failed: {0}")]
    Session(Arc<Error>),

    /// Building the client failed.
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),
}

impl Error {
    /// Returns true if this error (or the handshake failure it wraps) is a
    /// transport-level timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Request(RequestError::Transport(e)) => e.is_timeout(),
            Error::Session(inner) => inner.is_timeout(),
            _ => false,
        }
    }

    /// The HTTP status of a non-success response, if that is what this error is.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Request(RequestError::Server { status, .. }) => Some(*status),
            Error::Session(inner) => inner.status(),
            _ => None,
        }
    }
}

// --- Request Errors ---

/// Transport and server-side HTTP errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network/protocol failure from reqwest (timeouts, TLS, I/O, etc.).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned something other than `200 OK`.
    #[error("Server responded with an error: {status} - {message}")]
    Server {
        /// The HTTP status code returned by the server.
        status: reqwest::StatusCode,
        /// The server response body, or the canonical reason when it was unreadable.
        message: String,
    },

    /// The request body could not be encoded.
    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The response did not match the listing schema (including unknown fields).
    #[error("JSON decode error: {message}")]
    DecodeJson {
        /// Error message from the JSON deserializer.
        message: String,
    },
}

// --- Path Errors ---

/// Failures while resolving URLs and hrefs.
#[derive(Debug, Error)]
pub enum PathError {
    /// URL parsing failed.
    #[error("failed to parse URL: {0}")]
    Url(#[from] url::ParseError),

    /// The URL cannot carry path segments (`mailto:`, `data:` and friends).
    #[error("URL cannot be a base: {url}")]
    NotABase {
        /// The offending URL.
        url: String,
    },

    /// An href contains a `%` not followed by two hex digits.
    #[error("malformed percent-encoding in href {href:?}")]
    MalformedEscape {
        /// The raw href.
        href: String,
    },

    /// An href did not percent-decode to valid UTF-8.
    #[error("invalid percent-encoding in href {href:?}: {source}")]
    Unescape {
        /// The raw href.
        href: String,
        /// Underlying UTF-8 failure.
        source: std::str::Utf8Error,
    },

    /// A file retrieval was requested for a directory-style URL.
    #[error("invalid url {url}: expected a file, got a directory")]
    NotAFile {
        /// The offending URL.
        url: String,
    },
}

/// A specialized `Result` type for `h5ai` operations.
pub type Result<T> = std::result::Result<T, Error>;

// Ergonomic "Staircase" From Implementations ---
macro_rules! impl_from_for_error {
    ($from_type:ty, $to_variant:path) => {
        impl From<$from_type> for Error {
            fn from(err: $from_type) -> Self {
                $to_variant(err.into())
            }
        }
    };
}

impl_from_for_error!(reqwest::Error, Error::Request);
impl_from_for_error!(url::ParseError, Error::Path);
impl_from_for_error!(serde_json::Error, Error::Request);
