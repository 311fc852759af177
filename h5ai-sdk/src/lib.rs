//! Client for directory trees served by [h5ai](https://larsjung.de/h5ai/).
//!
//! h5ai answers JSON `POST`s against any directory URL. This crate wraps that
//! protocol:
//! - [`Client::list`] and [`Client::items`] fetch one directory's entries (raw,
//!   or filtered down to its descendants with decoded hrefs).
//! - [`Client::get`] downloads a single file.
//! - [`Client::walk`] enumerates a whole tree depth-first, with
//!   [`WalkControl`] to prune or stop.
//!
//! Every client performs a one-time session handshake before its first request
//! and reuses its outcome afterwards. The HTTP stack is pluggable through
//! [`HttpTransport`]; configuration lives in [`ClientConfig`].
//!
//! ```no_run
//! use h5ai::{ClientConfig, WalkControl};
//!
//! # async fn run() -> h5ai::Result<()> {
//! let mut files = 0;
//! h5ai::walk(
//!     "https://larsjung.de/h5ai/demo/",
//!     |_href, item, err| {
//!         if let Some(err) = err {
//!             return Err(err);
//!         }
//!         files += usize::from(item.is_some_and(|i| !i.is_dir()));
//!         Ok(WalkControl::Continue)
//!     },
//!     ClientConfig::default(),
//! )
//! .await?;
//! # Ok(()) }
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

mod api;
mod client;
pub mod errors;
mod fetch;
mod item;
mod list;
mod path;
mod session;
mod util;
mod walk;

#[cfg(test)]
mod testing;

pub mod prelude;

// --- PUBLIC API EXPORTS ---
// Client and configuration
pub use client::core::{Client, ClientConfig, DEFAULT_USER_AGENT};
// Transport
pub use client::cookies::CookieJar;
pub use client::http::{
    HttpRequest, HttpResponse, HttpTransport, LogHook, LoggingTransport, ReqwestTransport,
};
// One-shot operations
pub use api::{get, items, list, walk};

// Error
pub use errors::{BuildError, Error, Result};

// Data types
pub use item::{Item, Timestamp};
pub use path::{ResolvedPath, resolve, unescape};
pub use walk::WalkControl;

// Re-exports
pub use reqwest::{Method, StatusCode};
pub use url::Url;
