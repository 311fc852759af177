//! Listing entries as returned by the h5ai `items` action.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Largest millisecond value `httpdate` can render (end of year 9999).
const MAX_HTTP_DATE_MILLIS: i64 = 253_402_300_799_999;

/// Modification time of an entry, carried on the wire as milliseconds since the
/// Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap a raw wire value.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let millis = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
            Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
        };
        Self(millis)
    }

    /// Milliseconds since the Unix epoch.
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert to a [`SystemTime`].
    pub fn to_system_time(&self) -> SystemTime {
        let offset = Duration::from_millis(self.0.unsigned_abs());
        if self.0 >= 0 {
            UNIX_EPOCH + offset
        } else {
            UNIX_EPOCH - offset
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        t.to_system_time()
    }
}

impl fmt::Display for Timestamp {
    /// Renders as an HTTP-date; values outside 1970..=9999 fall back to raw milliseconds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..=MAX_HTTP_DATE_MILLIS).contains(&self.0) {
            f.write_str(&httpdate::fmt_http_date(self.to_system_time()))
        } else {
            write!(f, "{}ms", self.0)
        }
    }
}

/// One entry (file or directory) of a directory listing.
///
/// Items are immutable values constructed fresh from every listing response.
/// The wire schema is strict: unknown fields fail decoding.
///
/// ```
/// let item: h5ai::Item =
///     serde_json::from_str(r#"{"href":"/demo/a.txt","size":0,"time":1000}"#).unwrap();
/// assert!(!item.is_dir());
/// assert!(item.has_size());
/// assert_eq!(item.file_size(), 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Item {
    #[serde(default, skip_serializing_if = "is_false")]
    fetched: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    href: String,
    #[serde(default, skip_serializing_if = "is_false")]
    managed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<Timestamp>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Item {
    /// Synthesized entry standing for the root directory of a walk.
    pub(crate) fn root(href: String) -> Self {
        Self {
            fetched: true,
            href,
            managed: true,
            size: None,
            time: Some(Timestamp::now()),
        }
    }

    /// Same entry with its href replaced (used when percent-decoding listings).
    pub(crate) fn with_href(self, href: String) -> Self {
        Self { href, ..self }
    }

    /// Server-relative path of the entry. Percent-decoded for filtered listings,
    /// raw (as sent by the server) for unfiltered ones.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// True when the entry is a navigable directory.
    pub fn is_dir(&self) -> bool {
        self.managed
    }

    /// The raw `managed` wire flag.
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// The raw `fetched` wire flag.
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// Size in bytes, or `0` when the server sent none.
    pub fn file_size(&self) -> i64 {
        self.size.unwrap_or(0)
    }

    /// Whether the server reported a size (distinguishes unknown from zero bytes).
    pub fn has_size(&self) -> bool {
        self.size.is_some()
    }

    /// The reported size, if any.
    pub fn size(&self) -> Option<i64> {
        self.size
    }

    /// Modification time, if the server sent one.
    pub fn modified(&self) -> Option<Timestamp> {
        self.time
    }
}
