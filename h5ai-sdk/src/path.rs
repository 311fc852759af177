//! Joining a base URL with path segments, and the href forms derived from it.
//!
//! An *href* is the server-relative, percent-encoded path of an entry
//! (e.g. `/h5ai/demo/file%20preview/`). Requests always go to the absolute URL;
//! the href is what the listing protocol is queried with, and its percent-decoded
//! form is the key used when filtering listings down to descendants.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::errors::PathError;

/// An absolute request URL together with its href.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    url: Url,
    href: String,
}

impl ResolvedPath {
    fn from_url(url: Url) -> Self {
        let href = url.path().to_string();
        Self { url, href }
    }

    /// The absolute URL requests are sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The absolute URL as a string.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The escaped path component, as sent in listing requests.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// The percent-decoded href, used only as a comparison key.
    pub fn decoded_href(&self) -> Result<String, PathError> {
        unescape(&self.href)
    }

    /// Whether the URL is directory-style (ends with `/`).
    pub fn is_dir(&self) -> bool {
        self.href.ends_with('/')
    }

    /// Same location with a trailing `/` on both the URL and the href.
    pub(crate) fn into_dir(self) -> Self {
        if self.is_dir() {
            return self;
        }
        let mut url = self.url;
        let path = format!("{}/", url.path());
        url.set_path(&path);
        Self::from_url(url)
    }

    pub(crate) fn into_url(self) -> Url {
        self.url
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Join `segments` onto `base`.
///
/// Each segment may contain `/`; its pieces are pushed as individual path
/// components and escaped as such. Empty pieces and `.` are dropped, `..`
/// removes the previous component (never going above the root), and a trailing
/// `/` on the last segment is preserved. With no segments the base is returned
/// as-is.
///
/// ```
/// # use url::Url;
/// let base = Url::parse("https://larsjung.de/h5ai/demo/").unwrap();
/// let resolved = h5ai::resolve(&base, &["file preview", "text.md"]).unwrap();
/// assert_eq!(resolved.as_str(), "https://larsjung.de/h5ai/demo/file%20preview/text.md");
/// assert_eq!(resolved.href(), "/h5ai/demo/file%20preview/text.md");
/// assert_eq!(resolved.decoded_href().unwrap(), "/h5ai/demo/file preview/text.md");
/// ```
pub fn resolve<S: AsRef<str>>(base: &Url, segments: &[S]) -> Result<ResolvedPath, PathError> {
    if base.cannot_be_a_base() {
        return Err(PathError::NotABase {
            url: base.to_string(),
        });
    }

    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|s| s.as_ref().split('/'))
        .filter(|p| !matches!(*p, "" | "."))
        .collect();
    let trailing = segments
        .last()
        .is_some_and(|s| s.as_ref().ends_with('/'));
    if parts.is_empty() && !trailing {
        return Ok(ResolvedPath::from_url(base.clone()));
    }

    let mut url = base.clone();
    {
        let mut segs = url.path_segments_mut().map_err(|()| PathError::NotABase {
            url: base.to_string(),
        })?;
        segs.pop_if_empty();
        for part in parts {
            // `pop` stops at the root.
            if part == ".." {
                segs.pop();
            } else {
                segs.push(part);
            }
        }
        if trailing {
            segs.push("");
        }
    }
    Ok(ResolvedPath::from_url(url))
}

/// Normalize a URL to its containing directory: directory-style URLs are kept,
/// otherwise everything after the last `/` of the path is dropped.
pub(crate) fn containing_dir(url: &Url) -> Url {
    let mut dir = url.clone();
    dir.set_query(None);
    dir.set_fragment(None);
    let path = dir.path();
    if !path.ends_with('/') {
        let cut = path.rfind('/').map_or(0, |i| i + 1);
        let parent = if cut == 0 {
            format!("{path}/")
        } else {
            path[..cut].to_string()
        };
        dir.set_path(&parent);
    }
    dir
}

/// Directory-style form of a URL (appends `/` to the path when missing).
pub(crate) fn as_dir(url: &Url) -> Url {
    if url.path().ends_with('/') {
        return url.clone();
    }
    let mut dir = url.clone();
    let path = format!("{}/", dir.path());
    dir.set_path(&path);
    dir
}

/// Percent-decode an href.
///
/// Fails on a `%` not followed by two hex digits, and on decoded bytes that are
/// not UTF-8.
pub fn unescape(href: &str) -> Result<String, PathError> {
    let bytes = href.as_bytes();
    let mut i = 0;
    while let Some(off) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + off;
        let valid = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(PathError::MalformedEscape {
                href: href.to_string(),
            });
        }
        i = at + 3;
    }

    percent_decode_str(href)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|source| PathError::Unescape {
            href: href.to_string(),
            source,
        })
}
