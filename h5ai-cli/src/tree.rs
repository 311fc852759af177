//! Callback state for `h5ai walk`: printing, depth limiting and totals.

use h5ai::{Error, Item, WalkControl};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WalkOptions {
    pub(crate) max_depth: Option<usize>,
    pub(crate) dirs_only: bool,
    pub(crate) fail_fast: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) items: u64,
    pub(crate) directories: u64,
    pub(crate) files: u64,
    pub(crate) size: i64,
    /// Directories whose listing failed.
    pub(crate) failed: u64,
}

#[derive(Debug)]
pub(crate) struct TreeWalker {
    options: WalkOptions,
    /// Decoded href of the first directory visited.
    root: Option<String>,
    summary: Summary,
}

impl TreeWalker {
    pub(crate) fn new(options: WalkOptions) -> Self {
        Self {
            options,
            root: None,
            summary: Summary::default(),
        }
    }

    pub(crate) fn summary(&self) -> Summary {
        self.summary
    }

    /// Handle one walk callback. Returns what the walk should do next and the
    /// line to print, if any.
    pub(crate) fn visit(
        &mut self,
        href: &str,
        item: Option<&Item>,
        err: Option<Error>,
    ) -> h5ai::Result<(WalkControl, Option<String>)> {
        let Some(item) = item else {
            // Only the handshake failure arrives without an item.
            return match err {
                Some(err) => Err(err),
                None => Ok((WalkControl::Continue, None)),
            };
        };

        if let Some(err) = err {
            if self.options.fail_fast {
                return Err(err);
            }
            tracing::warn!(href, error = %err, "cannot list directory");
            self.summary.failed += 1;
        }

        let root = self
            .root
            .get_or_insert_with(|| h5ai::unescape(href).unwrap_or_else(|_| href.to_string()));
        let depth = depth_below(root, href);

        self.summary.items += 1;
        if item.is_dir() {
            self.summary.directories += 1;
        } else {
            self.summary.files += 1;
            self.summary.size += item.file_size();
        }

        let line = (!self.options.dirs_only || item.is_dir()).then(|| format_item(item));
        let control = match self.options.max_depth {
            Some(max) if item.is_dir() && depth >= max => WalkControl::SkipDir,
            _ => WalkControl::Continue,
        };
        Ok((control, line))
    }
}

/// Number of path components `href` sits below `root` (0 for the root itself).
fn depth_below(root: &str, href: &str) -> usize {
    href.strip_prefix(root)
        .map_or(0, |rest| rest.split('/').filter(|s| !s.is_empty()).count())
}

/// `<time>  <size>  <href>`; directories and missing values print as `-`.
pub(crate) fn format_item(item: &Item) -> String {
    let time = item
        .modified()
        .map_or_else(|| "-".to_string(), |t| t.to_string());
    let size = if item.is_dir() || !item.has_size() {
        "-".to_string()
    } else {
        item.file_size().to_string()
    };
    format!("{time:<29}  {size:>12}  {}", item.href())
}

#[cfg(test)]
mod tests {
    use h5ai::errors::PathError;

    use super::*;

    fn item(json: &str) -> Item {
        serde_json::from_str(json).unwrap()
    }

    fn listing_error() -> Error {
        PathError::MalformedEscape { href: "/x%".into() }.into()
    }

    #[test]
    fn formats_files_and_directories() {
        let file = item(r#"{"href":"/demo/a.txt","size":5,"time":0}"#);
        assert_eq!(
            format_item(&file),
            format!("{:<29}  {:>12}  /demo/a.txt", "Thu, 01 Jan 1970 00:00:00 GMT", 5)
        );

        let dir = item(r#"{"href":"/demo/sub/","managed":true}"#);
        assert_eq!(format_item(&dir), format!("{:<29}  {:>12}  /demo/sub/", "-", "-"));
    }

    #[test]
    fn depth_is_relative_to_root() {
        assert_eq!(depth_below("/demo/", "/demo/"), 0);
        assert_eq!(depth_below("/demo/", "/demo/sub/"), 1);
        assert_eq!(depth_below("/demo/", "/demo/sub/b.txt"), 2);
    }

    #[test]
    fn max_depth_skips_deep_directories() {
        let mut walker = TreeWalker::new(WalkOptions {
            max_depth: Some(1),
            ..WalkOptions::default()
        });
        let root = item(r#"{"href":"/demo%20x/","managed":true}"#);
        let sub = item(r#"{"href":"/demo x/sub/","managed":true}"#);
        let file = item(r#"{"href":"/demo x/a.txt","size":3}"#);

        let (c, _) = walker.visit("/demo%20x/", Some(&root), None).unwrap();
        assert_eq!(c, WalkControl::Continue);
        let (c, _) = walker.visit("/demo x/sub/", Some(&sub), None).unwrap();
        assert_eq!(c, WalkControl::SkipDir);
        let (c, line) = walker.visit("/demo x/a.txt", Some(&file), None).unwrap();
        assert_eq!(c, WalkControl::Continue);
        assert!(line.unwrap().ends_with("/demo x/a.txt"));

        assert_eq!(
            walker.summary(),
            Summary {
                items: 3,
                directories: 2,
                files: 1,
                size: 3,
                failed: 0,
            }
        );
    }

    #[test]
    fn dirs_only_suppresses_file_lines() {
        let mut walker = TreeWalker::new(WalkOptions {
            dirs_only: true,
            ..WalkOptions::default()
        });
        let file = item(r#"{"href":"/a.txt","size":1}"#);
        let (_, line) = walker.visit("/a.txt", Some(&file), None).unwrap();
        assert!(line.is_none());
        assert_eq!(walker.summary().files, 1);
    }

    #[test]
    fn listing_errors_are_counted_unless_fail_fast() {
        let dir = item(r#"{"href":"/demo/","managed":true}"#);

        let mut lenient = TreeWalker::new(WalkOptions::default());
        let (c, _) = lenient.visit("/demo/", Some(&dir), Some(listing_error())).unwrap();
        assert_eq!(c, WalkControl::Continue);
        assert_eq!(lenient.summary().failed, 1);

        let mut strict = TreeWalker::new(WalkOptions {
            fail_fast: true,
            ..WalkOptions::default()
        });
        assert!(strict.visit("/demo/", Some(&dir), Some(listing_error())).is_err());
    }

    #[test]
    fn handshake_failure_is_returned() {
        let mut walker = TreeWalker::new(WalkOptions::default());
        assert!(walker.visit("/", None, Some(listing_error())).is_err());
    }
}
