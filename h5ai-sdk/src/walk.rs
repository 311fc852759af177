//! Recursive, depth-first traversal of a directory tree.

use crate::errors::{Error, Result};
use crate::{Client, Item};

/// What a walk callback wants to happen next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum WalkControl {
    /// Keep going; descend into the current directory.
    #[default]
    Continue,
    /// Do not descend into the current directory. Returned for a file, it is
    /// the same as [`WalkControl::Continue`]. Siblings are still visited.
    SkipDir,
    /// Stop the walk. The walk still reports success.
    SkipAll,
}

impl Client {
    /// Walk the tree rooted at `root` (resolved against the base URL), calling
    /// `f` for every entry, parents before children, in server listing order.
    ///
    /// `f` receives the entry's href, the entry, and the error that occurred
    /// listing it, if any. A directory whose listing failed is never descended
    /// into; the callback decides whether the failure ends the walk (return
    /// `Err`) or is ignored (return `Ok`).
    ///
    /// If the session handshake fails, `f` is called once with `root`, no item
    /// and the handshake error.
    ///
    /// Returning `Err` from `f` aborts the walk with that error. [`WalkControl::SkipAll`]
    /// stops it with `Ok(())`.
    ///
    /// ```no_run
    /// # use h5ai::{Client, WalkControl};
    /// # async fn run() -> h5ai::Result<()> {
    /// let client = Client::new("https://larsjung.de/h5ai/demo/")?;
    /// let mut total = 0;
    /// client
    ///     .walk("", |href, item, err| {
    ///         if let Some(err) = err {
    ///             return Err(err);
    ///         }
    ///         total += item.map_or(0, |i| i.file_size());
    ///         Ok(if href.ends_with("/.git/") { WalkControl::SkipDir } else { WalkControl::Continue })
    ///     })
    ///     .await?;
    /// # Ok(()) }
    /// ```
    pub async fn walk<S, F>(&self, root: S, mut f: F) -> Result<()>
    where
        S: AsRef<str>,
        F: FnMut(&str, Option<&Item>, Option<Error>) -> Result<WalkControl>,
    {
        let root = root.as_ref();
        let resolved = self.href(&[root])?.into_dir();

        if let Err(e) = self.ensure_session(resolved.url()).await {
            return f(root, None, Some(e)).map(drop);
        }

        let target = resolved.url().clone();
        let mut pending = vec![Item::root(resolved.href().to_string())];

        while let Some(item) = pending.pop() {
            if !item.is_dir() {
                match f(item.href(), Some(&item), None)? {
                    WalkControl::SkipAll => return Ok(()),
                    WalkControl::Continue | WalkControl::SkipDir => continue,
                }
            }

            let (children, err) = match self.list_at(&target, item.href(), true).await {
                Ok(children) => (children, None),
                Err(e) => {
                    tracing::debug!(href = item.href(), error = %e, "listing failed");
                    (Vec::new(), Some(e))
                }
            };
            let failed = err.is_some();

            match f(item.href(), Some(&item), err)? {
                WalkControl::SkipAll => return Ok(()),
                WalkControl::SkipDir => {
                    tracing::trace!(href = item.href(), "skipping directory");
                }
                WalkControl::Continue if failed => {}
                WalkControl::Continue => pending.extend(children.into_iter().rev()),
            }
        }

        Ok(())
    }
}
