//! Common imports for quick starts.

pub use crate::{BuildError, Error, Result};

pub use crate::{Client, ClientConfig};

pub use crate::{Item, Timestamp, WalkControl};

pub use crate::{HttpTransport, ResolvedPath};
