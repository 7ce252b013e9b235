//! Request-path resolution against the layered file-lookup chain.
//!
//! Resolution order, stopping at the first match:
//! 1. exact file under the output directory
//! 2. `index.html` under that path (directory-index convention)
//! 3. exact file under the public directory (static passthrough)
//!
//! Every call re-touches the filesystem; there is no cache. That keeps
//! resolution correct while a rebuild is rewriting the output directory
//! underneath the server.

use std::path::{Path, PathBuf};

/// Resolves request paths to servable files.
#[derive(Debug, Clone)]
pub struct Resolver {
    out_dir: PathBuf,
    public_dir: PathBuf,
}

impl Resolver {
    pub fn new(out_dir: impl Into<PathBuf>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            public_dir: public_dir.into(),
        }
    }

    /// Resolve a request path to a file, or `None` when the whole chain
    /// misses. The caller substitutes its own `404.html` lookup on a
    /// miss (a single extra `resolve` call, no recursion).
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let trimmed = request_path.trim_matches('/');

        let direct = self.out_dir.join(trimmed);
        if direct.is_file() {
            return Some(direct);
        }

        let index = self.out_dir.join(trimmed).join("index.html");
        if index.is_file() {
            return Some(index);
        }

        let passthrough = self.public_dir.join(trimmed);
        if passthrough.is_file() {
            return Some(passthrough);
        }

        None
    }
}
