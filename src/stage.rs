//! Artifact writer: persists rendered pages into the staging directory.
//!
//! Pages are independent, so writes run in parallel; the returned path
//! list still matches input order so the bundler sees a deterministic
//! entrypoint ordering. A write failure aborts the build cycle.

use crate::page::Page;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal-to-cycle staging failure.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to stage `{0}`")]
    Write(PathBuf, #[source] std::io::Error),
}

/// Write each page under `staging_dir`, creating parent directories as
/// needed, and return the written paths in page order.
///
/// Duplicate pathnames are allowed: the last page in iteration order
/// determines the staged content (no collision error).
pub fn write_pages(pages: &[Page], staging_dir: &Path) -> Result<Vec<PathBuf>, StageError> {
    // Index of the winning page per pathname. Writes run in parallel, so
    // losers skip their write instead of racing on the same file.
    let mut winner: HashMap<&str, usize> = HashMap::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        winner.insert(&page.pathname, i);
    }

    pages
        .par_iter()
        .enumerate()
        .map(|(i, page)| {
            let dest = staging_dir.join(&page.pathname);
            if winner[page.pathname.as_str()] == i {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).map_err(|e| StageError::Write(dest.clone(), e))?;
                }
                fs::write(&dest, &page.content).map_err(|e| StageError::Write(dest.clone(), e))?;
            }
            Ok(dest)
        })
        .collect()
}
