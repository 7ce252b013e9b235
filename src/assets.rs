//! Static asset copier: merges the public directory into the output
//! directory without overwriting bundler output.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `public_dir` into `out_dir`.
///
/// Files already present in the output (bundler output) are left alone.
/// An absent public directory is a normal configuration and a no-op.
pub fn copy_public(public_dir: &Path, out_dir: &Path) -> Result<()> {
    if !public_dir.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(public_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(public_dir) else {
            continue;
        };
        let dest = out_dir.join(rel);

        // Bundler output wins on collision.
        if dest.exists() {
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(entry.path(), &dest)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
    }

    Ok(())
}
