//! Bundler contract and the built-in copying bundler.
//!
//! The orchestrator treats bundling as a black-box batch transform: it
//! hands over staged entrypoints and inspects only the report's success
//! flag and log entries. A failed bundle never aborts the pipeline
//! (fail-soft); stale or missing output is the visible consequence.

use std::fs;
use std::path::{Path, PathBuf};

/// Inputs for one bundle invocation.
#[derive(Debug)]
pub struct BundleJob<'a> {
    /// Staged entrypoint files, in deterministic page order.
    pub entrypoints: &'a [PathBuf],
    /// Directory the entrypoints are relative to (the staging dir).
    pub root: &'a Path,
    /// Final output directory.
    pub out_dir: &'a Path,
    /// Minify HTML output.
    pub minify: bool,
    /// Module patterns to leave unresolved.
    pub external: &'a [String],
}

/// Outcome of a bundle invocation: a success flag and diagnostic log
/// entries. A failed report is reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub success: bool,
    pub logs: Vec<String>,
}

impl BuildReport {
    pub const fn ok() -> Self {
        Self {
            success: true,
            logs: Vec::new(),
        }
    }

    pub const fn failed(logs: Vec<String>) -> Self {
        Self {
            success: false,
            logs,
        }
    }
}

/// A batch transform from staged files to final output.
pub trait Bundler: Send + Sync {
    fn bundle(&self, job: &BundleJob) -> BuildReport;
}

/// Built-in bundler: relocates staged entrypoints into the output
/// directory, preserving root-relative paths, and minifies HTML when the
/// job asks for it.
///
/// It has no module graph, so `external` patterns are ignored; they exist
/// for real bundler implementations plugged in via
/// [`run_with_bundler`](crate::run_with_bundler).
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyBundler;

impl Bundler for CopyBundler {
    fn bundle(&self, job: &BundleJob) -> BuildReport {
        let mut logs = Vec::new();
        for entry in job.entrypoints {
            if let Err(e) = relocate(entry, job) {
                logs.push(format!("{}: {e}", entry.display()));
            }
        }
        if logs.is_empty() {
            BuildReport::ok()
        } else {
            BuildReport::failed(logs)
        }
    }
}

fn relocate(entry: &Path, job: &BundleJob) -> std::io::Result<()> {
    let rel = entry.strip_prefix(job.root).unwrap_or(entry);
    let dest = job.out_dir.join(rel);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let is_html = matches!(
        entry.extension().and_then(|e| e.to_str()),
        Some("html" | "htm")
    );
    if job.minify && is_html {
        let content = fs::read(entry)?;
        fs::write(&dest, minify_page(&content))?;
    } else {
        fs::copy(entry, &dest)?;
    }
    Ok(())
}

/// Minify HTML content using the `minify_html` crate.
fn minify_page(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job<'a>(
        entrypoints: &'a [PathBuf],
        root: &'a Path,
        out_dir: &'a Path,
        minify: bool,
    ) -> BundleJob<'a> {
        BundleJob {
            entrypoints,
            root,
            out_dir,
            minify,
            external: &[],
        }
    }

    #[test]
    fn test_copy_preserves_relative_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("stage");
        let out = tmp.path().join("out");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("index.html"), "<h1>Hi</h1>").unwrap();
        fs::write(root.join("sub/page.html"), "<p>sub</p>").unwrap();

        let entrypoints = vec![root.join("index.html"), root.join("sub/page.html")];
        let report = CopyBundler.bundle(&job(&entrypoints, &root, &out, false));

        assert!(report.success);
        assert_eq!(fs::read(out.join("index.html")).unwrap(), b"<h1>Hi</h1>");
        assert_eq!(fs::read(out.join("sub/page.html")).unwrap(), b"<p>sub</p>");
    }

    #[test]
    fn test_minify_strips_comments() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("stage");
        let out = tmp.path().join("out");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("index.html"), "<!-- gone --><h1>Hi</h1>").unwrap();

        let entrypoints = vec![root.join("index.html")];
        let report = CopyBundler.bundle(&job(&entrypoints, &root, &out, true));

        assert!(report.success);
        let built = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(!built.contains("gone"));
        assert!(built.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_missing_entrypoint_fails_soft() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("stage");
        let out = tmp.path().join("out");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("ok.html"), "ok").unwrap();

        let entrypoints = vec![root.join("missing.html"), root.join("ok.html")];
        let report = CopyBundler.bundle(&job(&entrypoints, &root, &out, false));

        // Reported, not raised; remaining entrypoints still processed.
        assert!(!report.success);
        assert_eq!(report.logs.len(), 1);
        assert!(report.logs[0].contains("missing.html"));
        assert_eq!(fs::read(out.join("ok.html")).unwrap(), b"ok");
    }
}
