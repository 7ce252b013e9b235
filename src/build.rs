//! One build cycle: clean → render → stage → bundle → copy.
//!
//! The cycle is internally sequential; each step gates on the previous
//! one. Staging failures abort the cycle (fatal-to-cycle), bundler
//! failures are reported and the cycle continues (fail-soft) so the dev
//! server can keep serving whatever is on disk.

use crate::{
    assets::copy_public,
    bundle::{BundleJob, Bundler},
    log,
    options::BuildOptions,
    page::{Page, RenderContext},
    stage::write_pages,
};
use anyhow::{Context, Result};
use std::{fs, io, path::Path};

/// Run one full build cycle.
///
/// Staging and output directories are recreated from scratch every
/// cycle; no partial build state survives between cycles.
pub fn build_site(opts: &BuildOptions, bundler: &dyn Bundler, ctx: &RenderContext) -> Result<()> {
    clean_dir(&opts.staging_dir)?;
    clean_dir(&opts.out_dir)?;

    // Registration order defines cross-module page order.
    let mut pages: Vec<Page> = Vec::new();
    for module in &opts.page_modules {
        pages.extend(module.render(ctx));
    }

    let entrypoints = write_pages(&pages, &opts.staging_dir)?;
    log!("build"; "staged {} pages", entrypoints.len());

    let report = bundler.bundle(&BundleJob {
        entrypoints: &entrypoints,
        root: &opts.staging_dir,
        out_dir: &opts.out_dir,
        minify: opts.minify,
        external: &opts.external,
    });
    if !report.success {
        for line in &report.logs {
            log!("error"; "{line}");
        }
        log!("build"; "bundle failed, output may be stale or incomplete");
    }

    copy_public(&opts.public_dir, &opts.out_dir)?;

    log!("build"; "done");
    Ok(())
}

/// Recreate a directory from scratch (delete then create).
fn clean_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to clear {}", dir.display()));
        }
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BuildReport, CopyBundler};
    use std::path::PathBuf;

    fn site(tmp: &Path) -> BuildOptions {
        BuildOptions::new()
            .staging_dir(tmp.join(".cache"))
            .out_dir(tmp.join("dist"))
            .public_dir(tmp.join("public"))
            .page_module(|_: &RenderContext| vec![Page::new("index.html", "<h1>Hi</h1>")])
    }

    fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_build_only_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = site(tmp.path());

        build_site(&opts, &CopyBundler, &RenderContext::default()).unwrap();

        let built = fs::read_to_string(tmp.path().join("dist/index.html")).unwrap();
        assert!(built.contains("<h1>Hi</h1>"));
        // Staged copy is ephemeral but present until the next clean.
        assert!(tmp.path().join(".cache/index.html").is_file());
    }

    #[test]
    fn test_idempotent_output() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = site(tmp.path());
        let ctx = RenderContext::default();

        build_site(&opts, &CopyBundler, &ctx).unwrap();
        let first = snapshot(&tmp.path().join("dist"));
        build_site(&opts, &CopyBundler, &ctx).unwrap();
        let second = snapshot(&tmp.path().join("dist"));

        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_clean_removes_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = site(tmp.path());
        fs::create_dir_all(tmp.path().join("dist")).unwrap();
        fs::write(tmp.path().join("dist/stale.html"), "old").unwrap();

        build_site(&opts, &CopyBundler, &RenderContext::default()).unwrap();

        assert!(!tmp.path().join("dist/stale.html").exists());
        assert!(tmp.path().join("dist/index.html").is_file());
    }

    #[test]
    fn test_public_assets_merged() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = site(tmp.path());
        fs::create_dir_all(tmp.path().join("public")).unwrap();
        fs::write(tmp.path().join("public/robots.txt"), "ok").unwrap();

        build_site(&opts, &CopyBundler, &RenderContext::default()).unwrap();

        assert_eq!(
            fs::read(tmp.path().join("dist/robots.txt")).unwrap(),
            b"ok"
        );
    }

    #[test]
    fn test_bundler_failure_is_fail_soft() {
        struct FailingBundler;
        impl Bundler for FailingBundler {
            fn bundle(&self, _job: &BundleJob) -> BuildReport {
                BuildReport::failed(vec!["boom".into()])
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let opts = site(tmp.path());
        fs::create_dir_all(tmp.path().join("public")).unwrap();
        fs::write(tmp.path().join("public/robots.txt"), "ok").unwrap();

        // The cycle completes and later stages still run.
        build_site(&opts, &FailingBundler, &RenderContext::default()).unwrap();
        assert!(tmp.path().join("dist/robots.txt").is_file());
    }
}
