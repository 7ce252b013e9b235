//! plank - minimal static-site build orchestrator.
//!
//! Renders registered page modules into a staging directory, bundles
//! them into a deployable output directory, merges public assets, and —
//! in dev mode — serves the output while watching source directories
//! for changes with a debounced full-rebuild loop.
//!
//! The crate is embedded in a site's own build script:
//!
//! ```no_run
//! use plank::{BuildOptions, Page, RenderContext};
//!
//! fn main() -> anyhow::Result<()> {
//!     plank::run(
//!         BuildOptions::new()
//!             .page_module(|_: &RenderContext| {
//!                 vec![Page::new("index.html", "<h1>Hi</h1>")]
//!             })
//!             .watch_dir("src"),
//!     )
//! }
//! ```
//!
//! Run modes come from the argument vector: `--dev` builds, watches and
//! serves; `--preview` builds and serves; no flag builds once and exits.

mod assets;
mod build;
mod bundle;
mod cli;
pub mod logger;
mod options;
mod page;
mod resolve;
mod serve;
mod stage;
mod watch;

pub use bundle::{BuildReport, BundleJob, Bundler, CopyBundler};
pub use cli::{DEV_PORT, PREVIEW_PORT, RunMode};
pub use options::BuildOptions;
pub use page::{Page, PageModule, RenderContext};
pub use resolve::Resolver;
pub use stage::StageError;

use anyhow::Result;
use std::path::PathBuf;

/// Run the orchestrator with the built-in [`CopyBundler`].
///
/// A failed bundle is logged and the invocation still returns `Ok`, so
/// build scripts exit 0 on bundler failure (fail-soft). Staging
/// failures are fatal to the invocation.
pub fn run(options: BuildOptions) -> Result<()> {
    run_with_bundler(options, CopyBundler)
}

/// Run the orchestrator with a custom [`Bundler`] implementation.
pub fn run_with_bundler<B: Bundler + 'static>(options: BuildOptions, bundler: B) -> Result<()> {
    let cli = cli::Cli::parse_args(&options.args)?;
    let mode = cli.run_mode();

    // Dev mode hands these to a detached watch thread.
    let opts: &'static BuildOptions = Box::leak(Box::new(options));
    let bundler: &'static B = Box::leak(Box::new(bundler));
    let ctx: &'static RenderContext = Box::leak(Box::new(RenderContext::new(cli.base_path())));

    build::build_site(opts, bundler, ctx)?;

    if mode == RunMode::Build {
        return Ok(());
    }

    if mode == RunMode::Dev {
        // Watched set = explicit watch dirs plus the public dir.
        let watch_set: Vec<PathBuf> = opts
            .watch_dirs
            .iter()
            .cloned()
            .chain(std::iter::once(opts.public_dir.clone()))
            .collect();

        std::thread::spawn(move || {
            let rebuild = || {
                log!("watch"; "change detected, rebuilding...");
                if let Err(e) = build::build_site(opts, bundler, ctx) {
                    log!("error"; "rebuild failed: {e:#}");
                }
            };
            if let Err(e) = watch::watch_and_rebuild(&watch_set, rebuild) {
                log!("watch"; "{e:#}");
            }
        });
    }

    let resolver = Resolver::new(opts.out_dir.clone(), opts.public_dir.clone());
    serve::serve_site(resolver, cli.serve_port(mode), &ctx.base)
}
