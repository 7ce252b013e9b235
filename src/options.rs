//! Build options: the immutable configuration record for one invocation.
//!
//! Defaults mirror the conventional project layout (`public`, `.cache`,
//! `dist`); each `with_*` builder overrides exactly one field, so user
//! values always take precedence field by field.

use crate::page::PageModule;
use educe::Educe;
use std::ffi::OsString;
use std::path::PathBuf;

/// Configuration for one orchestrator invocation.
///
/// # Example
/// ```no_run
/// use plank::{BuildOptions, Page, RenderContext};
///
/// let opts = BuildOptions::new()
///     .page_module(|_: &RenderContext| vec![Page::new("index.html", "<h1>Hi</h1>")])
///     .watch_dir("src")
///     .minify(true);
/// plank::run(opts).unwrap();
/// ```
#[derive(Educe)]
#[educe(Default)]
pub struct BuildOptions {
    /// Directories watched (recursively) for changes in dev mode.
    pub watch_dirs: Vec<PathBuf>,

    /// Static assets merged into the output directory verbatim.
    #[educe(Default = PathBuf::from("public"))]
    pub public_dir: PathBuf,

    /// Ephemeral staging directory for pre-bundle rendered files.
    #[educe(Default = PathBuf::from(".cache"))]
    pub staging_dir: PathBuf,

    /// Final servable/deployable directory.
    #[educe(Default = PathBuf::from("dist"))]
    pub out_dir: PathBuf,

    /// Minify HTML during bundling.
    pub minify: bool,

    /// Module patterns the bundler must leave unresolved. Opaque to the
    /// orchestrator; forwarded to the bundler as-is.
    pub external: Vec<String>,

    /// Page modules, rendered in registration order.
    pub page_modules: Vec<Box<dyn PageModule>>,

    /// Raw CLI arguments (including argv[0]).
    #[educe(Default = std::env::args_os().collect())]
    pub args: Vec<OsString>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory to watch in dev mode.
    pub fn watch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.watch_dirs.push(dir.into());
        self
    }

    pub fn public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }

    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Add a module pattern to exclude from bundling.
    pub fn external(mut self, pattern: impl Into<String>) -> Self {
        self.external.push(pattern.into());
        self
    }

    /// Register a page module. Modules render in registration order.
    pub fn page_module(mut self, module: impl PageModule + 'static) -> Self {
        self.page_modules.push(Box::new(module));
        self
    }

    /// Replace the argument vector parsed for run-mode flags.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}
