//! Page units and the page-module extension point.
//!
//! A [`Page`] is one `(pathname, content)` pair produced by site content
//! code. A [`PageModule`] is the sole extension point for content: given a
//! [`RenderContext`], it yields zero or more pages. Modules are registered
//! on [`BuildOptions`](crate::BuildOptions) and rendered in registration
//! order on every build cycle.

/// One rendered output unit: a relative pathname and its content.
///
/// The pathname may contain subdirectories (`posts/first/index.html`);
/// parent directories are created when the page is staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path relative to the staging directory.
    pub pathname: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl Page {
    pub fn new(pathname: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            pathname: pathname.into(),
            content: content.into(),
        }
    }
}

/// Data handed to every page module on render.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Base path prefix the site is served under (`--base`), empty when
    /// serving from the root. Page code should prefix internal links
    /// with it.
    pub base: String,
}

impl RenderContext {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

/// A capability producing pages for one build cycle.
///
/// Implemented by call sites, not by this crate. Any
/// `Fn(&RenderContext) -> Vec<Page>` closure qualifies:
///
/// ```
/// use plank::{Page, RenderContext};
///
/// let home = |_ctx: &RenderContext| {
///     vec![Page::new("index.html", "<h1>Hi</h1>")]
/// };
/// # let _ = &home as &dyn plank::PageModule;
/// ```
pub trait PageModule: Send + Sync {
    /// Produce this module's pages. Order within the returned list is
    /// preserved through staging.
    fn render(&self, ctx: &RenderContext) -> Vec<Page>;
}

impl<F> PageModule for F
where
    F: Fn(&RenderContext) -> Vec<Page> + Send + Sync,
{
    fn render(&self, ctx: &RenderContext) -> Vec<Page> {
        self(ctx)
    }
}
