//! Command-line interface definitions.
//!
//! Flags are parsed from [`BuildOptions::args`](crate::BuildOptions::args)
//! rather than the process environment directly, so the embedding build
//! script owns the argument vector.

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;

/// Default port in dev (watch + serve) mode.
pub const DEV_PORT: u16 = 5000;

/// Default port in preview (serve-only) mode.
pub const PREVIEW_PORT: u16 = 4000;

/// Orchestrator CLI flags.
#[derive(Parser, Debug, Clone)]
#[command(name = "plank", version, about = "minimal static-site build orchestrator", long_about = None)]
pub struct Cli {
    /// Build, then watch source directories and serve the output
    #[arg(long, conflicts_with = "preview")]
    pub dev: bool,

    /// Build, then serve the output without watching
    #[arg(long)]
    pub preview: bool,

    /// Port for the development server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base path prefix the site is served under
    #[arg(short, long)]
    pub base: Option<String>,
}

/// The three supported run modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One-shot build, then exit.
    Build,
    /// Build, watch and serve; long-running.
    Dev,
    /// Build and serve without watching; long-running.
    Preview,
}

impl Cli {
    /// Parse flags from a raw argument vector (including argv[0]).
    pub fn parse_args(args: &[OsString]) -> Result<Self> {
        Self::try_parse_from(args).context("Failed to parse CLI arguments")
    }

    /// Derive the run mode: `--dev` implies watch+serve, `--preview`
    /// implies serve-only, neither means a one-shot build.
    pub const fn run_mode(&self) -> RunMode {
        match (self.dev, self.preview) {
            (true, _) => RunMode::Dev,
            (false, true) => RunMode::Preview,
            (false, false) => RunMode::Build,
        }
    }

    /// Port to serve on: explicit `--port`, otherwise the mode default.
    pub fn serve_port(&self, mode: RunMode) -> u16 {
        self.port.unwrap_or(match mode {
            RunMode::Preview => PREVIEW_PORT,
            _ => DEV_PORT,
        })
    }

    /// Base path prefix, normalized to no surrounding slashes.
    pub fn base_path(&self) -> &str {
        self.base.as_deref().unwrap_or("").trim_matches('/')
    }
}
