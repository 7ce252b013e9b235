//! Watch coordinator: filesystem watchers plus a shared debounce window.
//!
//! All watched directories feed one trailing-edge debounce window: the
//! first relevant event arms it, every further event restarts it, and
//! only after the tree stays quiet for the full delay does the rebuild
//! callback run. The coordinator moves through three states:
//!
//! ```text
//! Idle ──event──▶ PendingDebounce ──quiet for DEBOUNCE_MS──▶ Rebuilding ──▶ Idle
//!                      ▲  │
//!                      └──┘ further events restart the window
//! ```
//!
//! There is no cancellation of an in-flight rebuild; events arriving
//! while one runs simply arm a fresh window afterwards.

use crate::log;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

/// Quiet period before a rebuild fires (trailing-edge debounce).
const DEBOUNCE_MS: u64 = 500;

/// Idle poll interval while no window is armed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

const fn is_relevant_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

/// True when the event should arm the debounce window.
fn is_relevant(event: &Event) -> bool {
    is_relevant_kind(&event.kind) && event.paths.iter().any(|p| !is_temp_file(p))
}

// =============================================================================
// Debounce State
// =============================================================================

/// The single shared debounce window across all watched directories.
///
/// Owned by the event loop, not a global, so it can be driven directly
/// in tests.
struct Debouncer {
    last_event: Option<Instant>,
    delay: Duration,
}

impl Debouncer {
    const fn new(delay: Duration) -> Self {
        Self {
            last_event: None,
            delay,
        }
    }

    /// Arm the window, or restart it if already armed.
    fn arm(&mut self) {
        self.last_event = Some(Instant::now());
    }

    /// Armed and quiet for the full delay?
    fn ready(&self) -> bool {
        self.last_event.is_some_and(|t| t.elapsed() >= self.delay)
    }

    fn disarm(&mut self) {
        self.last_event = None;
    }

    fn timeout(&self) -> Duration {
        if self.last_event.is_some() {
            self.delay
        } else {
            IDLE_TIMEOUT
        }
    }
}

// =============================================================================
// Watcher Setup
// =============================================================================

/// Register a recursive watcher per existing directory.
///
/// Directories missing at setup time are silently skipped: optional
/// directories (e.g. no public assets) are a normal configuration.
fn setup_watchers(watcher: &mut impl Watcher, dirs: &[PathBuf]) -> Result<()> {
    let mut watched = Vec::new();
    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        watched.push(dir.display().to_string());
    }

    if !watched.is_empty() {
        log!("watch"; "watching: {}", watched.join(", "));
    }
    Ok(())
}

// =============================================================================
// Event Loop
// =============================================================================

/// Drive the debounce state machine over a channel of watcher events.
///
/// Runs until the sending side disconnects. Extracted from the watcher
/// plumbing so the burst/quiet behavior is testable with synthetic
/// events.
fn run_event_loop<F>(rx: &Receiver<notify::Result<Event>>, delay: Duration, mut rebuild: F)
where
    F: FnMut(),
{
    let mut debouncer = Debouncer::new(delay);

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.arm(),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                debouncer.disarm();
                rebuild();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Watch `dirs` recursively and run `rebuild` after each debounced burst
/// of changes. Blocks for the lifetime of the watcher.
pub fn watch_and_rebuild<F>(dirs: &[PathBuf], rebuild: F) -> Result<()>
where
    F: FnMut(),
{
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, dirs)?;

    run_event_loop(&rx, Duration::from_millis(DEBOUNCE_MS), rebuild);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::sync::mpsc::channel;
    use std::thread;

    fn modify_event(path: &str) -> notify::Result<Event> {
        Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path)))
    }

    #[test]
    fn test_temp_files_filtered() {
        assert!(is_temp_file(Path::new("src/.index.html.swp")));
        assert!(is_temp_file(Path::new("src/index.html~")));
        assert!(is_temp_file(Path::new("src/index.bak")));
        assert!(!is_temp_file(Path::new("src/index.html")));
    }

    #[test]
    fn test_relevant_event_kinds() {
        assert!(is_relevant_kind(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_relevant_kind(&EventKind::Create(CreateKind::Any)));
        assert!(!is_relevant_kind(&EventKind::Access(
            notify::event::AccessKind::Any
        )));
    }

    #[test]
    fn test_burst_triggers_one_rebuild() {
        let (tx, rx) = channel();
        let sender = thread::spawn(move || {
            // 5 events spaced well inside the 80ms window
            for i in 0..5 {
                tx.send(modify_event(&format!("src/{i}.html"))).unwrap();
                thread::sleep(Duration::from_millis(10));
            }
            // Let the window expire before disconnecting
            thread::sleep(Duration::from_millis(200));
        });

        let mut rebuilds = 0;
        run_event_loop(&rx, Duration::from_millis(80), || rebuilds += 1);
        sender.join().unwrap();

        assert_eq!(rebuilds, 1);
    }

    #[test]
    fn test_spaced_events_each_rebuild() {
        let (tx, rx) = channel();
        let sender = thread::spawn(move || {
            for i in 0..3 {
                tx.send(modify_event(&format!("src/{i}.html"))).unwrap();
                // Each gap exceeds the window, so each event fires alone
                thread::sleep(Duration::from_millis(200));
            }
        });

        let mut rebuilds = 0;
        run_event_loop(&rx, Duration::from_millis(50), || rebuilds += 1);
        sender.join().unwrap();

        assert_eq!(rebuilds, 3);
    }

    #[test]
    fn test_temp_only_events_never_arm() {
        let (tx, rx) = channel();
        tx.send(modify_event("src/.index.html.swp")).unwrap();
        drop(tx);

        let mut rebuilds = 0;
        run_event_loop(&rx, Duration::from_millis(10), || rebuilds += 1);

        assert_eq!(rebuilds, 0);
    }

    #[test]
    fn test_missing_dirs_silently_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let existing = tmp.path().join("src");
        std::fs::create_dir_all(&existing).unwrap();

        let (tx, _rx) = channel();
        let mut watcher = notify::recommended_watcher(tx).unwrap();
        let dirs = vec![existing, tmp.path().join("does-not-exist")];

        setup_watchers(&mut watcher, &dirs).unwrap();
    }
}
