//! File watching for automatic configuration republish.

use crate::error::{Result, SyncError};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Default minimum time between reload triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches the resolved configuration file for changes.
///
/// Uses the `notify` crate and emits one reload signal per (debounced) batch
/// of write events over an mpsc channel. The receiving side is expected to
/// drain the channel sequentially, so reloads never overlap.
///
/// # Examples
///
/// ```rust,no_run
/// use twitch_bot_config::watch::{FileWatcher, DEFAULT_DEBOUNCE};
///
/// # async fn example() -> twitch_bot_config::error::Result<()> {
/// let (_watcher, mut rx) = FileWatcher::new("config/twitch-bot.yaml", DEFAULT_DEBOUNCE)?;
/// while let Some(()) = rx.recv().await {
///     println!("config file changed");
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    // Held so the underlying OS watch stays registered.
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FileWatcher {
    /// Register a persistent watch on a configuration file.
    ///
    /// Returns the watcher (keep it alive) and the receiver that yields one
    /// message per reload that should happen.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or the OS watch
    /// cannot be registered.
    pub fn new(
        path: impl AsRef<Path>,
        debounce: Duration,
    ) -> Result<(Self, mpsc::Receiver<()>)> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| SyncError::WatchError(format!("Failed to resolve path: {}", e)))?;

        let (tx, rx) = mpsc::channel(100);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                // Writes and renames both count as changes; editors often
                // save via rename.
                if matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) {
                    let _ = event_tx.send(event);
                }
            }
        })
        .map_err(|e| SyncError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| SyncError::WatchError(format!("Failed to watch {}: {}", path.display(), e)))?;

        // Collapse bursts of raw events into single reload triggers.
        tokio::spawn(async move {
            let mut last_reload = tokio::time::Instant::now();

            while let Some(_event) = event_rx.recv().await {
                let now = tokio::time::Instant::now();
                let elapsed = now.duration_since(last_reload);

                if elapsed >= debounce {
                    if tx.send(()).await.is_err() {
                        break;
                    }
                    last_reload = now;
                } else {
                    let remaining = debounce - elapsed;
                    let tx_clone = tx.clone();
                    tokio::spawn(async move {
                        sleep(remaining).await;
                        let _ = tx_clone.send(()).await;
                    });
                }
            }
        });

        Ok((Self { _watcher: watcher, path }, rx))
    }

    /// The canonical path of the watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
