//! Filesystem watcher: observes the project tree with `notify`, debounces
//! raw events into `{created | modified | deleted}` per project-relative
//! path with `notify-debouncer-mini`, filters through the project's ignore
//! rules, and drives [`codemap_indexer::driver`] to keep the store in sync.
//!
//! The background task consumes events off a single [`BoundedEventQueue`]
//! receiver one at a time, so two re-indexes of the same path never overlap;
//! unrelated paths still proceed independently since nothing here blocks on
//! a whole-queue drain before handling the next event.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use codemap_core::{ChangeEvent, IgnoreRules, Store};
use codemap_indexer::driver;

use crate::queue::BoundedEventQueue;

/// Default coalescing window: multiple raw events for the same path within
/// this duration collapse into a single debounced notification.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Default capacity of the queue handing paths from the OS watcher to the
/// re-index task; on overflow, duplicate paths coalesce (see [`BoundedEventQueue`]).
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// A debounced, ignore-filtered filesystem event for one project-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(String),
    Modified(String),
    Deleted(String),
}

impl WatchEvent {
    pub fn path(&self) -> &str {
        match self {
            WatchEvent::Created(p) | WatchEvent::Modified(p) | WatchEvent::Deleted(p) => p,
        }
    }
}

/// Keeps the watch alive and exposes the "graph changed" notification stream.
/// Dropping the handle aborts the background re-index task and the OS watch.
pub struct WatchHandle {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    task: JoinHandle<()>,
    changes: Mutex<Option<mpsc::UnboundedReceiver<ChangeEvent>>>,
}

impl WatchHandle {
    /// Takes the receiver for graph-change notifications. Callers get at
    /// most one receiver per handle; a second call panics, matching the
    /// single-consumer nature of the underlying channel.
    pub fn changes(&self) -> mpsc::UnboundedReceiver<ChangeEvent> {
        self.changes
            .lock()
            .unwrap()
            .take()
            .expect("WatchHandle::changes called more than once")
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start watching `root` with the default debounce window. See
/// [`watch_with_debounce`] to override it.
pub fn watch(root: impl Into<PathBuf>) -> anyhow::Result<WatchHandle> {
    watch_with_debounce(root, DEFAULT_DEBOUNCE)
}

pub fn watch_with_debounce(root: impl Into<PathBuf>, debounce: Duration) -> anyhow::Result<WatchHandle> {
    let root = root.into();
    let (queue, mut rx) = BoundedEventQueue::new(DEFAULT_QUEUE_CAPACITY);
    let queue = Arc::new(queue);
    let known_paths: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

    let watch_root = root.clone();
    let queue_for_events = Arc::clone(&queue);
    let known_for_events = Arc::clone(&known_paths);
    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| match result {
        Ok(events) => {
            for event in events {
                if event.kind != DebouncedEventKind::Any {
                    continue;
                }
                if let Some(watch_event) = classify(&watch_root, &event.path, &known_for_events) {
                    queue_for_events.push(watch_event);
                }
            }
        }
        Err(errors) => {
            for err in errors {
                error!(error = %err, "filesystem watch error");
            }
        }
    })?;
    debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;

    let (change_tx, change_rx) = mpsc::unbounded_channel();
    let driver_root = root.clone();
    let task = tokio::spawn(async move {
        let ignore_rules = IgnoreRules::load(&driver_root);
        while let Some(event) = rx.recv().await {
            let rel_path = event.path().to_string();
            if ignore_rules.is_ignored(&rel_path) {
                continue;
            }
            let outcome = match &event {
                WatchEvent::Deleted(_) => clear_path(&driver_root, &rel_path),
                WatchEvent::Created(_) | WatchEvent::Modified(_) => reindex_one(&driver_root, &rel_path),
            };
            match outcome {
                Ok(Some(change)) => {
                    if change_tx.send(change).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(file = %rel_path, error = %err, "watcher failed to apply change"),
            }
        }
    });

    Ok(WatchHandle {
        _debouncer: debouncer,
        task,
        changes: Mutex::new(Some(change_rx)),
    })
}

/// Map a raw debounced path into a `WatchEvent`. `created` vs. `modified` is
/// decided by whether this is the first time the path has been observed
/// since the watch started; a path that no longer exists on disk is a delete
/// regardless of prior history.
fn classify(root: &Path, path: &Path, known_paths: &Mutex<HashSet<String>>) -> Option<WatchEvent> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel_str = codemap_core::model::normalize_path(rel);
    if rel_str.is_empty() {
        return None;
    }

    if path.exists() {
        let mut known = known_paths.lock().unwrap();
        if known.insert(rel_str.clone()) {
            Some(WatchEvent::Created(rel_str))
        } else {
            Some(WatchEvent::Modified(rel_str))
        }
    } else {
        known_paths.lock().unwrap().remove(&rel_str);
        Some(WatchEvent::Deleted(rel_str))
    }
}

fn clear_path(root: &Path, rel_path: &str) -> anyhow::Result<Option<ChangeEvent>> {
    let mut store = Store::open(root)?;
    store.clear_file(rel_path)?;
    Ok(Some(ChangeEvent::file(rel_path.to_string(), 0, 0)))
}

fn reindex_one(root: &Path, rel_path: &str) -> anyhow::Result<Option<ChangeEvent>> {
    let report = driver::reindex_path(root, Path::new(rel_path))?;
    Ok(Some(report.change))
}
