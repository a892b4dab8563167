//! Filesystem change watcher: debounces raw `notify` events into
//! `{created | modified | deleted}` notifications per project-relative
//! path, filtered through the same ignore rules the indexing driver uses,
//! and hands them to the driver through a bounded, coalescing queue.

mod queue;
mod watcher;

pub use watcher::{watch, WatchEvent, WatchHandle};
