//! graphstat watcher: reload a graph document when it changes on disk and
//! publish fresh statistics.

pub mod watcher;

pub use watcher::{load_graph_file, FileWatcher, ReloadOutcome, WatchEvent, WatchService};
