//! Filesystem watcher implementation

use anyhow::{Context, Result};
use graphstat_core::{GraphData, GraphStats, GraphStore, WatchConfig};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Document created or written
    Modified(PathBuf),
    /// Document removed or renamed away
    Removed(PathBuf),
}

/// Watches a single graph document.
///
/// The parent directory is watched non-recursively so that editors which save
/// by writing a temp file and renaming it over the target are still seen.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    target: PathBuf,
}

impl FileWatcher {
    pub fn new(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let filter = target.clone();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        debug!("File system event: {:?}", event);
                        Self::handle_notify_event(event, &filter, &event_tx);
                    }
                    Err(e) => {
                        error!("File system watch error: {}", e);
                    }
                }
            })?;

        let dir = watch_dir(&target);
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {}", dir.display()))?;
        info!("Watching graph document: {:?}", target);

        Ok(Self {
            _watcher: watcher,
            event_rx,
            target,
        })
    }

    fn handle_notify_event(
        event: notify::Event,
        target: &Path,
        event_tx: &mpsc::UnboundedSender<WatchEvent>,
    ) {
        let removed = match event.kind {
            notify::EventKind::Create(_) | notify::EventKind::Modify(_) => false,
            notify::EventKind::Remove(_) => true,
            _ => return,
        };
        for path in event.paths {
            if !is_target(&path, target) {
                continue;
            }
            let event = if removed {
                WatchEvent::Removed(path)
            } else {
                WatchEvent::Modified(path)
            };
            if let Err(e) = event_tx.send(event) {
                warn!("Failed to send watch event: {}", e);
            }
        }
    }

    pub fn event_receiver(&mut self) -> &mut mpsc::UnboundedReceiver<WatchEvent> {
        &mut self.event_rx
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Directory to watch for `target`; a bare file name means the current one.
fn watch_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Event paths are absolute while the target may be relative, so match on the
/// file name within the watched directory.
fn is_target(path: &Path, target: &Path) -> bool {
    path.file_name().is_some() && path.file_name() == target.file_name()
}

/// Read and parse a `{nodes, links|edges}` JSON document.
pub async fn load_graph_file(path: impl AsRef<Path>) -> Result<GraphData> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading graph {}", path.display()))?;
    GraphData::from_json_str(&text).with_context(|| format!("parsing graph {}", path.display()))
}

/// Result of a reload.
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    /// Content hash changed; stats were recomputed and published.
    Updated(GraphStats),
    /// Same node ids and edge endpoints as last time.
    Unchanged,
}

/// Keeps a shared store in sync with a graph document and publishes stats
/// whenever its content hash changes.
pub struct WatchService {
    path: PathBuf,
    store: Arc<RwLock<GraphStore>>,
    debounce: Duration,
    stats_tx: broadcast::Sender<GraphStats>,
    last_hash: Option<u64>,
}

impl WatchService {
    pub fn new(
        path: impl AsRef<Path>,
        store: Arc<RwLock<GraphStore>>,
        config: &WatchConfig,
    ) -> Self {
        let (stats_tx, _) = broadcast::channel(16);
        Self {
            path: path.as_ref().to_path_buf(),
            store,
            debounce: Duration::from_millis(config.debounce_ms),
            stats_tx,
            last_hash: None,
        }
    }

    /// Receive every published stats update.
    pub fn subscribe(&self) -> broadcast::Receiver<GraphStats> {
        self.stats_tx.subscribe()
    }

    pub fn store(&self) -> Arc<RwLock<GraphStore>> {
        Arc::clone(&self.store)
    }

    /// Re-read the document into the store. Stats are recomputed only when
    /// the content hash differs from the last published one.
    ///
    /// On any error the previous graph is put back, so the store always holds
    /// the last document that loaded cleanly.
    pub async fn reload(&mut self) -> Result<ReloadOutcome> {
        let data = load_graph_file(&self.path).await?;

        let (hash, previous) = {
            let mut store = self.store.write().await;
            let previous = store.to_data();
            store.load(data)?;
            if let Err(e) = store.build_index() {
                store.load(previous)?;
                return Err(e.into());
            }
            (store.content_hash(), previous)
        };
        if self.last_hash == Some(hash) {
            debug!(hash, "graph content unchanged");
            return Ok(ReloadOutcome::Unchanged);
        }

        let computed = {
            let store = self.store.read().await;
            store.stats()
        };
        let stats = match computed {
            Ok(stats) => stats,
            Err(e) => {
                self.store.write().await.load(previous)?;
                return Err(e.into());
            }
        };
        self.last_hash = Some(hash);
        info!(
            nodes = stats.node_count,
            edges = stats.edge_count,
            components = stats.component_count,
            "graph stats updated"
        );
        // No subscribers is fine.
        let _ = self.stats_tx.send(stats.clone());
        Ok(ReloadOutcome::Updated(stats))
    }

    /// Load once, then reload after every debounced burst of changes.
    ///
    /// The initial load must succeed; later failures are logged and the last
    /// good graph stays in the store.
    pub async fn run(&mut self) -> Result<()> {
        let mut watcher = FileWatcher::new(&self.path)?;
        self.reload().await?;

        while let Some(event) = watcher.event_receiver().recv().await {
            debug!("Processing watch event: {:?}", event);
            tokio::time::sleep(self.debounce).await;

            let mut removed = matches!(event, WatchEvent::Removed(_));
            while let Ok(next) = watcher.event_receiver().try_recv() {
                removed = matches!(next, WatchEvent::Removed(_));
            }
            if removed && !self.path.exists() {
                warn!("Graph document removed: {:?}", self.path);
                continue;
            }

            match self.reload().await {
                Ok(ReloadOutcome::Updated(_)) => {}
                Ok(ReloadOutcome::Unchanged) => debug!("reload skipped, content unchanged"),
                Err(e) => warn!("Reload failed: {:#}", e),
            }
        }
        Ok(())
    }
}
