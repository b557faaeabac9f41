//! CLI command implementations

use anyhow::Context;
use graphstat_core::{Config, GraphStore, NodeId};
use graphstat_watcher::{load_graph_file, WatchService};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

#[derive(Serialize)]
struct ComponentReport {
    count: usize,
    components: Vec<Vec<NodeId>>,
}

/// Load a document into a store carrying the engine settings.
async fn open_store(file: &Path, config: &Config) -> anyhow::Result<GraphStore> {
    let data = load_graph_file(file).await?;
    let mut store = GraphStore::with_config(config.engine.clone());
    store
        .load(data)
        .with_context(|| format!("loading graph {}", file.display()))?;
    tracing::info!(
        "Loaded {} nodes, {} edges from {}",
        store.node_count(),
        store.edge_count(),
        file.display()
    );
    Ok(store)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

pub async fn stats(file: &Path, config: &Config, pretty: bool) -> anyhow::Result<()> {
    let store = open_store(file, config).await?;
    let stats = store.stats()?;
    print_json(&stats, pretty)
}

pub async fn components(file: &Path, config: &Config) -> anyhow::Result<()> {
    let store = open_store(file, config).await?;
    let components = store.component_ids()?;
    let report = ComponentReport {
        count: components.len(),
        components,
    };
    print_json(&report, false)
}

pub async fn paths(file: &Path, config: &Config, source: String) -> anyhow::Result<()> {
    let store = open_store(file, config).await?;
    let distances = store.shortest_path_lengths_from(&NodeId::from(source))?;
    print_json(&distances, false)
}

pub async fn largest(file: &Path, config: &Config, output: Option<&Path>) -> anyhow::Result<()> {
    let store = open_store(file, config).await?;
    let sub = store.extract_largest_component()?;
    tracing::info!(
        "Largest component: {} nodes, {} edges",
        sub.nodes.len(),
        sub.edges.len()
    );

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&sub)?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
            Ok(())
        }
        None => print_json(&sub, true),
    }
}

/// Print a stats line for the initial load and every content change until
/// interrupted.
pub async fn watch(file: PathBuf, config: Config) -> anyhow::Result<()> {
    let store = Arc::new(RwLock::new(GraphStore::with_config(config.engine.clone())));
    let mut service = WatchService::new(&file, store, &config.watch);
    let mut updates = service.subscribe();

    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(stats) => {
                    if let Err(e) = print_json(&stats, false) {
                        tracing::error!("Failed to print stats: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} stats updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = tokio::select! {
        result = service.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Stopping watch");
            Ok(())
        }
    };

    drop(service);
    // The sender is gone, so the printer drains what is queued and exits.
    join_printer(printer).await;
    result
}

/// Wait for the printer task; a panic inside it is logged, not swallowed.
/// Returns whether it finished cleanly.
async fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Stats printer task failed: {}", e);
            false
        }
    }
}
