//! Subcommand implementations. Each prints one JSON document to stdout.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use workmint_core::app::sync_pass;
use workmint_core::impls::{FileBlobStorage, LoggingPush, ManualConnectivity, ScriptedPush};
use workmint_core::ports::{Connectivity, RemotePush, SystemClock};
use workmint_core::{DraftStore, SyncLoop, TaskId, WorkmintConfig};

pub struct Context {
    config: WorkmintConfig,
    store: Arc<DraftStore>,
    connectivity: Arc<ManualConnectivity>,
}

impl Context {
    pub fn open(config_path: &Path) -> Result<Self> {
        let config = WorkmintConfig::load(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        let connectivity = Arc::new(ManualConnectivity::new(config.start_online));
        let store = Arc::new(DraftStore::with_key(
            Arc::new(FileBlobStorage::new(&config.storage_dir)),
            Arc::new(SystemClock),
            connectivity.clone(),
            config.storage_key.clone(),
        ));
        tracing::debug!(dir = %config.storage_dir.display(), key = %config.storage_key, "draft store opened");
        Ok(Self {
            config,
            store,
            connectivity,
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn save(ctx: &Context, task_id: &str, completed_qty: f64) -> Result<()> {
    let record = ctx
        .store
        .save_draft(task_id, completed_qty)
        .context("saving draft")?;
    print_json(&record)
}

pub fn get(ctx: &Context, task_id: &str) -> Result<()> {
    let record = ctx.store.get_draft(&TaskId::new(task_id))?;
    print_json(&record)
}

pub fn list(ctx: &Context, unsynced: bool) -> Result<()> {
    let drafts = if unsynced {
        ctx.store.list_unsynced()?
    } else {
        ctx.store.list_drafts()?
    };
    print_json(&drafts)
}

pub fn mark_synced(ctx: &Context, task_id: &str) -> Result<()> {
    let marked = ctx.store.mark_synced(&TaskId::new(task_id))?;
    print_json(&serde_json::json!({ "taskId": task_id, "marked": marked }))
}

pub fn remove(ctx: &Context, task_id: &str) -> Result<()> {
    let removed = ctx.store.remove_draft(&TaskId::new(task_id))?;
    print_json(&serde_json::json!({ "taskId": task_id, "removed": removed }))
}

pub fn clear(ctx: &Context) -> Result<()> {
    ctx.store.clear_all()?;
    print_json(&serde_json::json!({ "cleared": true }))
}

fn status_report(ctx: &Context) -> Result<serde_json::Value> {
    let drafts = ctx.store.list_drafts()?.len();
    let pending = ctx.store.pending_count()?;
    Ok(serde_json::json!({
        "storageDir": ctx.config.storage_dir,
        "storageKey": ctx.store.storage_key(),
        "online": ctx.store.is_online(),
        "drafts": drafts,
        "pending": pending,
    }))
}

pub fn status(ctx: &Context) -> Result<()> {
    print_json(&status_report(ctx)?)
}

pub async fn sync_once(ctx: &Context, reject: Vec<String>, offline: bool) -> Result<()> {
    if offline {
        ctx.connectivity.set_online(false);
    }
    let push: Arc<dyn RemotePush> = if reject.is_empty() {
        Arc::new(LoggingPush::new())
    } else {
        Arc::new(ScriptedPush::rejecting(reject))
    };

    let report = sync_pass(&ctx.store, push.as_ref()).await;
    print_json(&report)
}

pub async fn run(ctx: &Context, offline: bool) -> Result<()> {
    if offline {
        ctx.connectivity.set_online(false);
    }

    let connectivity: Arc<dyn Connectivity> = ctx.connectivity.clone();
    let sync = SyncLoop::new(
        ctx.store.clone(),
        Arc::new(LoggingPush::new()),
        connectivity,
        ctx.config.sync_loop_config(),
    );
    sync.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("reading stdin")? else {
                    stdin_open = false;
                    continue;
                };
                match line.trim() {
                    "" => {}
                    "online" => ctx.connectivity.set_online(true),
                    "offline" => ctx.connectivity.set_online(false),
                    "sync" => match sync.sync_now().await {
                        Some(report) => print_json(&report)?,
                        None => tracing::info!("a sync pass is already running"),
                    },
                    "status" => print_json(&sync.status())?,
                    "quit" | "exit" => break,
                    other => tracing::warn!(command = other, "unknown command (online|offline|sync|status|quit)"),
                }
            }
        }
    }

    sync.stop().await;
    print_json(&sync.status())
}
