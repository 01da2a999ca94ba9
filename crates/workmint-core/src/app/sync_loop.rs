//! SyncLoop - バックグラウンド同期サービス
//!
//! # トリガー
//! - 一定周期のタイマー（デフォルト 30 秒、オンライン状態に関係なく起動し、パス内で判定）
//! - オンライン復帰（Connectivity の復帰カウンタが増えたとき。パス実行中の復帰も次のループで拾う）
//! - `sync_now()` による手動実行
//!
//! # 設計
//! - グローバル状態ではなく、インスタンスごとにタイマーとリスナーを持つ
//! - `start()` / `stop()` でライフサイクルを管理（テストで独立に作れる）
//! - 同時に走るパスは 1 つだけ（single-flight）。重なったトリガーはスキップ
//! - `stop()` は以後のパスを止めるだけで、実行中のパスは中断しない

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::app::status::{SkipReason, SyncReport, SyncStatus};
use crate::app::sync_pass::sync_pass;
use crate::ports::{Connectivity, RemotePush};
use crate::store::DraftStore;

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SyncLoopConfig {
    pub interval: Duration,
}

impl Default for SyncLoopConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SYNC_INTERVAL,
        }
    }
}

/// What started a pass. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    Online,
    Manual,
}

struct Inner {
    store: Arc<DraftStore>,
    push: Arc<dyn RemotePush>,
    connectivity: Arc<dyn Connectivity>,
    in_flight: tokio::sync::Mutex<()>,
    status_tx: watch::Sender<SyncStatus>,
}

impl Inner {
    /// Runs one pass unless another one is in progress.
    async fn run_pass(&self, trigger: Trigger) -> Option<SyncReport> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::info!(?trigger, "sync pass already in progress, skipping");
            let report = SyncReport::skipped(self.store.now(), SkipReason::PassInProgress);
            self.status_tx.send_modify(|s| s.record(&report));
            return None;
        };

        let span = tracing::info_span!("sync_pass", ?trigger);
        let report = sync_pass(&self.store, self.push.as_ref())
            .instrument(span)
            .await;
        self.status_tx.send_modify(|s| s.record(&report));
        Some(report)
    }
}

struct Running {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

/// Background sync service.
///
/// # 使用例
/// ```ignore
/// let sync = SyncLoop::new(store, push, connectivity, SyncLoopConfig::default());
/// sync.start();
/// // ...
/// sync.stop().await;
/// ```
pub struct SyncLoop {
    inner: Arc<Inner>,
    config: SyncLoopConfig,
    running: Mutex<Option<Running>>,
}

impl SyncLoop {
    pub fn new(
        store: Arc<DraftStore>,
        push: Arc<dyn RemotePush>,
        connectivity: Arc<dyn Connectivity>,
        config: SyncLoopConfig,
    ) -> Self {
        let (status_tx, _rx) = watch::channel(SyncStatus::default());
        Self {
            inner: Arc::new(Inner {
                store,
                push,
                connectivity,
                in_flight: tokio::sync::Mutex::new(()),
                status_tx,
            }),
            config,
            running: Mutex::new(None),
        }
    }

    /// Spawn the background task. Calling it again while running is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.as_ref().is_some_and(|r| !r.join.is_finished()) {
            tracing::warn!("sync loop already started");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        // subscribe here so a reconnect right after start() is not missed
        let reconnect_rx = self.inner.connectivity.subscribe();
        let inner = Arc::clone(&self.inner);
        let interval = self.config.interval;
        let join = tokio::spawn(async move {
            run_loop(inner, interval, reconnect_rx, shutdown_rx).await;
        });

        self.inner.status_tx.send_modify(|s| s.running = true);
        tracing::info!(interval_secs = interval.as_secs_f64(), "sync loop started");
        *running = Some(Running { shutdown_tx, join });
    }

    /// Stop scheduling passes and wait for the task to exit. A pass that is
    /// already running is allowed to finish.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(running) = running else {
            return;
        };

        // ignore send error: the task may already be gone
        let _ = running.shutdown_tx.send(true);
        if let Err(e) = running.join.await {
            tracing::warn!(error = %e, "sync loop task ended abnormally");
        }
        self.inner.status_tx.send_modify(|s| s.running = false);
        tracing::info!("sync loop stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|r| !r.join.is_finished())
    }

    /// Run a pass right away. `None` if a pass is already in progress.
    pub async fn sync_now(&self) -> Option<SyncReport> {
        self.inner.run_pass(Trigger::Manual).await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status_tx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status_tx.subscribe()
    }
}

impl Drop for SyncLoop {
    fn drop(&mut self) {
        if let Some(running) = self
            .running
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            let _ = running.shutdown_tx.send(true);
        }
    }
}

async fn run_loop(
    inner: Arc<Inner>,
    period: Duration,
    mut reconnect_rx: watch::Receiver<u64>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut signal_open = true;

    // like setInterval: first tick one period after start
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let trigger = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    // SyncLoop dropped
                    break;
                }
                continue;
            }
            _ = ticker.tick() => Trigger::Timer,
            // a reconnect during the previous pass leaves this ready
            changed = reconnect_rx.changed(), if signal_open => {
                if changed.is_err() {
                    tracing::warn!("connectivity signal closed, timer only from now on");
                    signal_open = false;
                    continue;
                }
                let reconnects = *reconnect_rx.borrow_and_update();
                tracing::debug!(reconnects, "connectivity regained");
                Trigger::Online
            }
        };

        inner.run_pass(trigger).await;
    }

    tracing::debug!("sync loop task exiting");
}
