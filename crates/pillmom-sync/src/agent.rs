//! # Sync Agent
//!
//! Background task that syncs an embedded replica on a fixed period.
//!
//! ## Agent Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SyncAgent                                        │
//! │                                                                         │
//! │  spawn(db, period)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  loop {                                                                │
//! │    select! {                                                           │
//! │      tick (every period, first one after one period) ──► db.sync()     │
//! │            ├── Ok  → debug!, count                                     │
//! │            └── Err → error!, keep going (next tick retries)            │
//! │      shutdown_rx.recv() ──► break                                      │
//! │    }                                                                    │
//! │  }                                                                      │
//! │                                                                         │
//! │  Missed ticks are delayed, never bunched up.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pillmom_db::Database;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::{SyncError, SyncResult};

/// Counters shared between the agent task and its handle.
#[derive(Debug, Default)]
pub struct SyncStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl SyncStats {
    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Handle to a running background sync task.
pub struct SyncAgent {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
    stats: Arc<SyncStats>,
    period: Duration,
}

impl std::fmt::Debug for SyncAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncAgent")
            .field("period", &self.period)
            .field("stats", &self.stats)
            .finish()
    }
}

impl SyncAgent {
    /// Spawns the sync loop on the current tokio runtime.
    ///
    /// ## Panics
    /// Outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn(db: Database, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let stats = Arc::new(SyncStats::default());

        let task = tokio::spawn(run(db, period, shutdown_rx, Arc::clone(&stats)));
        info!(period_secs = period.as_secs_f64(), "Sync agent started");

        SyncAgent {
            shutdown_tx,
            task,
            stats,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the loop and waits for it to finish.
    ///
    /// A sync already in flight completes first.
    pub async fn shutdown(self) -> SyncResult<()> {
        // A closed channel means the task already ended; joining tells why.
        let _ = self.shutdown_tx.send(()).await;
        self.task
            .await
            .map_err(|e| SyncError::AgentStopped(e.to_string()))?;
        info!(
            succeeded = self.stats.succeeded(),
            failed = self.stats.failed(),
            "Sync agent stopped"
        );
        Ok(())
    }
}

async fn run(db: Database, period: Duration, mut shutdown_rx: mpsc::Receiver<()>, stats: Arc<SyncStats>) {
    // The replica was synced on open; the first tick is one period out.
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match db.sync().await {
                    Ok(report) => {
                        stats.succeeded.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            frame_no = ?report.frame_no,
                            frames_synced = report.frames_synced,
                            "Background sync"
                        );
                    }
                    Err(e) => {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        error!(error = %e, "Background sync failed");
                    }
                }
            }

            _ = shutdown_rx.recv() => {
                debug!("Sync agent shutting down");
                break;
            }
        }
    }
}
