//! Throttled bulk prefetch scheduler.
//!
//! One job runs at a time. Each throttle tick dispatches exactly one tile:
//! a spawned task fetches it and writes it to the store while the tick
//! loop moves on. Slow fetches may overlap the next tick.
//!
//! ```text
//! start(request)
//!   Idle → Enumerating → Downloading ─┬─ last tile dispatched → Idle
//!                                     └─ cancelled / replaced  → Idle
//! ```

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{TileCacheClient, TileEntry};
use crate::coord::TileCoord;
use crate::provider::{TileFetcher, TileUrlTemplate};

use super::config::{PrefetchProgress, PrefetchReport, PrefetchRequest, PrefetchState};
use super::job::PrefetchJob;

/// Errors surfaced by [`PrefetchHandle::wait`].
#[derive(Debug, Error)]
pub enum PrefetchError {
    #[error("Prefetch task failed: {0}")]
    TaskFailed(String),
}

/// The currently running job.
struct ActiveJob {
    id: u64,
    cancel: CancellationToken,
}

/// State shared between the scheduler and its job tasks.
struct Shared {
    state: watch::Sender<PrefetchState>,
    active: Mutex<Option<ActiveJob>>,
}

impl Shared {
    /// Publishes `state` if job `id` is still the active one.
    fn set_state_if_current(&self, id: u64, state: PrefetchState) {
        let active = self.active.lock();
        if active.as_ref().is_some_and(|job| job.id == id) {
            self.state.send_replace(state);
        }
    }

    /// Clears the active slot if job `id` still holds it.
    fn finish(&self, id: u64) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|job| job.id == id) {
            *active = None;
            self.state.send_replace(PrefetchState::Idle);
        }
    }
}

/// Completion counters updated by dispatched tile tasks.
#[derive(Default)]
struct JobCounters {
    stored: AtomicUsize,
    failed: AtomicUsize,
}

/// Runs throttled prefetch jobs against the tile store.
pub struct PrefetchScheduler {
    cache: TileCacheClient,
    fetcher: Arc<dyn TileFetcher>,
    urls: TileUrlTemplate,
    shared: Arc<Shared>,
    next_id: AtomicU64,
}

impl PrefetchScheduler {
    pub fn new(cache: TileCacheClient, fetcher: Arc<dyn TileFetcher>, urls: TileUrlTemplate) -> Self {
        let (state, _) = watch::channel(PrefetchState::Idle);
        Self {
            cache,
            fetcher,
            urls,
            shared: Arc::new(Shared {
                state,
                active: Mutex::new(None),
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Starts a prefetch job.
    ///
    /// A job that is already running is cancelled and replaced. Its timer
    /// stops at once; fetches it already dispatched run to completion.
    /// Must be called inside a Tokio runtime.
    pub fn start(&self, request: PrefetchRequest) -> PrefetchHandle {
        self.spawn_job(request, None)
    }

    /// Runs `tiles` instead of enumerating the request's region.
    #[cfg(test)]
    fn start_with_tiles(&self, request: PrefetchRequest, tiles: PrefetchJob) -> PrefetchHandle {
        self.spawn_job(request, Some(tiles))
    }

    fn spawn_job(&self, request: PrefetchRequest, tiles: Option<PrefetchJob>) -> PrefetchHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        {
            let mut active = self.shared.active.lock();
            if let Some(previous) = active.replace(ActiveJob {
                id,
                cancel: cancel.clone(),
            }) {
                info!(job = previous.id, replaced_by = id, "Replacing running prefetch job");
                previous.cancel.cancel();
            }
            self.shared.state.send_replace(PrefetchState::Enumerating);
        }

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let runner = JobRunner {
            id,
            request,
            tiles,
            cache: self.cache.clone(),
            fetcher: Arc::clone(&self.fetcher),
            urls: self.urls.clone(),
            shared: Arc::clone(&self.shared),
            cancel: cancel.clone(),
            progress: progress_tx,
        };
        let task = tokio::spawn(runner.run());

        PrefetchHandle {
            id,
            cancel,
            task,
            progress: Some(progress_rx),
        }
    }

    /// Cancels the running job, if any.
    pub fn cancel(&self) {
        if let Some(job) = self.shared.active.lock().as_ref() {
            debug!(job = job.id, "Cancelling prefetch job");
            job.cancel.cancel();
        }
    }

    pub fn state(&self) -> PrefetchState {
        *self.shared.state.borrow()
    }

    /// Watches state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PrefetchState> {
        self.shared.state.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.lock().is_some()
    }
}

/// Handle to a started prefetch job.
pub struct PrefetchHandle {
    id: u64,
    cancel: CancellationToken,
    task: JoinHandle<PrefetchReport>,
    progress: Option<mpsc::UnboundedReceiver<PrefetchProgress>>,
}

impl PrefetchHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stops dispatching further tiles.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that cancels this job, for signal handlers and other tasks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Takes the progress receiver. Returns `None` after the first call.
    pub fn take_progress(&mut self) -> Option<mpsc::UnboundedReceiver<PrefetchProgress>> {
        self.progress.take()
    }

    /// Waits for the job to stop and its dispatched tiles to settle.
    pub async fn wait(self) -> Result<PrefetchReport, PrefetchError> {
        self.task
            .await
            .map_err(|e| PrefetchError::TaskFailed(e.to_string()))
    }
}

/// Body of one prefetch job.
struct JobRunner {
    id: u64,
    request: PrefetchRequest,
    tiles: Option<PrefetchJob>,
    cache: TileCacheClient,
    fetcher: Arc<dyn TileFetcher>,
    urls: TileUrlTemplate,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    progress: mpsc::UnboundedSender<PrefetchProgress>,
}

impl JobRunner {
    async fn run(mut self) -> PrefetchReport {
        let mut job = self
            .tiles
            .take()
            .unwrap_or_else(|| PrefetchJob::from_request(&self.request));
        let total = job.total();
        let counters = Arc::new(JobCounters::default());
        let mut in_flight = JoinSet::new();

        info!(
            job = self.id,
            total,
            max_zoom = self.request.max_zoom,
            throttle_ms = self.request.effective_throttle().as_millis() as u64,
            "Prefetch job starting"
        );
        let _ = self.progress.send(PrefetchProgress::Starting { total });

        let mut cancelled = false;
        if !job.is_finished() {
            self.shared
                .set_state_if_current(self.id, PrefetchState::Downloading);

            let throttle = self.request.effective_throttle();
            let mut ticker = interval_at(Instant::now() + throttle, throttle);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(tile) = job.next_tile() else { break };
                        in_flight.spawn(self.dispatch(tile, Arc::clone(&counters)));

                        let _ = self.progress.send(PrefetchProgress::Progress {
                            dispatched: job.dispatched(),
                            total,
                            stored: counters.stored.load(Ordering::Relaxed),
                            failed: counters.failed.load(Ordering::Relaxed),
                        });
                        if job.is_finished() {
                            break;
                        }
                    }
                }
            }
            // ticker dropped here
        }
        self.shared.finish(self.id);

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(job = self.id, error = %e, "Prefetch tile task failed");
                counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        let report = PrefetchReport {
            total,
            dispatched: job.dispatched(),
            stored: counters.stored.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            cancelled,
        };
        info!(job = self.id, %report, "Prefetch job finished");

        let event = if cancelled {
            PrefetchProgress::Cancelled(report)
        } else {
            PrefetchProgress::Complete(report)
        };
        let _ = self.progress.send(event);
        report
    }

    /// Fetch-then-store for one tile. Failures are counted, never raised.
    fn dispatch(
        &self,
        tile: TileCoord,
        counters: Arc<JobCounters>,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let url = self.urls.url_for(&tile);
        let fetcher = Arc::clone(&self.fetcher);
        let cache = self.cache.clone();

        async move {
            let data = match fetcher.fetch(&url).await {
                Ok(data) => data,
                Err(e) => {
                    debug!(tile = %tile, error = %e, "Prefetch fetch failed");
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            };

            match cache.put(&tile, TileEntry::png(data)).await {
                Ok(_) => {
                    counters.stored.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    debug!(tile = %tile, error = %e, "Prefetch store failed");
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}
