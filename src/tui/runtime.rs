//! Async runtime and task management for the TUI
//!
//! This module implements the dual-channel event-driven architecture:
//! - Input channel (priority): User input events that are never dropped
//! - Data channel: Data updates that may be dropped under backpressure
//!
//! The main loop uses `tokio::select!` with bias toward the input channel
//! to prevent input starvation under heavy data update loads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use jqmon::models::{EntityKind, Snapshot};
use jqmon::query::StatusClient;

use crate::tui::app::App;
use crate::tui::event::{DataEvent, EventResult, InputEvent};

/// Channel capacities
const INPUT_CHANNEL_CAPACITY: usize = 16;
const DATA_CHANNEL_CAPACITY: usize = 32;

const ANIMATION_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Default idle detection threshold (30 seconds)
const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(30);
/// Multiplier applied when idle (2x slowdown)
const IDLE_MULTIPLIER: f32 = 2.0;

/// Forward one fetch result to the app.
///
/// On success, sends the snapshot. On error, records the error in throttle
/// and sends a FetchError event with appropriate logging.
fn handle_fetch_result(
    result: jqmon::Result<Snapshot>,
    tx: &mpsc::Sender<DataEvent>,
    throttle: &FetcherThrottle,
    source: EntityKind,
    generation: u64,
) {
    match result {
        Ok(snapshot) => {
            tracing::debug!(%source, generation, count = snapshot.len(), "fetch completed");
            if tx
                .try_send(DataEvent::SnapshotUpdated {
                    source,
                    generation,
                    snapshot,
                })
                .is_err()
            {
                throttle.record_backpressure();
                tracing::debug!("Could not send {} snapshot (channel full)", source);
            }
        }
        Err(e) => {
            throttle.record_error();
            tracing::warn!(%source, generation, error = %e, "fetch failed");
            if tx
                .try_send(DataEvent::FetchError {
                    source,
                    generation,
                    error: e.to_string(),
                })
                .is_err()
            {
                tracing::warn!(
                    "Could not send {} fetch error notification (channel full)",
                    source
                );
            }
        }
    }
}

/// Shared state for adaptive throttling
pub struct FetcherThrottle {
    /// Multiplier applied to base interval (stored as multiplier * 100 for atomicity)
    multiplier: AtomicU32,
    /// Recent error count (rolling window)
    error_count: AtomicU32,
    /// Recent channel-full count (rolling window)
    backpressure_count: AtomicU32,
    /// Last user activity timestamp (seconds since start)
    last_activity: AtomicU64,
    /// When the throttle was created (for calculating elapsed time)
    start_time: Instant,
    /// No idle slowdown when `None`
    idle_threshold: Option<Duration>,
}

impl Default for FetcherThrottle {
    fn default() -> Self {
        Self::new(Some(DEFAULT_IDLE_THRESHOLD))
    }
}

impl FetcherThrottle {
    #[must_use]
    pub fn new(idle_threshold: Option<Duration>) -> Self {
        Self {
            multiplier: AtomicU32::new(100), // 1.0x
            error_count: AtomicU32::new(0),
            backpressure_count: AtomicU32::new(0),
            last_activity: AtomicU64::new(0),
            start_time: Instant::now(),
            idle_threshold,
        }
    }

    /// Get the effective multiplier (includes idle detection)
    #[must_use]
    pub fn get_multiplier(&self) -> f32 {
        let base = self.multiplier.load(Ordering::Relaxed) as f32 / 100.0;
        if self.is_idle() {
            base * IDLE_MULTIPLIER
        } else {
            base
        }
    }

    /// Scale a base refresh interval by the current multiplier
    #[must_use]
    pub fn scale(&self, base: Duration) -> Duration {
        Duration::from_secs_f32(base.as_secs_f32() * self.get_multiplier())
    }

    /// Check if the user has been idle for longer than the threshold
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let Some(threshold) = self.idle_threshold else {
            return false;
        };
        let last = self.last_activity.load(Ordering::Relaxed);
        let now = self.start_time.elapsed().as_secs();
        now.saturating_sub(last) > threshold.as_secs()
    }

    /// Record user activity (call this on any user input)
    pub fn record_activity(&self) {
        let now = self.start_time.elapsed().as_secs();
        self.last_activity.store(now, Ordering::Relaxed);
    }

    /// Called when try_send fails (channel full)
    pub fn record_backpressure(&self) {
        let count = self.backpressure_count.fetch_add(1, Ordering::Relaxed);
        if count >= 5 {
            self.increase_multiplier();
        }
    }

    /// Called on a failed status query
    pub fn record_error(&self) {
        let count = self.error_count.fetch_add(1, Ordering::Relaxed);
        if count >= 3 {
            self.increase_multiplier();
        }
    }

    fn increase_multiplier(&self) {
        // Cap at 4x slowdown
        let current = self.multiplier.load(Ordering::Relaxed);
        if current < 400 {
            self.multiplier
                .store((current + 50).min(400), Ordering::Relaxed);
        }
    }

    /// Called periodically to gradually restore normal speed
    pub fn decay(&self) {
        let current = self.multiplier.load(Ordering::Relaxed);
        if current > 100 {
            self.multiplier
                .store((current - 10).max(100), Ordering::Relaxed);
        }
        // Reset counters
        self.error_count.store(0, Ordering::Relaxed);
        self.backpressure_count.store(0, Ordering::Relaxed);
    }
}

/// TUI runtime managing all background tasks
pub struct TuiRuntime {
    cancel_token: CancellationToken,
    task_handles: Vec<JoinHandle<()>>,
}

impl TuiRuntime {
    /// Create a new TUI runtime
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            task_handles: Vec::new(),
        }
    }

    /// Get a clone of the cancellation token for spawning tasks
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Add a task handle to track
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.task_handles.push(handle);
    }

    /// Signal shutdown and wait for tasks to complete
    pub async fn shutdown(self) {
        // Signal all tasks to stop
        self.cancel_token.cancel();

        // Wait for graceful shutdown with timeout
        let shutdown = async {
            for handle in self.task_handles {
                let _ = handle.await;
            }
        };

        tokio::select! {
            _ = shutdown => {}
            _ = tokio::time::sleep(Duration::from_secs(2)) => {
                tracing::debug!("background tasks did not stop in time");
            }
        }
    }
}

/// Spawn the input event reader task
pub fn spawn_input_task(tx: mpsc::Sender<InputEvent>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            let input_event = match event {
                                Event::Key(key) => Some(InputEvent::Key(key)),
                                Event::Mouse(mouse) => Some(InputEvent::Mouse(mouse)),
                                Event::Resize(w, h) => Some(InputEvent::Resize(w, h)),
                                _ => None,
                            };

                            if let Some(evt) = input_event {
                                // Input channel should never be full, but handle it gracefully
                                if tx.send(evt).await.is_err() {
                                    break; // Receiver dropped
                                }
                            }
                        }
                        Some(Err(e)) => {
                            // Check for fatal terminal errors that should trigger shutdown
                            let is_fatal = matches!(
                                e.kind(),
                                std::io::ErrorKind::BrokenPipe
                                    | std::io::ErrorKind::ConnectionReset
                                    | std::io::ErrorKind::UnexpectedEof
                            );

                            if is_fatal {
                                tracing::info!("Terminal disconnected: {:?}", e);
                                break;
                            } else {
                                tracing::warn!("Terminal event read error: {:?}", e);
                            }
                        }
                        None => break, // Stream ended
                    }
                }
            }
        }
    })
}

/// Manual refresh handles, one per fetcher
#[derive(Debug, Clone, Default)]
pub struct RefreshTriggers {
    pub jobs: Arc<Notify>,
    pub queues: Arc<Notify>,
}

impl RefreshTriggers {
    #[must_use]
    pub fn for_kind(&self, kind: EntityKind) -> &Arc<Notify> {
        match kind {
            EntityKind::Job => &self.jobs,
            EntityKind::Queue => &self.queues,
        }
    }

    /// Wake the fetcher of `kind`. A permit is stored if it is not waiting
    /// yet, so the request is never lost.
    pub fn trigger(&self, kind: EntityKind) {
        self.for_kind(kind).notify_one();
    }
}

/// Everything one fetcher task needs besides the shared channels.
pub struct FetcherParams {
    pub kind: EntityKind,
    pub client: StatusClient,
    pub interval: Duration,
    /// Wakes the fetcher for an immediate refresh. A refresh that arrives
    /// while a request is in flight drops that request and starts a new one.
    pub refresh: Arc<Notify>,
}

/// Spawn the periodic fetcher for one entity kind
///
/// Each request gets the next generation number. A superseded request is
/// dropped before it can report, so its generation never reaches the app.
pub fn spawn_fetcher(
    params: FetcherParams,
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    throttle: Arc<FetcherThrottle>,
) -> JoinHandle<()> {
    let FetcherParams {
        kind,
        client,
        interval,
        refresh,
    } = params;

    tokio::spawn(async move {
        let mut generation: u64 = 0;

        loop {
            generation += 1;

            // Initial fetch immediately, then one per interval or refresh
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = refresh.notified() => {
                    tracing::debug!(%kind, generation, "fetch superseded by refresh");
                    continue;
                }
                result = client.query(kind) => {
                    handle_fetch_result(result, &tx, &throttle, kind, generation);
                }
            }

            let current_interval = throttle.scale(interval);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = refresh.notified() => {
                    tracing::debug!(%kind, "manual refresh");
                }
                _ = tokio::time::sleep(current_interval) => {}
            }
        }
    })
}

/// Spawn the animation tick task
pub fn spawn_animation_tick(
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    animation_visible: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ANIMATION_TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    // Only send tick if animation is visible
                    if animation_visible.load(Ordering::Relaxed) {
                        let _ = tx.try_send(DataEvent::AnimationTick);
                    }
                }
            }
        }
    })
}

/// Spawn the throttle decay task
pub fn spawn_throttle_decay(
    cancel: CancellationToken,
    throttle: Arc<FetcherThrottle>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    throttle.decay();
                }
            }
        }
    })
}

/// Run the main TUI event loop
pub async fn run_event_loop(
    mut app: App,
    mut input_rx: mpsc::Receiver<InputEvent>,
    mut data_rx: mpsc::Receiver<DataEvent>,
    throttle: Arc<FetcherThrottle>,
    mut render_fn: impl FnMut(&mut App) -> Result<()>,
) -> Result<()> {
    let mut needs_render = true;

    // Mark initial activity
    throttle.record_activity();

    loop {
        if needs_render {
            render_fn(&mut app)?;
            needs_render = false;
        }

        if !app.running {
            break;
        }

        tokio::select! {
            // Bias toward input channel to prevent input starvation
            biased;

            Some(input) = input_rx.recv() => {
                // Record user activity for adaptive refresh
                throttle.record_activity();

                match app.handle_input(input) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            Some(data) = data_rx.recv() => {
                match app.handle_data(data) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            else => break,
        }
    }

    Ok(())
}

/// Create the dual channels for the TUI
pub fn create_channels() -> (
    mpsc::Sender<InputEvent>,
    mpsc::Receiver<InputEvent>,
    mpsc::Sender<DataEvent>,
    mpsc::Receiver<DataEvent>,
) {
    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let (data_tx, data_rx) = mpsc::channel(DATA_CHANNEL_CAPACITY);
    (input_tx, input_rx, data_tx, data_rx)
}
