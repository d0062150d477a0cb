//! Core pipeline implementation split into focused submodules.
//!
//! The `PipelineController` struct and its methods are organized by domain:
//! - [`control`] - Run lifecycle commands (submit/start/cancel/reset)
//! - [`session`] - Per-run worker handles and cancellation token
//! - [`convert_worker`] - Sequential format conversion worker
//! - [`bundle_worker`] - Archive bundling worker

mod bundle_worker;
mod control;
mod convert_worker;
mod session;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::convert::{self, ImageConverter};
use crate::error::Result;
use crate::types::{
    ArchiveResult, ConvertedItem, Event, ProgressEvent, RunState,
};
use crate::validator::ValidatedBatch;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

use session::RunSession;

/// Buffer size of the event broadcast channel. A subscriber that falls more
/// than this many events behind receives `RecvError::Lagged`.
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Buffer size of the worker-to-driver message channel
const WORKER_CHANNEL_CAPACITY: usize = 64;

/// Message sent from a worker task to the run driver
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// Per-item progress report
    Progress(ProgressEvent),
    /// The conversion worker processed every item
    ConversionComplete(Vec<ConvertedItem>),
    /// The bundling worker finished the archive
    BundlingComplete(ArchiveResult),
    /// The active worker failed; the run is over
    Failed {
        /// Human-readable failure message
        message: String,
    },
}

/// Mutable controller state, guarded by a single async mutex
pub(crate) struct ControllerState {
    /// Current state of the (single) run
    pub(crate) run_state: RunState,
    /// Batch staged by `submit_batch`, consumed by `start`
    pub(crate) pending: Option<ValidatedBatch>,
    /// The live run session, if a run is active
    pub(crate) session: Option<RunSession>,
    /// Archive retained after a successful run until taken or reset
    pub(crate) result: Option<ArchiveResult>,
    /// Most recent progress report of the current run
    pub(crate) last_progress: Option<ProgressEvent>,
    /// Failure message of the current run, if it failed
    pub(crate) last_error: Option<String>,
    /// Next run id to hand out
    pub(crate) next_run_id: u64,
}

/// Pipeline controller (cloneable - all fields are Arc-wrapped)
///
/// Owns the lifecycle of the conversion and bundling workers, drives the
/// validate → convert → bundle → deliver sequence, and exposes the run state
/// machine to consumers. Exactly one run is active at a time.
///
/// # Examples
///
/// ```no_run
/// use imgpack::{Config, InputItem, PipelineController};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let controller = PipelineController::new(Config::default())?;
///
///     // Subscribe to events
///     let mut events = controller.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {:?}", event);
///         }
///     });
///
///     let photo = InputItem::new("photo.heic", std::fs::read("photo.heic")?, "image/heic");
///     controller.submit_batch(vec![photo]).await?;
///     controller.start().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct PipelineController {
    /// Run state, staged batch, live session, retained result
    pub(crate) inner: Arc<Mutex<ControllerState>>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Format converter (trait object for pluggable implementations)
    pub(crate) converter: Arc<dyn ImageConverter>,
}

impl PipelineController {
    /// Create a new controller, selecting a converter from the configuration
    ///
    /// The converter is chosen from [`Config::tools`](crate::config::ToolsConfig):
    /// an explicit binary path, a PATH search, or the no-op stub when neither
    /// is available.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config fails validation.
    pub fn new(config: Config) -> Result<Self> {
        let converter = convert::from_config(&config.tools);
        Self::with_converter(config, converter)
    }

    /// Create a new controller with an explicit converter implementation
    pub fn with_converter(config: Config, converter: Arc<dyn ImageConverter>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(Mutex::new(ControllerState {
                run_state: RunState::Idle,
                pending: None,
                session: None,
                result: None,
                last_progress: None,
                last_error: None,
                next_run_id: 1,
            })),
            event_tx,
            config: Arc::new(config),
            converter,
        })
    }

    /// Subscribe to pipeline events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently; events are buffered, and a subscriber falling
    /// behind by more than the channel capacity receives
    /// `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current state of the run state machine
    pub async fn state(&self) -> RunState {
        self.inner.lock().await.run_state
    }

    /// Most recent progress report of the current run, if any
    pub async fn progress(&self) -> Option<ProgressEvent> {
        self.inner.lock().await.last_progress.clone()
    }

    /// Failure message of the current run, if it failed
    pub async fn failure_message(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    /// Claim the archive of a completed run
    ///
    /// The result is handed over exactly once: the first call after a
    /// successful run returns it, every later call returns `None`. A reset
    /// discards an unclaimed result.
    pub async fn take_result(&self) -> Option<ArchiveResult> {
        self.inner.lock().await.result.take()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the pipeline never depends on anyone listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Transition the state machine, emitting `StateChanged` when it moves
    pub(crate) fn set_state(&self, state: &mut ControllerState, new_state: RunState) {
        if state.run_state == new_state {
            return;
        }
        tracing::debug!(from = ?state.run_state, to = ?new_state, "state transition");
        state.run_state = new_state;
        self.emit_event(Event::StateChanged { state: new_state });
    }
}
