//! Run lifecycle control — submit, start, cancel, reset — and the run driver.

use crate::error::{Error, Result};
use crate::types::{Event, InputItem, RunId, RunState};
use crate::validator;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::bundle_worker::{BundleWorkerContext, run_bundle_worker};
use super::convert_worker::{ConvertWorkerContext, run_convert_worker};
use super::session::RunSession;
use super::{PipelineController, WORKER_CHANNEL_CAPACITY, WorkerMessage};

impl PipelineController {
    /// Submit a candidate file list for the next run
    ///
    /// Validation applies the format, count, and size policies; on success
    /// the batch is staged and the state moves to `ItemsReady`. Returns the
    /// non-fatal size advisory (`true` when the combined size crossed the
    /// warning threshold).
    ///
    /// Re-submitting while `ItemsReady` replaces the staged batch. Submitting
    /// during an active run or from a terminal state is rejected with
    /// `InvalidState` — terminal states require an explicit [`reset`](Self::reset)
    /// first.
    ///
    /// A validation failure leaves the state machine untouched.
    pub async fn submit_batch(&self, candidates: Vec<InputItem>) -> Result<bool> {
        let mut state = self.inner.lock().await;

        match state.run_state {
            RunState::Idle | RunState::ItemsReady => {}
            other => {
                return Err(Error::InvalidState {
                    operation: "submit a batch".to_string(),
                    current_state: format!("{other:?}"),
                });
            }
        }

        let validated = validator::validate(candidates, &self.config.limits)?;

        tracing::info!(
            items = validated.batch.len(),
            total_bytes = validated.batch.total_bytes(),
            size_warning = validated.size_warning,
            "batch accepted"
        );

        let size_warning = validated.size_warning;
        state.pending = Some(validated);
        self.set_state(&mut state, RunState::ItemsReady);

        Ok(size_warning)
    }

    /// Start a run on the staged batch
    ///
    /// Rejected with `InvalidState` unless the current state is `ItemsReady`.
    /// Creates a fresh session — new run id, armed cancellation token, new
    /// worker tasks — and clears anything left over from a previous run, so
    /// no residual in-flight work can leak into this one.
    pub async fn start(&self) -> Result<()> {
        let mut state = self.inner.lock().await;

        if state.run_state != RunState::ItemsReady {
            return Err(Error::InvalidState {
                operation: "start".to_string(),
                current_state: format!("{:?}", state.run_state),
            });
        }
        let Some(validated) = state.pending.take() else {
            // ItemsReady without a staged batch cannot happen through the
            // public surface; treat it as a rejected command rather than
            // panicking
            return Err(Error::InvalidState {
                operation: "start".to_string(),
                current_state: "ItemsReady without a staged batch".to_string(),
            });
        };

        let run_id = RunId(state.next_run_id);
        state.next_run_id += 1;

        state.result = None;
        state.last_error = None;
        state.last_progress = None;

        let token = CancellationToken::new();
        let (worker_tx, worker_rx) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        let mut session = RunSession::new(run_id, token.clone());

        tracing::info!(
            run_id = %run_id,
            items = validated.batch.len(),
            total_bytes = validated.batch.total_bytes(),
            "starting run"
        );

        session.register(tokio::spawn(run_convert_worker(ConvertWorkerContext {
            run_id,
            batch: validated.batch,
            conversion: self.config.conversion.clone(),
            converter: self.converter.clone(),
            token: token.clone(),
            tx: worker_tx.clone(),
        })));
        session.register(tokio::spawn(drive_run(
            self.clone(),
            run_id,
            token,
            worker_tx,
            worker_rx,
        )));

        state.session = Some(session);
        self.set_state(&mut state, RunState::Converting);

        Ok(())
    }

    /// Cancel the active run
    ///
    /// Rejected with `InvalidState` unless a run is converting or bundling.
    /// Fires the cancellation token and immediately terminates every session
    /// task without waiting for acknowledgement; accumulated converted items
    /// die with the worker that owned them. Any message a worker managed to
    /// send before termination is discarded, never delivered.
    pub async fn cancel(&self) -> Result<()> {
        let mut state = self.inner.lock().await;

        if !state.run_state.is_active() {
            return Err(Error::InvalidState {
                operation: "cancel".to_string(),
                current_state: format!("{:?}", state.run_state),
            });
        }

        let session = state.session.take();
        state.last_progress = None;
        self.set_state(&mut state, RunState::Cancelled);
        drop(state);

        if let Some(session) = session {
            tracing::info!(run_id = %session.run_id, "run cancelled");
            session.teardown();
        }

        Ok(())
    }

    /// Reset the pipeline to `Idle`
    ///
    /// Accepted from any state and idempotent. Tears down any session
    /// unconditionally — even one whose tasks already terminated — and
    /// discards the staged batch, accumulated progress, and any unclaimed
    /// archive, so the next run starts from guaranteed-clean workers.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.inner.lock().await;

        let session = state.session.take();
        state.pending = None;
        state.result = None;
        state.last_progress = None;
        state.last_error = None;
        self.set_state(&mut state, RunState::Idle);
        drop(state);

        if let Some(session) = session {
            tracing::info!(run_id = %session.run_id, "tearing down session on reset");
            session.teardown();
        }

        Ok(())
    }
}

/// Consume worker messages for one run and drive the state machine
///
/// Runs as a task inside the session, so cancel/reset terminate it along
/// with the workers. Every message is double-checked against the live
/// session: a message from a torn-down run (stale run id, cancelled token,
/// or mismatched phase) is discarded rather than applied.
async fn drive_run(
    controller: PipelineController,
    run_id: RunId,
    token: CancellationToken,
    worker_tx: mpsc::Sender<WorkerMessage>,
    mut worker_rx: mpsc::Receiver<WorkerMessage>,
) {
    while let Some(message) = worker_rx.recv().await {
        if token.is_cancelled() {
            tracing::warn!(run_id = %run_id, "discarding worker message after cancellation");
            continue;
        }

        let mut state = controller.inner.lock().await;
        let session_live = state
            .session
            .as_ref()
            .is_some_and(|session| session.run_id == run_id);
        if !session_live {
            tracing::warn!(run_id = %run_id, "discarding message from torn-down session");
            continue;
        }

        match message {
            WorkerMessage::Progress(event) => {
                state.last_progress = Some(event.clone());
                drop(state);
                controller.emit_event(Event::Progress(event));
            }

            WorkerMessage::ConversionComplete(items) => {
                if state.run_state != RunState::Converting {
                    tracing::warn!(
                        run_id = %run_id,
                        state = ?state.run_state,
                        "discarding conversion completion outside the converting phase"
                    );
                    continue;
                }

                tracing::info!(
                    run_id = %run_id,
                    items = items.len(),
                    "conversion finished, handing items to the bundling worker"
                );

                let handle = tokio::spawn(run_bundle_worker(BundleWorkerContext {
                    run_id,
                    items,
                    archive: controller.config.archive.clone(),
                    token: token.clone(),
                    tx: worker_tx.clone(),
                }));
                if let Some(session) = state.session.as_mut() {
                    session.register(handle);
                }
                controller.set_state(&mut state, RunState::Bundling);
            }

            WorkerMessage::BundlingComplete(result) => {
                if state.run_state != RunState::Bundling {
                    tracing::warn!(
                        run_id = %run_id,
                        state = ?state.run_state,
                        "discarding archive outside the bundling phase"
                    );
                    continue;
                }

                tracing::info!(
                    run_id = %run_id,
                    file_name = %result.file_name,
                    entry_count = result.entry_count,
                    archive_bytes = result.bytes.len(),
                    "run complete"
                );

                let file_name = result.file_name.clone();
                let entry_count = result.entry_count;
                state.result = Some(result);
                state.session = None;
                controller.set_state(&mut state, RunState::Complete);
                drop(state);
                controller.emit_event(Event::Completed {
                    file_name,
                    entry_count,
                });
                break;
            }

            WorkerMessage::Failed { message } => {
                tracing::error!(run_id = %run_id, error = %message, "run failed");

                state.last_error = Some(message.clone());
                state.session = None;
                controller.set_state(&mut state, RunState::Failed);
                drop(state);
                controller.emit_event(Event::Failed { message });
                break;
            }
        }
    }
}
