//! Per-run session — worker handles and the cancellation token.

use crate::types::RunId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// State owned by one pipeline run
///
/// Constructed fresh for every `start()` and discarded on completion, cancel,
/// or reset. The token is never reused across runs, so a stale cancel from a
/// previous run can never kill a new one; tearing the session down
/// unconditionally guarantees every run begins from clean worker instances.
pub(crate) struct RunSession {
    /// Identifier tying worker messages to this session
    pub(crate) run_id: RunId,
    /// Single-shot cooperative cancellation signal for this run
    pub(crate) token: CancellationToken,
    /// Tasks spawned for this run (workers and the run driver)
    tasks: Vec<JoinHandle<()>>,
}

impl RunSession {
    /// Create a session with an armed (not yet cancelled) token
    pub(crate) fn new(run_id: RunId, token: CancellationToken) -> Self {
        Self {
            run_id,
            token,
            tasks: Vec::new(),
        }
    }

    /// Track a task belonging to this run
    pub(crate) fn register(&mut self, handle: JoinHandle<()>) {
        self.tasks.push(handle);
    }

    /// Cancel the token and terminate every task without waiting
    ///
    /// Aborting an already-finished task is a no-op, so teardown is safe to
    /// call regardless of how far the run got.
    pub(crate) fn teardown(self) {
        self.token.cancel();
        for handle in self.tasks {
            handle.abort();
        }
    }
}
