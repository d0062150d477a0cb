//! Bundling worker — packs converted items into one archive.

use crate::bundle::ArchiveBuilder;
use crate::config::ArchiveConfig;
use crate::types::{ArchiveResult, ConvertedItem, Phase, ProgressEvent, RunId};
use crate::utils::archive_file_name;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::WorkerMessage;

/// Everything the bundling worker needs for one run
pub(crate) struct BundleWorkerContext {
    pub(crate) run_id: RunId,
    pub(crate) items: Vec<ConvertedItem>,
    pub(crate) archive: ArchiveConfig,
    pub(crate) token: CancellationToken,
    pub(crate) tx: mpsc::Sender<WorkerMessage>,
}

/// Pack the converted items into a single archive, in conversion order
///
/// The archive layout is deterministic: entries appear exactly in the order
/// they were converted. The cancellation token is checked before each entry
/// is added and again around finalization — archive generation itself is not
/// interruptible, so a cancel that lands mid-generation is honored by
/// discarding the finished archive instead of delivering it.
pub(crate) async fn run_bundle_worker(ctx: BundleWorkerContext) {
    let total = ctx.items.len();
    let mut builder = ArchiveBuilder::new(&ctx.archive);

    tracing::debug!(run_id = %ctx.run_id, total, "bundling worker starting");

    for (index, item) in ctx.items.iter().enumerate() {
        if ctx.token.is_cancelled() {
            tracing::debug!(run_id = %ctx.run_id, "bundling worker stopping on cancel");
            return;
        }

        if let Err(error) = builder.add_entry(&item.output_name, &item.bytes) {
            ctx.tx
                .send(WorkerMessage::Failed {
                    message: error.to_string(),
                })
                .await
                .ok();
            return;
        }

        let progress = ProgressEvent {
            phase: Phase::Bundling,
            current: index + 1,
            total,
            item_label: item.output_name.clone(),
        };
        if ctx.tx.send(WorkerMessage::Progress(progress)).await.is_err() {
            return;
        }
    }

    if ctx.token.is_cancelled() {
        return;
    }

    match builder.finalize() {
        Ok((bytes, entry_count)) => {
            if ctx.token.is_cancelled() {
                // Cancelled while finalizing; the archive is never delivered
                tracing::debug!(run_id = %ctx.run_id, "discarding archive after cancel");
                return;
            }
            let result = ArchiveResult {
                file_name: archive_file_name(&ctx.archive.file_name_prefix, Utc::now()),
                bytes,
                entry_count,
            };
            tracing::debug!(
                run_id = %ctx.run_id,
                entry_count,
                "bundling worker finished"
            );
            ctx.tx
                .send(WorkerMessage::BundlingComplete(result))
                .await
                .ok();
        }
        Err(error) => {
            ctx.tx
                .send(WorkerMessage::Failed {
                    message: error.to_string(),
                })
                .await
                .ok();
        }
    }
}
