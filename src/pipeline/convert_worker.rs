//! Conversion worker — sequential per-item format conversion.

use crate::config::ConversionConfig;
use crate::convert::ImageConverter;
use crate::error::ConversionError;
use crate::types::{Batch, ConvertedItem, Phase, ProgressEvent, RunId};
use crate::utils::derive_output_name;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::WorkerMessage;

/// Everything the conversion worker needs for one run
pub(crate) struct ConvertWorkerContext {
    pub(crate) run_id: RunId,
    pub(crate) batch: Batch,
    pub(crate) conversion: ConversionConfig,
    pub(crate) converter: Arc<dyn ImageConverter>,
    pub(crate) token: CancellationToken,
    pub(crate) tx: mpsc::Sender<WorkerMessage>,
}

/// Convert every item of the batch, one at a time, in batch order
///
/// Per item: progress is reported BEFORE conversion begins, the cancellation
/// token is checked before each item and again after the converter returns
/// (discarding the result of a call that raced a cancel), and the first
/// conversion failure terminates the whole run — no partial output. After the
/// last item a single completion message carries the full converted set.
///
/// At most one item is ever in flight, bounding peak memory to one decoded
/// image plus the growing converted set.
pub(crate) async fn run_convert_worker(ctx: ConvertWorkerContext) {
    let total = ctx.batch.len();
    let mut converted = Vec::with_capacity(total);

    tracing::debug!(run_id = %ctx.run_id, total, "conversion worker starting");

    for (index, item) in ctx.batch.into_items().into_iter().enumerate() {
        if ctx.token.is_cancelled() {
            tracing::debug!(run_id = %ctx.run_id, "conversion worker stopping on cancel");
            return;
        }

        let progress = ProgressEvent {
            phase: Phase::Converting,
            current: index + 1,
            total,
            item_label: item.name.clone(),
        };
        if ctx.tx.send(WorkerMessage::Progress(progress)).await.is_err() {
            // Driver is gone; the run was torn down
            return;
        }

        match ctx
            .converter
            .convert(&item.bytes, &item.media_type, &ctx.conversion)
            .await
        {
            Ok(bytes) => {
                if ctx.token.is_cancelled() {
                    // Cancelled while the converter ran; discard partial work
                    tracing::debug!(
                        run_id = %ctx.run_id,
                        item = %item.name,
                        "discarding converted item after cancel"
                    );
                    return;
                }
                let output_name = derive_output_name(&item.name, &ctx.conversion.target_extension);
                converted.push(ConvertedItem { output_name, bytes });
            }
            Err(error) => {
                if ctx.token.is_cancelled() {
                    return;
                }
                let message = ConversionError::Failed {
                    name: item.name.clone(),
                    reason: error.to_string(),
                }
                .to_string();
                ctx.tx.send(WorkerMessage::Failed { message }).await.ok();
                return;
            }
        }
    }

    tracing::debug!(
        run_id = %ctx.run_id,
        converted = converted.len(),
        "conversion worker finished"
    );
    ctx.tx
        .send(WorkerMessage::ConversionComplete(converted))
        .await
        .ok();
}
