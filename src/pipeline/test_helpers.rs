//! Shared test helpers for pipeline tests.

use crate::config::{Config, ConversionConfig};
use crate::convert::{ConverterCapabilities, ImageConverter};
use crate::error::ConversionError;
use crate::pipeline::PipelineController;
use crate::types::{Event, InputItem};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

/// Items whose bytes start with this marker fail conversion in the mock.
pub(crate) const FAIL_MARKER: &[u8] = b"FAIL";

/// Prefix the mock converter stamps onto successful output bytes.
pub(crate) const CONVERTED_PREFIX: &[u8] = b"JPEG:";

/// Scripted converter for tests.
///
/// Succeeds by prefixing the input bytes with [`CONVERTED_PREFIX`]; fails
/// for inputs starting with [`FAIL_MARKER`]. An optional per-item delay
/// opens a window for cancellation tests, and the call counter lets tests
/// assert that no further item begins after a cancel.
pub(crate) struct MockConverter {
    delay: Duration,
    calls: AtomicUsize,
}

impl MockConverter {
    pub(crate) fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of conversion calls started so far
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageConverter for MockConverter {
    async fn convert(
        &self,
        bytes: &[u8],
        _source_media_type: &str,
        _conversion: &ConversionConfig,
    ) -> Result<Vec<u8>, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if bytes.starts_with(FAIL_MARKER) {
            return Err(ConversionError::ExternalTool("scripted failure".into()));
        }
        let mut out = CONVERTED_PREFIX.to_vec();
        out.extend_from_slice(bytes);
        Ok(out)
    }

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities { can_convert: true }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Build an input item declared as HEIC
pub(crate) fn heic_item(name: &str, payload: &[u8]) -> InputItem {
    InputItem::new(name, payload.to_vec(), "image/heic")
}

/// Controller with default config and the given converter
pub(crate) fn test_controller(converter: Arc<dyn ImageConverter>) -> PipelineController {
    PipelineController::with_converter(Config::default(), converter).unwrap()
}

/// Receive the next event, failing the test after a generous timeout
pub(crate) async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Collect events until the run's terminal event (Completed or Failed)
pub(crate) async fn collect_run_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        let event = next_event(rx).await;
        let terminal = matches!(event, Event::Completed { .. } | Event::Failed { .. });
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

/// Assert that no event at all arrives within the window
pub(crate) async fn assert_no_event_within(rx: &mut broadcast::Receiver<Event>, window: Duration) {
    if let Ok(event) = tokio::time::timeout(window, rx.recv()).await {
        panic!("expected no further events, got {event:?}");
    }
}
