//! Core types and events for imgpack

use serde::{Deserialize, Serialize};

/// Unique identifier for one pipeline run
///
/// Monotonically increasing per controller. Every run session is tagged with
/// its id so that nothing produced by a torn-down session can be mistaken for
/// output of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single input file accepted into a batch
///
/// Immutable once accepted by the validator; ownership transfers to the
/// conversion worker for the duration of one run.
#[derive(Clone)]
pub struct InputItem {
    /// Original filename (e.g. "IMG_0001.heic")
    pub name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Declared media type (e.g. "image/heic")
    pub media_type: String,
}

impl InputItem {
    /// Create a new input item
    pub fn new(
        name: impl Into<String>,
        bytes: Vec<u8>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bytes,
            media_type: media_type.into(),
        }
    }

    /// Size of the raw contents in bytes
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Manual Debug: raw image bytes would drown any log line
impl std::fmt::Debug for InputItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputItem")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// A successfully converted item
///
/// Created exactly once per input item that converts successfully. The set of
/// converted items for a run is append-only and is discarded entirely on
/// cancellation or reset.
#[derive(Clone)]
pub struct ConvertedItem {
    /// Output filename, derived from the input name by extension substitution
    pub output_name: String,
    /// Converted file contents in the target format
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ConvertedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertedItem")
            .field("output_name", &self.output_name)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// A validated, ordered set of input items submitted for one pipeline run
///
/// A batch can only be produced by [`crate::validator::validate`], which
/// enforces the format, count, and size policies. It has no identity beyond
/// the run it is handed to.
#[derive(Debug, Clone)]
pub struct Batch {
    items: Vec<InputItem>,
    total_bytes: u64,
}

impl Batch {
    /// Construct a batch from already-validated items.
    ///
    /// Crate-private: the validator is the only entry point for building a
    /// batch from untrusted candidates.
    pub(crate) fn from_validated(items: Vec<InputItem>) -> Self {
        let total_bytes = items.iter().map(InputItem::size_bytes).sum();
        Self { items, total_bytes }
    }

    /// Number of items in the batch (always at least 1)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty (never true for a validator-produced batch)
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Combined size of all items in bytes
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Borrow the items in submission order
    pub fn items(&self) -> &[InputItem] {
        &self.items
    }

    /// Consume the batch, yielding the items in submission order
    pub fn into_items(self) -> Vec<InputItem> {
        self.items
    }
}

/// State of the single pipeline run
///
/// Exactly one state is active at a time; there are no concurrent runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No batch submitted
    Idle,
    /// A validated batch is staged and ready to start
    ItemsReady,
    /// Conversion worker is processing items
    Converting,
    /// Bundling worker is building the archive
    Bundling,
    /// Run finished; the archive is available until taken or reset
    Complete,
    /// Run was cancelled by explicit request
    Cancelled,
    /// Run failed; requires an explicit reset before another run
    Failed,
}

impl RunState {
    /// Whether this is a terminal state (Complete, Cancelled, or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Cancelled | RunState::Failed)
    }

    /// Whether a run is actively processing (Converting or Bundling)
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Converting | RunState::Bundling)
    }
}

/// The two sequential stages of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Items are being converted to the target format
    Converting,
    /// Converted items are being packed into the archive
    Bundling,
}

/// Per-item progress report from a worker
///
/// Within a phase, `current` takes every value `1..=total` exactly once, in
/// strictly increasing order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The phase reporting progress
    pub phase: Phase,
    /// 1-based index of the item being processed
    pub current: usize,
    /// Total number of items in the phase
    pub total: usize,
    /// Display label for the item (input name while converting, output name
    /// while bundling)
    pub item_label: String,
}

/// The single bundled output of a successful run
///
/// Produced at most once per run and handed to the consumer exactly once via
/// [`crate::pipeline::PipelineController::take_result`].
#[derive(Clone)]
pub struct ArchiveResult {
    /// Timestamp-derived download filename (e.g. "converted-20260806-142501.zip")
    pub file_name: String,
    /// The archive contents
    pub bytes: Vec<u8>,
    /// Number of entries in the archive
    pub entry_count: usize,
}

impl std::fmt::Debug for ArchiveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveResult")
            .field("file_name", &self.file_name)
            .field("entry_count", &self.entry_count)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// Event emitted during the pipeline lifecycle
///
/// Consumers subscribe via [`crate::pipeline::PipelineController::subscribe`].
/// The completed event intentionally carries only metadata; the archive bytes
/// are held by the controller until claimed with `take_result()`, so that the
/// result is consumed exactly once rather than cloned per subscriber.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The pipeline transitioned to a new state
    StateChanged {
        /// The new state
        state: RunState,
    },

    /// A worker reported per-item progress
    Progress(ProgressEvent),

    /// The run completed and an archive is available
    Completed {
        /// Download filename of the archive
        file_name: String,
        /// Number of entries in the archive
        entry_count: usize,
    },

    /// The run failed
    Failed {
        /// Human-readable failure message
        message: String,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // --- RunState classification ---

    #[test]
    fn terminal_states_are_exactly_complete_cancelled_failed() {
        let cases = [
            (RunState::Idle, false),
            (RunState::ItemsReady, false),
            (RunState::Converting, false),
            (RunState::Bundling, false),
            (RunState::Complete, true),
            (RunState::Cancelled, true),
            (RunState::Failed, true),
        ];
        for (state, expected) in cases {
            assert_eq!(
                state.is_terminal(),
                expected,
                "{state:?}.is_terminal() should be {expected}"
            );
        }
    }

    #[test]
    fn active_states_are_exactly_converting_and_bundling() {
        let cases = [
            (RunState::Idle, false),
            (RunState::ItemsReady, false),
            (RunState::Converting, true),
            (RunState::Bundling, true),
            (RunState::Complete, false),
            (RunState::Cancelled, false),
            (RunState::Failed, false),
        ];
        for (state, expected) in cases {
            assert_eq!(
                state.is_active(),
                expected,
                "{state:?}.is_active() should be {expected}"
            );
        }
    }

    // --- Batch accounting ---

    #[test]
    fn batch_total_bytes_sums_item_sizes() {
        let batch = Batch::from_validated(vec![
            InputItem::new("a.heic", vec![0u8; 10], "image/heic"),
            InputItem::new("b.heif", vec![0u8; 5], "image/heif"),
        ]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.total_bytes(), 15);
    }

    #[test]
    fn batch_preserves_submission_order() {
        let batch = Batch::from_validated(vec![
            InputItem::new("first.heic", vec![1], "image/heic"),
            InputItem::new("second.heic", vec![2], "image/heic"),
            InputItem::new("third.heic", vec![3], "image/heic"),
        ]);
        let names: Vec<&str> = batch.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["first.heic", "second.heic", "third.heic"]);

        let names: Vec<String> = batch.into_items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["first.heic", "second.heic", "third.heic"]);
    }

    // --- Debug formatting hides raw bytes ---

    #[test]
    fn input_item_debug_reports_length_not_contents() {
        let item = InputItem::new("a.heic", vec![0xAB; 4096], "image/heic");
        let dbg = format!("{item:?}");
        assert!(
            dbg.contains("4096 bytes"),
            "Debug should summarize the payload, got: {dbg}"
        );
        assert!(
            !dbg.contains("171"),
            "Debug must not dump raw byte values, got: {dbg}"
        );
    }

    // --- Event serialization shape ---

    #[test]
    fn events_serialize_with_snake_case_type_tag() {
        let event = Event::StateChanged {
            state: RunState::ItemsReady,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["state"], "items_ready");

        let event = Event::Progress(ProgressEvent {
            phase: Phase::Converting,
            current: 1,
            total: 3,
            item_label: "a.heic".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["phase"], "converting");
        assert_eq!(json["current"], 1);
        assert_eq!(json["total"], 3);
        assert_eq!(json["item_label"], "a.heic");
    }

    #[test]
    fn completed_event_round_trips_through_json() {
        let event = Event::Completed {
            file_name: "converted-20260806-120000.zip".into(),
            entry_count: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::Completed {
                file_name,
                entry_count,
            } => {
                assert_eq!(file_name, "converted-20260806-120000.zip");
                assert_eq!(entry_count, 2);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn run_id_display_matches_inner_value() {
        assert_eq!(RunId(7).to_string(), "7");
        assert_eq!(RunId(7).get(), 7);
    }
}
