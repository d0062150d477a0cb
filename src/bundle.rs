//! Archive generation for converted items
//!
//! Thin wrapper over the `zip` writer producing the bundle entirely in
//! memory. Entry order is insertion order, which the bundling worker keeps
//! identical to conversion order — the archive layout is deterministic for a
//! given run.

use crate::config::{ArchiveConfig, CompressionKind};
use crate::error::BundlingError;
use std::io::{Cursor, Write};
use zip::write::FileOptions;

/// In-memory archive builder
///
/// Matches the two-call external contract the bundling worker drives:
/// [`add_entry`](ArchiveBuilder::add_entry) per converted item, then one
/// [`finalize`](ArchiveBuilder::finalize).
pub struct ArchiveBuilder {
    writer: zip::ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    entry_count: usize,
}

impl ArchiveBuilder {
    /// Create an empty builder with the configured compression
    pub fn new(config: &ArchiveConfig) -> Self {
        let method = match config.compression {
            CompressionKind::Deflated => zip::CompressionMethod::Deflated,
            CompressionKind::Stored => zip::CompressionMethod::Stored,
        };
        Self {
            writer: zip::ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(method),
            entry_count: 0,
        }
    }

    /// Append one entry to the archive
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), BundlingError> {
        self.writer
            .start_file(name, self.options)
            .map_err(|e| BundlingError::EntryFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        self.writer
            .write_all(bytes)
            .map_err(|e| BundlingError::EntryFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        self.entry_count += 1;
        Ok(())
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Finish the archive, yielding its bytes and the entry count
    pub fn finalize(mut self) -> Result<(Vec<u8>, usize), BundlingError> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| BundlingError::FinalizeFailed(e.to_string()))?;
        Ok((cursor.into_inner(), self.entry_count))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_back(bytes: Vec<u8>) -> zip::ZipArchive<Cursor<Vec<u8>>> {
        zip::ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn entries_come_back_in_insertion_order() {
        let mut builder = ArchiveBuilder::new(&ArchiveConfig::default());
        builder.add_entry("a.jpg", b"alpha").unwrap();
        builder.add_entry("b.jpg", b"bravo").unwrap();
        builder.add_entry("c.jpg", b"charlie").unwrap();
        let (bytes, count) = builder.finalize().unwrap();
        assert_eq!(count, 3);

        let mut archive = read_back(bytes);
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn entry_contents_round_trip() {
        let mut builder = ArchiveBuilder::new(&ArchiveConfig::default());
        builder.add_entry("photo.jpg", b"jpeg payload").unwrap();
        let (bytes, _) = builder.finalize().unwrap();

        let mut archive = read_back(bytes);
        let mut entry = archive.by_name("photo.jpg").unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"jpeg payload");
    }

    #[test]
    fn stored_compression_keeps_entries_uncompressed() {
        let config = ArchiveConfig {
            compression: CompressionKind::Stored,
            ..ArchiveConfig::default()
        };
        let mut builder = ArchiveBuilder::new(&config);
        builder.add_entry("raw.jpg", &[7u8; 256]).unwrap();
        let (bytes, _) = builder.finalize().unwrap();

        let mut archive = read_back(bytes);
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
        assert_eq!(entry.size(), 256);
    }

    #[test]
    fn empty_archive_finalizes_with_zero_entries() {
        let builder = ArchiveBuilder::new(&ArchiveConfig::default());
        let (bytes, count) = builder.finalize().unwrap();
        assert_eq!(count, 0);
        let archive = read_back(bytes);
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn entry_count_tracks_additions() {
        let mut builder = ArchiveBuilder::new(&ArchiveConfig::default());
        assert_eq!(builder.entry_count(), 0);
        builder.add_entry("one.jpg", b"1").unwrap();
        assert_eq!(builder.entry_count(), 1);
        builder.add_entry("two.jpg", b"2").unwrap();
        assert_eq!(builder.entry_count(), 2);
    }
}
