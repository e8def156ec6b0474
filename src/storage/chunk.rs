//! Chunked CSV persistence for classified records
//!
//! Each output category owns one [`ChunkSink`]. Records accumulate in a
//! buffer and are written out as a numbered CSV file whenever the buffer
//! reaches the configured chunk size; whatever remains at shutdown is
//! flushed by [`ChunkSink::flush_remaining`]. The append and the
//! threshold check run inside one critical section, so concurrent
//! appenders can neither double-flush a chunk nor lose records to an
//! interleaved flush.

use csv::{QuoteStyle, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::models::ResourceRecord;

/// Buffered records plus the counter for the next chunk file
#[derive(Debug)]
struct ChunkState {
    records: Vec<ResourceRecord>,
    counter: u32,
}

/// Per-category sink writing fixed-size CSV chunks
pub struct ChunkSink {
    category: String,
    chunk_size: usize,
    output_dir: PathBuf,
    state: Mutex<ChunkState>,
}

impl ChunkSink {
    /// Create a sink for one output category.
    ///
    /// The output directory is created if missing. Chunk numbering starts
    /// at 1 and increases by exactly one per file written.
    pub fn new(category: &str, chunk_size: usize, output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)?;

        Ok(Self {
            category: category.to_string(),
            chunk_size,
            output_dir: output_dir.to_path_buf(),
            state: Mutex::new(ChunkState {
                records: Vec::new(),
                counter: 1,
            }),
        })
    }

    /// Append one record, writing a chunk file when the buffer reaches the
    /// configured size. Returns the path of the chunk written, if any.
    pub fn append(&self, record: ResourceRecord) -> Result<Option<PathBuf>> {
        let mut state = self.lock();
        state.records.push(record);

        if state.records.len() >= self.chunk_size {
            return self.write_chunk(&mut state).map(Some);
        }

        Ok(None)
    }

    /// Write out whatever remains in the buffer regardless of threshold.
    /// No-op on an empty buffer; the counter is untouched in that case.
    pub fn flush_remaining(&self) -> Result<Option<PathBuf>> {
        let mut state = self.lock();

        if state.records.is_empty() {
            return Ok(None);
        }

        self.write_chunk(&mut state).map(Some)
    }

    /// Number of chunk files written so far
    pub fn chunks_written(&self) -> u32 {
        self.lock().counter - 1
    }

    /// Number of records currently buffered
    pub fn buffered(&self) -> usize {
        self.lock().records.len()
    }

    /// Serialize the buffered records, clear the buffer, bump the counter.
    ///
    /// Field order is `url, depth, type` with a trailing `content` column
    /// only when at least one buffered record carries content. Every field
    /// is quoted.
    fn write_chunk(&self, state: &mut ChunkState) -> Result<PathBuf> {
        let path = self.output_dir.join(format!(
            "crawl_{}_chunk_{}.csv",
            self.category, state.counter
        ));

        let with_content = state.records.iter().any(|record| record.content.is_some());

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_path(&path)?;

        if with_content {
            writer.write_record(["url", "depth", "type", "content"])?;
        } else {
            writer.write_record(["url", "depth", "type"])?;
        }

        for record in &state.records {
            let depth = record.depth.to_string();
            if with_content {
                writer.write_record([
                    record.url.as_str(),
                    depth.as_str(),
                    record.kind.as_str(),
                    record.content.as_deref().unwrap_or_default(),
                ])?;
            } else {
                writer.write_record([record.url.as_str(), depth.as_str(), record.kind.as_str()])?;
            }
        }

        writer.flush()?;

        tracing::info!(
            path = %path.display(),
            category = %self.category,
            records = state.records.len(),
            "Wrote chunk file"
        );

        state.records.clear();
        state.counter += 1;

        Ok(path)
    }

    fn lock(&self) -> MutexGuard<'_, ChunkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
