use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::record::DiscoveryRecord;

/// Append-only destination for discovery records.
///
/// Implementations must accept writes from concurrent collectors. A write
/// error is fatal for the run.
pub trait RecordSink: Send + Sync {
    fn write(&self, record: &DiscoveryRecord) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Number of records accepted so far.
    fn count(&self) -> usize;
}

/// Newline-delimited JSON, one compact object per record.
pub struct NdjsonSink<W: Write + Send> {
    writer: Mutex<BufWriter<W>>,
    written: AtomicUsize,
}

impl NdjsonSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create record stream {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> NdjsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(BufWriter::new(writer)), written: AtomicUsize::new(0) }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write + Send> RecordSink for NdjsonSink<W> {
    fn write(&self, record: &DiscoveryRecord) -> Result<()> {
        // Serialize outside the lock; the line itself is written in one go.
        let mut line = serde_json::to_vec(record).context("Failed to serialize record")?;
        line.push(b'\n');
        self.writer.lock().write_all(&line).context("Failed to write record")?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush().context("Failed to flush record stream")
    }

    fn count(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }
}

/// Keeps records in memory. Useful when embedding the pipeline.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiscoveryRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiscoveryRecord> {
        self.records.lock().clone()
    }
}

impl RecordSink for MemorySink {
    fn write(&self, record: &DiscoveryRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn count(&self) -> usize {
        self.records.lock().len()
    }
}
