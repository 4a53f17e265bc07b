//! Output buffers shared between the relay thread and the UI loop.
//!
//! - `DisplayRing`: bounded, drop-oldest view of the most recent lines
//! - `Spool`: every line ever produced, appended to an anonymous temp file
//!   and replayed once when the UI has closed
//!
//! The relay thread appends to both; the render path reads the ring and
//! shrinks it when the panel gets smaller. Both sides may evict, so the ring
//! lives behind a mutex.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Bounded FIFO of output lines. Oldest lines are evicted first.
#[derive(Debug, Clone)]
pub struct DisplayRing {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DisplayRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a line, evicting the oldest ones past capacity.
    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        self.trim();
    }

    /// Change the capacity, evicting the oldest lines if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    fn trim(&mut self) {
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    /// Remove and return every buffered line, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }
}

/// Append-only log of every output line, backed by an anonymous temp file.
///
/// The file is deleted by the OS once the spool is dropped.
#[derive(Debug)]
pub struct Spool {
    writer: BufWriter<File>,
    len: usize,
    /// First write failure; later appends are skipped so the log stays a prefix
    error: Option<io::Error>,
}

impl Spool {
    pub fn new() -> io::Result<Self> {
        let file = tempfile::tempfile()?;
        Ok(Self {
            writer: BufWriter::new(file),
            len: 0,
            error: None,
        })
    }

    pub fn append(&mut self, line: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self
            .writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"));
        match result {
            Ok(()) => self.len += 1,
            Err(e) => {
                tracing::warn!("Failed to append to output spool: {}", e);
                self.error = Some(e);
            }
        }
    }

    /// Number of lines stored so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Write every stored line, in order, to `sink`. Consumes the spool.
    ///
    /// Returns the number of lines written.
    pub fn replay(self, sink: &mut dyn Write) -> io::Result<usize> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut file = self.writer.into_inner().map_err(|e| e.into_error())?;
        file.seek(SeekFrom::Start(0))?;

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        let mut written = 0;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }
            sink.write_all(&line)?;
            written += 1;
        }
        sink.flush()?;
        Ok(written)
    }
}

/// Shared state between the output relay (single writer) and the UI loop.
#[derive(Debug)]
pub struct OutputBuffers {
    ring: Mutex<DisplayRing>,
    spool: Mutex<Option<Spool>>,
    spooled: AtomicUsize,
    finished: AtomicBool,
}

impl OutputBuffers {
    /// Create the buffers, opening the spool file.
    pub fn new(ring_capacity: usize) -> io::Result<Self> {
        Ok(Self {
            ring: Mutex::new(DisplayRing::new(ring_capacity)),
            spool: Mutex::new(Some(Spool::new()?)),
            spooled: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
        })
    }

    fn ring(&self) -> MutexGuard<'_, DisplayRing> {
        // A panicked holder can't leave the ring inconsistent; keep going
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn spool(&self) -> MutexGuard<'_, Option<Spool>> {
        self.spool.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append one line to both the display ring and the spool.
    pub fn push_line(&self, line: String) {
        if let Some(spool) = self.spool().as_mut() {
            spool.append(&line);
            self.spooled.store(spool.len(), Ordering::Release);
        }
        self.ring().push(line);
    }

    /// Resize the display ring to the number of visible rows.
    pub fn set_capacity(&self, capacity: usize) {
        self.ring().set_capacity(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.ring().capacity()
    }

    /// Snapshot of the lines currently on display, oldest first.
    pub fn visible_lines(&self) -> Vec<String> {
        self.ring().iter().cloned().collect()
    }

    /// Remove whatever is left in the display ring.
    pub fn take_remaining(&self) -> Vec<String> {
        self.ring().drain()
    }

    /// Number of lines persisted to the spool. Never decreases.
    pub fn spool_len(&self) -> usize {
        self.spooled.load(Ordering::Acquire)
    }

    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// True once the relay has seen end-of-stream.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Replay the full spool to `sink`, optionally preceded by a banner line.
    ///
    /// The spool is read once; later calls write only the banner and return 0.
    pub fn replay(&self, sink: &mut dyn Write, banner: Option<&str>) -> io::Result<usize> {
        if let Some(banner) = banner {
            writeln!(sink, "{}", banner)?;
        }
        match self.spool().take() {
            Some(spool) => spool.replay(sink),
            None => {
                tracing::warn!("Output spool already replayed");
                sink.flush()?;
                Ok(0)
            }
        }
    }
}
