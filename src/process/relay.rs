//! Output relay: drains a subprocess stream into the output buffers.
//!
//! Runs on its own thread so a silent or slow command never blocks redraw or
//! input polling. End-of-stream and read errors both end the relay; nothing
//! is retried.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::buffers::OutputBuffers;

/// Handle to the background thread feeding `OutputBuffers`.
#[derive(Debug)]
pub struct OutputRelay {
    handle: JoinHandle<usize>,
}

impl OutputRelay {
    /// Start relaying `source` into `buffers` on a dedicated thread.
    ///
    /// `on_finish` runs on the relay thread once the stream has ended and the
    /// buffers are marked finished.
    pub fn spawn<R, F>(source: R, buffers: Arc<OutputBuffers>, on_finish: F) -> io::Result<Self>
    where
        R: Read + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("output-relay".to_string())
            .spawn(move || {
                let count = relay_lines(source, &buffers);
                buffers.mark_finished();
                tracing::info!("Output relay finished after {} lines", count);
                on_finish();
                count
            })?;

        Ok(Self { handle })
    }

    /// True once the relay thread has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the relay to finish and return the number of lines relayed.
    pub fn join(self) -> usize {
        match self.handle.join() {
            Ok(count) => count,
            Err(_) => {
                tracing::error!("Output relay thread panicked");
                0
            }
        }
    }
}

/// Decode one raw line: lossy UTF-8, trailing whitespace (and the newline) removed.
pub fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim_end().to_string()
}

/// Read `source` line by line into `buffers` until end-of-stream or a read error.
///
/// Returns the number of lines relayed. A final line without a trailing
/// newline is still delivered.
pub fn relay_lines<R: Read>(source: R, buffers: &OutputBuffers) -> usize {
    let mut reader = BufReader::new(source);
    let mut raw = Vec::new();
    let mut count = 0;

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&raw);
                tracing::trace!("relay: {:?}", line);
                buffers.push_line(line);
                count += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // Same as end-of-stream: the command is considered finished
                tracing::warn!("Output relay read error, treating as end of output: {}", e);
                break;
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    /// Yields its data, then fails instead of reporting end-of-stream.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_decode_line_strips_trailing_whitespace() {
        assert_eq!(decode_line(b"hello  \r\n"), "hello");
        assert_eq!(decode_line(b"  indented\n"), "  indented");
        assert_eq!(decode_line(b"\n"), "");
    }

    #[test]
    fn test_decode_line_is_lossy() {
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
    }

    #[test]
    fn test_relay_lines_preserves_order() {
        let buffers = OutputBuffers::new(2).unwrap();
        let count = relay_lines(Cursor::new(b"one\ntwo\nthree\n".to_vec()), &buffers);

        assert_eq!(count, 3);
        assert_eq!(buffers.visible_lines(), vec!["two", "three"]);
        assert_eq!(buffers.spool_len(), 3);
    }

    #[test]
    fn test_relay_delivers_unterminated_last_line() {
        let buffers = OutputBuffers::new(10).unwrap();
        let count = relay_lines(Cursor::new(b"first\nno newline".to_vec()), &buffers);

        assert_eq!(count, 2);
        assert_eq!(buffers.visible_lines(), vec!["first", "no newline"]);
    }

    #[test]
    fn test_read_error_ends_relay_like_eof() {
        let buffers = OutputBuffers::new(10).unwrap();
        let reader = FailingReader {
            data: Cursor::new(b"before failure\n".to_vec()),
        };

        assert_eq!(relay_lines(reader, &buffers), 1);
        assert_eq!(buffers.visible_lines(), vec!["before failure"]);
    }

    #[test]
    fn test_spawned_relay_marks_finished_and_calls_back() {
        let buffers = Arc::new(OutputBuffers::new(10).unwrap());
        let called = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let called_clone = called.clone();
        let relay = OutputRelay::spawn(
            Cursor::new(b"a\nb\n".to_vec()),
            buffers.clone(),
            move || {
                called_clone.store(true, Ordering::SeqCst);
                let _ = tx.send(());
            },
        )
        .unwrap();

        rx.recv_timeout(Duration::from_secs(5))
            .expect("relay should finish");
        assert_eq!(relay.join(), 2);
        assert!(called.load(Ordering::SeqCst));
        assert!(buffers.is_finished());
        assert_eq!(buffers.spool_len(), 2);
    }
}
