/// Bounded output collection
/// Each child stream is drained on its own thread so a chatty process can
/// never block on a full pipe; bytes past the cap are read and dropped.
use std::io::{BufReader, Read};
use std::thread::{self, JoinHandle};

/// Appended to a stream that hit the capture cap
pub const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Bytes captured from one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCapture {
    pub bytes: Vec<u8>,
    /// True when the stream produced more than the cap
    pub truncated: bool,
    /// Total bytes the stream produced, including dropped ones
    pub total_bytes: usize,
}

impl StreamCapture {
    /// Lossy UTF-8 text, with the truncation marker when bytes were dropped
    pub fn into_text(self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }
}

/// Handle to a stream being drained in the background
pub struct OutputCollector {
    handle: Option<JoinHandle<StreamCapture>>,
}

impl OutputCollector {
    /// Start draining `stream`, keeping at most `limit` bytes
    pub fn spawn<R: Read + Send + 'static>(stream: Option<R>, limit: usize) -> Self {
        let handle = stream.map(|stream| thread::spawn(move || collect_stream(stream, limit)));
        Self { handle }
    }

    /// Wait for EOF and return what was captured
    pub fn finish(self) -> StreamCapture {
        match self.handle {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                log::warn!("output collector thread panicked");
                StreamCapture::default()
            }),
            None => StreamCapture::default(),
        }
    }
}

/// Collect from a single stream with limit
fn collect_stream<R: Read>(stream: R, limit: usize) -> StreamCapture {
    let mut reader = BufReader::new(stream);
    let mut capture = StreamCapture::default();
    let mut chunk = [0u8; 4096];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                capture.total_bytes += n;
                let room = limit.saturating_sub(capture.bytes.len());
                if n > room {
                    capture.bytes.extend_from_slice(&chunk[..room]);
                    capture.truncated = true;
                } else {
                    capture.bytes.extend_from_slice(&chunk[..n]);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("output stream closed with error: {}", e);
                break;
            }
        }
    }

    capture
}
