use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt};

/// Result of a bounded line read.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadLineResult {
    Line(Vec<u8>),
    Truncated(Vec<u8>),
    Eof,
}

/// Read a line with a size limit, preventing unbounded memory growth.
///
/// Bytes past `max_len` are consumed and discarded. A final line without a
/// trailing newline is still returned before `Eof`.
pub async fn read_line_with_limit<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<ReadLineResult> {
    buf.clear();
    let mut truncated = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            if buf.is_empty() && !truncated {
                return Ok(ReadLineResult::Eof);
            }
            break;
        }

        let (chunk_len, found_newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };

        let room = max_len.saturating_sub(buf.len());
        let keep = chunk_len.min(room);
        if let Some(kept) = available.get(..keep) {
            buf.extend_from_slice(kept);
        }
        truncated |= keep < chunk_len;
        reader.consume(chunk_len);

        if found_newline {
            break;
        }
    }

    if truncated {
        Ok(ReadLineResult::Truncated(buf.clone()))
    } else {
        Ok(ReadLineResult::Line(buf.clone()))
    }
}

/// Decode a raw line, dropping the line terminator.
pub fn decode_line(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches(['\n', '\r']).to_owned()
}

/// Byte capture that keeps the first and last `half` bytes of a stream.
///
/// Used for one-shot commands whose output size is unknown up front: the
/// middle of a huge stream is counted but not stored.
#[derive(Debug)]
pub struct HeadTailCapture {
    half: usize,
    head: Vec<u8>,
    tail: VecDeque<u8>,
    omitted: usize,
}

impl HeadTailCapture {
    pub fn new(half: usize) -> Self {
        Self {
            half,
            head: Vec::new(),
            tail: VecDeque::new(),
            omitted: 0,
        }
    }

    pub fn push(&mut self, mut bytes: &[u8]) {
        let head_room = self.half.saturating_sub(self.head.len());
        if head_room > 0 {
            let take = head_room.min(bytes.len());
            let (front, rest) = bytes.split_at(take);
            self.head.extend_from_slice(front);
            bytes = rest;
        }

        self.tail.extend(bytes.iter().copied());
        let overflow = self.tail.len().saturating_sub(self.half);
        if overflow > 0 {
            self.tail.drain(..overflow);
            self.omitted += overflow;
        }
    }

    /// Number of bytes dropped from the middle of the stream.
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    pub fn into_string(self) -> String {
        let tail: Vec<u8> = self.tail.into_iter().collect();
        if self.omitted == 0 {
            let mut all = self.head;
            all.extend_from_slice(&tail);
            return String::from_utf8_lossy(&all).into_owned();
        }

        format!(
            "{}\n... ({} bytes omitted) ...\n{}",
            String::from_utf8_lossy(&self.head),
            self.omitted,
            String::from_utf8_lossy(&tail)
        )
    }
}

/// Drain `reader` to EOF into `capture`.
pub async fn drain_into<R: AsyncRead + Unpin>(
    mut reader: R,
    capture: &parking_lot::Mutex<HeadTailCapture>,
) -> io::Result<()> {
    let mut chunk = vec![0u8; 8_192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => return Ok(()),
            Ok(n) => {
                if let Some(read) = chunk.get(..n) {
                    capture.lock().push(read);
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
