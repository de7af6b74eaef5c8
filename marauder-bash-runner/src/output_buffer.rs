use std::collections::VecDeque;

/// Hard ceiling on buffered lines per background process.
pub const OUTPUT_BUFFER_HARD_CAP: usize = 500;
/// Lines kept after the hard cap is exceeded.
pub const OUTPUT_BUFFER_RETAIN: usize = 300;
/// Longest single line stored; the rest of the line is discarded.
pub const MAX_LINE_BYTES: usize = 4_096;

/// Bounded, ordered line buffer shared by a process's stream readers.
///
/// Never holds more than `hard_cap` lines. Crossing the cap drops the oldest
/// lines so that exactly `retain` remain.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    lines: VecDeque<String>,
    hard_cap: usize,
    retain: usize,
    dropped: usize,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::with_limits(OUTPUT_BUFFER_HARD_CAP, OUTPUT_BUFFER_RETAIN)
    }
}

impl OutputBuffer {
    pub fn with_limits(hard_cap: usize, retain: usize) -> Self {
        let retain = retain.min(hard_cap);
        Self {
            lines: VecDeque::with_capacity(hard_cap.min(64)),
            hard_cap,
            retain,
            dropped: 0,
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        if self.lines.len() > self.hard_cap {
            let excess = self.lines.len() - self.retain;
            self.lines.drain(..excess);
            self.dropped += excess;
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total lines discarded over the buffer's lifetime.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The most recent `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(skip).cloned().collect()
    }
}
