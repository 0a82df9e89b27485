//! Bounded tail of recent log lines for the side panel.

use arrayvec::ArrayVec;

pub const LOG_TAIL_LINES: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct LogTail {
    lines: ArrayVec<String, LOG_TAIL_LINES>,
}

impl LogTail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text, one entry per non-empty line; the oldest entries fall off.
    pub fn push(&mut self, text: &str) {
        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            if self.lines.is_full() {
                self.lines.remove(0);
            }
            self.lines.push(line.to_string());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
