//! Console output buffer
//!
//! Fixed-capacity sink for everything the firmware prints. Writes past the
//! end are dropped, never reallocated.

use core::fmt;

/// Console line terminator
pub const LINE_END: &str = "\r\n";

/// Console output buffer
pub struct ConsoleBuffer<const N: usize> {
    buffer: [u8; N],
    len: usize,
    dropped: usize,
}

impl<const N: usize> ConsoleBuffer<N> {
    /// Create an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            len: 0,
            dropped: 0,
        }
    }

    /// Write data to buffer, returns the number of bytes kept
    pub fn write(&mut self, data: &[u8]) -> usize {
        let space = N - self.len;
        let to_write = data.len().min(space);
        self.buffer[self.len..self.len + to_write].copy_from_slice(&data[..to_write]);
        self.len += to_write;
        self.dropped += data.len() - to_write;
        to_write
    }

    /// Write with line terminator
    pub fn writeln(&mut self, data: &[u8]) -> usize {
        self.write(data) + self.write(LINE_END.as_bytes())
    }

    /// Get buffer contents
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Get buffer contents as text (console output is always ASCII)
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    /// Bytes lost to overflow since the last clear
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }

    /// Get used length
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for ConsoleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for ConsoleBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}
