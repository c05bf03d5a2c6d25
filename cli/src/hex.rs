//! Hex output for the `--format hex` mode

use merandom_core::{ByteSink, TransferFault};
use std::fmt::Write as _;
use std::io::{self, Write};

/// Lowercase hex, 32 bytes per line
pub struct HexSink<W: Write> {
    inner: W,
    column: usize,
}

impl<W: Write> HexSink<W> {
    const BYTES_PER_LINE: usize = 32;

    pub fn new(inner: W) -> Self {
        Self { inner, column: 0 }
    }

    /// Terminate a partial last line and flush
    pub fn finish(mut self) -> io::Result<W> {
        if self.column != 0 {
            writeln!(self.inner)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> ByteSink for HexSink<W> {
    fn put(&mut self, chunk: &[u8]) -> Result<(), TransferFault> {
        let mut text = String::with_capacity(chunk.len() * 3);
        for byte in chunk {
            // Writing to a String cannot fail
            let _ = write!(text, "{:02x}", byte);
            self.column += 1;
            if self.column == Self::BYTES_PER_LINE {
                text.push('\n');
                self.column = 0;
            }
        }
        self.inner
            .write_all(text.as_bytes())
            .map_err(|e| TransferFault::new(e.to_string()))
    }
}
