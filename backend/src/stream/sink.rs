//! Byte sinks - destinations for produced bytes
//!
//! A sink stands in for the copy-to-caller primitive of a device driver.
//! The stream hands it one chunk at a time; a chunk is either accepted
//! whole or rejected with a `TransferFault`.

use std::io::Write;
use thiserror::Error;

/// Copying produced bytes to the caller failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Transfer to caller failed: {reason}")]
pub struct TransferFault {
    pub reason: String,
}

impl TransferFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Destination for bytes read from a stream
pub trait ByteSink {
    /// Accept one chunk. Must not partially consume the chunk on error.
    fn put(&mut self, chunk: &[u8]) -> Result<(), TransferFault>;
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, chunk: &[u8]) -> Result<(), TransferFault> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// Sink writing into a fixed caller-provided slice
///
/// Behaves like a user buffer of limited size: a chunk that does not fit
/// faults instead of being truncated.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, written: 0 }
    }

    /// Bytes accepted so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ByteSink for SliceSink<'_> {
    fn put(&mut self, chunk: &[u8]) -> Result<(), TransferFault> {
        let end = self
            .written
            .checked_add(chunk.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                TransferFault::new(format!(
                    "destination holds {} bytes, {} already written, chunk of {}",
                    self.buf.len(),
                    self.written,
                    chunk.len()
                ))
            })?;
        self.buf[self.written..end].copy_from_slice(chunk);
        self.written = end;
        Ok(())
    }
}

/// Sink forwarding chunks to any `io::Write`
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn put(&mut self, chunk: &[u8]) -> Result<(), TransferFault> {
        self.inner
            .write_all(chunk)
            .map_err(|e| TransferFault::new(e.to_string()))
    }
}
