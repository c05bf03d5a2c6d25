//! Stream buffer manager
//!
//! Amortizes engine calls: a fixed scratch buffer is refilled in bulk and
//! drained to readers in chunks of any size.

mod buffer;
mod sink;

pub use buffer::{ByteStream, StreamError, DEFAULT_BUFFER_WORDS};
pub use sink::{ByteSink, SliceSink, TransferFault, WriterSink};
