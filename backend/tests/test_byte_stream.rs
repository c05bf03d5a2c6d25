//! Tests for the buffered byte stream
//!
//! Critical invariants tested:
//! - Reading through the buffer equals concatenated raw engine output
//! - Refills happen only on exhaustion and always rewrite the whole buffer
//! - Chunking of reads does not change the bytes produced
//! - A sink fault leaves the cursor at the rejected chunk

use merandom_core::{
    ByteSink, ByteStream, SliceSink, StreamError, TransferFault, WriterSink, Xorshift1024Star,
    DEFAULT_BUFFER_WORDS,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Raw engine output for `words` calls, native byte order
fn raw_engine_bytes(words: usize) -> Vec<u8> {
    let mut rng = Xorshift1024Star::new();
    (0..words).flat_map(|_| rng.next().to_ne_bytes()).collect()
}

/// Sink that accepts a fixed number of chunks and then faults
struct FailAfter {
    accepted: Vec<u8>,
    chunks_left: usize,
}

impl ByteSink for FailAfter {
    fn put(&mut self, chunk: &[u8]) -> Result<(), TransferFault> {
        if self.chunks_left == 0 {
            return Err(TransferFault::new("bad address"));
        }
        self.chunks_left -= 1;
        self.accepted.extend_from_slice(chunk);
        Ok(())
    }
}

// ============================================================================
// Buffer Exhaustion
// ============================================================================

#[test]
fn test_default_capacity_is_1024_bytes() {
    let stream = ByteStream::new(DEFAULT_BUFFER_WORDS).unwrap();
    assert_eq!(stream.capacity(), 1024);
}

#[test]
fn test_capacity_plus_one_triggers_two_refills() {
    let mut stream = ByteStream::new(DEFAULT_BUFFER_WORDS).unwrap();
    let capacity = stream.capacity();

    let bytes = stream.read(capacity + 1);

    assert_eq!(stream.refills(), 2, "initial fill plus one refill");
    assert_eq!(stream.cursor(), 1);
    assert_eq!(bytes.len(), capacity + 1);

    let raw = raw_engine_bytes(2 * DEFAULT_BUFFER_WORDS);
    assert_eq!(bytes, raw[..capacity + 1].to_vec());
}

#[test]
fn test_stream_equals_raw_engine_output() {
    let mut stream = ByteStream::new(3).unwrap();
    let bytes = stream.read(24 * 10);
    assert_eq!(bytes, raw_engine_bytes(30));
    assert_eq!(stream.refills(), 10);
}

#[test]
fn test_engine_advances_only_on_refill() {
    let mut stream = ByteStream::new(2).unwrap();
    let position_after_fill = stream.engine().position();

    stream.read(15);
    assert_eq!(stream.engine().position(), position_after_fill);

    stream.read(2);
    assert_eq!(stream.engine().position(), (position_after_fill + 2) % 16);
}

#[test]
fn test_single_word_buffer() {
    let mut stream = ByteStream::new(1).unwrap();
    let bytes = stream.read(8 * 5 + 3);
    assert_eq!(bytes, raw_engine_bytes(6)[..43].to_vec());
    assert_eq!(stream.refills(), 6);
}

#[test]
fn test_zero_words_rejected() {
    assert_eq!(ByteStream::new(0).unwrap_err(), StreamError::ZeroCapacity);
}

// ============================================================================
// Chunking Invariance
// ============================================================================

#[test]
fn test_chunked_reads_match_single_read() {
    let mut whole = ByteStream::new(DEFAULT_BUFFER_WORDS).unwrap();
    let mut parts = ByteStream::new(DEFAULT_BUFFER_WORDS).unwrap();

    let expected = whole.read(1000);

    let mut got = parts.read(300);
    got.extend(parts.read(400));
    got.extend(parts.read(300));

    assert_eq!(got, expected);
    assert_eq!(whole.cursor(), parts.cursor());
}

#[test]
fn test_byte_by_byte_matches_bulk() {
    let mut bulk = ByteStream::new(4).unwrap();
    let mut single = ByteStream::new(4).unwrap();

    let expected = bulk.read(100);
    let got: Vec<u8> = (0..100).flat_map(|_| single.read(1)).collect();
    assert_eq!(got, expected);
}

// ============================================================================
// Sinks
// ============================================================================

#[test]
fn test_read_into_returns_full_length() {
    let mut stream = ByteStream::new(4).unwrap();
    let mut out = Vec::new();
    assert_eq!(stream.read_into(77, &mut out), Ok(77));
    assert_eq!(out.len(), 77);
}

#[test]
fn test_slice_sink_receives_stream() {
    let mut stream = ByteStream::new(4).unwrap();
    let mut reference = ByteStream::new(4).unwrap();

    let mut buf = [0u8; 50];
    let mut sink = SliceSink::new(&mut buf);
    stream.read_into(50, &mut sink).unwrap();
    assert_eq!(sink.written(), 50);
    assert_eq!(buf.to_vec(), reference.read(50));
}

#[test]
fn test_writer_sink_receives_stream() {
    let mut stream = ByteStream::new(4).unwrap();
    let mut reference = ByteStream::new(4).unwrap();

    let mut sink = WriterSink::new(Vec::new());
    stream.read_into(70, &mut sink).unwrap();
    assert_eq!(sink.into_inner(), reference.read(70));
}

#[test]
fn test_fault_rereads_rejected_chunk() {
    let mut stream = ByteStream::new(4).unwrap();
    let mut reference = ByteStream::new(4).unwrap();
    let expected = reference.read(64);

    // 32-byte buffer: first chunk accepted, second (after refill) rejected
    let mut sink = FailAfter {
        accepted: Vec::new(),
        chunks_left: 1,
    };
    let result = stream.read_into(48, &mut sink);

    assert_eq!(result, Err(TransferFault::new("bad address")));
    assert_eq!(sink.accepted, expected[..32].to_vec());
    assert_eq!(stream.cursor(), 0, "cursor stays at the rejected chunk");
    assert_eq!(stream.refills(), 2);

    // The next read starts with the bytes that were rejected
    let resumed = stream.read(32);
    assert_eq!(resumed, expected[32..64].to_vec());
}

#[test]
fn test_fill_matches_read() {
    let mut a = ByteStream::new(DEFAULT_BUFFER_WORDS).unwrap();
    let mut b = ByteStream::new(DEFAULT_BUFFER_WORDS).unwrap();

    let mut out = vec![0u8; 3000];
    a.fill(&mut out);
    assert_eq!(out, b.read(3000));
}
