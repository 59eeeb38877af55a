use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::RECORD_DELIMITER;

/// Reassembles newline-delimited records from a byte stream that arrives in
/// arbitrarily sized chunks.
///
/// Chunk boundaries are independent of record boundaries: a record may span
/// several chunks and a single chunk may carry several records. The buffer
/// holds exactly the bytes received so far that have not yet been emitted as
/// part of a complete record.
///
/// The buffer works on raw bytes rather than `String` because a chunk
/// boundary can fall inside a multi-byte UTF-8 sequence; records are only
/// interpreted as text once a full line has been reassembled.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    buf: BytesMut,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one arrival chunk. Accepts any length, including zero; an
    /// empty chunk leaves the buffer untouched.
    pub fn append(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Splits off the next complete record, consuming its delimiter.
    ///
    /// Returns `None` when no delimiter remains; leftover bytes stay buffered
    /// for the next [`append`](Self::append). Calling this repeatedly drains
    /// all complete records in arrival order.
    pub fn next_record(&mut self) -> Option<Bytes> {
        let pos = self
            .buf
            .iter()
            .position(|&byte| byte == RECORD_DELIMITER)?;
        let record = self.buf.split_to(pos).freeze();
        let _ = self.buf.split_to(1); // discard the delimiter
        Some(record)
    }

    /// Restores a drained record to the front of the buffer, delimiter
    /// included, so it is re-emitted once more bytes arrive.
    pub fn push_back(&mut self, record: Bytes) {
        let mut restored = BytesMut::with_capacity(record.len() + 1 + self.buf.len());
        restored.extend_from_slice(&record);
        restored.put_u8(RECORD_DELIMITER);
        restored.extend_from_slice(&self.buf);
        self.buf = restored;
    }

    /// Takes whatever remains with no trailing delimiter. Called once the
    /// source stream signals end-of-data; an empty result is the normal
    /// termination case.
    pub fn remainder(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
