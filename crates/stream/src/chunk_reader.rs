//! Pull-based byte stream over a chunk producer
//!
//! Some producers can only be driven in "give me the next chunk" mode (an
//! HTTP body arriving over a channel, or an encoder emitting one block per
//! batch) while their consumers expect "read up to N bytes". `ChunkReader`
//! sits between the two with a single lookahead buffer.

use std::io::{self, Read};

use bytes::{Buf, Bytes};

#[cfg(test)]
#[path = "chunk_reader_test.rs"]
mod chunk_reader_test;

/// Adapts a chunk-producing iterator to the buffered-reader contract.
///
/// `read` serves from the retained `leftover` first and pulls at most one
/// chunk from the source per empty-buffer call, so memory overhead is
/// bounded by one source chunk plus whatever the caller has not yet read
/// from it. Empty source chunks are skipped. Once the source is exhausted
/// `read` returns `Ok(0)`.
pub struct ChunkReader<I> {
    source: I,
    leftover: Bytes,
}

impl<I> ChunkReader<I>
where
    I: Iterator<Item = io::Result<Bytes>>,
{
    /// Create a reader over a chunk source.
    pub fn new(source: I) -> Self {
        Self {
            source,
            leftover: Bytes::new(),
        }
    }

    /// Bytes pulled from the source but not yet handed to the caller.
    pub fn leftover_len(&self) -> usize {
        self.leftover.len()
    }
}

impl<I> Read for ChunkReader<I>
where
    I: Iterator<Item = io::Result<Bytes>>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.leftover.is_empty() {
            match self.source.next() {
                Some(Ok(chunk)) => self.leftover = chunk,
                Some(Err(e)) => return Err(e),
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.leftover.len());
        buf[..n].copy_from_slice(&self.leftover[..n]);
        self.leftover.advance(n);
        Ok(n)
    }
}
