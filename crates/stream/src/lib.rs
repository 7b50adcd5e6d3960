//! Streaming plumbing shared by the ingest and export pipelines
//!
//! Two small building blocks, used on both sides:
//!
//! - [`ChunkReader`] adapts a producer of discrete byte chunks (an HTTP body,
//!   the output of a batch encoder) into a `std::io::Read`, holding at most
//!   one partially consumed chunk of lookahead.
//! - [`Batcher`] groups a row iterator into fixed-size batches without
//!   buffering more than the batch currently being filled.
//!
//! [`ChannelIter`] bridges a tokio mpsc receiver into the blocking pipeline
//! stages that drive these two.

mod batcher;
mod channel;
mod chunk_reader;

pub use batcher::{BatchSizeError, Batcher, batched};
pub use channel::ChannelIter;
pub use chunk_reader::ChunkReader;

/// Chunk size for bounded reads and response chunks, in bytes.
///
/// Both pipelines move data in steps of at most this size so a single read
/// or send never stalls a worker for long.
pub const CHUNK_SIZE: usize = 5120;
