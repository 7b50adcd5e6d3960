//! Bridge from async channels to the blocking pipeline stages
//!
//! The HTTP side of both pipelines runs on the async runtime while parsing
//! and encoding run on blocking threads. `ChannelIter` adapts the receiving
//! half of a tokio mpsc channel into a plain iterator: byte chunks feeding a
//! [`ChunkReader`](crate::ChunkReader), or rows feeding a
//! [`Batcher`](crate::Batcher).

use tokio::sync::mpsc;

/// Iterator over items arriving on an mpsc channel.
///
/// Must be driven from a blocking thread (`spawn_blocking`): `next` parks
/// the thread until an item arrives or the sending side closes, at which
/// point the iterator ends.
pub struct ChannelIter<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> ChannelIter<T> {
    pub fn new(rx: mpsc::Receiver<T>) -> Self {
        Self { rx }
    }
}

impl<T> Iterator for ChannelIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.blocking_recv()
    }
}
