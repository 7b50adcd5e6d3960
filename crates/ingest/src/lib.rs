//! Access-log ingest pipeline
//!
//! Turns one uploaded access log into one streaming insert. Body
//! chunks are reassembled into lines, each line runs through the
//! grammar, and the rows that survive are written to the store. The
//! insert commits only after the whole body has been read, so an
//! aborted upload leaves nothing behind. After the commit the row
//! count is polled until the new rows show up, since reads go through
//! a different path than the insert.

mod coordinator;
mod error;

pub use coordinator::{IngestCoordinator, IngestOptions, IngestReport};
pub use error::IngestError;
