//! In-memory collaborators and duplex streams for protocol tests.
//!
//! Everything here implements the traits from `apiary-api` against local
//! state: streams run over in-process duplex pipes, topology and pricing
//! are scripted, storage and accounting record what happened for the test
//! to assert on.

mod crypto;
mod headlers;
mod store;
mod stream;
mod tags;
mod topology;

pub use crypto::{ContentValidator, StaticValidator, TestSigner, content_chunk};
pub use headlers::{EmptyHeadler, QuoteHeadler};
pub use store::MemoryChunkStore;
pub use stream::{Endpoint, OpenRecord, RemoteFn, StreamProbe, TestStream, TestStreamer};
pub use tags::{CountingTag, CountingTags};
pub use topology::TestTopology;
