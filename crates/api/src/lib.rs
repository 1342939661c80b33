//! Core traits and interfaces for apiary components
//!
//! This crate defines the contracts between the protocol implementations and
//! the surrounding node: stream management, topology queries, bandwidth
//! accounting, pricing, chunk storage and cryptographic services. It
//! specifies component interactions without fixing implementations.

pub use async_trait::async_trait;

pub use apiary_net_headers::Headers;

/// Stream management traits
pub mod stream;
pub use stream::*;

/// Topology and peer selection traits
pub mod topology;
pub use topology::*;

/// Bandwidth accounting traits
pub mod accounting;
pub use accounting::*;

/// Pricing traits
pub mod pricing;
pub use pricing::*;

/// Chunk storage traits
pub mod storage;
pub use storage::*;

/// Signing and chunk validation traits
pub mod crypto;
pub use crypto::*;

/// Upload tag tracking traits
pub mod tags;
pub use tags::*;
