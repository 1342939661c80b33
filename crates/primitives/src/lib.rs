//! Core primitive types for the apiary storage network
//!
//! This crate defines the basic types used throughout the apiary project:
//! the two 32-byte address spaces (chunk addresses and node overlay
//! addresses), the XOR distance metric that orders both, and the [`Chunk`]
//! unit of stored data.

#![warn(missing_docs)]

/// Address types and the XOR distance metric
pub mod address;
pub use address::*;

/// The chunk unit of stored data
pub mod chunk;
pub use chunk::*;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Maximum payload size of a chunk in bytes.
pub const MAX_CHUNK_SIZE: usize = 4096;
