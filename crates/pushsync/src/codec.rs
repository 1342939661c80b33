//! Codec for push syncing protocol messages.

use apiary_api::ProtocolStream;
use apiary_net_codec::WireCodec;
use apiary_primitives::{ChunkAddress, InvalidAddressLength};
use asynchronous_codec::Framed;
use bytes::Bytes;
use futures::{SinkExt, TryStreamExt};

/// Maximum size of a push syncing message, chunk data plus framing overhead.
pub(crate) const MAX_MESSAGE_SIZE: usize = 5 * 1024 * 1024;

/// Codec for chunk delivery messages.
pub type DeliveryCodec = WireCodec<crate::proto::pushsync::Delivery, Delivery, CodecError>;

/// Codec for storage receipt messages.
pub type ReceiptCodec = WireCodec<crate::proto::pushsync::Receipt, Receipt, CodecError>;

/// Error type for push syncing codec operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid chunk address length: {0}")]
    InvalidAddressLength(#[from] InvalidAddressLength),
    #[error("Connection closed")]
    ConnectionClosed,
}

impl From<quick_protobuf_codec::Error> for CodecError {
    fn from(error: quick_protobuf_codec::Error) -> Self {
        CodecError::Protocol(error.to_string())
    }
}

/// Delivery of a chunk to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The address of the chunk.
    pub address: ChunkAddress,
    /// The chunk data.
    pub data: Bytes,
}

impl Delivery {
    /// Create a new delivery.
    pub fn new(address: ChunkAddress, data: Bytes) -> Self {
        Self { address, data }
    }
}

impl TryFrom<crate::proto::pushsync::Delivery> for Delivery {
    type Error = CodecError;

    fn try_from(value: crate::proto::pushsync::Delivery) -> Result<Self, Self::Error> {
        Ok(Self {
            address: ChunkAddress::from_slice(&value.Address)?,
            data: Bytes::from(value.Data),
        })
    }
}

impl From<Delivery> for crate::proto::pushsync::Delivery {
    fn from(value: Delivery) -> Self {
        crate::proto::pushsync::Delivery {
            Address: value.address.to_vec(),
            Data: value.data.to_vec(),
        }
    }
}

/// Receipt acknowledging chunk storage, signed by the storer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The address of the stored chunk.
    pub address: ChunkAddress,
    /// Signature over the chunk address by the storer node.
    pub signature: Bytes,
}

impl Receipt {
    /// Create a new receipt.
    pub fn new(address: ChunkAddress, signature: Bytes) -> Self {
        Self { address, signature }
    }
}

impl TryFrom<crate::proto::pushsync::Receipt> for Receipt {
    type Error = CodecError;

    fn try_from(value: crate::proto::pushsync::Receipt) -> Result<Self, Self::Error> {
        Ok(Self {
            address: ChunkAddress::from_slice(&value.Address)?,
            signature: Bytes::from(value.Signature),
        })
    }
}

impl From<Receipt> for crate::proto::pushsync::Receipt {
    fn from(value: Receipt) -> Self {
        crate::proto::pushsync::Receipt {
            Address: value.address.to_vec(),
            Signature: value.signature.to_vec(),
        }
    }
}

/// Send a delivery over the stream and flush it.
pub(crate) async fn write_delivery(
    stream: &mut Box<dyn ProtocolStream>,
    delivery: Delivery,
) -> Result<(), CodecError> {
    let mut framed = Framed::new(stream, DeliveryCodec::new(MAX_MESSAGE_SIZE));
    framed.send(delivery).await
}

/// Read a single delivery from the stream.
pub(crate) async fn read_delivery(
    stream: &mut Box<dyn ProtocolStream>,
) -> Result<Delivery, CodecError> {
    let mut framed = Framed::new(stream, DeliveryCodec::new(MAX_MESSAGE_SIZE));
    framed.try_next().await?.ok_or(CodecError::ConnectionClosed)
}

/// Send a receipt over the stream and flush it.
pub(crate) async fn write_receipt(
    stream: &mut Box<dyn ProtocolStream>,
    receipt: Receipt,
) -> Result<(), CodecError> {
    let mut framed = Framed::new(stream, ReceiptCodec::new(MAX_MESSAGE_SIZE));
    framed.send(receipt).await
}

/// Read a single receipt from the stream.
pub(crate) async fn read_receipt(
    stream: &mut Box<dyn ProtocolStream>,
) -> Result<Receipt, CodecError> {
    let mut framed = Framed::new(stream, ReceiptCodec::new(MAX_MESSAGE_SIZE));
    framed.try_next().await?.ok_or(CodecError::ConnectionClosed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_roundtrip() {
        let original = Delivery::new(ChunkAddress::new([0x42; 32]), Bytes::from(vec![1, 2, 3]));
        let proto: crate::proto::pushsync::Delivery = original.clone().into();
        let decoded = Delivery::try_from(proto).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn receipt_roundtrip() {
        let original = Receipt::new(ChunkAddress::new([0x42; 32]), Bytes::from(vec![9, 8, 7]));
        let proto: crate::proto::pushsync::Receipt = original.clone().into();
        let decoded = Receipt::try_from(proto).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn truncated_address_is_rejected() {
        let proto = crate::proto::pushsync::Delivery {
            Address: vec![0u8; 16],
            Data: vec![1],
        };
        assert!(Delivery::try_from(proto).is_err());
    }
}
