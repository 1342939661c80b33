//! Length-delimited protobuf framing shared by apiary wire protocols.
//!
//! [`WireCodec`] bridges a generated protobuf struct and its domain-level
//! counterpart: messages are encoded by converting the domain type into the
//! wire struct, and decoded through a fallible conversion back, so malformed
//! payloads surface as the protocol's own error type instead of leaking
//! protobuf internals.

use std::marker::PhantomData;

use bytes::BytesMut;

/// Codec for one message shape of a protocol.
///
/// `Proto` is the generated protobuf struct, `Msg` the domain type carried
/// by the protocol, and `E` the protocol's codec error. A single maximum
/// message size bounds every frame.
pub struct WireCodec<Proto, Msg, E> {
    inner: quick_protobuf_codec::Codec<Proto>,
    _marker: PhantomData<(Msg, E)>,
}

impl<Proto, Msg, E> WireCodec<Proto, Msg, E> {
    /// Creates a codec refusing frames larger than `max_message_size`.
    pub fn new(max_message_size: usize) -> Self {
        Self {
            inner: quick_protobuf_codec::Codec::new(max_message_size),
            _marker: PhantomData,
        }
    }
}

impl<Proto, Msg, E> asynchronous_codec::Encoder for WireCodec<Proto, Msg, E>
where
    Proto: quick_protobuf::MessageWrite,
    Msg: Into<Proto>,
    quick_protobuf_codec::Error: Into<E>,
    E: From<std::io::Error>,
{
    type Item<'a> = Msg;
    type Error = E;

    fn encode(&mut self, item: Self::Item<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(item.into(), dst).map_err(Into::into)
    }
}

impl<Proto, Msg, PE, E> asynchronous_codec::Decoder for WireCodec<Proto, Msg, E>
where
    Proto: for<'a> quick_protobuf::MessageRead<'a>,
    Msg: TryFrom<Proto, Error = PE>,
    PE: Into<E>,
    quick_protobuf_codec::Error: Into<E>,
    E: From<std::io::Error>,
{
    type Item = Msg;
    type Error = E;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src).map_err(Into::into)? {
            Some(proto) => Msg::try_from(proto).map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }
}
