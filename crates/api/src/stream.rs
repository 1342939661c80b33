//! Stream management traits

use std::sync::Arc;

use apiary_net_headers::Headers;
use apiary_primitives::OverlayAddress;
use futures::{AsyncRead, AsyncWrite};

use crate::async_trait;

/// Error opening or using a protocol stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Peer not connected: {0}")]
    NotConnected(OverlayAddress),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Error returned by a stream handler to the protocol multiplexer.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A bidirectional stream negotiated for a single protocol exchange.
///
/// Headers exchanged during stream setup are available for the lifetime of
/// the stream. Dropping a stream without closing it signals abnormal
/// termination to the remote, `reset` does so explicitly.
pub trait ProtocolStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Response headers negotiated during stream setup.
    ///
    /// On an outbound stream these are the headers the remote answered
    /// with, on an inbound stream the ones the local headler produced.
    fn headers(&self) -> &Headers;

    /// Abort the stream, discarding buffered data on both sides.
    fn reset(&mut self);
}

/// Opens protocol streams to connected peers.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait Streamer: Send + Sync + 'static {
    /// Open a new stream to `peer`, sending `headers` during setup.
    async fn new_stream(
        &self,
        peer: &OverlayAddress,
        headers: Headers,
        protocol: &str,
        version: &str,
        stream: &str,
    ) -> Result<Box<dyn ProtocolStream>, StreamError>;
}

/// Handles inbound streams for one stream name of a protocol.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait StreamHandler: Send + Sync + 'static {
    /// Handle a fully negotiated inbound stream from `peer`.
    async fn handle(
        &self,
        peer: OverlayAddress,
        stream: Box<dyn ProtocolStream>,
    ) -> Result<(), HandlerError>;
}

/// Produces response headers during stream setup, before the handler runs.
#[auto_impl::auto_impl(&, Arc)]
pub trait Headler: Send + Sync + 'static {
    /// Compute the headers to send back for a stream opened by `peer`.
    fn headle(&self, received: &Headers, peer: &OverlayAddress) -> Headers;
}

/// Specification of a single named stream within a protocol.
pub struct StreamSpec {
    /// Stream name.
    pub name: &'static str,
    /// Handler invoked for each inbound stream.
    pub handler: Arc<dyn StreamHandler>,
    /// Optional header negotiation hook.
    pub headler: Option<Arc<dyn Headler>>,
}

/// Specification of a protocol and its streams, registered with the host.
pub struct ProtocolSpec {
    /// Protocol name.
    pub name: &'static str,
    /// Protocol semantic version.
    pub version: &'static str,
    /// Streams served under this protocol.
    pub streams: Vec<StreamSpec>,
}
