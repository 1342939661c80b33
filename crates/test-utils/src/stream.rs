//! Duplex protocol streams and a scripted streamer.

use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use apiary_api::{Headler, ProtocolStream, StreamError, Streamer, async_trait};
use apiary_net_headers::Headers;
use apiary_primitives::OverlayAddress;
use futures::future::BoxFuture;
use futures::{AsyncRead, AsyncWrite};
use parking_lot::{Mutex, RwLock};
use tokio::io::DuplexStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

const PIPE_CAPACITY: usize = 64 * 1024;

/// One end of an in-process protocol stream.
///
/// Reads and writes go over a tokio duplex pipe. Resetting drops the pipe,
/// so the remote end observes an abrupt end of stream, and flips a flag the
/// matching [`StreamProbe`] can observe.
pub struct TestStream {
    io: Option<Compat<DuplexStream>>,
    headers: Headers,
    reset: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl TestStream {
    /// Create a connected pair of streams, both seeing `headers` as their
    /// negotiated response headers.
    pub fn pair(headers: Headers) -> ((Self, StreamProbe), (Self, StreamProbe)) {
        let (a, b) = tokio::io::duplex(PIPE_CAPACITY);
        let a = Self::new(a, headers.clone());
        let b = Self::new(b, headers);
        let probe_a = a.probe();
        let probe_b = b.probe();
        ((a, probe_a), (b, probe_b))
    }

    fn new(io: DuplexStream, headers: Headers) -> Self {
        Self {
            io: Some(io.compat()),
            headers,
            reset: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A probe observing how this stream ends.
    pub fn probe(&self) -> StreamProbe {
        StreamProbe {
            reset: Arc::clone(&self.reset),
            closed: Arc::clone(&self.closed),
        }
    }

    fn io_mut(&mut self) -> io::Result<&mut Compat<DuplexStream>> {
        self.io
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

impl AsyncRead for TestStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        match self.io_mut() {
            Ok(io) => Pin::new(io).poll_read(cx, buf),
            Err(err) => Poll::Ready(Err(err)),
        }
    }
}

impl AsyncWrite for TestStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.io_mut() {
            Ok(io) => Pin::new(io).poll_write(cx, buf),
            Err(err) => Poll::Ready(Err(err)),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.io_mut() {
            Ok(io) => Pin::new(io).poll_flush(cx),
            Err(err) => Poll::Ready(Err(err)),
        }
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let result = match self.io_mut() {
            Ok(io) => Pin::new(io).poll_close(cx),
            Err(err) => Poll::Ready(Err(err)),
        };
        if let Poll::Ready(Ok(())) = result {
            self.closed.store(true, Ordering::SeqCst);
        }
        result
    }
}

impl ProtocolStream for TestStream {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn reset(&mut self) {
        self.reset.store(true, Ordering::SeqCst);
        // Dropping the pipe makes the remote end observe an abrupt EOF.
        self.io = None;
    }
}

/// Observes whether a [`TestStream`] was reset or closed gracefully.
#[derive(Clone)]
pub struct StreamProbe {
    reset: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl StreamProbe {
    pub fn was_reset(&self) -> bool {
        self.reset.load(Ordering::SeqCst)
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// The remote side of a scripted stream, run as a spawned task.
pub type RemoteFn =
    Arc<dyn Fn(Box<dyn ProtocolStream>) -> BoxFuture<'static, ()> + Send + Sync>;

/// What a [`TestStreamer`] does when a stream to a given peer is opened.
#[derive(Clone)]
pub enum Endpoint {
    /// Accept the stream: answer headers through `headler` and hand the
    /// remote end to `remote`.
    Accept {
        headler: Arc<dyn Headler>,
        remote: RemoteFn,
    },
    /// Refuse the stream as if the peer were not connected.
    Refuse,
}

/// Record of one `new_stream` call.
#[derive(Clone)]
pub struct OpenRecord {
    pub peer: OverlayAddress,
    pub sent_headers: Headers,
    pub protocol: String,
    pub stream: String,
    /// Probe of the stream handed back to the caller.
    pub probe: StreamProbe,
}

/// Streamer backed by in-process duplex pipes and scripted endpoints.
pub struct TestStreamer {
    caller: OverlayAddress,
    endpoints: RwLock<HashMap<OverlayAddress, Endpoint>>,
    opens: Mutex<Vec<OpenRecord>>,
}

impl TestStreamer {
    /// Create a streamer whose streams originate from `caller`.
    pub fn new(caller: OverlayAddress) -> Arc<Self> {
        Arc::new(Self {
            caller,
            endpoints: RwLock::new(HashMap::new()),
            opens: Mutex::new(Vec::new()),
        })
    }

    /// Script the endpoint reached when opening a stream to `peer`.
    pub fn endpoint(&self, peer: OverlayAddress, endpoint: Endpoint) {
        self.endpoints.write().insert(peer, endpoint);
    }

    /// Script an accepting endpoint.
    pub fn accept(&self, peer: OverlayAddress, headler: Arc<dyn Headler>, remote: RemoteFn) {
        self.endpoint(peer, Endpoint::Accept { headler, remote });
    }

    /// Script a refusing endpoint.
    pub fn refuse(&self, peer: OverlayAddress) {
        self.endpoint(peer, Endpoint::Refuse);
    }

    /// All `new_stream` calls made so far, in order.
    pub fn opens(&self) -> Vec<OpenRecord> {
        self.opens.lock().clone()
    }
}

#[async_trait]
impl Streamer for TestStreamer {
    async fn new_stream(
        &self,
        peer: &OverlayAddress,
        headers: Headers,
        protocol: &str,
        _version: &str,
        stream: &str,
    ) -> Result<Box<dyn ProtocolStream>, StreamError> {
        let endpoint = self.endpoints.read().get(peer).cloned();
        let Some(Endpoint::Accept { headler, remote }) = endpoint else {
            return Err(StreamError::NotConnected(*peer));
        };

        let response = headler.headle(&headers, &self.caller);

        let (pipe_local, pipe_remote) = tokio::io::duplex(PIPE_CAPACITY);
        let local = TestStream::new(pipe_local, response.clone());
        let remote_stream = TestStream::new(pipe_remote, response);

        self.opens.lock().push(OpenRecord {
            peer: *peer,
            sent_headers: headers,
            protocol: protocol.to_string(),
            stream: stream.to_string(),
            probe: local.probe(),
        });

        let _ = tokio::spawn(remote(Box::new(remote_stream)));

        Ok(Box::new(local))
    }
}
