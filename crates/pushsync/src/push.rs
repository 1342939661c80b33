//! Forwarding loop pushing a chunk towards its storer.

use std::sync::Arc;

use apiary_api::{PeerSelection, ProtocolStream};
use apiary_net_headers::make_pricing_headers;
use apiary_primitives::Chunk;
use futures::AsyncWriteExt;
use tokio::time::timeout_at;
use tracing::{trace, warn};

use crate::codec::{CodecError, Delivery, Receipt, read_receipt, write_delivery};
use crate::error::PushError;
use crate::negotiate::parse_quote;
use crate::reservation::Reservation;
use crate::{
    MAX_PEER_ATTEMPTS, PROTOCOL_NAME, PROTOCOL_VERSION, PushSync, STREAM_NAME, TIME_TO_LIVE,
};

impl PushSync {
    /// Try up to [`MAX_PEER_ATTEMPTS`] peers, closest and cheapest first,
    /// until one returns a matching receipt.
    ///
    /// A peer that fails after its stream was opened is skipped for the
    /// remainder of the attempt. When all attempts are spent, or no further
    /// peer is eligible, the most recent failure is surfaced rather than a
    /// bare not-found.
    pub(crate) async fn push_to_closest(&self, chunk: &Chunk) -> Result<Receipt, PushError> {
        let address = *chunk.address();
        let mut skip = Vec::new();
        let mut last_err: Option<PushError> = None;

        for _ in 0..MAX_PEER_ATTEMPTS {
            let peer = match self.topology.cheapest_peer(&address, &skip)? {
                PeerSelection::Selected(peer) => peer,
                PeerSelection::WantSelf => return Err(PushError::WantSelf),
                PeerSelection::NotFound => {
                    return Err(last_err.unwrap_or(PushError::NoPeerFound));
                }
            };

            // The price we expect to pay this peer for its receipt.
            let mut receipt_price = self.pricer.peer_price(&peer, &address);

            let headers = make_pricing_headers(receipt_price, &address);
            let mut stream = match self
                .streamer
                .new_stream(&peer, headers, PROTOCOL_NAME, PROTOCOL_VERSION, STREAM_NAME)
                .await
            {
                Ok(stream) => stream,
                Err(err) => {
                    skip.push(peer);
                    last_err = Some(PushError::Stream { peer, source: err });
                    continue;
                }
            };

            let quote = match parse_quote(stream.as_ref()) {
                Ok(quote) => quote,
                Err(err) => {
                    stream.reset();
                    skip.push(peer);
                    last_err = Some(PushError::PricingHeaders { peer, source: err });
                    continue;
                }
            };

            if quote.price != receipt_price {
                self.pricer.notify_peer_price(&peer, quote.price, quote.index);

                // The quote is authoritative, but it may no longer make this
                // peer the cheapest choice. The peer is not skipped: at its
                // new price it stays eligible for later attempts.
                match self.topology.cheapest_peer(&address, &skip) {
                    Ok(PeerSelection::Selected(cheapest)) if cheapest != peer => {
                        trace!(%peer, chunk = %address, "cheapest peer changed after quote");
                        stream.reset();
                        continue;
                    }
                    _ => {}
                }

                receipt_price = quote.price;
            }

            // From here on any failure with this peer skips it.
            skip.push(peer);

            let reservation = match Reservation::reserve(
                Arc::clone(&self.accounting),
                peer,
                receipt_price,
            )
            .await
            {
                Ok(reservation) => reservation,
                Err(source) => {
                    stream.reset();
                    return Err(PushError::Reserve { peer, source });
                }
            };

            let deadline = tokio::time::Instant::now() + TIME_TO_LIVE;

            let delivery = Delivery::new(address, chunk.data().clone());
            match timeout_at(deadline, write_delivery(&mut stream, delivery)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    stream.reset();
                    last_err = Some(PushError::Delivery {
                        chunk: address,
                        peer,
                        source: err,
                    });
                    continue;
                }
                Err(_) => {
                    stream.reset();
                    last_err = Some(PushError::Delivery {
                        chunk: address,
                        peer,
                        source: CodecError::Io(std::io::ErrorKind::TimedOut.into()),
                    });
                    continue;
                }
            }

            self.metrics.total_sent.increment(1);

            if let Some(tag) = chunk.tag() {
                if let Some(t) = self.tags.get(tag) {
                    if let Err(source) = t.increment_sent() {
                        stream.reset();
                        return Err(PushError::Tag { tag, source });
                    }
                }
            }

            let receipt = match timeout_at(deadline, read_receipt(&mut stream)).await {
                Ok(Ok(receipt)) => receipt,
                Ok(Err(err)) => {
                    stream.reset();
                    last_err = Some(PushError::ReceiptRead { peer, source: err });
                    continue;
                }
                Err(_) => {
                    stream.reset();
                    last_err = Some(PushError::ReceiptRead {
                        peer,
                        source: CodecError::Io(std::io::ErrorKind::TimedOut.into()),
                    });
                    continue;
                }
            };

            if receipt.address != address {
                self.metrics.invalid_receipts.increment(1);
                spawn_close(stream);
                last_err = Some(PushError::InvalidReceipt {
                    chunk: address,
                    peer,
                });
                continue;
            }

            reservation.credit().await.map_err(PushError::Credit)?;

            spawn_close(stream);
            return Ok(receipt);
        }

        warn!(chunk = %address, attempts = MAX_PEER_ATTEMPTS, "push attempts exhausted");
        Err(last_err.unwrap_or(PushError::NoPeerFound))
    }
}

/// Close the stream gracefully without holding up the caller.
pub(crate) fn spawn_close(mut stream: Box<dyn ProtocolStream>) {
    let _ = tokio::spawn(async move {
        let _ = stream.close().await;
    });
}
