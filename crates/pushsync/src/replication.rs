//! Neighborhood replication after taking custody of a chunk.

use std::ops::ControlFlow;
use std::sync::Arc;

use apiary_api::{Pricer, ProtocolStream, Streamer};
use apiary_net_headers::make_pricing_headers;
use apiary_primitives::{Chunk, OverlayAddress};
use futures::AsyncWriteExt;
use metrics::Counter;
use tracing::trace;

use crate::codec::{Delivery, write_delivery};
use crate::negotiate::parse_quote;
use crate::{
    PROTOCOL_NAME, PROTOCOL_VERSION, PushSync, REPLICATION_PEERS, REPLICATION_TIMEOUT, STREAM_NAME,
};

// Neighborhood replication is not paid for.
const REPLICATION_PRICE: u64 = 0;

impl PushSync {
    /// Push the chunk to up to [`REPLICATION_PEERS`] neighborhood peers in
    /// parallel, skipping the upstream peer it arrived from.
    ///
    /// Replication is fire and forget: failures are counted and logged but
    /// never reach the caller, and no receipts are collected.
    pub(crate) fn replicate_to_neighbors(&self, chunk: &Chunk, upstream: &OverlayAddress) {
        let mut count = 0;
        self.topology.each_neighbor(&mut |peer, _po| {
            if peer == upstream {
                return ControlFlow::Continue(());
            }
            if count == REPLICATION_PEERS {
                return ControlFlow::Break(());
            }
            count += 1;

            let _ = tokio::spawn(replicate_to_peer(
                Arc::clone(&self.streamer),
                Arc::clone(&self.pricer),
                chunk.clone(),
                *peer,
                self.metrics.total_replicated.clone(),
                self.metrics.total_replication_errors.clone(),
            ));

            ControlFlow::Continue(())
        });
    }
}

async fn replicate_to_peer(
    streamer: Arc<dyn Streamer>,
    pricer: Arc<dyn Pricer>,
    chunk: Chunk,
    peer: OverlayAddress,
    replicated: Counter,
    errors: Counter,
) {
    match deliver_replica(streamer, pricer, &chunk, &peer).await {
        Ok(()) => replicated.increment(1),
        Err(err) => {
            trace!(%peer, chunk = %chunk.address(), %err, "replication failed");
            errors.increment(1);
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ReplicationError {
    #[error("New stream: {0}")]
    Stream(#[from] apiary_api::StreamError),
    #[error("Pricing headers: {0}")]
    PricingHeaders(#[from] apiary_net_headers::HeaderError),
    #[error("Peer quoted {0} for free replication")]
    PriceDisagreement(u64),
    #[error("Deliver replica: {0}")]
    Delivery(#[from] crate::codec::CodecError),
    #[error("Deliver replica timed out")]
    Timeout,
}

async fn deliver_replica(
    streamer: Arc<dyn Streamer>,
    pricer: Arc<dyn Pricer>,
    chunk: &Chunk,
    peer: &OverlayAddress,
) -> Result<(), ReplicationError> {
    let headers = make_pricing_headers(REPLICATION_PRICE, chunk.address());
    let mut stream = streamer
        .new_stream(peer, headers, PROTOCOL_NAME, PROTOCOL_VERSION, STREAM_NAME)
        .await?;

    let quote = parse_quote(stream.as_ref())?;
    if quote.price != REPLICATION_PRICE {
        pricer.notify_peer_price(peer, quote.price, quote.index);
        stream.reset();
        return Err(ReplicationError::PriceDisagreement(quote.price));
    }

    let delivery = Delivery::new(*chunk.address(), chunk.data().clone());
    match tokio::time::timeout(REPLICATION_TIMEOUT, write_delivery(&mut stream, delivery)).await {
        Ok(Ok(())) => {
            let _ = stream.close().await;
            Ok(())
        }
        Ok(Err(err)) => {
            stream.reset();
            Err(err.into())
        }
        Err(_) => {
            stream.reset();
            Err(ReplicationError::Timeout)
        }
    }
}
