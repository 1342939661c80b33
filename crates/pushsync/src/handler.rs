//! Inbound delivery handling.

use std::cmp::Ordering;
use std::sync::Arc;

use apiary_api::{HandlerError as ApiHandlerError, ModePut, ProtocolStream, StreamHandler, async_trait};
use apiary_net_headers::parse_price_header;
use apiary_primitives::{Chunk, OverlayAddress, distance_cmp};
use futures::AsyncWriteExt;
use tracing::{debug, error, warn};

use crate::codec::{Receipt, read_delivery, write_receipt};
use crate::error::{HandlerError, PushError};
use crate::{PushSync, TIME_TO_LIVE};

#[async_trait]
impl StreamHandler for PushSync {
    async fn handle(
        &self,
        peer: OverlayAddress,
        mut stream: Box<dyn ProtocolStream>,
    ) -> Result<(), ApiHandlerError> {
        let result = match tokio::time::timeout(
            TIME_TO_LIVE,
            self.handle_delivery(&peer, &mut stream),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(HandlerError::DeadlineExceeded),
        };

        match result {
            Ok(()) => {
                let _ = stream.close().await;
                Ok(())
            }
            Err(err) => {
                self.metrics.total_handler_errors.increment(1);
                stream.reset();
                debug!(%peer, %err, "inbound delivery failed");
                Err(Box::new(err))
            }
        }
    }
}

impl PushSync {
    /// Handle one chunk delivery from `peer`: forward it towards its
    /// storer, or take custody when this node is the closest, and answer
    /// with a receipt either way.
    async fn handle_delivery(
        &self,
        peer: &OverlayAddress,
        stream: &mut Box<dyn ProtocolStream>,
    ) -> Result<(), HandlerError> {
        let delivery = read_delivery(stream)
            .await
            .map_err(HandlerError::ReadDelivery)?;
        self.metrics.total_received.increment(1);

        let chunk = Chunk::new(delivery.address, delivery.data);
        let address = *chunk.address();

        if self.validator.valid_content_addressed(&chunk) {
            // Content addressed chunks may wrap a dispersed replica.
            let unwrap = Arc::clone(&self.unwrap);
            let unwrapped = chunk.clone();
            let _ = tokio::spawn(async move { unwrap(unwrapped) });
        } else if !self.validator.valid_single_owner(&chunk) {
            return Err(HandlerError::InvalidChunk(address));
        }

        // The price we charge the upstream peer, as quoted by our headler
        // during stream setup.
        let price = match parse_price_header(stream.headers()) {
            Ok(price) => price,
            Err(err) => {
                warn!(%peer, %err, "no price in response headers");
                self.pricer.price_for_peer(peer, &address)
            }
        };

        // If the upstream peer is closer to the chunk than this node, we
        // were picked for neighborhood replication rather than forwarding.
        if distance_cmp(&address, peer, &self.address) == Ordering::Less {
            if self.topology.is_within_depth(&address) {
                if let Err(err) = self.store.put(ModePut::Sync, &chunk).await {
                    error!(chunk = %address, %err, "chunk store failed");
                }

                return self
                    .accounting
                    .debit(peer, price)
                    .await
                    .map_err(HandlerError::Debit);
            }

            return Err(HandlerError::OutOfDepthReplication(address));
        }

        // A forwarded chunk passing through its neighborhood is stored on
        // the way, best effort.
        if self.topology.is_within_depth(&address) {
            if let Err(err) = self.store.put(ModePut::Sync, &chunk).await {
                warn!(chunk = %address, %err, "store of forwarded chunk failed");
            }
        }

        let receipt = match self.push_to_closest(&chunk).await {
            Ok(receipt) => receipt,
            Err(PushError::WantSelf) => {
                self.store
                    .put(ModePut::Sync, &chunk)
                    .await
                    .map_err(|source| HandlerError::Store {
                        chunk: address,
                        source,
                    })?;

                self.replicate_to_neighbors(&chunk, peer);

                let signature = self.signer.sign(address.as_bytes())?;
                Receipt::new(address, signature)
            }
            Err(err) => {
                return Err(HandlerError::Forward {
                    chunk: address,
                    source: Box::new(err),
                });
            }
        };

        write_receipt(stream, receipt)
            .await
            .map_err(HandlerError::SendReceipt)?;

        self.accounting
            .debit(peer, price)
            .await
            .map_err(HandlerError::Debit)
    }
}
