//! Push syncing metrics.

use metrics::Counter;

/// Counters for the push syncing protocol.
#[derive(Clone, Debug)]
pub(crate) struct PushSyncMetrics {
    /// Number of chunks sent towards their storer.
    pub(crate) total_sent: Counter,
    /// Number of chunks received from upstream peers.
    pub(crate) total_received: Counter,
    /// Number of inbound deliveries that failed.
    pub(crate) total_handler_errors: Counter,
    /// Number of chunks replicated into the neighborhood.
    pub(crate) total_replicated: Counter,
    /// Number of neighborhood replication attempts that failed.
    pub(crate) total_replication_errors: Counter,
    /// Number of invalid receipts received.
    pub(crate) invalid_receipts: Counter,
}

impl Default for PushSyncMetrics {
    fn default() -> Self {
        Self {
            total_sent: metrics::counter!("pushsync.sent_total"),
            total_received: metrics::counter!("pushsync.received_total"),
            total_handler_errors: metrics::counter!("pushsync.handler_errors_total"),
            total_replicated: metrics::counter!("pushsync.replicated_total"),
            total_replication_errors: metrics::counter!("pushsync.replication_errors_total"),
            invalid_receipts: metrics::counter!("pushsync.invalid_receipts_total"),
        }
    }
}
