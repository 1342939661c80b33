//! Upload tag tracking traits

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Unknown tag: {0}")]
    Unknown(u64),
    #[error("Tag error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Progress counters for a single upload.
pub trait Tag: Send + Sync + 'static {
    /// Record that one chunk of the upload left the node.
    fn increment_sent(&self) -> Result<(), TagError>;
}

/// Registry of active upload tags.
#[auto_impl::auto_impl(&, Arc)]
pub trait Tags: Send + Sync + 'static {
    /// Look up a tag by its identifier.
    fn get(&self, tag: u64) -> Option<Arc<dyn Tag>>;
}
