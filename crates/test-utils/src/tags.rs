//! Counting upload tags.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use apiary_api::{Tag, TagError, Tags};
use parking_lot::Mutex;

/// Tag counting sent chunks, optionally failing every increment.
pub struct CountingTag {
    sent: AtomicU64,
    fail: bool,
}

impl CountingTag {
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

impl Tag for CountingTag {
    fn increment_sent(&self) -> Result<(), TagError> {
        if self.fail {
            return Err(TagError::Other("tag increment failed".into()));
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Tag registry backed by a map.
#[derive(Default)]
pub struct CountingTags {
    tags: Mutex<HashMap<u64, Arc<CountingTag>>>,
}

impl CountingTags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a counting tag under `id`.
    pub fn create(&self, id: u64) -> Arc<CountingTag> {
        let tag = Arc::new(CountingTag {
            sent: AtomicU64::new(0),
            fail: false,
        });
        self.tags.lock().insert(id, Arc::clone(&tag));
        tag
    }

    /// Register a tag under `id` whose increments always fail.
    pub fn create_failing(&self, id: u64) -> Arc<CountingTag> {
        let tag = Arc::new(CountingTag {
            sent: AtomicU64::new(0),
            fail: true,
        });
        self.tags.lock().insert(id, Arc::clone(&tag));
        tag
    }
}

impl Tags for CountingTags {
    fn get(&self, tag: u64) -> Option<Arc<dyn Tag>> {
        self.tags
            .lock()
            .get(&tag)
            .map(|tag| Arc::clone(tag) as Arc<dyn Tag>)
    }
}
