use std::collections::HashMap;

use bytes::Bytes;

/// Headers exchanged during stream setup.
///
/// An unordered map of string keys to opaque byte values, scoped to one
/// stream's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    inner: HashMap<String, Bytes>,
}

impl Headers {
    /// Look up a header value by key.
    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.inner.get(key)
    }

    /// Insert a header value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Whether no headers are set.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
