//! Cache tier of the user store.

use std::sync::Arc;

use dashmap::DashMap;

use crate::store::StoreResult;

/// Key/value cache holding serialized records.
pub trait UserCache: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: String) -> StoreResult<()>;
}

/// In-process cache.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl UserCache for MemoryCache {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }
}
