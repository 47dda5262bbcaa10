//! Mock user store.
//!
//! # Data Flow
//! ```text
//! query_users()
//!     → cache.rs   (all_user_ids, then user:<id> for each)   hit → return
//!     → database.rs (all rows)                                empty → seed mock rows
//!     → cache.rs   (write back ids + each user)
//! ```
//!
//! # Design Decisions
//! - A partially cached list counts as a miss
//! - Seeding is serialized so concurrent first requests create one set of rows

pub mod cache;
pub mod database;
pub mod model;

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

pub use cache::{MemoryCache, UserCache};
pub use database::{MemoryDatabase, UserDatabase};
pub use model::User;

/// Cache key of the id list.
pub const USER_IDS_KEY: &str = "all_user_ids";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

/// Read-through user store.
pub struct Store {
    cache: Arc<dyn UserCache>,
    database: Arc<dyn UserDatabase>,
    mock_user_count: usize,
    seed_lock: Mutex<()>,
}

impl Store {
    pub fn new(cache: Arc<dyn UserCache>, database: Arc<dyn UserDatabase>, mock_user_count: usize) -> Self {
        Self {
            cache,
            database,
            mock_user_count,
            seed_lock: Mutex::new(()),
        }
    }

    /// Store backed by in-process cache and database.
    pub fn in_memory(mock_user_count: usize) -> Self {
        Self::new(
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryDatabase::new()),
            mock_user_count,
        )
    }

    pub fn query_users(&self) -> StoreResult<Vec<User>> {
        if let Some(users) = self.cached_users()? {
            debug!(count = users.len(), "Users served from cache");
            return Ok(users);
        }

        let users = self.database_users()?;
        self.cache_users(&users)?;
        Ok(users)
    }

    fn cached_users(&self) -> StoreResult<Option<Vec<User>>> {
        let Some(raw_ids) = self.cache.get(USER_IDS_KEY)? else {
            return Ok(None);
        };
        let ids: Vec<String> = serde_json::from_str(&raw_ids)?;

        let mut users = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.cache.get(&user_key(id))? {
                Some(raw) => users.push(serde_json::from_str(&raw)?),
                None => {
                    warn!(user_id = %id, "User missing from cache; reloading from database");
                    return Ok(None);
                }
            }
        }

        if users.is_empty() {
            return Ok(None);
        }
        Ok(Some(users))
    }

    fn database_users(&self) -> StoreResult<Vec<User>> {
        let users = self.database.list_users()?;
        if !users.is_empty() {
            debug!(count = users.len(), "Users served from database");
            return Ok(users);
        }

        let _guard = self.seed_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let users = self.database.list_users()?;
        if !users.is_empty() {
            return Ok(users);
        }

        let users: Vec<User> = (1..=self.mock_user_count).map(User::mock).collect();
        for user in &users {
            self.database.insert_user(user)?;
        }
        info!(count = users.len(), "Seeded database with mock users");
        Ok(users)
    }

    fn cache_users(&self, users: &[User]) -> StoreResult<()> {
        for user in users {
            self.cache.set(&user_key(&user.id), serde_json::to_string(user)?)?;
        }
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        self.cache.set(USER_IDS_KEY, serde_json::to_string(&ids)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDatabase {
        inner: MemoryDatabase,
        reads: AtomicUsize,
    }

    impl UserDatabase for CountingDatabase {
        fn list_users(&self) -> StoreResult<Vec<User>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.list_users()
        }

        fn insert_user(&self, user: &User) -> StoreResult<()> {
            self.inner.insert_user(user)
        }
    }

    #[test]
    fn test_seeds_then_serves_from_cache() {
        let cache = MemoryCache::new();
        let database = Arc::new(CountingDatabase::default());
        let store = Store::new(Arc::new(cache.clone()), database.clone(), 10);

        let first = store.query_users().unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(database.inner.list_users().unwrap(), first);
        assert_eq!(cache.len(), 11);

        let reads = database.reads.load(Ordering::SeqCst);
        let second = store.query_users().unwrap();
        assert_eq!(second, first);
        assert_eq!(database.reads.load(Ordering::SeqCst), reads, "cache hit must not read the database");
    }

    #[test]
    fn test_partial_cache_falls_back_to_database() {
        let cache = MemoryCache::new();
        let store = Store::new(Arc::new(cache.clone()), Arc::new(MemoryDatabase::new()), 3);
        let users = store.query_users().unwrap();

        cache.remove(&user_key(&users[1].id));
        let again = store.query_users().unwrap();
        assert_eq!(again, users);
        assert_eq!(cache.len(), 4, "cache is repopulated");
    }

    #[test]
    fn test_existing_rows_are_not_reseeded() {
        let database = Arc::new(MemoryDatabase::new());
        let alice = User {
            id: "1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
        };
        database.insert_user(&alice).unwrap();

        let store = Store::new(Arc::new(MemoryCache::new()), database, 10);
        assert_eq!(store.query_users().unwrap(), vec![alice]);
    }

    #[test]
    fn test_corrupt_cache_entry_is_an_error() {
        let cache = MemoryCache::new();
        cache.set(USER_IDS_KEY, "not json".into()).unwrap();
        let store = Store::new(Arc::new(cache), Arc::new(MemoryDatabase::new()), 1);
        assert!(matches!(store.query_users(), Err(StoreError::Serialization(_))));
    }
}
