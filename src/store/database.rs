//! Database tier of the user store.

use std::sync::{PoisonError, RwLock};

use crate::store::model::User;
use crate::store::StoreResult;

pub trait UserDatabase: Send + Sync {
    fn list_users(&self) -> StoreResult<Vec<User>>;
    fn insert_user(&self, user: &User) -> StoreResult<()>;
}

/// In-process table, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    users: RwLock<Vec<User>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDatabase for MemoryDatabase {
    fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(user.clone());
        Ok(())
    }
}
