//! User record served by the API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// Synthesize the `index`-th mock user (1-based) with a fresh id.
    pub fn mock(index: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: format!("Mock User {}", index),
            email: format!("mock{}@example.com", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_user() {
        let a = User::mock(3);
        let b = User::mock(3);
        assert_eq!(a.name, "Mock User 3");
        assert_eq!(a.email, "mock3@example.com");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }
}
