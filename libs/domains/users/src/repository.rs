use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, UserDocument};

/// Repository trait for User persistence.
///
/// Implementations own the username uniqueness constraint: `insert` and
/// `replace` return [`UserError::DuplicateUsername`] when it is violated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, in store order
    async fn find_all(&self) -> UserResult<Vec<UserDocument>>;

    /// Case-sensitive exact match on username
    async fn find_by_username(&self, username: &str) -> UserResult<Option<UserDocument>>;

    async fn insert(&self, user: NewUser) -> UserResult<UserDocument>;

    /// Overwrite the stored document with the same id. Last write wins.
    async fn replace(&self, user: &UserDocument) -> UserResult<UserDocument>;

    /// Find and remove in one step, returning the removed document
    async fn delete_by_username(&self, username: &str) -> UserResult<Option<UserDocument>>;
}

/// In-memory implementation of UserRepository (for testing/development)
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<UserDocument>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> UserResult<Vec<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.clone())
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, user: NewUser) -> UserResult<UserDocument> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::DuplicateUsername(user.username));
        }

        let doc = UserDocument::new(user);
        users.push(doc.clone());

        tracing::info!(user_id = %doc.id, username = %doc.username, "Created user");
        Ok(doc)
    }

    async fn replace(&self, user: &UserDocument) -> UserResult<UserDocument> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(UserError::DuplicateUsername(user.username.clone()));
        }

        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| {
                UserError::Database(format!("No document found for _id {} in users", user.id))
            })?;
        *slot = user.clone();

        tracing::info!(user_id = %user.id, "Replaced user");
        Ok(user.clone())
    }

    async fn delete_by_username(&self, username: &str) -> UserResult<Option<UserDocument>> {
        let mut users = self.users.write().await;

        match users.iter().position(|u| u.username == username) {
            Some(index) => {
                let removed = users.remove(index);
                tracing::info!(user_id = %removed.id, "Deleted user");
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();

        let created = repo.insert(new_user("testuser")).await.unwrap();
        assert_eq!(created.username, "testuser");
        assert_eq!(created.revision, 0);

        let fetched = repo.find_by_username("testuser").await.unwrap();
        assert_eq!(fetched, Some(created));

        // Case sensitive
        assert!(repo.find_by_username("TestUser").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_error() {
        let repo = InMemoryUserRepository::new();

        repo.insert(new_user("testuser")).await.unwrap();

        let result = repo.insert(new_user("testuser")).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(name)) if name == "testuser"));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_one() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert(new_user("racer")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_replace_keeps_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("alpha")).await.unwrap();
        let mut bravo = repo.insert(new_user("bravo")).await.unwrap();

        bravo.username = "alpha".to_string();
        let result = repo.replace(&bravo).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(_))));

        bravo.username = "charlie".to_string();
        bravo.is_admin = true;
        repo.replace(&bravo).await.unwrap();

        let stored = repo.find_by_username("charlie").await.unwrap().unwrap();
        assert!(stored.is_admin);
    }

    #[tokio::test]
    async fn test_replace_missing_document() {
        let repo = InMemoryUserRepository::new();
        let ghost = UserDocument::new(new_user("ghost"));

        let result = repo.replace(&ghost).await;
        assert!(matches!(result, Err(UserError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_removed() {
        let repo = InMemoryUserRepository::new();
        let created = repo.insert(new_user("testuser")).await.unwrap();

        let removed = repo.delete_by_username("testuser").await.unwrap();
        assert_eq!(removed, Some(created));
        assert!(repo.delete_by_username("testuser").await.unwrap().is_none());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
