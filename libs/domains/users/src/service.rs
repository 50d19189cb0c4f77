//! User Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserInput};
use crate::repository::UserRepository;
use crate::validation;

/// User service providing the CRUD operations behind the HTTP handlers.
///
/// Every successful operation returns the stripped [`User`]. Uniqueness is
/// left to the repository, so create never checks for an existing username
/// before inserting.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        let users = self.repository.find_all().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> UserResult<User> {
        self.repository
            .find_by_username(username)
            .await?
            .map(User::from)
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }

    /// Validate and insert a new user.
    ///
    /// Fails with `Validation` for bad input and `DuplicateUsername` when
    /// the store rejects the username.
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: UserInput) -> UserResult<User> {
        tracing::debug!(?input, "Creating user");

        let new_user = validation::new_user(&input).map_err(UserError::Validation)?;
        let username = new_user.username.clone();

        match self.repository.insert(new_user).await {
            Ok(doc) => {
                tracing::info!(username = %doc.username, "Created user");
                Ok(User::from(doc))
            }
            Err(e) => {
                tracing::debug!(%username, error = %e, "Error while creating user");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> UserResult<User> {
        let removed = self
            .repository
            .delete_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        tracing::info!(username = %removed.username, "Deleted user");
        Ok(User::from(removed))
    }

    /// Merge `input` onto the stored user and persist it.
    ///
    /// Only a missing user is reported as `NotFound`. Any failure after the
    /// user is loaded, validation and duplicates included, comes back as
    /// `Internal` carrying the underlying message.
    #[instrument(skip(self, input))]
    pub async fn patch_user(&self, username: &str, input: UserInput) -> UserResult<User> {
        let existing = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        let mut merged = validation::merge(&existing, &input)
            .map_err(|e| UserError::Internal(UserError::Validation(e).to_string()))?;
        merged.revision = existing.revision + 1;

        let saved = self
            .repository
            .replace(&merged)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        tracing::info!(username = %saved.username, revision = saved.revision, "Patched user");
        Ok(User::from(saved))
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
