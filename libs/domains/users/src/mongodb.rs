//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::doc,
    error::{Error as MongoDbError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, UserDocument};
use crate::repository::UserRepository;

pub const COLLECTION_NAME: &str = "users";

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(client.database("nrotc_api"));
    /// repo.init_indexes().await?;
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<UserDocument>(collection_name);
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<UserDocument> {
        &self.collection
    }

    /// Create the unique index on `username`.
    ///
    /// Uniqueness is enforced only by this index, so it must exist before
    /// the first write.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(username_index).await?;

        tracing::info!("User indexes initialized");
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoDbError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn classify_write_error(err: MongoDbError, username: &str) -> UserError {
    if is_duplicate_key(&err) {
        UserError::DuplicateUsername(username.to_string())
    } else {
        UserError::from(err)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<UserDocument>> {
        use futures::TryStreamExt;

        let cursor = self.collection.find(doc! {}).await?;
        let users: Vec<UserDocument> = cursor.try_collect().await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> UserResult<Option<UserDocument>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> UserResult<UserDocument> {
        let doc = UserDocument::new(user);

        self.collection
            .insert_one(&doc)
            .await
            .map_err(|e| classify_write_error(e, &doc.username))?;

        tracing::info!(user_id = %doc.id, "User created successfully");
        Ok(doc)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
    async fn replace(&self, user: &UserDocument) -> UserResult<UserDocument> {
        let result = self
            .collection
            .replace_one(doc! { "_id": user.id }, user)
            .await
            .map_err(|e| classify_write_error(e, &user.username))?;

        if result.matched_count == 0 {
            return Err(UserError::Database(format!(
                "No document found for _id {} in {}",
                user.id,
                self.collection.name()
            )));
        }

        tracing::info!("User replaced successfully");
        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn delete_by_username(&self, username: &str) -> UserResult<Option<UserDocument>> {
        let removed = self
            .collection
            .find_one_and_delete(doc! { "username": username })
            .await?;

        if let Some(ref user) = removed {
            tracing::info!(user_id = %user.id, "User deleted successfully");
        }
        Ok(removed)
    }
}
