use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// User document as stored in the `users` collection.
///
/// Carries the internal identifier and revision marker, so it is never
/// serialized into an HTTP response. Convert to [`User`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    /// Bumped on every successful patch, including one that changes no field.
    #[serde(rename = "__v", default)]
    pub revision: i32,
}

impl UserDocument {
    pub fn new(user: NewUser) -> Self {
        Self {
            id: ObjectId::new(),
            username: user.username,
            is_admin: user.is_admin,
            revision: 0,
        }
    }
}

/// User as returned by the API, without internal fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique username, also the resource key in URLs
    #[schema(example = "midshipman1")]
    pub username: String,
    /// Whether the user has admin rights
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            username: doc.username,
            is_admin: doc.is_admin,
        }
    }
}

/// Validated data for a user that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub is_admin: bool,
}

/// Request body for create and patch.
///
/// Only `username` and `isAdmin` are read; any other field is ignored.
/// Values stay loosely typed until validation casts them, and a field
/// sent as `null` is kept as `Some(Value::Null)` so patch can tell it
/// apart from an absent field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UserInput {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "midshipman1")]
    pub username: Option<Value>,

    #[serde(rename = "isAdmin", default, deserialize_with = "present")]
    #[schema(value_type = Option<bool>, example = false)]
    pub is_admin: Option<Value>,
}

impl UserInput {
    pub fn new(username: impl Into<Value>, is_admin: impl Into<Value>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: Some(is_admin.into()),
        }
    }

    pub fn with_username(username: impl Into<Value>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: None,
        }
    }

    pub fn with_is_admin(is_admin: impl Into<Value>) -> Self {
        Self {
            username: None,
            is_admin: Some(is_admin.into()),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
