//! Persistence for todo records.
//!
//! `TodoStore` is the narrow capability handlers depend on; `MongoTodoStore`
//! is the concrete implementation over a document collection.

use std::fmt;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Store-assigned identifier. Parses from the 24-character hex form used in
/// URLs and JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId(ObjectId);

#[derive(Debug, Error)]
#[error("not a valid todo id")]
pub struct InvalidTodoId;

impl TodoId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidTodoId> {
        ObjectId::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| InvalidTodoId)
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// The two fields a client may change after creation.
#[derive(Debug, Clone)]
pub struct TodoUpdate {
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        Self(err.to_string())
    }
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persists a new record with a fresh id, `completed = false` and the
    /// current time as `created_at`. Returns the assigned id.
    async fn create(&self, title: String) -> Result<TodoId, StoreError>;

    /// All records, in store-native order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    /// Sets `title` and `completed` on the matching record. Returns whether
    /// a record matched.
    async fn update_by_id(&self, id: TodoId, update: TodoUpdate) -> Result<bool, StoreError>;

    /// Removes the matching record. Returns whether a record matched.
    async fn delete_by_id(&self, id: TodoId) -> Result<bool, StoreError>;
}

/// Wire shape of a persisted todo.
#[derive(Debug, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    completed: bool,
    created_at: bson::DateTime,
}

impl From<TodoDocument> for Todo {
    fn from(document: TodoDocument) -> Self {
        Self {
            id: document.id.to_hex(),
            title: document.title,
            completed: document.completed,
            created_at: document.created_at.to_chrono(),
        }
    }
}

fn update_document(update: TodoUpdate) -> Document {
    doc! {
        "$set": {
            "title": update.title,
            "completed": update.completed,
        }
    }
}

pub struct MongoTodoStore {
    collection: Collection<TodoDocument>,
}

impl MongoTodoStore {
    /// Connects and pings the server, so an unreachable backend surfaces as
    /// a startup error rather than on the first request.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.database_uri)
            .await
            .map_err(|err| {
                StoreError::new(format!(
                    "failed to connect to {}: {err}",
                    config.database_uri
                ))
            })?;

        let database = client.database(&config.database_name);
        database
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|err| {
                StoreError::new(format!("failed to reach {}: {err}", config.database_uri))
            })?;

        Ok(Self {
            collection: database.collection(&config.collection_name),
        })
    }
}

#[async_trait]
impl TodoStore for MongoTodoStore {
    async fn create(&self, title: String) -> Result<TodoId, StoreError> {
        let document = TodoDocument {
            id: ObjectId::new(),
            title,
            completed: false,
            created_at: bson::DateTime::now(),
        };

        self.collection.insert_one(&document).await?;
        Ok(TodoId(document.id))
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut cursor = self.collection.find(doc! {}).await?;

        let mut todos = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            todos.push(Todo::from(document));
        }
        Ok(todos)
    }

    async fn update_by_id(&self, id: TodoId, update: TodoUpdate) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(doc! {"_id": id.0}, update_document(update))
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_by_id(&self, id: TodoId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! {"_id": id.0}).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_id_parses_hex_and_trims() {
        let id = TodoId::parse("  5f8f8c44b54764421b7156c3 ").expect("valid id");
        assert_eq!(id.to_hex(), "5f8f8c44b54764421b7156c3");
    }

    #[test]
    fn todo_id_rejects_garbage() {
        assert!(TodoId::parse("not-an-id").is_err());
        assert!(TodoId::parse("").is_err());
        assert!(TodoId::parse("5f8f8c44b54764421b7156").is_err());
    }

    #[test]
    fn fresh_todo_ids_are_unique() {
        assert_ne!(TodoId::new(), TodoId::new());
    }

    #[test]
    fn document_maps_to_domain_todo() {
        let oid = ObjectId::parse_str("5f8f8c44b54764421b7156c3").expect("valid oid");
        let todo = Todo::from(TodoDocument {
            id: oid,
            title: "buy milk".to_string(),
            completed: true,
            created_at: bson::DateTime::from_millis(1_600_000_000_000),
        });

        assert_eq!(todo.id, "5f8f8c44b54764421b7156c3");
        assert_eq!(todo.title, "buy milk");
        assert!(todo.completed);
        assert_eq!(todo.created_at.timestamp_millis(), 1_600_000_000_000);
    }

    #[test]
    fn update_document_sets_only_mutable_fields() {
        let document = update_document(TodoUpdate {
            title: "buy milk".to_string(),
            completed: true,
        });

        let set = document.get_document("$set").expect("$set document");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("title").expect("title"), "buy milk");
        assert!(set.get_bool("completed").expect("completed"));
    }

    #[test]
    fn todo_serializes_created_at_as_iso8601() {
        let todo = Todo {
            id: "5f8f8c44b54764421b7156c3".to_string(),
            title: "buy milk".to_string(),
            completed: false,
            created_at: bson::DateTime::from_millis(1_600_000_000_000).to_chrono(),
        };

        let json = serde_json::to_value(&todo).expect("serializable");
        assert_eq!(json["id"], "5f8f8c44b54764421b7156c3");
        assert_eq!(json["created_at"], "2020-09-13T12:26:40Z");
    }
}
