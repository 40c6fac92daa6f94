//! Document store accessor
//!
//! Resolves a [`Collection`] to read/write operations against the backing
//! database. Every call is a direct round trip; nothing is cached or buffered.
//! The PostgreSQL implementations are used in production, the in-memory ones
//! back the HTTP tests.

mod collection;
mod document;
#[cfg(test)]
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;

pub use collection::Collection;
pub use document::{Fields, StoredDocument, UserRecord};
#[cfg(test)]
pub use memory::{InMemoryDocumentStore, InMemoryUserStore};
pub use postgres::{PgDocumentStore, PgUserStore};

/// Last check on a document about to land in a collection; an error aborts the write
pub type DocumentCheck = dyn Fn(&mut Fields) -> Result<()> + Send + Sync;

/// Collection-scoped document operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection in store-native order
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>>;

    async fn find_by_id(&self, collection: Collection, id: Uuid)
        -> Result<Option<StoredDocument>>;

    /// Insert one document and return the server-assigned id
    async fn insert_one(&self, collection: Collection, fields: Fields) -> Result<Uuid>;

    /// Insert all documents or none; returns the number inserted
    async fn insert_many(&self, collection: Collection, docs: Vec<Fields>) -> Result<u64>;

    /// Shallow-merge `partial` over the stored fields
    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        partial: Fields,
    ) -> Result<Option<StoredDocument>>;

    /// Delete every listed id present in the collection; returns the number removed
    async fn delete_many_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<u64>;

    async fn count(&self, collection: Collection) -> Result<u64>;

    /// Copy a document into `to` with `stamp` merged over it, then remove it from
    /// `from`. Both steps commit together or not at all. The id is preserved.
    ///
    /// `check` sees the merged document before it is written; if it fails the
    /// source stays as it was.
    async fn move_document(
        &self,
        from: Collection,
        id: Uuid,
        to: Collection,
        stamp: Fields,
        check: &DocumentCheck,
    ) -> Result<Option<StoredDocument>>;
}

/// Credential records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Create the user or replace its hash and admin flag
    async fn upsert(&self, username: &str, password_hash: &str, admin: bool)
        -> Result<UserRecord>;
}
