use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Collection, DocumentCheck, DocumentStore, Fields, StoredDocument, UserRecord, UserStore,
};
use crate::core::error::Result;

/// Document store kept in process memory, used by the HTTP tests
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_document(fields: Fields) -> StoredDocument {
        let now = Utc::now();
        StoredDocument {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn insert_one(&self, collection: Collection, fields: Fields) -> Result<Uuid> {
        let doc = Self::new_document(fields);
        let id = doc.id;
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(doc);
        Ok(id)
    }

    async fn insert_many(&self, collection: Collection, docs: Vec<Fields>) -> Result<u64> {
        let count = docs.len() as u64;
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection).or_default();
        target.extend(docs.into_iter().map(Self::new_document));
        Ok(count)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        partial: Fields,
    ) -> Result<Option<StoredDocument>> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };

        doc.fields.extend(partial);
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete_many_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|d| !ids.contains(&d.id));
        Ok((before - docs.len()) as u64)
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn move_document(
        &self,
        from: Collection,
        id: Uuid,
        to: Collection,
        stamp: Fields,
        check: &DocumentCheck,
    ) -> Result<Option<StoredDocument>> {
        let mut collections = self.collections.write().await;
        let Some(source) = collections.get_mut(&from) else {
            return Ok(None);
        };
        let Some(position) = source.iter().position(|d| d.id == id) else {
            return Ok(None);
        };

        let mut merged = source[position].fields.clone();
        merged.extend(stamp);
        check(&mut merged)?;

        let mut doc = source.remove(position);
        doc.fields = merged;
        doc.updated_at = Utc::now();
        collections.entry(to).or_default().push(doc.clone());
        Ok(Some(doc))
    }
}

/// User store kept in process memory, used by the HTTP tests
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn upsert(
        &self,
        username: &str,
        password_hash: &str,
        admin: bool,
    ) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        let now = Utc::now();
        let record = users
            .entry(username.to_string())
            .and_modify(|u| {
                u.password_hash = password_hash.to_string();
                u.admin = admin;
                u.updated_at = now;
            })
            .or_insert_with(|| UserRecord {
                id: Uuid::new_v4(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                admin,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_update_merges_shallowly() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert_one(
                Collection::Pending,
                fields(json!({"parcel": "A1", "designer": "Lin"})),
            )
            .await
            .unwrap();

        let updated = store
            .update_by_id(Collection::Pending, id, fields(json!({"designer": "Chen"})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.get_str("parcel"), Some("A1"));
        assert_eq!(updated.get_str("designer"), Some("Chen"));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert_one(Collection::Sample, fields(json!({"parcel": "A1"})))
            .await
            .unwrap();

        assert!(store
            .find_by_id(Collection::Pending, id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store
                .delete_many_by_ids(Collection::Pending, &[id])
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.count(Collection::Sample).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_move_check_keeps_source() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert_one(Collection::Sample, fields(json!({"parcel": "A1"})))
            .await
            .unwrap();

        let result = store
            .move_document(
                Collection::Sample,
                id,
                Collection::Pending,
                Fields::new(),
                &|_: &mut Fields| -> Result<()> {
                    Err(AppError::Validation("uploaded_by is required".into()))
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.find_by_id(Collection::Sample, id).await.unwrap().is_some());
        assert_eq!(store.count(Collection::Pending).await.unwrap(), 0);
    }
}
