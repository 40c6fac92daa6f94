use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::locations::dtos::MoveLocationDto;
use crate::features::locations::models::location::{
    parse_timestamp, KEY_APPROVED_BY, KEY_APPROVED_DATETIME, KEY_UPLOADED_BY,
};
use crate::features::locations::models::{
    prepare_document, prepare_update, require_stage_fields,
};
use crate::modules::store::{Collection, DocumentStore, Fields, StoredDocument};

/// Service for location CRUD across the three collections
pub struct LocationService {
    store: Arc<dyn DocumentStore>,
}

impl LocationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List every document in a collection
    pub async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let documents = self.store.find_all(collection).await?;
        tracing::info!(
            "Found {} locations in {}",
            documents.len(),
            collection
        );
        Ok(documents)
    }

    /// Insert one location and return it as stored
    pub async fn create(&self, collection: Collection, fields: Fields) -> Result<StoredDocument> {
        let fields = prepare_document(collection, fields)?;
        let id = self.store.insert_one(collection, fields).await?;

        let created = self
            .store
            .find_by_id(collection, id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Created location {} missing from {}", id, collection))
            })?;

        tracing::info!("Location created: collection={}, id={}", collection, id);
        Ok(created)
    }

    /// Insert many locations at once; all of them land or none do
    pub async fn batch_create(&self, collection: Collection, docs: Vec<Fields>) -> Result<u64> {
        let prepared = docs
            .into_iter()
            .enumerate()
            .map(|(index, fields)| {
                prepare_document(collection, fields).map_err(|e| match e {
                    AppError::Validation(msg) => {
                        AppError::Validation(format!("locations[{}]: {}", index, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let inserted = self.store.insert_many(collection, prepared).await?;
        tracing::info!(
            "Batch created {} locations in {}",
            inserted,
            collection
        );
        Ok(inserted)
    }

    /// Shallow-merge `partial` into an existing location
    pub async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        partial: Fields,
    ) -> Result<StoredDocument> {
        let partial = prepare_update(collection, partial)?;

        let updated = self
            .store
            .update_by_id(collection, id, partial)
            .await?
            .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

        tracing::info!("Location updated: collection={}, id={}", collection, id);
        Ok(updated)
    }

    /// Delete the listed locations; missing ids are not an error
    pub async fn delete(&self, collection: Collection, ids: &[Uuid]) -> Result<u64> {
        let deleted = self.store.delete_many_by_ids(collection, ids).await?;
        tracing::info!(
            "Deleted {} of {} requested locations from {}",
            deleted,
            ids.len(),
            collection
        );
        Ok(deleted)
    }

    /// Move a location to another collection.
    ///
    /// Moving into `reviewed_data` stamps `approved_by` and `approved_datetime`;
    /// both are required and validated before the store is touched. Moving into
    /// `pending_data` may stamp `uploaded_by`. The merged document must carry
    /// every field the destination requires, otherwise the source is left alone.
    pub async fn move_location(
        &self,
        from: Collection,
        id: Uuid,
        to: Collection,
        dto: MoveLocationDto,
    ) -> Result<StoredDocument> {
        if from == to {
            return Err(AppError::BadRequest(
                "Source and destination collections must differ".to_string(),
            ));
        }

        let stamp = approval_stamp(to, dto)?;

        let moved = self
            .store
            .move_document(from, id, to, stamp, &move |fields: &mut Fields| {
                require_stage_fields(to, fields)
            })
            .await?
            .ok_or_else(|| {
                tracing::warn!("Location not found for move: id={}, from={}", id, from);
                AppError::NotFound("Location not found".to_string())
            })?;

        tracing::info!("Moved location {} from {} to {}", id, from, to);
        Ok(moved)
    }
}

fn approval_stamp(to: Collection, dto: MoveLocationDto) -> Result<Fields> {
    let mut stamp = Fields::new();
    match to {
        Collection::Sample => return Ok(stamp),
        Collection::Pending => {
            if let Some(uploaded_by) = dto.uploaded_by.filter(|s| !s.trim().is_empty()) {
                stamp.insert(KEY_UPLOADED_BY.to_string(), Value::String(uploaded_by));
            }
            return Ok(stamp);
        }
        Collection::Reviewed => {}
    }

    let approved_by = dto.approved_by.filter(|s| !s.trim().is_empty());
    let approved_datetime = dto.approved_datetime.filter(|s| !s.trim().is_empty());
    let (Some(approved_by), Some(approved_datetime)) = (approved_by, approved_datetime) else {
        return Err(AppError::BadRequest(
            "Approval information is required".to_string(),
        ));
    };

    let approved_at = parse_timestamp(&approved_datetime).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid approved_datetime '{}'", approved_datetime))
    })?;

    stamp.insert(KEY_APPROVED_BY.to_string(), Value::String(approved_by));
    stamp.insert(
        KEY_APPROVED_DATETIME.to_string(),
        Value::String(approved_at.to_rfc3339()),
    );
    Ok(stamp)
}
