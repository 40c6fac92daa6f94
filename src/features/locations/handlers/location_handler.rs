use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::locations::dtos::{
    BatchCreateLocationsDto, DeleteLocationsDto, LocationDocumentSchema, MoveLocationDto,
};
use crate::features::locations::services::LocationService;
use crate::modules::store::{Collection, StoredDocument};
use crate::shared::types::{ErrorResponse, MessageResponse};

/// Parse a document id from its string form
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("Invalid id '{}'", raw)))
}

/// List all locations in a collection
#[utoipa::path(
    get,
    path = "/api/locations/{collection}",
    params(
        ("collection" = String, Path, description = "sample_data, pending_data or reviewed_data")
    ),
    responses(
        (status = 200, description = "All documents in the collection", body = Vec<LocationDocumentSchema>),
        (status = 400, description = "Unknown collection", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(service): State<Arc<LocationService>>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<StoredDocument>>> {
    let collection: Collection = collection.parse()?;
    let locations = service.list(collection).await?;
    Ok(Json(locations))
}

/// Create a location in a collection
#[utoipa::path(
    post,
    path = "/api/locations/{collection}",
    params(
        ("collection" = String, Path, description = "Target collection")
    ),
    request_body = LocationDocumentSchema,
    responses(
        (status = 200, description = "Location created", body = LocationDocumentSchema),
        (status = 400, description = "Unknown collection or invalid fields", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(service): State<Arc<LocationService>>,
    Path(collection): Path<String>,
    AppJson(fields): AppJson<Map<String, Value>>,
) -> Result<Json<StoredDocument>> {
    let collection: Collection = collection.parse()?;
    let created = service.create(collection, fields).await?;
    Ok(Json(created))
}

/// Create many locations in one request
#[utoipa::path(
    post,
    path = "/api/locations/{collection}/batch",
    params(
        ("collection" = String, Path, description = "Target collection")
    ),
    request_body = BatchCreateLocationsDto,
    responses(
        (status = 200, description = "Number of locations created", body = MessageResponse),
        (status = 400, description = "Unknown collection or invalid fields", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn batch_create_locations(
    State(service): State<Arc<LocationService>>,
    Path(collection): Path<String>,
    AppJson(dto): AppJson<BatchCreateLocationsDto>,
) -> Result<Json<MessageResponse>> {
    let collection: Collection = collection.parse()?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.batch_create(collection, dto.locations).await?;
    Ok(Json(MessageResponse::new(
        format!("Successfully created {} locations", created),
        created,
    )))
}

/// Update fields of a location
#[utoipa::path(
    put,
    path = "/api/locations/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "Collection holding the location"),
        ("id" = String, Path, description = "Location id")
    ),
    request_body = LocationDocumentSchema,
    responses(
        (status = 200, description = "Location after the update", body = LocationDocumentSchema),
        (status = 400, description = "Invalid collection, id or fields", body = ErrorResponse),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn update_location(
    State(service): State<Arc<LocationService>>,
    Path((collection, id)): Path<(String, String)>,
    AppJson(partial): AppJson<Map<String, Value>>,
) -> Result<Json<StoredDocument>> {
    let collection: Collection = collection.parse()?;
    let id = parse_id(&id)?;
    let updated = service.update(collection, id, partial).await?;
    Ok(Json(updated))
}

/// Delete locations by id
#[utoipa::path(
    delete,
    path = "/api/locations/{collection}",
    params(
        ("collection" = String, Path, description = "Collection holding the locations")
    ),
    request_body = DeleteLocationsDto,
    responses(
        (status = 200, description = "Number of locations deleted", body = MessageResponse),
        (status = 400, description = "Invalid collection or id", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn delete_locations(
    State(service): State<Arc<LocationService>>,
    Path(collection): Path<String>,
    AppJson(dto): AppJson<DeleteLocationsDto>,
) -> Result<Json<MessageResponse>> {
    let collection: Collection = collection.parse()?;

    let ids = dto
        .ids
        .iter()
        .map(|id| parse_id(id.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let deleted = service.delete(collection, &ids).await?;
    Ok(Json(MessageResponse::new(
        format!("Successfully deleted {} locations", deleted),
        deleted,
    )))
}

/// Move a location to another collection
#[utoipa::path(
    post,
    path = "/api/locations/{collection}/{id}/move/{to_collection}",
    params(
        ("collection" = String, Path, description = "Source collection"),
        ("id" = String, Path, description = "Location id"),
        ("to_collection" = String, Path, description = "Destination collection")
    ),
    request_body = MoveLocationDto,
    responses(
        (status = 200, description = "Location as stored in the destination", body = LocationDocumentSchema),
        (status = 400, description = "Invalid collection or id, or missing approval", body = ErrorResponse),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn move_location(
    State(service): State<Arc<LocationService>>,
    Path((from, id, to)): Path<(String, String, String)>,
    body: Option<AppJson<MoveLocationDto>>,
) -> Result<Json<StoredDocument>> {
    let from: Collection = from.parse()?;
    let to: Collection = to.parse()?;
    let id = parse_id(&id)?;

    // Body may be empty; approval fields only matter for reviewed_data
    let dto = body.map(|AppJson(dto)| dto).unwrap_or_default();

    let moved = service.move_location(from, id, to, dto).await?;
    Ok(Json(moved))
}
