use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request DTO for batch creation
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchCreateLocationsDto {
    #[validate(length(min = 1, message = "At least one location is required"))]
    #[schema(value_type = Vec<Object>)]
    pub locations: Vec<Map<String, Value>>,
}

/// Request DTO for bulk deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteLocationsDto {
    /// Document ids in their string form; an empty list deletes nothing
    pub ids: Vec<String>,
}

/// Request DTO for moving a location between collections
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct MoveLocationDto {
    /// Reviewer name, required when the destination is `reviewed_data`
    pub approved_by: Option<String>,
    /// Approval time (RFC 3339), required when the destination is `reviewed_data`
    pub approved_datetime: Option<String>,
    /// Uploader name stamped onto the location when the destination is `pending_data`
    pub uploaded_by: Option<String>,
}

/// Documentation-only shape of a location document
#[derive(Debug, Serialize, ToSchema)]
#[allow(dead_code)]
pub struct LocationDocumentSchema {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub parcel: String,
    pub designer: String,
    #[serde(rename = "constructionCompany")]
    pub construction_company: String,
    #[serde(rename = "landUseZone")]
    pub land_use_zone: String,
    #[serde(rename = "aboveGroundFloors")]
    pub above_ground_floors: String,
    #[serde(rename = "undergroundFloors")]
    pub underground_floors: String,
    #[serde(rename = "solarPower")]
    pub solar_power: String,
    #[serde(rename = "universalBathroom")]
    pub universal_bathroom: String,
    #[serde(rename = "universalCommonRoom")]
    pub universal_common_room: String,
    #[serde(rename = "universalElevator")]
    pub universal_elevator: String,
    #[serde(rename = "landscapeBalcony")]
    pub landscape_balcony: String,
    #[serde(rename = "rainwaterCollection")]
    pub rainwater_collection: String,
    #[serde(rename = "frontGreenEnergy")]
    pub front_green_energy: String,
    #[serde(rename = "backGreenEnergy")]
    pub back_green_energy: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Present on `pending_data` documents
    pub uploaded_by: Option<String>,
    /// Present on `reviewed_data` documents
    pub approved_by: Option<String>,
    /// Present on `reviewed_data` documents
    pub approved_datetime: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
