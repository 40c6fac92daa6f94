use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::locations::{dtos as locations_dtos, handlers as locations_handlers};
use crate::modules::store::Collection;
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Locations
        locations_handlers::list_locations,
        locations_handlers::create_location,
        locations_handlers::batch_create_locations,
        locations_handlers::update_location,
        locations_handlers::delete_locations,
        locations_handlers::move_location,
        // Auth
        auth_handlers::login,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageResponse,
            Collection,
            // Locations
            locations_dtos::LocationDocumentSchema,
            locations_dtos::BatchCreateLocationsDto,
            locations_dtos::DeleteLocationsDto,
            locations_dtos::MoveLocationDto,
            // Auth
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
        )
    ),
    tags(
        (name = "locations", description = "Location records across sample, pending and reviewed collections"),
        (name = "auth", description = "Username/password login"),
    ),
    info(
        title = "KS Map API",
        version = "0.1.0",
        description = "API documentation for the KS map location service",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
