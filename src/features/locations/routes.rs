use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::locations::handlers;
use crate::features::locations::services::LocationService;

/// Create routes for the locations feature
///
/// Every route is parameterized by collection; the name is validated against
/// the known collections inside the handlers.
pub fn routes(service: Arc<LocationService>) -> Router {
    Router::new()
        .route(
            "/api/locations/{collection}",
            get(handlers::list_locations)
                .post(handlers::create_location)
                .delete(handlers::delete_locations),
        )
        .route(
            "/api/locations/{collection}/batch",
            post(handlers::batch_create_locations),
        )
        .route(
            "/api/locations/{collection}/{id}",
            put(handlers::update_location),
        )
        .route(
            "/api/locations/{collection}/{id}/move/{to_collection}",
            post(handlers::move_location),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::features::locations::SeedImportService;
    use crate::modules::store::{Collection, DocumentStore};
    use crate::shared::test_helpers::create_test_server;

    fn sample_location(parcel: &str) -> Value {
        json!({
            "parcel": parcel,
            "designer": "Lin Architects",
            "latitude": 22.62,
            "longitude": 120.30,
            "uploaded_by": "alice"
        })
    }

    #[tokio::test]
    async fn test_create_then_list_includes_document() {
        let (server, _app) = create_test_server();

        let response = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await;
        response.assert_status_ok();
        let created: Value = response.json();
        let id = created["_id"].as_str().unwrap().to_string();
        assert_eq!(created["parcel"], "A1");
        assert_eq!(created["constructionCompany"], "");
        assert!(created["createdAt"].is_string());

        let response = server.get("/api/locations/pending_data").await;
        response.assert_status_ok();
        let listed: Vec<Value> = response.json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["_id"], id);
    }

    #[tokio::test]
    async fn test_unknown_collection_is_rejected() {
        let (server, _app) = create_test_server();

        let response = server.get("/api/locations/users").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("users"));

        let response = server
            .post("/api/locations/system.profile")
            .json(&sample_location("A1"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_without_coordinates_fails_validation() {
        let (server, app) = create_test_server();

        let response = server
            .post("/api/locations/sample_data")
            .json(&json!({"parcel": "A1"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(app.documents.count(Collection::Sample).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (server, _app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .put(&format!("/api/locations/pending_data/{}", id))
            .json(&json!({"designer": "Chen Studio", "solarPower": "yes"}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();

        assert_eq!(updated["_id"], id);
        assert_eq!(updated["designer"], "Chen Studio");
        assert_eq!(updated["solarPower"], "yes");
        assert_eq!(updated["parcel"], "A1");
        assert_eq!(updated["latitude"], json!(22.62));
        assert_eq!(updated["uploaded_by"], "alice");
    }

    #[tokio::test]
    async fn test_update_cannot_blank_reviewed_approval() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/reviewed_data")
            .json(&json!({
                "parcel": "A1",
                "latitude": 22.62,
                "longitude": 120.30,
                "approved_by": "bob",
                "approved_datetime": "2024-05-01T10:00:00Z"
            }))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .put(&format!("/api/locations/reviewed_data/{}", id))
            .json(&json!({"approved_by": "", "approved_datetime": "not a date"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let stored = app.documents.find_all(Collection::Reviewed).await.unwrap();
        assert_eq!(stored[0].get_str("approved_by"), Some("bob"));
        assert_eq!(
            stored[0].get_str("approved_datetime"),
            Some("2024-05-01T10:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn test_update_unknown_or_malformed_id() {
        let (server, _app) = create_test_server();

        let response = server
            .put("/api/locations/pending_data/7f0c2a4e-8d1b-4c55-9a3e-2b6f1d0c9e11")
            .json(&json!({"designer": "x"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Location not found");

        let response = server
            .put("/api/locations/pending_data/not-an-id")
            .json(&json!({"designer": "x"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_in_wrong_collection_is_not_found() {
        let (server, _app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .put(&format!("/api/locations/reviewed_data/{}", id))
            .json(&json!({"designer": "x"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_reports_removed_count() {
        let (server, app) = create_test_server();
        let mut ids = Vec::new();
        for parcel in ["A1", "A2", "A3"] {
            let created: Value = server
                .post("/api/locations/pending_data")
                .json(&sample_location(parcel))
                .await
                .json();
            ids.push(created["_id"].as_str().unwrap().to_string());
        }

        let response = server
            .delete("/api/locations/pending_data")
            .json(&json!({
                "ids": [ids[0], ids[1], "7f0c2a4e-8d1b-4c55-9a3e-2b6f1d0c9e11"]
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "Successfully deleted 2 locations");

        let remaining = app.documents.find_all(Collection::Pending).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id.to_string(), ids[2]);
    }

    #[tokio::test]
    async fn test_delete_with_empty_id_list_reports_zero() {
        let (server, app) = create_test_server();
        server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .assert_status_ok();

        let response = server
            .delete("/api/locations/pending_data")
            .json(&json!({"ids": []}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Successfully deleted 0 locations");
        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_malformed_id_deletes_nothing() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();

        let response = server
            .delete("/api/locations/pending_data")
            .json(&json!({"ids": [created["_id"], "bogus"]}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_create_counts_inserted() {
        let (server, app) = create_test_server();

        let response = server
            .post("/api/locations/sample_data/batch")
            .json(&json!({
                "locations": [sample_location("A1"), sample_location("A2")]
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "Successfully created 2 locations");
        assert_eq!(app.documents.count(Collection::Sample).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_batch_create_is_all_or_nothing() {
        let (server, app) = create_test_server();

        let response = server
            .post("/api/locations/sample_data/batch")
            .json(&json!({
                "locations": [sample_location("A1"), {"parcel": "no coordinates"}]
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("locations[1]"));
        assert_eq!(app.documents.count(Collection::Sample).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_move_to_reviewed_requires_approval() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .post(&format!(
                "/api/locations/pending_data/{}/move/reviewed_data",
                id
            ))
            .json(&json!({"approved_by": "bob"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Approval information is required");

        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 1);
        assert_eq!(app.documents.count(Collection::Reviewed).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_move_to_reviewed_stamps_approval() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .post(&format!(
                "/api/locations/pending_data/{}/move/reviewed_data",
                id
            ))
            .json(&json!({
                "approved_by": "bob",
                "approved_datetime": "2024-05-01T10:00:00Z"
            }))
            .await;
        response.assert_status_ok();
        let moved: Value = response.json();
        assert_eq!(moved["_id"], id);
        assert_eq!(moved["approved_by"], "bob");
        assert_eq!(moved["approved_datetime"], "2024-05-01T10:00:00+00:00");
        assert_eq!(moved["parcel"], "A1");

        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 0);
        let reviewed = app.documents.find_all(Collection::Reviewed).await.unwrap();
        assert_eq!(reviewed.len(), 1);
        assert_eq!(reviewed[0].get_str("approved_by"), Some("bob"));
    }

    #[tokio::test]
    async fn test_move_without_body_outside_review() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .post(&format!("/api/locations/pending_data/{}/move/sample_data", id))
            .await;
        response.assert_status_ok();
        assert_eq!(app.documents.count(Collection::Sample).await.unwrap(), 1);
        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_move_into_pending_requires_uploader() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/sample_data")
            .json(&json!({"parcel": "A1", "latitude": 22.62, "longitude": 120.30}))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();
        let path = format!("/api/locations/sample_data/{}/move/pending_data", id);

        let response = server.post(&path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "uploaded_by is required");
        assert_eq!(app.documents.count(Collection::Sample).await.unwrap(), 1);
        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 0);

        let response = server
            .post(&path)
            .json(&json!({"uploaded_by": "alice"}))
            .await;
        response.assert_status_ok();
        let moved: Value = response.json();
        assert_eq!(moved["_id"], id);
        assert_eq!(moved["uploaded_by"], "alice");
        assert_eq!(app.documents.count(Collection::Sample).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_move_with_malformed_body_is_rejected() {
        let (server, app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .post(&format!("/api/locations/pending_data/{}/move/sample_data", id))
            .text("{not json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(app.documents.count(Collection::Pending).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_move_missing_record_is_not_found() {
        let (server, _app) = create_test_server();

        let response = server
            .post("/api/locations/pending_data/7f0c2a4e-8d1b-4c55-9a3e-2b6f1d0c9e11/move/reviewed_data")
            .json(&json!({
                "approved_by": "bob",
                "approved_datetime": "2024-05-01T10:00:00Z"
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_move_into_same_collection_is_rejected() {
        let (server, _app) = create_test_server();
        let created: Value = server
            .post("/api/locations/pending_data")
            .json(&sample_location("A1"))
            .await
            .json();
        let id = created["_id"].as_str().unwrap();

        let response = server
            .post(&format!("/api/locations/pending_data/{}/move/pending_data", id))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_seeded_records_are_listed() {
        let (server, app) = create_test_server();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "地號,latitude,longitude").unwrap();
        writeln!(file, "A1,25.03,121.56").unwrap();

        let documents: Arc<dyn DocumentStore> = app.documents.clone();
        SeedImportService::new(documents, file.path())
            .import_if_empty()
            .await
            .unwrap();

        let listed: Vec<Value> = server.get("/api/locations/sample_data").await.json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["parcel"], "A1");
        assert_eq!(listed[0]["latitude"], json!(25.03));
        assert_eq!(listed[0]["longitude"], json!(121.56));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _app) = create_test_server();
        server.get("/health").await.assert_status_ok();
    }
}
