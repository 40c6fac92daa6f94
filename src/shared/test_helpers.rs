use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use crate::features::auth::AuthService;
use crate::features::locations::LocationService;
use crate::modules::store::{InMemoryDocumentStore, InMemoryUserStore};

/// Lowest bcrypt cost, keeps credential tests fast
pub const TEST_HASH_COST: u32 = 4;

/// Services wired to in-memory stores, with handles kept for assertions
pub struct TestApp {
    pub documents: Arc<InMemoryDocumentStore>,
    pub auth: Arc<AuthService>,
    pub router: Router,
}

pub fn create_test_app() -> TestApp {
    let documents = Arc::new(InMemoryDocumentStore::new());
    let users = Arc::new(InMemoryUserStore::new());

    let location_service = Arc::new(LocationService::new(documents.clone()));
    let auth = Arc::new(AuthService::with_cost(users, TEST_HASH_COST));

    let router = crate::api_routes(location_service, Arc::clone(&auth));

    TestApp {
        documents,
        auth,
        router,
    }
}

pub fn create_test_server() -> (TestServer, TestApp) {
    let app = create_test_app();
    let server = TestServer::new(app.router.clone()).unwrap();
    (server, app)
}
