mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware::OriginPolicy;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::{routes as auth_routes, AuthService};
use crate::features::locations::services::ImportOutcome;
use crate::features::locations::{routes as locations_routes, LocationService, SeedImportService};
use crate::modules::store::{DocumentStore, PgDocumentStore, PgUserStore, UserStore};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

/// Feature routes without docs or outer layers
fn api_routes(location_service: Arc<LocationService>, auth_service: Arc<AuthService>) -> Router {
    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }

    Router::new()
        .merge(locations_routes::routes(location_service))
        .merge(auth_routes::routes(auth_service))
        .route("/health", axum::routing::get(health_check))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            tracing::warn!("Error loading .env file: {}", e);
        }
    }

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}, environment={:?}",
        worker_threads,
        std::process::id(),
        config.app.environment
    );

    // Database connection failure is fatal
    let pool = database::create_pool(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Could not connect to database: {}", e))?;
    tracing::info!(
        "Database connection pool created: {}",
        config.database.redacted_url()
    );

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Stores are constructed once and handed to the services
    let document_store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool.clone()));
    let user_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));

    let location_service = Arc::new(LocationService::new(Arc::clone(&document_store)));
    tracing::info!("Location service initialized");

    let auth_service = Arc::new(AuthService::new(Arc::clone(&user_store)));
    auth_service
        .warm_up()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare auth service: {}", e))?;
    tracing::info!("Auth service initialized");

    if let Some((username, password)) = config.bootstrap.admin_credentials() {
        auth_service
            .upsert_user(username, password, true)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to provision admin user: {}", e))?;
    }

    // Seed import failure is logged; the server keeps serving
    let seed_import = SeedImportService::new(
        Arc::clone(&document_store),
        config.app.seed_csv_path.clone(),
    );
    match seed_import.import_if_empty().await {
        Ok(ImportOutcome::Imported(count)) => {
            tracing::info!("Seed import finished: {} locations", count)
        }
        Ok(_) => {}
        Err(e) => tracing::error!("Failed to import initial data: {}", e),
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let origin_policy = OriginPolicy::from_config(&config.app);
    tracing::info!("CORS origin policy: {:?}", origin_policy);

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes(location_service, auth_service))
        .layer(middleware::cors_layer(origin_policy))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server running on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
