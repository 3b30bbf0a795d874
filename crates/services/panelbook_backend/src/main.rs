// File: crates/services/panelbook_backend/src/main.rs
use axum::{extract::State, http::StatusCode, routing::get, Router};
use panelbook_availability::routes as availability_routes;
use panelbook_booking::routes as booking_routes;
use panelbook_config::load_config;
use panelbook_db::{
    DbClient, SqlBookingRepository, SqlSlotRepository, SqlTemplateRepository,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[axum::debug_handler]
async fn health_handler(State(db): State<Arc<DbClient>>) -> Result<&'static str, StatusCode> {
    if db.is_healthy().await {
        Ok("ok")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    panelbook_common::logging::init();

    let db_client = DbClient::new(&config)
        .await
        .expect("Failed to connect to database");

    let slots = Arc::new(SqlSlotRepository::new(db_client.clone()));
    let bookings = Arc::new(SqlBookingRepository::new(db_client.clone()));
    let templates = Arc::new(SqlTemplateRepository::new(db_client.clone()));

    slots
        .init_schema()
        .await
        .expect("Failed to initialize slot schema");
    bookings
        .init_schema()
        .await
        .expect("Failed to initialize booking schema");
    templates
        .init_schema()
        .await
        .expect("Failed to initialize template schema");

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Panelbook API!" }))
        .route("/health", get(health_handler))
        .with_state(Arc::new(db_client));

    let api_router = Router::new().nest("/api", {
        let mut router = api_router;
        if config.use_booking {
            info!("Mounting booking routes");
            router = router.merge(booking_routes::routes(
                config.clone(),
                slots.clone(),
                bookings.clone(),
                templates.clone(),
            ));
        }
        if config.use_availability {
            info!("Mounting availability routes");
            router = router.merge(availability_routes::routes(
                config.clone(),
                slots.clone(),
                templates.clone(),
            ));
        }
        router
    });

    #[allow(unused_mut)] // mutated when the openapi feature is enabled
    let mut app = api_router.layer(TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use panelbook_availability::doc::AvailabilityApiDoc;
        use panelbook_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Panelbook API",
                version = "0.1.0",
                description = "Panelbook interview scheduling API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Panelbook", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        openapi_doc.merge(AvailabilityApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
