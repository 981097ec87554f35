//! Main application router.

use crate::{
    controllers::{health_controller, post_controller},
    middleware::logging_middleware,
    state::AppState,
};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use chronicle_config::ServerConfig;
use chronicle_service::PostService;
use shaku::{HasComponent, Module};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Creates the main application router from a Shaku module.
///
/// This is the preferred way to create the router, using Shaku for
/// dependency injection. The module must provide a `PostService` component.
pub fn create_router<M>(module: &M, server_config: &ServerConfig) -> Router
where
    M: Module + HasComponent<dyn PostService>,
{
    let state = AppState::from_module(module);
    build_router(state, server_config)
}

/// Builds the application router from pre-constructed state.
///
/// Split out from [`create_router`] so tests can wire in service fakes
/// without building a DI module.
pub fn build_router(state: AppState, server_config: &ServerConfig) -> Router {
    // Create CORS layer
    let cors = create_cors_layer(server_config);

    // Build the API router
    let api_router = Router::new()
        .nest("/posts", post_controller::router())
        .with_state(state);

    let router = Router::new()
        // Health endpoints
        .merge(health_controller::router())
        // API
        .nest("/api", api_router)
        // Root endpoint
        .route("/", get(root))
        // Add middleware layers
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with REST endpoints");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if server_config.cors_enabled {
        if server_config.cors_origins.contains(&"*".to_string()) {
            CorsLayer::permissive()
        } else {
            let origins: Vec<HeaderValue> = server_config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    } else {
        CorsLayer::new()
    }
}

/// Root endpoint handler.
async fn root() -> &'static str {
    "Chronicle API"
}
