//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, count_handler, delete_all_specific_handler, delete_handler,
    delete_specific_handler, get_handler, get_latest_specific_handler, get_specific_handler,
    health_handler, set_handler, set_specific_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT|GET|DELETE /docs/:key` - Plain entries
/// - `PUT|GET|DELETE /docs/:key/specific` - Specific entries (write, latest, remove all)
/// - `GET|DELETE /docs/:key/specific/:sub_key` - One specific entry
/// - `DELETE /docs` - Clear the collection
/// - `GET /count` - Live JSON document count
/// - `GET /stats` - Read statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/docs", delete(clear_handler))
        .route(
            "/docs/:key",
            put(set_handler).get(get_handler).delete(delete_handler),
        )
        .route(
            "/docs/:key/specific",
            put(set_specific_handler)
                .get(get_latest_specific_handler)
                .delete(delete_all_specific_handler),
        )
        .route(
            "/docs/:key/specific/:sub_key",
            get(get_specific_handler).delete(delete_specific_handler),
        )
        .route("/count", get(count_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
