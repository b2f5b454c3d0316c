//! request-nest — HTTP surface: the public ingest endpoint, the
//! token-protected Admin API, health probes and the web UI.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
///
/// Only the Admin API sits behind the bearer-token guard; ingest, health
/// and the web UI are public.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(routes::bins::router())
        .merge(routes::events::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_token,
        ));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::web::router())
        .merge(admin)
        .merge(routes::ingest::router())
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
