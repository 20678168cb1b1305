mod handlers;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::workflow::Controller;

/// Permissive CORS unless specific origins are configured.
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}

pub fn create_router(controller: Arc<Controller>, cors_origins: Option<&[String]>) -> Router {
    let api = Router::new()
        // Session
        .route("/session", get(handlers::get_session))
        .route("/view", put(handlers::set_view))
        // Extraction and staging
        .route("/extract", post(handlers::extract))
        .route(
            "/staging",
            post(handlers::stage).delete(handlers::clear_staged),
        )
        // Synthesis
        .route("/synthesize", post(handlers::synthesize))
        .route("/retry", post(handlers::retry))
        .route("/discard", post(handlers::discard))
        // Vault
        .route("/vault", get(handlers::list_vault))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(controller)
}
