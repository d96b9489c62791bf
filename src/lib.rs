pub mod config;
pub mod error;
pub mod state;
pub mod models;
pub mod routes;
pub mod email;
pub mod sheets;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::Notifier;
use crate::sheets::RecordStore;
use crate::state::{AppState, SharedState};
use crate::submission::pipeline::Dispatcher;

pub fn build_app(
    config: Config,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
) -> Router {
    let cors = cors_layer(&config.cors_origins);
    let body_limit = RequestBodyLimitLayer::new(config.max_body_size);

    let state: SharedState = Arc::new(AppState {
        config,
        dispatcher: Dispatcher::new(store, notifier),
    });

    Router::new()
        .merge(routes::contact_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// Any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring invalid CORS origin '{origin}': {e}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

async fn health() -> &'static str {
    "ok"
}
