use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::auth::auth_routes;
use super::changes::change_routes;
use super::classes::class_routes;
use super::coaches::coach_routes;
use super::events::event_routes;
use super::health::health_routes;
use super::programs::program_routes;
use super::settings::settings_routes;
use super::sponsors::sponsor_routes;
use super::sponsorship::{inquiry_routes, package_routes};
use super::workouts::workout_routes;
use crate::state::AppState;

pub fn create_routes(state: AppState, allowed_origins: &[String]) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/classes", class_routes())
        .nest("/coaches", coach_routes())
        .nest("/programs", program_routes())
        .nest("/events", event_routes())
        .nest("/sponsors", sponsor_routes())
        .nest("/sponsorship-packages", package_routes())
        .nest("/sponsorship-inquiries", inquiry_routes())
        .nest("/settings", settings_routes())
        .merge(workout_routes())
        .merge(change_routes());

    Router::new()
        .nest("/health", health_routes())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// CORS for the marketing site and back office. With no configured origins
/// any origin is accepted and credentials are not allowed.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

pub fn security_headers_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}
