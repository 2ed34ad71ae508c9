use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The quiz front end is served from a different origin and sends bearer tokens.
pub fn quiz_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
