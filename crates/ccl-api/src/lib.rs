//! # ccl-api
//!
//! HTTP server for client care letter generation.
//!
//! Exposes create/update/read endpoints under `/api/ccl`, serves generated
//! documents from `/ccls`, and reports liveness on `/health`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use uuid::Uuid;

use ccl_core::defaults::CCL_SUBDIR;

pub use config::{parse_allowed_origins, ServerConfig};
pub use error::ApiError;
pub use services::CclService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub ccl: CclService,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(ccl: CclService, config: ServerConfig) -> Self {
        Self {
            ccl,
            config: Arc::new(config),
        }
    }
}

/// Request ID generator using UUIDv7 (time-ordered).
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let artifacts = ServeDir::new(config.public_dir.join(CCL_SUBDIR));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/ccl", post(handlers::create_ccl))
        .route(
            "/api/ccl/:matter_id",
            get(handlers::get_ccl).patch(handlers::update_ccl),
        )
        .nest_service(&format!("/{}", CCL_SUBDIR), artifacts)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins()))
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state)
}
