//! The HTTP gateway.
//!
//! Every request is handled on its own: a font is fetched or received, decoded,
//! read or edited, and dropped again. The only shared state is the
//! [`ServiceConfig`] and a pooled HTTP client.

mod config;
mod error;
mod fetch;
mod handlers;
mod response;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use config::{ServeArgs, ServiceConfig};
pub use error::ApiError;
pub use fetch::{build_client, fetch_font};
pub use response::respond_with_file;

use crate::FontgateError;

/// Room for multipart framing and the other form fields around an upload
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub(crate) struct AppState {
    config: Arc<ServiceConfig>,
    client: reqwest::Client,
}

/// Build the gateway's routes
pub fn router(config: ServiceConfig) -> Result<Router, FontgateError> {
    let cors = cors_layer(&config)?;
    let body_limit = config.max_font_bytes.saturating_add(FORM_OVERHEAD_BYTES);
    let state = AppState {
        client: build_client(config.fetch_timeout)?,
        config: Arc::new(config),
    };
    Ok(Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/get-font-data", post(handlers::get_font_data))
        .route("/api/get-all-font-data", post(handlers::get_all_font_data))
        .route(
            "/api/get-font-data-buffer",
            post(handlers::get_font_data_buffer),
        )
        .route("/api/update-font-data", post(handlers::update_font_data))
        .route(
            "/api/update-font-data-from-file",
            post(handlers::update_font_data_from_file),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(config: &ServiceConfig) -> Result<CorsLayer, FontgateError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);
    if config.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| FontgateError::Config(format!("bad CORS origin '{origin}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Listen on the configured address until Ctrl-C
pub async fn serve(config: ServiceConfig) -> Result<(), FontgateError> {
    let bind = config.bind;
    let app = router(config)?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
