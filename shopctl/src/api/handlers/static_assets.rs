//! HTTP handler for the embedded stylesheet and other static files.

use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::static_assets::Assets;

/// Serve a file embedded from `static/` under `/static/{*path}`.
#[instrument]
pub async fn serve_embedded_asset(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                Body::from(content.data.into_owned()),
            )
                .into_response()
        }
        None => {
            debug!("Static asset not found: {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
