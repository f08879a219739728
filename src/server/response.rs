use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::{
    source::{download_filename, response_mime},
    FontgateError,
};

/// Send a rebuilt font back as a download.
///
/// `original` is the font as it was received; its magic number decides the
/// content type, with `declared_type` (from an upload) as the fallback.
pub fn respond_with_file(
    bytes: Vec<u8>,
    original: &[u8],
    filename: Option<&str>,
    declared_type: Option<&str>,
) -> Result<Response, FontgateError> {
    let mime = response_mime(original, declared_type);
    let filename = download_filename(filename, &mime);
    let header_value = |value: String| {
        HeaderValue::from_str(&value)
            .map_err(|e| FontgateError::General(format!("bad header value '{value}': {e}")))
    };
    log::info!("Sending {} ({} bytes, {})", filename, bytes.len(), mime);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, header_value(mime)?)
        .header(
            header::CONTENT_DISPOSITION,
            header_value(format!("attachment; filename=\"{filename}\""))?,
        )
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| FontgateError::General(format!("could not build response: {e}")))
}
