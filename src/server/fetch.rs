use std::time::Duration;

use reqwest::{Client, Url};

use crate::{
    source::{FontSource, LoadedFont},
    FontgateError,
};

/// Build the client shared by all requests
pub fn build_client(timeout: Duration) -> Result<Client, FontgateError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fontgate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FontgateError::Config(format!("could not build HTTP client: {e}")))
}

/// Download a font in full.
///
/// Only `http` and `https` URLs are fetched. A non-success status, a timeout or
/// a body larger than `max_bytes` all fail with
/// [`FontgateError::SourceUnavailable`].
pub async fn fetch_font(
    client: &Client,
    url: &str,
    max_bytes: usize,
) -> Result<LoadedFont, FontgateError> {
    let parsed = Url::parse(url)
        .map_err(|e| FontgateError::InvalidRequest(format!("fontUrl '{url}' is not a URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FontgateError::InvalidRequest(format!(
            "fontUrl must be an http or https URL, got '{}'",
            parsed.scheme()
        )));
    }

    log::info!("Fetching {}", parsed);
    let mut response = client.get(parsed).send().await?.error_for_status()?;
    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(too_large(max_bytes));
        }
    }
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }
    log::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(LoadedFont {
        bytes,
        source: FontSource::Url(url.to_string()),
    })
}

fn too_large(max_bytes: usize) -> FontgateError {
    FontgateError::SourceUnavailable(format!("font is larger than {max_bytes} bytes"))
}
