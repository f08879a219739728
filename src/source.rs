//! Where a font came from, and what to call it on the way back out.

/// Used when nothing better can be worked out
pub const FALLBACK_MIME: &str = "application/octet-stream";
const FALLBACK_FILENAME: &str = "updated_font.ttf";

/// The origin of a font
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A remote file, fetched in full over HTTP
    Url(String),
    /// An uploaded file
    Upload {
        /// The file name given by the client
        filename: Option<String>,
        /// The content type given by the client
        content_type: Option<String>,
    },
}

/// The bytes of a font file together with where they came from
#[derive(Debug, Clone)]
pub struct LoadedFont {
    /// The file contents, exactly as received
    pub bytes: Vec<u8>,
    /// Where the file came from
    pub source: FontSource,
}

impl FontSource {
    /// The file name of the source, if one can be worked out
    pub fn filename(&self) -> Option<String> {
        match self {
            FontSource::Url(url) => filename_from_url(url),
            FontSource::Upload { filename, .. } => filename
                .as_deref()
                .and_then(|name| name.rsplit(['/', '\\']).next())
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }

    /// The content type declared by the client, for uploads
    pub fn declared_type(&self) -> Option<&str> {
        match self {
            FontSource::Url(_) => None,
            FontSource::Upload { content_type, .. } => content_type.as_deref(),
        }
    }
}

/// The last path segment of a URL, without query or fragment
pub fn filename_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next()?;
    let path = without_query
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, path)| path).unwrap_or(""))
        .unwrap_or(without_query);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Work out a MIME type from the first bytes of a font file
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    Some(match data.get(0..4)? {
        [0, 1, 0, 0] | b"true" => "font/ttf",
        b"OTTO" => "font/otf",
        b"ttcf" => "font/collection",
        b"wOFF" => "font/woff",
        b"wOF2" => "font/woff2",
        _ => return None,
    })
}

/// The content type to send a font back with: what the bytes look like, then
/// what the client claimed, then a generic binary type.
pub fn response_mime(data: &[u8], declared: Option<&str>) -> String {
    sniff_mime(data)
        .map(str::to_string)
        .or_else(|| {
            declared
                .filter(|mime| mime.starts_with("font/") || mime.starts_with("application/"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// The name a rebuilt font is offered for download under.
///
/// `Inter.ttf` becomes `updated_Inter.ttf`. Characters that could break a
/// `Content-Disposition` header are replaced, and a missing extension is
/// filled in from the MIME type.
pub fn download_filename(original: Option<&str>, mime: &str) -> String {
    let Some(original) = original.filter(|name| !name.is_empty()) else {
        return FALLBACK_FILENAME.to_string();
    };
    let mut name: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !name.contains('.') {
        let extension = match mime {
            "font/otf" => "otf",
            "font/woff" => "woff",
            "font/woff2" => "woff2",
            "font/collection" => "ttc",
            _ => "ttf",
        };
        name = format!("{name}.{extension}");
    }
    format!("updated_{name}")
}
