use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::spawn_blocking;

use super::{error::ApiError, fetch::fetch_font, response::respond_with_file, AppState};
use crate::{
    read_all_tables, read_selected_tables,
    schema::resolve_table_key,
    source::{FontSource, LoadedFont},
    update_font_bytes, FieldUpdateSet, FontContainer, FontDump, FontgateError, Tag,
    DEFAULT_SELECTION,
};

const FONT_FILE_PART: &str = "fontFile";
const TABLES_PART: &str = "tables";
const NEW_DATA_PART: &str = "newData";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FontDataRequest {
    font_url: Option<String>,
    tables: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateRequest {
    font_url: Option<String>,
    new_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Health {
    status: &'static str,
    version: &'static str,
}

pub(crate) async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/get-font-data`
pub(crate) async fn get_font_data(
    State(state): State<AppState>,
    payload: Result<Json<FontDataRequest>, JsonRejection>,
) -> Result<Json<FontDump>, ApiError> {
    let Json(request) = payload?;
    let url = required_url(request.font_url)?;
    let selection = table_selection(request.tables.as_deref())?;
    let fetched = fetch_font(&state.client, &url, state.config.max_font_bytes).await?;
    let dump = spawn_blocking(move || {
        let font = FontContainer::from_bytes(&fetched.bytes)?;
        Ok::<_, FontgateError>(read_selected_tables(&font, &selection))
    })
    .await
    .map_err(FontgateError::from)??;
    Ok(Json(dump))
}

/// `POST /api/get-all-font-data`
pub(crate) async fn get_all_font_data(
    State(state): State<AppState>,
    payload: Result<Json<FontDataRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let url = required_url(request.font_url)?;
    let fetched = fetch_font(&state.client, &url, state.config.max_font_bytes).await?;
    let body = spawn_blocking(move || {
        let font = FontContainer::from_bytes(&fetched.bytes)?;
        Ok::<_, FontgateError>(serde_json::to_string_pretty(&read_all_tables(&font))?)
    })
    .await
    .map_err(FontgateError::from)??;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// `POST /api/get-font-data-buffer`
pub(crate) async fn get_font_data_buffer(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FontDump>, ApiError> {
    let form = UploadForm::read(multipart?, state.config.max_font_bytes).await?;
    let selection = table_selection(form.tables.as_deref())?;
    let upload = form.required_font()?;
    let dump = spawn_blocking(move || {
        let font = FontContainer::from_bytes(&upload.bytes)?;
        Ok::<_, FontgateError>(read_selected_tables(&font, &selection))
    })
    .await
    .map_err(FontgateError::from)??;
    Ok(Json(dump))
}

/// `POST /api/update-font-data`
pub(crate) async fn update_font_data(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let url = required_url(request.font_url)?;
    let new_data = request
        .new_data
        .filter(|value| !value.is_null())
        .ok_or(FontgateError::MissingField(NEW_DATA_PART))?;
    let updates = FieldUpdateSet::from_json(&new_data)?;
    let fetched = fetch_font(&state.client, &url, state.config.max_font_bytes).await?;
    update_and_respond(fetched, updates).await
}

/// `POST /api/update-font-data-from-file`
pub(crate) async fn update_font_data_from_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart?, state.config.max_font_bytes).await?;
    let new_data = form
        .new_data
        .as_deref()
        .ok_or(FontgateError::MissingField(NEW_DATA_PART))?;
    let new_data: Value = serde_json::from_str(new_data).map_err(|e| {
        FontgateError::InvalidRequest(format!("newData is not valid JSON: {e}"))
    })?;
    let updates = FieldUpdateSet::from_json(&new_data)?;
    let upload = form.required_font()?;
    update_and_respond(upload, updates).await
}

async fn update_and_respond(
    font: LoadedFont,
    updates: FieldUpdateSet,
) -> Result<Response, ApiError> {
    let LoadedFont {
        bytes: original,
        source,
    } = font;
    let (original, updated) = spawn_blocking(move || {
        let updated = update_font_bytes(&original, &updates)?;
        Ok::<_, FontgateError>((original, updated))
    })
    .await
    .map_err(FontgateError::from)??;
    let filename = source.filename();
    Ok(respond_with_file(
        updated,
        &original,
        filename.as_deref(),
        source.declared_type(),
    )?)
}

fn required_url(url: Option<String>) -> Result<String, FontgateError> {
    url.map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(FontgateError::MissingField("fontUrl"))
}

/// The tables a caller asked for, or the default selection
fn table_selection(names: Option<&[String]>) -> Result<Vec<Tag>, FontgateError> {
    match names {
        None | Some([]) => Ok(DEFAULT_SELECTION.to_vec()),
        Some(names) => names
            .iter()
            .map(|name| {
                resolve_table_key(name.trim()).ok_or_else(|| {
                    FontgateError::InvalidRequest(format!("'{name}' is not a table name"))
                })
            })
            .collect(),
    }
}

/// The parts of a multipart upload we know about
#[derive(Debug, Default)]
struct UploadForm {
    font: Option<LoadedFont>,
    tables: Option<Vec<String>>,
    new_data: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self, FontgateError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(FONT_FILE_PART) => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if bytes.len() > max_bytes {
                        return Err(FontgateError::InvalidRequest(format!(
                            "uploaded font is larger than {max_bytes} bytes"
                        )));
                    }
                    log::info!(
                        "Received upload {} ({} bytes)",
                        filename.as_deref().unwrap_or("<unnamed>"),
                        bytes.len()
                    );
                    form.font = Some(LoadedFont {
                        bytes: bytes.to_vec(),
                        source: FontSource::Upload {
                            filename,
                            content_type,
                        },
                    });
                }
                Some(TABLES_PART) => {
                    form.tables = Some(parse_table_list(&field.text().await?));
                }
                Some(NEW_DATA_PART) => {
                    form.new_data = Some(field.text().await?);
                }
                other => {
                    log::debug!("Ignoring multipart field {:?}", other);
                }
            }
        }
        Ok(form)
    }

    fn required_font(self) -> Result<LoadedFont, FontgateError> {
        self.font.ok_or(FontgateError::MissingField(FONT_FILE_PART))
    }
}

/// A table list sent as a form field: a JSON array or comma-separated names
fn parse_table_list(text: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(text).unwrap_or_else(|_| {
        text.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{HEAD, HHEA, OS2};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_selection() {
        assert_eq!(table_selection(None).unwrap(), DEFAULT_SELECTION.to_vec());
        let names: Vec<String> = vec![];
        assert_eq!(
            table_selection(Some(names.as_slice())).unwrap(),
            DEFAULT_SELECTION.to_vec()
        );
        let names = vec!["OS/2".to_string(), "head".to_string()];
        assert_eq!(table_selection(Some(names.as_slice())).unwrap(), vec![OS2, HEAD]);
        let names = vec!["not a table".to_string()];
        assert!(matches!(
            table_selection(Some(names.as_slice())),
            Err(FontgateError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_table_list() {
        assert_eq!(parse_table_list(r#"["hhea", "os2"]"#), vec!["hhea", "os2"]);
        assert_eq!(parse_table_list("hhea, os2,"), vec!["hhea", "os2"]);
        assert_eq!(
            table_selection(Some(parse_table_list("hhea").as_slice())).unwrap(),
            vec![HHEA]
        );
    }

    #[test]
    fn test_required_url() {
        assert_eq!(
            required_url(Some(" https://example.com/a.ttf ".to_string())).unwrap(),
            "https://example.com/a.ttf"
        );
        assert!(matches!(
            required_url(Some("".to_string())),
            Err(FontgateError::MissingField("fontUrl"))
        ));
        assert!(matches!(
            required_url(None),
            Err(FontgateError::MissingField("fontUrl"))
        ));
    }
}
