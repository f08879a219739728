use std::io;
use thiserror::Error;
use write_fonts::types::Tag;

/// Errors produced while fetching, reading or rebuilding a font
#[derive(Debug, Error)]
pub enum FontgateError {
    /// The font could not be fetched from its URL
    #[error("Could not fetch font: {0}")]
    SourceUnavailable(String),

    /// The bytes are not a font container we can read
    #[error("Error decoding font: {0}")]
    Decode(String),

    /// A required request parameter was absent
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// The request was malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid value for {table}.{field}: {reason}")]
    /// A field update carried a value the field cannot hold
    InvalidFieldValue {
        /// The table tag
        table: Tag,
        /// The field name
        field: String,
        /// Why the value was refused
        reason: String,
    },

    /// The rebuilt font failed verification
    #[error("Error encoding font: {0}")]
    Encode(String),

    /// None of the requested tables exist in the font
    #[error("Table(s) not found: {0}")]
    TableNotFound(String),

    /// Bad start-up configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// General error with a message
    #[error("{0}")]
    General(String),

    #[error("IO Error: {0}")]
    /// IO error
    IO(#[from] io::Error),

    #[error("JSON conversion error: {0}")]
    /// JSON conversion error
    JsonSerialize(#[from] serde_json::Error),
}

impl FontgateError {
    /// Whether the error was caused by what the caller sent us, as opposed to
    /// a failure on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FontgateError::Decode(_)
                | FontgateError::MissingField(_)
                | FontgateError::InvalidRequest(_)
                | FontgateError::InvalidFieldValue { .. }
                | FontgateError::TableNotFound(_)
        )
    }
}

impl From<write_fonts::read::ReadError> for FontgateError {
    fn from(val: write_fonts::read::ReadError) -> Self {
        FontgateError::Decode(val.to_string())
    }
}
