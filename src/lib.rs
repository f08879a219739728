#![deny(clippy::unwrap_used, clippy::expect_used)]
//! Read and edit the metadata tables of TrueType and OpenType fonts.
//!
//! A font is decoded into a [`FontContainer`], which keeps the raw bytes of
//! every table. The `head`, `hhea`, `OS/2`, `maxp` and `post` tables can be
//! dumped into named fields ([`read_selected_tables`]) and edited through a
//! [`FieldUpdateSet`] ([`apply_field_updates`]). With the `server` feature the
//! same operations are offered over HTTP by the [`server`] module.

mod container;
mod dump;
mod error;
pub mod filters;
pub mod schema;
pub mod source;
mod update;
mod value;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod testdata;

pub use crate::{
    container::FontContainer,
    dump::{
        read_all_tables, read_selected_tables, read_table, FontDump, TableDump,
        DEFAULT_SELECTION,
    },
    error::FontgateError,
    update::{apply_field_updates, FieldUpdateSet},
    value::FieldValue,
};
pub use write_fonts::types::Tag;
use std::path::PathBuf;

/// Load a font from a file on disk
pub fn load(filename: impl Into<PathBuf>) -> Result<FontContainer, FontgateError> {
    let pb = filename.into();
    let data = std::fs::read(&pb)?;
    let font = FontContainer::from_bytes(&data).map_err(|e| match e {
        FontgateError::Decode(msg) => FontgateError::Decode(format!("{}: {}", pb.display(), msg)),
        other => other,
    })?;
    log::debug!("Loaded {}", pb.display());
    Ok(font)
}

/// Decode a font, apply field updates and encode it again
pub fn update_font_bytes(data: &[u8], updates: &FieldUpdateSet) -> Result<Vec<u8>, FontgateError> {
    let mut font = FontContainer::from_bytes(data)?;
    apply_field_updates(&mut font, updates)?;
    font.encode()
}
