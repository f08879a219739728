use std::collections::BTreeMap;

use write_fonts::{
    read::{FontRef, TableProvider},
    types::Tag,
    FontBuilder,
};

use crate::{
    schema::{schema_for, HEAD, HHEA, MAXP, OS2, POST},
    value::{read_field, FieldValue},
    FontgateError,
};

/// Offset of `checkSumAdjustment` inside the `head` table
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// A decoded font: its sfnt version and the raw data of every table.
///
/// Tables are held as owned bytes so that edits can be made in place; the
/// table directory is rebuilt from scratch by [`FontContainer::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontContainer {
    sfnt_version: u32,
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl FontContainer {
    /// Decode a font from the bytes of a TrueType or OpenType file.
    ///
    /// Every table we have a schema for must parse cleanly, so that later
    /// edits are never made on top of a damaged table.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontgateError> {
        if let Some(flavor) = unsupported_flavor(data) {
            return Err(FontgateError::Decode(format!("{flavor} files are not supported")));
        }
        let font = FontRef::new(data)?;
        validate_known_tables(&font)?;

        let mut tables = BTreeMap::new();
        for record in font.table_directory.table_records() {
            let tag = record.tag();
            let table = font.table_data(tag).ok_or_else(|| {
                FontgateError::Decode(format!("table '{tag}' lies outside the font data"))
            })?;
            tables.insert(tag, table.as_bytes().to_vec());
        }
        log::debug!("Decoded font with {} tables", tables.len());
        Ok(FontContainer {
            sfnt_version: font.table_directory.sfnt_version(),
            tables,
        })
    }

    /// The sfnt version of the font (TrueType, `OTTO` or `true`)
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The tags of all tables, in tag order
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tables.keys().copied()
    }

    /// Whether the font has a table with this tag
    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// Raw data of a table
    pub fn table_data(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.get(&tag).map(Vec::as_slice)
    }

    /// Mutable raw data of a table
    pub fn table_data_mut(&mut self, tag: Tag) -> Option<&mut Vec<u8>> {
        self.tables.get_mut(&tag)
    }

    /// Insert or replace a table
    pub fn set_table(&mut self, tag: Tag, data: Vec<u8>) {
        self.tables.insert(tag, data);
    }

    /// Read a single named field, if both the table and the field exist
    pub fn field_value(&self, tag: Tag, name: &str) -> Option<FieldValue> {
        let schema = schema_for(tag)?;
        let data = self.table_data(tag)?;
        let field = schema.field(name)?;
        if !schema.carries(data, field) {
            return None;
        }
        read_field(data, field)
    }

    /// Serialize the font back into a binary file.
    ///
    /// The table directory is assembled by [`FontBuilder`]; we then restore the
    /// original sfnt version, recompute `head.checkSumAdjustment` and decode the
    /// result again to make sure nothing we hand out is unreadable.
    pub fn encode(&self) -> Result<Vec<u8>, FontgateError> {
        let mut builder = FontBuilder::new();
        for (tag, data) in &self.tables {
            if *tag == HEAD {
                // The head record checksum is taken with the adjustment zeroed
                let mut head = data.clone();
                if let Some(adjustment) = head
                    .get_mut(CHECKSUM_ADJUSTMENT_OFFSET..CHECKSUM_ADJUSTMENT_OFFSET + 4)
                {
                    adjustment.fill(0);
                }
                builder.add_raw(*tag, head);
            } else {
                builder.add_raw(*tag, data.as_slice());
            }
        }
        let mut bytes = builder.build();
        bytes
            .get_mut(0..4)
            .ok_or_else(|| FontgateError::Encode("font builder produced no header".to_string()))?
            .copy_from_slice(&self.sfnt_version.to_be_bytes());

        // The adjustment is computed over the whole file with its own slot zeroed
        if let Some(head_offset) = table_offset(&bytes, HEAD)? {
            let start = head_offset + CHECKSUM_ADJUSTMENT_OFFSET;
            bytes
                .get_mut(start..start + 4)
                .ok_or_else(|| FontgateError::Encode("head table is truncated".to_string()))?
                .fill(0);
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&bytes));
            bytes[start..start + 4].copy_from_slice(&adjustment.to_be_bytes());
        }

        FontContainer::from_bytes(&bytes)
            .map_err(|e| FontgateError::Encode(format!("rebuilt font does not decode: {e}")))?;
        Ok(bytes)
    }
}

/// The OpenType table checksum: the wrapping sum of big-endian u32 words, with
/// the final word zero-padded.
pub(crate) fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn table_offset(font_data: &[u8], tag: Tag) -> Result<Option<usize>, FontgateError> {
    let font = FontRef::new(font_data)
        .map_err(|e| FontgateError::Encode(format!("rebuilt table directory is invalid: {e}")))?;
    Ok(font
        .table_directory
        .table_records()
        .iter()
        .find(|record| record.tag() == tag)
        .map(|record| record.offset() as usize))
}

fn unsupported_flavor(data: &[u8]) -> Option<&'static str> {
    match data.get(0..4)? {
        b"wOFF" => Some("WOFF"),
        b"wOF2" => Some("WOFF2"),
        b"ttcf" => Some("Font collection"),
        _ => None,
    }
}

fn validate_known_tables(font: &FontRef) -> Result<(), FontgateError> {
    let present = |tag: Tag| font.table_data(tag).is_some();
    let check = |tag: Tag, result: Result<(), write_fonts::read::ReadError>| {
        result.map_err(|e| FontgateError::Decode(format!("malformed '{tag}' table: {e}")))
    };
    if present(HEAD) {
        check(HEAD, font.head().map(|_| ()))?;
    }
    if present(HHEA) {
        check(HHEA, font.hhea().map(|_| ()))?;
    }
    if present(OS2) {
        check(OS2, font.os2().map(|_| ()))?;
    }
    if present(MAXP) {
        check(MAXP, font.maxp().map(|_| ()))?;
    }
    if present(POST) {
        check(POST, font.post().map(|_| ()))?;
    }
    Ok(())
}
