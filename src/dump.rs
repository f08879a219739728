//! Turning decoded tables into plain field maps.

use indexmap::IndexMap;
use write_fonts::types::Tag;

use crate::{
    container::checksum,
    schema::{schema_for, table_key, HEAD, HHEA, OS2},
    value::{read_field, FieldValue},
    FontContainer,
};

/// The fields of one table, in table order
pub type TableDump = IndexMap<&'static str, FieldValue>;

/// Table dumps keyed by table
pub type FontDump = IndexMap<String, TableDump>;

/// The tables returned by the `get-font-data` family of endpoints when the
/// caller does not choose
pub const DEFAULT_SELECTION: [Tag; 3] = [HEAD, HHEA, OS2];

/// Dump a single table.
///
/// Tables with a schema are flattened into their named fields. Anything else is
/// reported as an opaque placeholder holding its length and checksum.
pub fn read_table(font: &FontContainer, tag: Tag) -> Option<TableDump> {
    let data = font.table_data(tag)?;
    let dump = match schema_for(tag) {
        Some(schema) => schema
            .present_fields(data)
            .filter_map(|field| Some((field.name, read_field(data, field)?)))
            .collect(),
        None => IndexMap::from([
            ("length", FieldValue::Integer(data.len() as i64)),
            ("checksum", FieldValue::Integer(checksum(data).into())),
        ]),
    };
    Some(dump)
}

/// Dump every table in the font, keyed by table tag
pub fn read_all_tables(font: &FontContainer) -> FontDump {
    font.tags()
        .filter_map(|tag| Some((tag.to_string(), read_table(font, tag)?)))
        .collect()
}

/// Dump the given tables, keyed by their JSON key (`os2` for `OS/2`).
///
/// Tables the font does not have are left out of the result.
pub fn read_selected_tables(font: &FontContainer, tags: &[Tag]) -> FontDump {
    let mut dump = FontDump::new();
    for tag in tags {
        match read_table(font, *tag) {
            Some(table) => {
                dump.insert(table_key(*tag), table);
            }
            None => log::debug!("Table '{}' not found, leaving it out", tag),
        }
    }
    dump
}
