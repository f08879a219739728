use indexmap::IndexMap;
use serde_json::Value;
use write_fonts::types::Tag;

use crate::{
    filters::{ApplyUpdates, FontFilter, NormalizeWeightClass},
    schema::{resolve_table_key, schema_for, OS2},
    FontContainer, FontgateError,
};

/// Field updates requested by a caller: table tag → field name → new value.
///
/// Values are kept as JSON until they are applied, since their type depends on
/// the field they land in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdateSet {
    tables: IndexMap<Tag, IndexMap<String, Value>>,
}

impl FieldUpdateSet {
    /// Create an empty update set
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an update of one field
    pub fn set(&mut self, table: Tag, field: impl Into<String>, value: Value) -> &mut Self {
        self.tables
            .entry(table)
            .or_default()
            .insert(field.into(), value);
        self
    }

    /// Whether no updates are queued
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(IndexMap::is_empty)
    }

    /// Iterate over the queued updates per table
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &IndexMap<String, Value>)> {
        self.tables.iter()
    }

    /// Parse the `newData` payload of an update request.
    ///
    /// Object values keyed by a table name (`head`, `hhea`, `os2`, `OS/2`,
    /// `post`, `maxp`, or any other tag) are field maps for that table. Any
    /// other top-level key is taken as an `OS/2` field, so
    /// `{"usWinAscent": 2000}` updates `OS/2.usWinAscent` and
    /// `{"panose": {"bWeight": 8}}` updates the `OS/2` PANOSE bytes.
    pub fn from_json(new_data: &Value) -> Result<Self, FontgateError> {
        let Value::Object(entries) = new_data else {
            return Err(FontgateError::InvalidRequest(
                "newData must be a JSON object".to_string(),
            ));
        };
        let mut updates = FieldUpdateSet::new();
        let os2 = schema_for(OS2);
        for (key, value) in entries {
            if os2.and_then(|schema| schema.field(key)).is_some() {
                updates.set(OS2, key.as_str(), value.clone());
                continue;
            }
            match (value, resolve_table_key(key)) {
                (Value::Object(fields), Some(tag)) => {
                    for (field, field_value) in fields {
                        updates.set(tag, field.as_str(), field_value.clone());
                    }
                }
                (Value::Object(_), None) => {
                    log::debug!("Ignoring updates for unknown table '{}'", key);
                }
                (scalar, _) => {
                    updates.set(OS2, key.as_str(), scalar.clone());
                }
            }
        }
        Ok(updates)
    }
}

/// Apply a set of field updates, then normalize `OS/2.usWeightClass`.
///
/// An absent `OS/2` table is created first (with a weight class of 400) so that
/// caller-supplied `OS/2` values land in it before the weight class is clamped
/// into 1..=1000.
pub fn apply_field_updates(
    font: &mut FontContainer,
    updates: &FieldUpdateSet,
) -> Result<(), FontgateError> {
    NormalizeWeightClass::ensure_os2(font)?;
    ApplyUpdates::new(updates.clone()).apply(font)?;
    NormalizeWeightClass::new().apply(font)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{HEAD, HHEA};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flat_payload_targets_os2() {
        let updates =
            FieldUpdateSet::from_json(&json!({"usWinAscent": 2000, "usWinDescent": 500})).unwrap();
        let mut expected = FieldUpdateSet::new();
        expected
            .set(OS2, "usWinAscent", json!(2000))
            .set(OS2, "usWinDescent", json!(500));
        assert_eq!(updates, expected);
    }

    #[test]
    fn test_nested_payload() {
        let updates = FieldUpdateSet::from_json(&json!({
            "head": {"ascender": 800, "descender": -200},
            "hhea": {"lineGap": 10},
            "os2": {"usWeightClass": 700},
            "OS/2": {"fsType": 0},
            "nosuchtable": {"foo": 1},
        }))
        .unwrap();
        let mut tables: Vec<(Tag, Vec<&str>)> = updates
            .iter()
            .map(|(tag, fields)| {
                let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
                names.sort();
                (*tag, names)
            })
            .collect();
        tables.sort();
        assert_eq!(
            tables,
            vec![
                (OS2, vec!["fsType", "usWeightClass"]),
                (HEAD, vec!["ascender", "descender"]),
                (HHEA, vec!["lineGap"]),
            ]
        );
    }

    #[test]
    fn test_top_level_os2_group() {
        let updates =
            FieldUpdateSet::from_json(&json!({"panose": {"bWeight": 9}, "fsType": 0})).unwrap();
        let mut got: Vec<(Tag, String, Value)> = updates
            .iter()
            .flat_map(|(tag, fields)| {
                fields
                    .iter()
                    .map(move |(name, value)| (*tag, name.clone(), value.clone()))
            })
            .collect();
        got.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(
            got,
            vec![
                (OS2, "fsType".to_string(), json!(0)),
                (OS2, "panose".to_string(), json!({"bWeight": 9})),
            ]
        );

        let mut font = crate::testdata::font();
        apply_field_updates(&mut font, &updates).unwrap();
        let Some(crate::FieldValue::Group(panose)) = font.field_value(OS2, "panose") else {
            panic!("OS/2 has no panose");
        };
        assert_eq!(panose["bWeight"], crate::FieldValue::Integer(9));
        assert_eq!(panose["bFamilyType"], crate::FieldValue::Integer(2));
    }

    #[test]
    fn test_payload_must_be_object() {
        assert!(matches!(
            FieldUpdateSet::from_json(&json!([1, 2])),
            Err(FontgateError::InvalidRequest(_))
        ));
        assert!(FieldUpdateSet::from_json(&json!({})).unwrap().is_empty());
    }
}
