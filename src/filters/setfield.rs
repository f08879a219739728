use serde_json::Value;
use write_fonts::types::Tag;

use crate::{
    filters::{ApplyUpdates, FontFilter},
    schema::resolve_table_key,
    FieldUpdateSet, FontgateError,
};

/// A filter that sets a single field, written as `table.field=value`
pub struct SetField {
    table: Tag,
    field: String,
    value: Value,
}

impl SetField {
    /// Create a new SetField filter
    pub fn new(table: Tag, field: impl Into<String>, value: Value) -> Self {
        SetField {
            table,
            field: field.into(),
            value,
        }
    }
}

impl FontFilter for SetField {
    fn apply(&self, font: &mut crate::FontContainer) -> Result<(), crate::FontgateError> {
        let mut updates = FieldUpdateSet::new();
        updates.set(self.table, self.field.as_str(), self.value.clone());
        ApplyUpdates::new(updates).apply(font)
    }

    fn from_str(s: &str) -> Result<Self, crate::FontgateError>
    where
        Self: Sized,
    {
        let bad = || {
            FontgateError::InvalidRequest(format!(
                "expected 'table.field=value', got '{}'",
                s
            ))
        };
        let (path, raw_value) = s.split_once('=').ok_or_else(bad)?;
        let (table, field) = path.rsplit_once('.').ok_or_else(bad)?;
        let table = resolve_table_key(table.trim()).ok_or_else(bad)?;
        // Anything that is not valid JSON is taken as a bare string
        let value = serde_json::from_str(raw_value.trim())
            .unwrap_or_else(|_| Value::String(raw_value.trim().to_string()));
        Ok(SetField::new(table, field.trim(), value))
    }
}
