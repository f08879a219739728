use crate::{
    filters::FontFilter,
    schema::schema_for,
    value::write_field,
    FieldUpdateSet, FontgateError,
};

/// A filter that writes caller-supplied values into table fields.
///
/// Updates are best effort: tables the font lacks, tables without a schema,
/// unknown field names, read-only fields and fields the table's version does
/// not carry are skipped without error. Only a value that cannot be stored in
/// its field is an error.
pub struct ApplyUpdates {
    updates: FieldUpdateSet,
}

impl ApplyUpdates {
    /// Create a new ApplyUpdates filter
    pub fn new(updates: FieldUpdateSet) -> Self {
        ApplyUpdates { updates }
    }
}

impl FontFilter for ApplyUpdates {
    fn apply(&self, font: &mut crate::FontContainer) -> Result<(), crate::FontgateError> {
        for (tag, fields) in self.updates.iter() {
            let Some(schema) = schema_for(*tag) else {
                log::debug!("No field layout known for '{}', skipping its updates", tag);
                continue;
            };
            let Some(data) = font.table_data_mut(*tag) else {
                log::debug!("Font has no '{}' table, skipping its updates", tag);
                continue;
            };
            for (name, value) in fields {
                let Some(field) = schema.field(name) else {
                    log::debug!("'{}' has no field '{}', ignoring", tag, name);
                    continue;
                };
                if !field.writable {
                    log::warn!("{}.{} cannot be changed, ignoring", tag, field.name);
                    continue;
                }
                if !schema.carries(data, field) {
                    log::debug!(
                        "This version of '{}' has no {} field, ignoring",
                        tag,
                        field.name
                    );
                    continue;
                }
                write_field(data, field, value).map_err(|reason| {
                    FontgateError::InvalidFieldValue {
                        table: *tag,
                        field: field.name.to_string(),
                        reason,
                    }
                })?;
                log::info!("Set {}.{} to {}", tag, field.name, value);
            }
        }
        Ok(())
    }

    fn from_str(s: &str) -> Result<Self, crate::FontgateError>
    where
        Self: Sized,
    {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| FontgateError::InvalidRequest(format!("updates are not valid JSON: {e}")))?;
        Ok(ApplyUpdates::new(FieldUpdateSet::from_json(&value)?))
    }
}
