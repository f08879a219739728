use write_fonts::tables::os2::Os2;

use crate::{
    filters::FontFilter,
    schema::{schema_for, OS2},
    value::read_field,
    FontContainer, FontgateError,
};

/// The weight class given to fonts which do not declare one
pub const DEFAULT_WEIGHT_CLASS: u16 = 400;
const MIN_WEIGHT_CLASS: u16 = 1;
const MAX_WEIGHT_CLASS: u16 = 1000;
const WEIGHT_CLASS_OFFSET: usize = 4;

/// A filter that clamps `OS/2.usWeightClass` into 1..=1000.
///
/// A font without an `OS/2` table gets a fresh one (see
/// [`NormalizeWeightClass::default_os2`]).
#[derive(Default)]
pub struct NormalizeWeightClass;

impl NormalizeWeightClass {
    /// Create a new NormalizeWeightClass filter
    pub fn new() -> Self {
        NormalizeWeightClass
    }

    /// A version 0 `OS/2` table with a regular weight, medium width and every
    /// other field zero.
    pub fn default_os2() -> Os2 {
        Os2 {
            us_weight_class: DEFAULT_WEIGHT_CLASS,
            us_width_class: 5,
            ..Default::default()
        }
    }

    /// Add the default `OS/2` table if the font has none
    pub fn ensure_os2(font: &mut FontContainer) -> Result<(), FontgateError> {
        if font.contains(OS2) {
            return Ok(());
        }
        log::info!("Font has no OS/2 table, creating one");
        let data = write_fonts::dump_table(&Self::default_os2())
            .map_err(|e| FontgateError::Encode(format!("could not build an OS/2 table: {e}")))?;
        font.set_table(OS2, data);
        Ok(())
    }
}

impl FontFilter for NormalizeWeightClass {
    fn apply(&self, font: &mut crate::FontContainer) -> Result<(), crate::FontgateError> {
        Self::ensure_os2(font)?;
        let field = schema_for(OS2)
            .and_then(|schema| schema.field("usWeightClass"))
            .ok_or_else(|| FontgateError::General("no layout for OS/2".to_string()))?;
        let Some(data) = font.table_data_mut(OS2) else {
            return Ok(());
        };
        let weight = match read_field(data, field).and_then(|v| v.as_integer()) {
            Some(current) => {
                let clamped = current.clamp(MIN_WEIGHT_CLASS.into(), MAX_WEIGHT_CLASS.into());
                if clamped != current {
                    log::info!("Clamping usWeightClass {} to {}", current, clamped);
                }
                clamped as u16
            }
            None => {
                log::warn!(
                    "OS/2 table is too short to hold usWeightClass, defaulting to {}",
                    DEFAULT_WEIGHT_CLASS
                );
                if data.len() < WEIGHT_CLASS_OFFSET + 2 {
                    data.resize(WEIGHT_CLASS_OFFSET + 2, 0);
                }
                DEFAULT_WEIGHT_CLASS
            }
        };
        data[WEIGHT_CLASS_OFFSET..WEIGHT_CLASS_OFFSET + 2].copy_from_slice(&weight.to_be_bytes());
        Ok(())
    }

    fn from_str(_s: &str) -> Result<Self, crate::FontgateError>
    where
        Self: Sized,
    {
        Ok(NormalizeWeightClass::new())
    }
}
