/// Macro to declare filters with less boilerplate
///
/// Usage: `declare_filters! { TypeName(module_name) => "cli_name", ... }`
macro_rules! declare_filters {
    ($($(#[$meta:meta])* $type:ident($module:ident) => $name:literal),* $(,)?) => {
        // Import modules
        $(
            $(#[$meta])*
            mod $module;
        )*

        // Re-export types
        $(
            $(#[$meta])*
            pub use $module::$type;
        )*

        /// The names filters are known by on the command line
        pub const FILTER_NAMES: &[&str] = &[$($name),*];

        /// Convert a CLI filter name and argument to a FontFilter instance
        pub fn cli_to_filter(name: &str, arg: &str) -> Result<Box<dyn FontFilter>, crate::FontgateError> {
            Ok(match name {
                $(
                    $(#[$meta])*
                    $name => Box::new($type::from_str(arg)?),
                )*
                _ => {
                    return Err(crate::FontgateError::InvalidRequest(format!(
                        "Unknown filter: {}",
                        name
                    )))
                }
            })
        }
    };
}

// Declare all filters in one place
declare_filters! {
    ApplyUpdates(applyupdates) => "updates",
    SetField(setfield) => "set",
    NormalizeWeightClass(normalizeweightclass) => "normalize-weight",
}

/// A trait for edits that can be applied to a decoded font
pub trait FontFilter {
    /// Apply the filter to the given font
    fn apply(&self, font: &mut crate::FontContainer) -> Result<(), crate::FontgateError>;

    /// Parse a FontFilter from a string argument
    fn from_str(s: &str) -> Result<Self, crate::FontgateError>
    where
        Self: Sized;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{schema::OS2, testdata, FieldValue};

    #[test]
    fn test_cli_to_filter() {
        let mut font = testdata::font();
        for (name, arg) in [
            ("set", "OS/2.usWinAscent=1234"),
            ("updates", r#"{"hhea": {"lineGap": 12}}"#),
            ("normalize-weight", ""),
        ] {
            cli_to_filter(name, arg).unwrap().apply(&mut font).unwrap();
        }
        assert_eq!(
            font.field_value(OS2, "usWinAscent"),
            Some(FieldValue::Integer(1234))
        );
        assert_eq!(
            font.field_value(crate::schema::HHEA, "lineGap"),
            Some(FieldValue::Integer(12))
        );
        assert_eq!(
            font.field_value(OS2, "usWeightClass"),
            Some(FieldValue::Integer(1000))
        );
        assert!(cli_to_filter("dropeverything", "").is_err());
        assert_eq!(FILTER_NAMES, &["updates", "set", "normalize-weight"]);
    }
}
