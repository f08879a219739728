//! Field layouts for the tables we know how to read and edit.
//!
//! Each supported table gets a closed list of fields with their byte offset and
//! wire type. Names follow the attribute names used by fontTools, which is what
//! existing clients of the HTTP API send and expect back.

use write_fonts::types::Tag;

/// `head` table tag
pub const HEAD: Tag = Tag::new(b"head");
/// `hhea` table tag
pub const HHEA: Tag = Tag::new(b"hhea");
/// `OS/2` table tag
pub const OS2: Tag = Tag::new(b"OS/2");
/// `maxp` table tag
pub const MAXP: Tag = Tag::new(b"maxp");
/// `post` table tag
pub const POST: Tag = Tag::new(b"post");

/// The wire type of a table field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// uint16
    U16,
    /// int16 (also FWORD)
    I16,
    /// uint32
    U32,
    /// 16.16 fixed point number
    Fixed,
    /// Version16Dot16, where the minor version lives in the top nibble
    Version16Dot16,
    /// Seconds since 1904-01-01, as a signed 64-bit integer
    LongDateTime,
    /// Four-byte tag
    Tag,
    /// The ten PANOSE classification bytes
    Panose,
}

impl FieldKind {
    /// Number of bytes the field occupies
    pub const fn size(self) -> usize {
        match self {
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::U32 | FieldKind::Fixed | FieldKind::Version16Dot16 | FieldKind::Tag => 4,
            FieldKind::LongDateTime => 8,
            FieldKind::Panose => 10,
        }
    }
}

/// A single named field of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// The field name, as seen by API clients
    pub name: &'static str,
    /// Byte offset from the start of the table
    pub offset: usize,
    /// Wire type
    pub kind: FieldKind,
    /// The first table version carrying this field (only for versioned tables)
    pub min_version: u16,
    /// Whether updates may touch this field
    pub writable: bool,
    /// Values written to this field are clamped into this range first
    pub clamp: Option<(i64, i64)>,
}

impl FieldDef {
    const fn new(name: &'static str, offset: usize, kind: FieldKind) -> Self {
        FieldDef {
            name,
            offset,
            kind,
            min_version: 0,
            writable: true,
            clamp: None,
        }
    }

    const fn since(mut self, version: u16) -> Self {
        self.min_version = version;
        self
    }

    const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    const fn clamped(mut self, min: i64, max: i64) -> Self {
        self.clamp = Some((min, max));
        self
    }

    /// The byte range of this field within its table
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.kind.size()
    }
}

/// The names of the PANOSE bytes, in table order
pub const PANOSE_FIELDS: [&str; 10] = [
    "bFamilyType",
    "bSerifStyle",
    "bWeight",
    "bProportion",
    "bContrast",
    "bStrokeVariation",
    "bArmStyle",
    "bLetterForm",
    "bMidline",
    "bXHeight",
];

/// The layout of one table type
#[derive(Debug)]
pub struct TableSchema {
    /// The table tag
    pub tag: Tag,
    /// The key used for this table in JSON payloads
    pub key: &'static str,
    /// Whether a uint16 version at offset 0 decides which fields exist
    pub versioned: bool,
    /// The fields, in table order
    pub fields: &'static [FieldDef],
    aliases: &'static [(&'static str, &'static str)],
}

use FieldKind::*;

const HEAD_FIELDS: &[FieldDef] = &[
    FieldDef::new("tableVersion", 0, Fixed).read_only(),
    FieldDef::new("fontRevision", 4, Fixed),
    FieldDef::new("checkSumAdjustment", 8, U32).read_only(),
    FieldDef::new("magicNumber", 12, U32).read_only(),
    FieldDef::new("flags", 16, U16),
    FieldDef::new("unitsPerEm", 18, U16),
    FieldDef::new("created", 20, LongDateTime),
    FieldDef::new("modified", 28, LongDateTime),
    FieldDef::new("xMin", 36, I16),
    FieldDef::new("yMin", 38, I16),
    FieldDef::new("xMax", 40, I16),
    FieldDef::new("yMax", 42, I16),
    FieldDef::new("macStyle", 44, U16),
    FieldDef::new("lowestRecPPEM", 46, U16),
    FieldDef::new("fontDirectionHint", 48, I16),
    FieldDef::new("indexToLocFormat", 50, I16).read_only(),
    FieldDef::new("glyphDataFormat", 52, I16).read_only(),
];

const HHEA_FIELDS: &[FieldDef] = &[
    FieldDef::new("tableVersion", 0, Fixed).read_only(),
    FieldDef::new("ascent", 4, I16),
    FieldDef::new("descent", 6, I16),
    FieldDef::new("lineGap", 8, I16),
    FieldDef::new("advanceWidthMax", 10, U16),
    FieldDef::new("minLeftSideBearing", 12, I16),
    FieldDef::new("minRightSideBearing", 14, I16),
    FieldDef::new("xMaxExtent", 16, I16),
    FieldDef::new("caretSlopeRise", 18, I16),
    FieldDef::new("caretSlopeRun", 20, I16),
    FieldDef::new("caretOffset", 22, I16),
    FieldDef::new("reserved0", 24, I16).read_only(),
    FieldDef::new("reserved1", 26, I16).read_only(),
    FieldDef::new("reserved2", 28, I16).read_only(),
    FieldDef::new("reserved3", 30, I16).read_only(),
    FieldDef::new("metricDataFormat", 32, I16).read_only(),
    FieldDef::new("numberOfHMetrics", 34, U16).read_only(),
];

const OS2_FIELDS: &[FieldDef] = &[
    FieldDef::new("version", 0, U16).read_only(),
    FieldDef::new("xAvgCharWidth", 2, I16),
    FieldDef::new("usWeightClass", 4, U16).clamped(1, 1000),
    FieldDef::new("usWidthClass", 6, U16),
    FieldDef::new("fsType", 8, U16),
    FieldDef::new("ySubscriptXSize", 10, I16),
    FieldDef::new("ySubscriptYSize", 12, I16),
    FieldDef::new("ySubscriptXOffset", 14, I16),
    FieldDef::new("ySubscriptYOffset", 16, I16),
    FieldDef::new("ySuperscriptXSize", 18, I16),
    FieldDef::new("ySuperscriptYSize", 20, I16),
    FieldDef::new("ySuperscriptXOffset", 22, I16),
    FieldDef::new("ySuperscriptYOffset", 24, I16),
    FieldDef::new("yStrikeoutSize", 26, I16),
    FieldDef::new("yStrikeoutPosition", 28, I16),
    FieldDef::new("sFamilyClass", 30, I16),
    FieldDef::new("panose", 32, Panose),
    FieldDef::new("ulUnicodeRange1", 42, U32),
    FieldDef::new("ulUnicodeRange2", 46, U32),
    FieldDef::new("ulUnicodeRange3", 50, U32),
    FieldDef::new("ulUnicodeRange4", 54, U32),
    FieldDef::new("achVendID", 58, FieldKind::Tag),
    FieldDef::new("fsSelection", 62, U16),
    FieldDef::new("usFirstCharIndex", 64, U16),
    FieldDef::new("usLastCharIndex", 66, U16),
    FieldDef::new("sTypoAscender", 68, I16),
    FieldDef::new("sTypoDescender", 70, I16),
    FieldDef::new("sTypoLineGap", 72, I16),
    FieldDef::new("usWinAscent", 74, U16),
    FieldDef::new("usWinDescent", 76, U16),
    FieldDef::new("ulCodePageRange1", 78, U32).since(1),
    FieldDef::new("ulCodePageRange2", 82, U32).since(1),
    FieldDef::new("sxHeight", 86, I16).since(2),
    FieldDef::new("sCapHeight", 88, I16).since(2),
    FieldDef::new("usDefaultChar", 90, U16).since(2),
    FieldDef::new("usBreakChar", 92, U16).since(2),
    FieldDef::new("usMaxContext", 94, U16).since(2),
    FieldDef::new("usLowerOpticalPointSize", 96, U16).since(5),
    FieldDef::new("usUpperOpticalPointSize", 98, U16).since(5),
];

const MAXP_FIELDS: &[FieldDef] = &[
    FieldDef::new("tableVersion", 0, Version16Dot16).read_only(),
    FieldDef::new("numGlyphs", 4, U16).read_only(),
    FieldDef::new("maxPoints", 6, U16),
    FieldDef::new("maxContours", 8, U16),
    FieldDef::new("maxCompositePoints", 10, U16),
    FieldDef::new("maxCompositeContours", 12, U16),
    FieldDef::new("maxZones", 14, U16),
    FieldDef::new("maxTwilightPoints", 16, U16),
    FieldDef::new("maxStorage", 18, U16),
    FieldDef::new("maxFunctionDefs", 20, U16),
    FieldDef::new("maxInstructionDefs", 22, U16),
    FieldDef::new("maxStackElements", 24, U16),
    FieldDef::new("maxSizeOfInstructions", 26, U16),
    FieldDef::new("maxComponentElements", 28, U16),
    FieldDef::new("maxComponentDepth", 30, U16),
];

const POST_FIELDS: &[FieldDef] = &[
    FieldDef::new("formatType", 0, Version16Dot16).read_only(),
    FieldDef::new("italicAngle", 4, Fixed),
    FieldDef::new("underlinePosition", 8, I16),
    FieldDef::new("underlineThickness", 10, I16),
    FieldDef::new("isFixedPitch", 12, U32),
    FieldDef::new("minMemType42", 16, U32),
    FieldDef::new("maxMemType42", 20, U32),
    FieldDef::new("minMemType1", 24, U32),
    FieldDef::new("maxMemType1", 28, U32),
];

/// Every table type with a known layout
pub static SCHEMAS: &[TableSchema] = &[
    TableSchema {
        tag: HEAD,
        key: "head",
        versioned: false,
        fields: HEAD_FIELDS,
        aliases: &[],
    },
    TableSchema {
        tag: HHEA,
        key: "hhea",
        versioned: false,
        fields: HHEA_FIELDS,
        aliases: &[("ascender", "ascent"), ("descender", "descent")],
    },
    TableSchema {
        tag: OS2,
        key: "os2",
        versioned: true,
        fields: OS2_FIELDS,
        aliases: &[("sTypoDecender", "sTypoDescender")],
    },
    TableSchema {
        tag: MAXP,
        key: "maxp",
        versioned: false,
        fields: MAXP_FIELDS,
        aliases: &[],
    },
    TableSchema {
        tag: POST,
        key: "post",
        versioned: false,
        fields: POST_FIELDS,
        aliases: &[],
    },
];

/// Look up the layout for a table tag
pub fn schema_for(tag: Tag) -> Option<&'static TableSchema> {
    SCHEMAS.iter().find(|schema| schema.tag == tag)
}

/// The key used for a table in JSON output: the schema key if we know the
/// table, otherwise the tag itself.
pub fn table_key(tag: Tag) -> String {
    match schema_for(tag) {
        Some(schema) => schema.key.to_string(),
        None => tag.to_string(),
    }
}

/// Resolve a table name sent by a client into a tag.
///
/// Accepts schema keys (`os2`), real tags (`OS/2`) and tags shorter than four
/// characters, which are padded with spaces (`cvt` becomes `cvt `).
pub fn resolve_table_key(key: &str) -> Option<Tag> {
    if let Some(schema) = SCHEMAS
        .iter()
        .find(|schema| schema.key.eq_ignore_ascii_case(key))
    {
        return Some(schema.tag);
    }
    if key.eq_ignore_ascii_case("os/2") {
        return Some(OS2);
    }
    tag_from_string(key)
}

pub(crate) fn tag_from_string(s: &str) -> Option<Tag> {
    if s.is_empty() || s.len() > 4 || !s.is_ascii() {
        return None;
    }
    let mut bytes = [b' '; 4];
    bytes[..s.len()].copy_from_slice(s.as_bytes());
    Some(Tag::new(&bytes))
}

impl TableSchema {
    /// Find a field by name or alias
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        let name = self
            .aliases
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, real)| *real)
            .unwrap_or(name);
        self.fields.iter().find(|field| field.name == name)
    }

    /// The table version, for versioned tables
    pub fn version_of(&self, data: &[u8]) -> Option<u16> {
        if !self.versioned {
            return None;
        }
        data.get(0..2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    /// Whether this table's data actually carries the field: the field must fit
    /// inside the data, and versioned tables must be recent enough.
    pub fn carries(&self, data: &[u8], field: &FieldDef) -> bool {
        if field.range().end > data.len() {
            return false;
        }
        match self.version_of(data) {
            Some(version) => version >= field.min_version,
            None => true,
        }
    }

    /// The fields present in the given table data, in table order
    pub fn present_fields<'a>(&'a self, data: &'a [u8]) -> impl Iterator<Item = &'a FieldDef> {
        self.fields
            .iter()
            .filter(move |field| self.carries(data, field))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_do_not_overlap() {
        for schema in SCHEMAS {
            let mut end = 0;
            for field in schema.fields {
                assert!(
                    field.offset >= end,
                    "{}.{} overlaps the previous field",
                    schema.key,
                    field.name
                );
                end = field.range().end;
            }
        }
    }

    #[test]
    fn test_table_sizes() {
        let size = |tag| schema_for(tag).unwrap().fields.last().unwrap().range().end;
        assert_eq!(size(HEAD), 54);
        assert_eq!(size(HHEA), 36);
        assert_eq!(size(OS2), 100);
        assert_eq!(size(MAXP), 32);
        assert_eq!(size(POST), 32);
    }

    #[test]
    fn test_resolve_table_key() {
        assert_eq!(resolve_table_key("os2"), Some(OS2));
        assert_eq!(resolve_table_key("OS/2"), Some(OS2));
        assert_eq!(resolve_table_key("head"), Some(HEAD));
        assert_eq!(resolve_table_key("cvt"), Some(Tag::new(b"cvt ")));
        assert_eq!(resolve_table_key("GSUB"), Some(Tag::new(b"GSUB")));
        assert_eq!(resolve_table_key("toolong"), None);
        assert_eq!(resolve_table_key(""), None);
    }

    #[test]
    fn test_aliases() {
        let hhea = schema_for(HHEA).unwrap();
        assert_eq!(hhea.field("ascender").unwrap().name, "ascent");
        assert_eq!(hhea.field("descent").unwrap().offset, 6);
        assert!(hhea.field("usWinAscent").is_none());
    }

    #[test]
    fn test_os2_versions() {
        let os2 = schema_for(OS2).unwrap();
        let mut v0 = vec![0u8; 78];
        // version through usWinDescent
        assert_eq!(os2.present_fields(&v0).count(), 30);
        // Version 1 claimed, but the data is too short to hold the code pages
        v0[1] = 1;
        assert!(!os2.carries(&v0, os2.field("ulCodePageRange1").unwrap()));

        let mut v4 = vec![0u8; 96];
        v4[1] = 4;
        assert!(os2.carries(&v4, os2.field("sxHeight").unwrap()));
        assert!(!os2.carries(&v4, os2.field("usLowerOpticalPointSize").unwrap()));

        // Data long enough for optical sizes, but the version says otherwise
        let mut padded = vec![0u8; 100];
        padded[1] = 4;
        assert!(!os2.carries(&padded, os2.field("usUpperOpticalPointSize").unwrap()));
    }
}
