//! Small fonts assembled in memory for unit tests.
#![allow(clippy::unwrap_used)]

use write_fonts::{
    tables::{head::Head, hhea::Hhea, maxp::Maxp, os2::Os2},
    types::{FWord, Tag},
    FontBuilder,
};

use crate::{schema::OS2, FontContainer};

/// An opaque table with no schema
pub(crate) const TEST_TAG: Tag = Tag::new(b"TEST");

pub(crate) fn os2() -> Os2 {
    Os2 {
        us_weight_class: 1500,
        us_width_class: 5,
        us_win_ascent: 900,
        us_win_descent: 250,
        s_typo_ascender: 800,
        s_typo_line_gap: 200,
        panose_10: [2, 11, 5, 3, 0, 0, 0, 0, 0, 4],
        ach_vend_id: Tag::new(b"FGTE"),
        ..Default::default()
    }
}

/// A font with `head`, `hhea`, `maxp`, `OS/2` and an opaque `TEST` table,
/// with any of them replaced by the raw tables given.
pub(crate) fn font_with_tables(raw: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    builder
        .add_table(&Head {
            units_per_em: 1000,
            ..Default::default()
        })
        .unwrap();
    builder
        .add_table(&Hhea {
            ascender: FWord::new(800),
            descender: FWord::new(-200),
            number_of_h_metrics: 1,
            ..Default::default()
        })
        .unwrap();
    builder
        .add_table(&Maxp {
            num_glyphs: 1,
            ..Default::default()
        })
        .unwrap();
    builder.add_table(&os2()).unwrap();
    builder.add_raw(TEST_TAG, vec![1u8, 2, 3, 4, 5]);
    for (tag, data) in raw {
        builder.add_raw(*tag, data.clone());
    }
    builder.build()
}

pub(crate) fn font_bytes() -> Vec<u8> {
    font_with_tables(&[])
}

pub(crate) fn font() -> FontContainer {
    FontContainer::from_bytes(&font_bytes()).unwrap()
}

/// The test font with its `OS/2` table removed
pub(crate) fn font_without_os2() -> FontContainer {
    let font = font();
    let mut stripped = FontBuilder::new();
    for tag in font.tags().filter(|tag| *tag != OS2) {
        stripped.add_raw(tag, font.table_data(tag).unwrap().to_vec());
    }
    FontContainer::from_bytes(&stripped.build()).unwrap()
}
