#![allow(dead_code, clippy::unwrap_used)]

use write_fonts::{
    tables::{head::Head, hhea::Hhea, maxp::Maxp, os2::Os2},
    types::{FWord, Tag},
    FontBuilder,
};

/// A small TrueType font with `head`, `hhea`, `maxp` and `OS/2`, whose weight
/// class is out of range.
pub fn font_bytes() -> Vec<u8> {
    build(true)
}

/// The same font with no `OS/2` table
pub fn font_bytes_without_os2() -> Vec<u8> {
    build(false)
}

fn build(with_os2: bool) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    builder
        .add_table(&Head {
            units_per_em: 2048,
            ..Default::default()
        })
        .unwrap();
    builder
        .add_table(&Hhea {
            ascender: FWord::new(1900),
            descender: FWord::new(-500),
            line_gap: FWord::new(0),
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
    if with_os2 {
        builder
            .add_table(&Os2 {
                us_weight_class: 1500,
                us_width_class: 5,
                us_win_ascent: 1900,
                us_win_descent: 500,
                panose_10: [2, 0, 5, 3, 0, 0, 0, 0, 0, 0],
                ach_vend_id: Tag::new(b"TEST"),
                ..Default::default()
            })
            .unwrap();
    }
    builder.add_raw(Tag::new(b"zzzz"), vec![0u8; 6]);
    builder.build()
}

/// Write bytes to a fresh file under the system temp directory
pub fn temp_font(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("fontgate-{}-{}", std::process::id(), name));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.ttf"));
    std::fs::write(&path, bytes).unwrap();
    path
}
