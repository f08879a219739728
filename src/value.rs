use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use write_fonts::types::Tag;

use crate::schema::{FieldDef, FieldKind, PANOSE_FIELDS};

/// The value of a single table field, as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Any integer field, including bit fields and dates
    Integer(i64),
    /// Fixed-point fields
    Number(f64),
    /// Tags
    Text(String),
    /// A nested descriptor flattened one level, such as PANOSE
    Group(IndexMap<&'static str, FieldValue>),
}

impl FieldValue {
    /// The integer value, if this is an integer field
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

fn be_bytes<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    data.get(offset..offset + N)?.try_into().ok()
}

/// Read a field out of raw table data. Returns `None` if the data is too short.
pub(crate) fn read_field(data: &[u8], field: &FieldDef) -> Option<FieldValue> {
    let at = field.offset;
    Some(match field.kind {
        FieldKind::U16 => FieldValue::Integer(u16::from_be_bytes(be_bytes(data, at)?).into()),
        FieldKind::I16 => FieldValue::Integer(i16::from_be_bytes(be_bytes(data, at)?).into()),
        FieldKind::U32 => FieldValue::Integer(u32::from_be_bytes(be_bytes(data, at)?).into()),
        FieldKind::Fixed => {
            FieldValue::Number(i32::from_be_bytes(be_bytes(data, at)?) as f64 / 65536.0)
        }
        FieldKind::Version16Dot16 => {
            let raw = u32::from_be_bytes(be_bytes(data, at)?);
            let major = (raw >> 16) as f64;
            let minor = ((raw >> 12) & 0xF) as f64;
            FieldValue::Number(major + minor / 10.0)
        }
        FieldKind::LongDateTime => FieldValue::Integer(i64::from_be_bytes(be_bytes(data, at)?)),
        FieldKind::Tag => FieldValue::Text(Tag::new(&be_bytes(data, at)?).to_string()),
        FieldKind::Panose => {
            let bytes: [u8; 10] = be_bytes(data, at)?;
            FieldValue::Group(
                PANOSE_FIELDS
                    .iter()
                    .zip(bytes)
                    .map(|(name, byte)| (*name, FieldValue::Integer(byte.into())))
                    .collect(),
            )
        }
    })
}

/// Write a JSON value into raw table data, checking it fits the field's type.
///
/// On failure the data is left untouched and the reason is returned.
pub(crate) fn write_field(data: &mut [u8], field: &FieldDef, value: &Value) -> Result<(), String> {
    let bytes: Vec<u8> = match field.kind {
        FieldKind::U16 => (integer_in_range(field, value, 0, u16::MAX.into())? as u16)
            .to_be_bytes()
            .to_vec(),
        FieldKind::I16 => (integer_in_range(field, value, i16::MIN.into(), i16::MAX.into())?
            as i16)
            .to_be_bytes()
            .to_vec(),
        FieldKind::U32 => (integer_in_range(field, value, 0, u32::MAX.into())? as u32)
            .to_be_bytes()
            .to_vec(),
        FieldKind::LongDateTime => integer_in_range(field, value, i64::MIN, i64::MAX)?
            .to_be_bytes()
            .to_vec(),
        FieldKind::Fixed => {
            let number = as_number(value).ok_or_else(|| format!("expected a number, got {value}"))?;
            let raw = (number * 65536.0).round();
            if !(i32::MIN as f64..=i32::MAX as f64).contains(&raw) {
                return Err(format!("{number} does not fit in a 16.16 fixed value"));
            }
            (raw as i32).to_be_bytes().to_vec()
        }
        FieldKind::Version16Dot16 => return Err("table versions cannot be changed".to_string()),
        FieldKind::Tag => tag_bytes(value)?.to_vec(),
        FieldKind::Panose => {
            let current: [u8; 10] = be_bytes(data, field.offset)
                .ok_or_else(|| "table is too short for PANOSE".to_string())?;
            panose_bytes(current, value)?.to_vec()
        }
    };
    let target = data
        .get_mut(field.range())
        .ok_or_else(|| format!("table is too short for {}", field.name))?;
    target.copy_from_slice(&bytes);
    Ok(())
}

/// Numbers may arrive as JSON numbers or as numeric strings from form inputs.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn integer_in_range(field: &FieldDef, value: &Value, min: i64, max: i64) -> Result<i64, String> {
    let mut int = as_integer(value).ok_or_else(|| format!("expected an integer, got {value}"))?;
    if let Some((low, high)) = field.clamp {
        int = int.clamp(low, high);
    }
    if int < min || int > max {
        return Err(format!("{int} is out of range {min}..={max}"));
    }
    Ok(int)
}

fn tag_bytes(value: &Value) -> Result<[u8; 4], String> {
    let Value::String(s) = value else {
        return Err(format!("expected a string of up to four characters, got {value}"));
    };
    if s.is_empty() || s.len() > 4 || !s.is_ascii() {
        return Err(format!("'{s}' is not a valid tag"));
    }
    let mut bytes = [b' '; 4];
    bytes[..s.len()].copy_from_slice(s.as_bytes());
    Ok(bytes)
}

/// PANOSE accepts either an array of ten bytes or an object naming some of the
/// bytes; unnamed bytes keep their current value.
fn panose_bytes(mut current: [u8; 10], value: &Value) -> Result<[u8; 10], String> {
    let byte = |name: &str, v: &Value| -> Result<u8, String> {
        as_integer(v)
            .and_then(|i| u8::try_from(i).ok())
            .ok_or_else(|| format!("{name} must be an integer in 0..=255, got {v}"))
    };
    match value {
        Value::Array(items) => {
            if items.len() != current.len() {
                return Err(format!("expected 10 PANOSE bytes, got {}", items.len()));
            }
            for (slot, item) in current.iter_mut().zip(items) {
                *slot = byte("PANOSE byte", item)?;
            }
        }
        Value::Object(map) => {
            for (index, name) in PANOSE_FIELDS.iter().enumerate() {
                if let Some(v) = map.get(*name) {
                    current[index] = byte(name, v)?;
                }
            }
        }
        other => return Err(format!("expected an object or array, got {other}")),
    }
    Ok(current)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{schema_for, HEAD, OS2, POST};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn os2_field(name: &str) -> &'static FieldDef {
        schema_for(OS2).unwrap().field(name).unwrap()
    }

    #[test]
    fn test_read_integers() {
        let mut data = vec![0u8; 78];
        data[4..6].copy_from_slice(&700u16.to_be_bytes());
        data[70..72].copy_from_slice(&(-250i16).to_be_bytes());
        assert_eq!(
            read_field(&data, os2_field("usWeightClass")),
            Some(FieldValue::Integer(700))
        );
        assert_eq!(
            read_field(&data, os2_field("sTypoDescender")),
            Some(FieldValue::Integer(-250))
        );
        assert_eq!(read_field(&data, os2_field("sxHeight")), None);
    }

    #[test]
    fn test_read_fixed_and_tag() {
        let head = schema_for(HEAD).unwrap();
        let mut data = vec![0u8; 54];
        data[4..8].copy_from_slice(&0x0001_8000u32.to_be_bytes());
        assert_eq!(
            read_field(&data, head.field("fontRevision").unwrap()),
            Some(FieldValue::Number(1.5))
        );

        let mut os2 = vec![0u8; 78];
        os2[58..62].copy_from_slice(b"ABCD");
        assert_eq!(
            read_field(&os2, os2_field("achVendID")),
            Some(FieldValue::Text("ABCD".to_string()))
        );
    }

    #[test]
    fn test_read_post_version() {
        let post = schema_for(POST).unwrap();
        let mut data = vec![0u8; 32];
        data[0..4].copy_from_slice(&0x0002_5000u32.to_be_bytes());
        assert_eq!(
            read_field(&data, post.field("formatType").unwrap()),
            Some(FieldValue::Number(2.5))
        );
    }

    #[test]
    fn test_panose_is_flattened() {
        let mut data = vec![0u8; 78];
        data[32..42].copy_from_slice(&[2, 11, 5, 3, 0, 0, 0, 0, 0, 4]);
        let FieldValue::Group(panose) = read_field(&data, os2_field("panose")).unwrap() else {
            panic!("PANOSE should be a group");
        };
        assert_eq!(panose.len(), 10);
        assert_eq!(panose["bFamilyType"], FieldValue::Integer(2));
        assert_eq!(panose["bSerifStyle"], FieldValue::Integer(11));
        assert_eq!(panose["bXHeight"], FieldValue::Integer(4));
    }

    #[rstest]
    #[case("usWinAscent", json!(2000), 2000)]
    #[case("usWinAscent", json!("2000"), 2000)]
    #[case("usWinAscent", json!(2000.0), 2000)]
    #[case("sTypoDescender", json!(-300), -300)]
    #[case("usWeightClass", json!(5000), 1000)]
    #[case("usWeightClass", json!(0), 1)]
    fn test_write_integer(#[case] name: &str, #[case] value: Value, #[case] expected: i64) {
        let field = os2_field(name);
        let mut data = vec![0u8; 78];
        write_field(&mut data, field, &value).unwrap();
        assert_eq!(read_field(&data, field), Some(FieldValue::Integer(expected)));
    }

    #[rstest]
    #[case("usWinAscent", json!(70000))]
    #[case("usWinAscent", json!(-1))]
    #[case("usWinAscent", json!(1.5))]
    #[case("usWinAscent", json!("tall"))]
    #[case("sTypoAscender", json!(40000))]
    #[case("achVendID", json!("TOOLONG"))]
    #[case("achVendID", json!(12))]
    #[case("panose", json!([1, 2, 3]))]
    #[case("panose", json!({"bWeight": 300}))]
    fn test_write_rejects(#[case] name: &str, #[case] value: Value) {
        let mut data = vec![0u8; 78];
        assert!(write_field(&mut data, os2_field(name), &value).is_err());
        assert_eq!(data, vec![0u8; 78]);
    }

    #[test]
    fn test_write_fixed() {
        let field = schema_for(HEAD).unwrap().field("fontRevision").unwrap();
        let mut data = vec![0u8; 54];
        write_field(&mut data, field, &json!(2.25)).unwrap();
        assert_eq!(&data[4..8], &0x0002_4000u32.to_be_bytes());
    }

    #[test]
    fn test_write_tag_pads() {
        let mut data = vec![0u8; 78];
        write_field(&mut data, os2_field("achVendID"), &json!("GO")).unwrap();
        assert_eq!(&data[58..62], b"GO  ");
    }

    #[test]
    fn test_write_partial_panose() {
        let field = os2_field("panose");
        let mut data = vec![0u8; 78];
        data[32..42].copy_from_slice(&[2, 11, 5, 3, 0, 0, 0, 0, 0, 4]);
        write_field(&mut data, field, &json!({"bWeight": 8, "bogus": 1})).unwrap();
        assert_eq!(&data[32..42], &[2, 11, 8, 3, 0, 0, 0, 0, 0, 4]);

        write_field(&mut data, field, &json!([0, 1, 2, 3, 4, 5, 6, 7, 8, 9])).unwrap();
        assert_eq!(&data[32..42], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_serialize() {
        let mut group = IndexMap::new();
        group.insert("bFamilyType", FieldValue::Integer(2));
        let values = vec![
            FieldValue::Integer(-3),
            FieldValue::Number(1.5),
            FieldValue::Text("NONE".to_string()),
            FieldValue::Group(group),
        ];
        let serialized = serde_json::to_string(&values).unwrap();
        assert_eq!(serialized, r#"[-3,1.5,"NONE",{"bFamilyType":2}]"#);
    }
}
