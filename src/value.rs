//! Typed value codec: encodes/decodes each CQL column type to/from its wire
//! bytes, recursing on element codecs for the parametric collection types.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_bigint::BigInt;
use std::fmt;
use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::primitive;

/// A CQL column type tag, as carried in row metadata and used to drive the
/// value codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Custom(String),
    Ascii,
    BigInt,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    TimeUuid,
    Inet,
    List(Box<ColumnType>),
    Map(Box<ColumnType>, Box<ColumnType>),
    Set(Box<ColumnType>),
}

/// A decoded (or to-be-encoded) CQL value.
///
/// This is the tagged sum type over the [`ColumnType`] domain: callers bind
/// values by constructing the matching `Value` variant, and mismatches
/// against the declared column type are rejected at encode time with
/// [`Error::UnsupportedType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Blob(Vec<u8>),
    BigInt(i64),
    Int(i32),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Uuid(uuid::Uuid),
    Varint(BigInt),
    Decimal { unscaled: BigInt, scale: i32 },
    Inet(IpAddr),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(b) if b.is_empty() => Ok(()),
            Value::Blob(b) => write!(f, "0x{}", hex::encode(b)),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Varint(v) => write!(f, "{v}"),
            Value::Decimal { unscaled, scale } => write!(f, "{}", decimal_to_f64(unscaled, *scale)),
            Value::Inet(v) => write!(f, "{v}"),
            Value::List(items) | Value::Set(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Approximate a decimal as `f64`, within float tolerance.
fn decimal_to_f64(unscaled: &BigInt, scale: i32) -> f64 {
    let base: f64 = unscaled.to_string().parse().unwrap_or(0.0);
    base / 10f64.powi(scale)
}

fn mismatch(ty: &ColumnType, value: &Value) -> Error {
    Error::Bind(format!("cannot encode {value:?} as {ty:?}"))
}

/// Encode a value for its declared column type, producing the element's
/// payload bytes (not length-prefixed; the caller frames them through
/// [`primitive::put_bytes`]).
///
/// `Value::Null` always encodes to `None` regardless of `ty` — the null
/// sentinel is handled one level up by the `[bytes]` length prefix for
/// every type, including Boolean.
pub fn encode(value: &Value, ty: &ColumnType) -> Result<Option<Vec<u8>>> {
    if matches!(value, Value::Null) {
        return Ok(None);
    }

    let mut buf = BytesMut::new();
    match (ty, value) {
        (ColumnType::Ascii | ColumnType::Text | ColumnType::Varchar, Value::Text(s)) => {
            buf.put_slice(s.as_bytes());
        }
        (ColumnType::Blob | ColumnType::Custom(_), Value::Blob(b)) => {
            buf.put_slice(b);
        }
        (ColumnType::Blob | ColumnType::Custom(_), Value::Text(s)) => {
            let hex_str = s.strip_prefix("0x").ok_or_else(|| mismatch(ty, value))?;
            let decoded = hex::decode(hex_str)
                .map_err(|e| Error::Bind(format!("invalid hex blob literal {s:?}: {e}")))?;
            buf.put_slice(&decoded);
        }
        (ColumnType::BigInt | ColumnType::Counter | ColumnType::Timestamp, Value::BigInt(v)) => {
            buf.put_i64(*v);
        }
        (ColumnType::Int, Value::Int(v)) => {
            buf.put_i32(*v);
        }
        (ColumnType::Boolean, Value::Boolean(v)) => {
            buf.put_u8(if *v { 0x01 } else { 0x00 });
        }
        (ColumnType::Float, Value::Float(v)) => {
            buf.put_slice(&v.to_be_bytes());
        }
        (ColumnType::Double, Value::Double(v)) => {
            buf.put_slice(&v.to_be_bytes());
        }
        (ColumnType::Uuid | ColumnType::TimeUuid, Value::Uuid(id)) => {
            primitive::put_uuid(&mut buf, id);
        }
        (ColumnType::Uuid | ColumnType::TimeUuid, Value::Text(s)) => {
            let id = uuid::Uuid::parse_str(s)
                .map_err(|e| Error::Bind(format!("invalid uuid literal {s:?}: {e}")))?;
            primitive::put_uuid(&mut buf, &id);
        }
        (ColumnType::Varint, Value::Varint(v)) => {
            buf.put_slice(&v.to_signed_bytes_be());
        }
        (ColumnType::Decimal, Value::Decimal { unscaled, scale }) => {
            buf.put_i32(*scale);
            buf.put_slice(&unscaled.to_signed_bytes_be());
        }
        (ColumnType::Inet, Value::Inet(addr)) => {
            primitive::put_inet(&mut buf, addr);
        }
        (ColumnType::List(inner), Value::List(items)) | (ColumnType::Set(inner), Value::Set(items)) => {
            buf.put_u16(items.len() as u16);
            for item in items {
                put_element(&mut buf, item, inner)?;
            }
        }
        (ColumnType::Map(key_ty, val_ty), Value::Map(pairs)) => {
            buf.put_u16(pairs.len() as u16);
            for (k, v) in pairs {
                put_element(&mut buf, k, key_ty)?;
                put_element(&mut buf, v, val_ty)?;
            }
        }
        _ => return Err(mismatch(ty, value)),
    }

    Ok(Some(buf.to_vec()))
}

/// Write one collection/map element using `[string]` length-prefix framing
/// (2-byte length, `0xFFFF` for null) — nested element encodings never use
/// `[bytes]`.
fn put_element(buf: &mut BytesMut, value: &Value, ty: &ColumnType) -> Result<()> {
    let payload = encode(value, ty)?;
    match payload {
        None => buf.put_u16(0xFFFF),
        Some(bytes) => primitive::put_string(buf, &bytes),
    }
    Ok(())
}

/// Decode a value from its wire payload for the declared column type.
///
/// `content == None` (the wire's `[bytes]` length `-1`) short-circuits to
/// `Value::Null` regardless of `ty`.
pub fn decode(content: Option<&[u8]>, ty: &ColumnType) -> Result<Value> {
    let Some(content) = content else {
        return Ok(Value::Null);
    };

    Ok(match ty {
        ColumnType::Ascii | ColumnType::Text | ColumnType::Varchar => {
            Value::Text(String::from_utf8_lossy(content).into_owned())
        }
        ColumnType::Blob | ColumnType::Custom(_) => Value::Blob(content.to_vec()),
        ColumnType::BigInt | ColumnType::Counter | ColumnType::Timestamp => {
            if content.len() != 8 {
                return Err(Error::Protocol(format!(
                    "expected 8 bytes for {ty:?}, got {}",
                    content.len()
                )));
            }
            let mut b = [0u8; 8];
            b.copy_from_slice(content);
            Value::BigInt(i64::from_be_bytes(b))
        }
        ColumnType::Int => {
            if content.len() != 4 {
                return Err(Error::Protocol(format!(
                    "expected 4 bytes for Int, got {}",
                    content.len()
                )));
            }
            let mut b = [0u8; 4];
            b.copy_from_slice(content);
            Value::Int(i32::from_be_bytes(b))
        }
        ColumnType::Boolean => match content.first() {
            Some(0x00) if content.len() == 1 => Value::Boolean(false),
            Some(0x01) if content.len() == 1 => Value::Boolean(true),
            _ => Value::Null,
        },
        ColumnType::Float => {
            if content.len() != 4 {
                return Err(Error::Protocol("expected 4 bytes for Float".into()));
            }
            let mut b = [0u8; 4];
            b.copy_from_slice(content);
            Value::Float(f32::from_be_bytes(b))
        }
        ColumnType::Double => {
            if content.len() != 8 {
                return Err(Error::Protocol("expected 8 bytes for Double".into()));
            }
            let mut b = [0u8; 8];
            b.copy_from_slice(content);
            Value::Double(f64::from_be_bytes(b))
        }
        ColumnType::Uuid | ColumnType::TimeUuid => {
            if content.len() != 16 {
                return Err(Error::Protocol("expected 16 bytes for Uuid".into()));
            }
            let mut b = [0u8; 16];
            b.copy_from_slice(content);
            Value::Uuid(uuid::Uuid::from_bytes(b))
        }
        ColumnType::Varint => Value::Varint(decode_varint(content)),
        ColumnType::Decimal => {
            if content.len() < 5 {
                Value::Decimal { unscaled: BigInt::from(0), scale: 0 }
            } else {
                let mut scale_bytes = [0u8; 4];
                scale_bytes.copy_from_slice(&content[..4]);
                let scale = i32::from_be_bytes(scale_bytes);
                Value::Decimal { unscaled: decode_varint(&content[4..]), scale }
            }
        }
        ColumnType::Inet => {
            let mut bytes = Bytes::copy_from_slice(content);
            Value::Inet(primitive::get_inet(&mut bytes, content.len())?)
        }
        ColumnType::List(inner) | ColumnType::Set(inner) => {
            let mut bytes = Bytes::copy_from_slice(content);
            let count = primitive::get_short(&mut bytes)?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let element = primitive::get_string(&mut bytes)?;
                items.push(decode(element.as_deref(), inner)?);
            }
            match ty {
                ColumnType::Set(_) => Value::Set(items),
                _ => Value::List(items),
            }
        }
        ColumnType::Map(key_ty, val_ty) => {
            let mut bytes = Bytes::copy_from_slice(content);
            let count = primitive::get_short(&mut bytes)?;
            let mut pairs = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let key = primitive::get_string(&mut bytes)?;
                let val = primitive::get_string(&mut bytes)?;
                pairs.push((decode(key.as_deref(), key_ty)?, decode(val.as_deref(), val_ty)?));
            }
            Value::Map(pairs)
        }
    })
}

fn decode_varint(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        BigInt::from(0)
    } else {
        BigInt::from_signed_bytes_be(bytes)
    }
}

/// Parse a column type tag (`short`) and, for the parametric shapes, the
/// nested type(s) that follow it. Values `< 0x20` are scalar, `0x20` is
/// `List`, `0x21` is `Map`, `0x22` is `Set`, and `0x00` (`Custom`) is
/// followed by a `[string]` class name.
pub fn parse_type(buf: &mut Bytes) -> Result<ColumnType> {
    let tag = primitive::get_short(buf)?;
    Ok(match tag {
        0x0000 => ColumnType::Custom(primitive::get_utf8_string(buf)?),
        0x0001 => ColumnType::Ascii,
        0x0002 => ColumnType::BigInt,
        0x0003 => ColumnType::Blob,
        0x0004 => ColumnType::Boolean,
        0x0005 => ColumnType::Counter,
        0x0006 => ColumnType::Decimal,
        0x0007 => ColumnType::Double,
        0x0008 => ColumnType::Float,
        0x0009 => ColumnType::Int,
        0x000A => ColumnType::Text,
        0x000B => ColumnType::Timestamp,
        0x000C => ColumnType::Uuid,
        0x000D => ColumnType::Varchar,
        0x000E => ColumnType::Varint,
        0x000F => ColumnType::TimeUuid,
        0x0010 => ColumnType::Inet,
        0x0020 => ColumnType::List(Box::new(parse_type(buf)?)),
        0x0021 => ColumnType::Map(Box::new(parse_type(buf)?), Box::new(parse_type(buf)?)),
        0x0022 => ColumnType::Set(Box::new(parse_type(buf)?)),
        other => return Err(Error::Protocol(format!("unknown column type tag 0x{other:04x}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_round_trip() {
        let encoded = encode(&Value::Int(-1), &ColumnType::Int).unwrap().unwrap();
        assert_eq!(encoded, vec![0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(decode(Some(&encoded), &ColumnType::Int).unwrap(), Value::Int(-1));

        let encoded = encode(&Value::Int(2147483647), &ColumnType::Int).unwrap().unwrap();
        assert_eq!(encoded, vec![0x7F, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn uuid_round_trip() {
        let id = uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let encoded = encode(&Value::Uuid(id), &ColumnType::Uuid).unwrap().unwrap();
        assert_eq!(
            encoded,
            vec![0x55, 0x0E, 0x84, 0x00, 0xE2, 0x9B, 0x41, 0xD4, 0xA7, 0x16, 0x44, 0x66, 0x55, 0x44, 0x00, 0x00]
        );
        assert_eq!(decode(Some(&encoded), &ColumnType::Uuid).unwrap(), Value::Uuid(id));
    }

    #[test]
    fn list_int_encoding() {
        let value = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let encoded = encode(&value, &ColumnType::List(Box::new(ColumnType::Int))).unwrap().unwrap();
        let expected = [
            0x00, 0x03,
            0x00, 0x04, 0x00, 0x00, 0x00, 0x01,
            0x00, 0x04, 0x00, 0x00, 0x00, 0x02,
            0x00, 0x04, 0x00, 0x00, 0x00, 0x03,
        ];
        assert_eq!(encoded, expected);
        let decoded = decode(Some(&encoded), &ColumnType::List(Box::new(ColumnType::Int))).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn set_of_text_round_trip() {
        let value = Value::Set(vec![Value::Text("a".into()), Value::Text("b".into())]);
        let ty = ColumnType::Set(Box::new(ColumnType::Text));
        let encoded = encode(&value, &ty).unwrap().unwrap();
        assert_eq!(decode(Some(&encoded), &ty).unwrap(), value);
    }

    #[test]
    fn map_text_int_round_trip() {
        let value = Value::Map(vec![(Value::Text("a".into()), Value::Int(1))]);
        let ty = ColumnType::Map(Box::new(ColumnType::Text), Box::new(ColumnType::Int));
        let encoded = encode(&value, &ty).unwrap().unwrap();
        assert_eq!(decode(Some(&encoded), &ty).unwrap(), value);
    }

    #[test]
    fn decimal_12_34() {
        let value = Value::Decimal { unscaled: BigInt::from(1234), scale: 2 };
        let encoded = encode(&value, &ColumnType::Decimal).unwrap().unwrap();
        assert_eq!(encoded, vec![0x00, 0x00, 0x00, 0x02, 0x04, 0xD2]);
        let decoded = decode(Some(&encoded), &ColumnType::Decimal).unwrap();
        match decoded {
            Value::Decimal { unscaled, scale } => {
                assert!((decimal_to_f64(&unscaled, scale) - 12.34).abs() < 1e-9);
            }
            other => panic!("expected Decimal, got {other:?}"),
        }
    }

    #[test]
    fn decimal_short_input_decodes_to_zero() {
        let decoded = decode(Some(&[0x00, 0x00]), &ColumnType::Decimal).unwrap();
        assert_eq!(decoded, Value::Decimal { unscaled: BigInt::from(0), scale: 0 });
    }

    #[test]
    fn null_short_circuits_regardless_of_type() {
        assert_eq!(decode(None, &ColumnType::Int).unwrap(), Value::Null);
        assert_eq!(decode(None, &ColumnType::Text).unwrap(), Value::Null);
        assert_eq!(encode(&Value::Null, &ColumnType::Boolean).unwrap(), None);
    }

    #[test]
    fn boolean_unknown_byte_decodes_to_null() {
        assert_eq!(decode(Some(&[0x02]), &ColumnType::Boolean).unwrap(), Value::Null);
    }

    #[test]
    fn blob_decode_prefixes_hex() {
        let decoded = decode(Some(&[0x48, 0x65]), &ColumnType::Blob).unwrap();
        assert_eq!(decoded.to_string(), "0x4865");
    }

    #[test]
    fn float_is_explicit_big_endian() {
        let encoded = encode(&Value::Float(1.5), &ColumnType::Float).unwrap().unwrap();
        assert_eq!(encoded, 1.5f32.to_be_bytes().to_vec());
    }

    #[test]
    fn mismatched_value_and_type_is_bind_error() {
        let err = encode(&Value::Text("not an int".into()), &ColumnType::Int).unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "expected Bind, got {err:?}");
    }

    #[test]
    fn invalid_hex_blob_literal_is_bind_error() {
        let err = encode(&Value::Text("0xZZ".into()), &ColumnType::Blob).unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "expected Bind, got {err:?}");
    }

    #[test]
    fn invalid_uuid_literal_is_bind_error() {
        let err = encode(&Value::Text("not-a-uuid".into()), &ColumnType::Uuid).unwrap_err();
        assert!(matches!(err, Error::Bind(_)), "expected Bind, got {err:?}");
    }
}
