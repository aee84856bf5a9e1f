//! Binary primitives codec: the transport's `byte`, `short`, `int`, `long`,
//! `string`, `long string`, `bytes`, `string map`, `uuid`, and `inet`
//! notations.
//!
//! All multi-byte integers are big-endian; [`bytes::Buf`]/[`bytes::BufMut`]
//! already read and write integers big-endian, so there is no separate
//! byte-order dependency here.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::net::IpAddr;

use crate::error::{Error, Result};

/// Null sentinel for `[string]` length prefixes.
const NULL_STRING_LEN: u16 = 0xFFFF;
/// Null sentinel for `[bytes]` length prefixes.
const NULL_BYTES_LEN: i32 = -1;

pub fn put_short(buf: &mut BytesMut, value: u16) {
    buf.put_u16(value);
}

pub fn get_short(buf: &mut Bytes) -> Result<u16> {
    require(buf, 2)?;
    Ok(buf.get_u16())
}

pub fn put_int(buf: &mut BytesMut, value: i32) {
    buf.put_i32(value);
}

pub fn get_int(buf: &mut Bytes) -> Result<i32> {
    require(buf, 4)?;
    Ok(buf.get_i32())
}

pub fn put_long(buf: &mut BytesMut, value: i64) {
    buf.put_i64(value);
}

pub fn get_long(buf: &mut Bytes) -> Result<i64> {
    require(buf, 8)?;
    Ok(buf.get_i64())
}

/// `[string]`: 2-byte length + payload. Length `0xFFFF` decodes to `None`.
pub fn put_string(buf: &mut BytesMut, value: &[u8]) {
    buf.put_u16(value.len() as u16);
    buf.put_slice(value);
}

pub fn get_string(buf: &mut Bytes) -> Result<Option<Bytes>> {
    let len = get_short(buf)?;
    if len == NULL_STRING_LEN {
        return Ok(None);
    }
    require(buf, len as usize)?;
    Ok(Some(buf.split_to(len as usize)))
}

/// `[string]` decoded and validated as UTF-8; never null.
pub fn get_utf8_string(buf: &mut Bytes) -> Result<String> {
    let bytes = get_string(buf)?.ok_or_else(|| {
        Error::Protocol("unexpected null [string] where a value was required".into())
    })?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Protocol(format!("non UTF-8 [string]: {e}")))
}

/// `[long string]`: 4-byte length + payload. Length `-1` decodes to `None`.
pub fn put_long_string(buf: &mut BytesMut, value: &[u8]) {
    buf.put_i32(value.len() as i32);
    buf.put_slice(value);
}

/// `[long string]` with the null case written explicitly: `None` encodes
/// as length `-1`, matching what [`get_long_string`] already decodes it
/// as. Used for EXECUTE's per-column bind values, where a value must be
/// able to encode null and `[long string]` shares `[bytes]`'s four-byte
/// length field.
pub fn put_long_string_opt(buf: &mut BytesMut, value: Option<&[u8]>) {
    match value {
        None => buf.put_i32(NULL_BYTES_LEN),
        Some(v) => put_long_string(buf, v),
    }
}

pub fn get_long_string(buf: &mut Bytes) -> Result<Option<Bytes>> {
    let len = get_int(buf)?;
    if len == NULL_BYTES_LEN {
        return Ok(None);
    }
    if len < 0 {
        return Err(Error::Protocol(format!("negative [long string] length {len}")));
    }
    require(buf, len as usize)?;
    Ok(Some(buf.split_to(len as usize)))
}

/// `[bytes]`: 4-byte length + payload. Length `-1` decodes to `None`
/// (the wire-level null sentinel the value codec short-circuits on).
pub fn put_bytes(buf: &mut BytesMut, value: Option<&[u8]>) {
    match value {
        None => buf.put_i32(NULL_BYTES_LEN),
        Some(v) => {
            buf.put_i32(v.len() as i32);
            buf.put_slice(v);
        }
    }
}

pub fn get_bytes(buf: &mut Bytes) -> Result<Option<Bytes>> {
    let len = get_int(buf)?;
    if len == NULL_BYTES_LEN {
        return Ok(None);
    }
    if len < 0 {
        return Err(Error::Protocol(format!("negative [bytes] length {len}")));
    }
    require(buf, len as usize)?;
    Ok(Some(buf.split_to(len as usize)))
}

/// `[string map]`: 2-byte count, then `(string, string)` pairs in order.
pub fn put_string_map<'a>(buf: &mut BytesMut, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let mut entries = Vec::new();
    for (k, v) in pairs {
        entries.push((k, v));
    }
    buf.put_u16(entries.len() as u16);
    for (k, v) in entries {
        put_string(buf, k.as_bytes());
        put_string(buf, v.as_bytes());
    }
}

pub fn get_string_map(buf: &mut Bytes) -> Result<Vec<(String, String)>> {
    let count = get_short(buf)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let k = get_utf8_string(buf)?;
        let v = get_utf8_string(buf)?;
        out.push((k, v));
    }
    Ok(out)
}

/// `[string multimap]`: 2-byte count, then per entry a key `[string]`
/// followed by a `[string list]` (2-byte count, then that many `[string]`
/// values). Used for SUPPORTED's body, where each option name maps to a
/// list of values rather than a single one.
pub fn get_string_multimap(buf: &mut Bytes) -> Result<Vec<(String, Vec<String>)>> {
    let count = get_short(buf)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = get_utf8_string(buf)?;
        let value_count = get_short(buf)?;
        let mut values = Vec::with_capacity(value_count as usize);
        for _ in 0..value_count {
            values.push(get_utf8_string(buf)?);
        }
        out.push((key, values));
    }
    Ok(out)
}

/// 16 raw bytes, the wire form of a UUID / TimeUUID.
pub fn put_uuid(buf: &mut BytesMut, value: &uuid::Uuid) {
    buf.put_slice(value.as_bytes());
}

pub fn get_uuid(buf: &mut Bytes) -> Result<uuid::Uuid> {
    require(buf, 16)?;
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Ok(uuid::Uuid::from_bytes(bytes))
}

/// 4 or 16 raw network-byte-order bytes, discriminated by IP version.
pub fn put_inet(buf: &mut BytesMut, addr: &IpAddr) {
    match addr {
        IpAddr::V4(v4) => buf.put_slice(&v4.octets()),
        IpAddr::V6(v6) => buf.put_slice(&v6.octets()),
    }
}

pub fn get_inet(buf: &mut Bytes, len: usize) -> Result<IpAddr> {
    require(buf, len)?;
    match len {
        4 => {
            let mut octets = [0u8; 4];
            buf.copy_to_slice(&mut octets);
            Ok(IpAddr::from(octets))
        }
        16 => {
            let mut octets = [0u8; 16];
            buf.copy_to_slice(&mut octets);
            Ok(IpAddr::from(octets))
        }
        other => Err(Error::Protocol(format!("invalid inet length {other}"))),
    }
}

fn require(buf: &Bytes, len: usize) -> Result<()> {
    if buf.remaining() < len {
        return Err(Error::Protocol(format!(
            "truncated frame: needed {len} bytes, {} remaining",
            buf.remaining()
        )));
    }
    Ok(())
}
