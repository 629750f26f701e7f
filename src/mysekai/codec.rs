//! MessagePack record-tree codec.
//!
//! The decrypted snapshot payload is a single MessagePack document: a
//! self-describing tree of maps, arrays and scalars. The decoder preserves
//! the integer/float distinction and UTF-8 string values exactly as they
//! appear on the wire. Extension types never occur in snapshots and are
//! rejected as malformed.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::trace;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use super::error::{Result, SnapshotError};

/// Guard against hostile nesting blowing the stack.
const MAX_DEPTH: usize = 512;

/// A decoded record-tree node.
///
/// Unsigned integers that fit in `i64` decode to [`Value::Int`]; only values
/// above `i64::MAX` use [`Value::UInt`]. This keeps integer comparisons
/// uniform across the snapshot's id and quantity fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bin(Vec<u8>),
    Array(Vec<Value>),
    /// Key/value pairs in wire order. Snapshot maps are string-keyed, but the
    /// wire format permits arbitrary keys, so they are kept as values.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Look up a string key in a map node. Returns `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find_map(|(k, v)| match k {
                Value::Str(s) if s == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric accessor: floats pass through, integers widen.
    ///
    /// World coordinates in snapshots are sometimes serialized as integers
    /// when they land on a whole number, so position reads go through this.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

/// Decode a complete MessagePack document.
///
/// The entire input must be consumed by the root value; trailing bytes are
/// rejected, since a snapshot is exactly one document.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut cur = Cursor::new(bytes);
    let value = decode_value(&mut cur, 0)?;
    let consumed = cur.position() as usize;
    if consumed != bytes.len() {
        return Err(malformed(format!(
            "{} trailing bytes after root value",
            bytes.len() - consumed
        )));
    }
    trace!("Decoded record tree from {} bytes", bytes.len());
    Ok(value)
}

/// Encode a record tree back into MessagePack bytes.
///
/// Produces canonical (smallest-width) encodings. Counterpart of [`decode`],
/// used for fixture generation and round-trip verification.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_value(value, &mut out)?;
    Ok(out)
}

/// Convert a record tree into a `serde_json::Value` for pretty-printed
/// debugging dumps. Binary payloads are hex-encoded; non-string map keys are
/// stringified.
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Nil => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(v) => JsonValue::Number((*v).into()),
        Value::UInt(v) => JsonValue::Number((*v).into()),
        Value::Float(f) => JsonNumber::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Bin(b) => JsonValue::String(hex::encode(b)),
        Value::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut map = JsonMap::new();
            for (k, v) in entries {
                let key = match k {
                    Value::Str(s) => s.clone(),
                    other => to_json(other).to_string(),
                };
                map.insert(key, to_json(v));
            }
            JsonValue::Object(map)
        }
    }
}

fn malformed(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::MalformedRecordTree(msg.into())
}

fn truncated() -> SnapshotError {
    malformed("truncated input")
}

fn decode_value(cur: &mut Cursor<&[u8]>, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(malformed("nesting depth limit exceeded"));
    }
    let marker = cur.read_u8().map_err(|_| truncated())?;
    match marker {
        // Positive fixint
        0x00..=0x7f => Ok(Value::Int(marker as i64)),
        // Fixmap / fixarray / fixstr
        0x80..=0x8f => decode_map(cur, (marker & 0x0f) as usize, depth),
        0x90..=0x9f => decode_array(cur, (marker & 0x0f) as usize, depth),
        0xa0..=0xbf => decode_str(cur, (marker & 0x1f) as usize),
        0xc0 => Ok(Value::Nil),
        0xc1 => Err(malformed("reserved marker 0xc1")),
        0xc2 => Ok(Value::Bool(false)),
        0xc3 => Ok(Value::Bool(true)),
        // bin 8/16/32
        0xc4 => {
            let len = cur.read_u8().map_err(|_| truncated())? as usize;
            decode_bin(cur, len)
        }
        0xc5 => {
            let len = cur.read_u16::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_bin(cur, len)
        }
        0xc6 => {
            let len = cur.read_u32::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_bin(cur, len)
        }
        // ext family: never produced by the snapshot serializer
        0xc7..=0xc9 | 0xd4..=0xd8 => {
            Err(malformed(format!("unsupported ext marker {:#04x}", marker)))
        }
        0xca => {
            let f = cur.read_f32::<BigEndian>().map_err(|_| truncated())?;
            Ok(Value::Float(f as f64))
        }
        0xcb => {
            let f = cur.read_f64::<BigEndian>().map_err(|_| truncated())?;
            Ok(Value::Float(f))
        }
        0xcc => Ok(Value::Int(
            cur.read_u8().map_err(|_| truncated())? as i64
        )),
        0xcd => Ok(Value::Int(
            cur.read_u16::<BigEndian>().map_err(|_| truncated())? as i64,
        )),
        0xce => Ok(Value::Int(
            cur.read_u32::<BigEndian>().map_err(|_| truncated())? as i64,
        )),
        0xcf => {
            let v = cur.read_u64::<BigEndian>().map_err(|_| truncated())?;
            match i64::try_from(v) {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Ok(Value::UInt(v)),
            }
        }
        0xd0 => Ok(Value::Int(
            cur.read_i8().map_err(|_| truncated())? as i64
        )),
        0xd1 => Ok(Value::Int(
            cur.read_i16::<BigEndian>().map_err(|_| truncated())? as i64,
        )),
        0xd2 => Ok(Value::Int(
            cur.read_i32::<BigEndian>().map_err(|_| truncated())? as i64,
        )),
        0xd3 => Ok(Value::Int(
            cur.read_i64::<BigEndian>().map_err(|_| truncated())?,
        )),
        // str 8/16/32
        0xd9 => {
            let len = cur.read_u8().map_err(|_| truncated())? as usize;
            decode_str(cur, len)
        }
        0xda => {
            let len = cur.read_u16::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_str(cur, len)
        }
        0xdb => {
            let len = cur.read_u32::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_str(cur, len)
        }
        // array 16/32
        0xdc => {
            let n = cur.read_u16::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_array(cur, n, depth)
        }
        0xdd => {
            let n = cur.read_u32::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_array(cur, n, depth)
        }
        // map 16/32
        0xde => {
            let n = cur.read_u16::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_map(cur, n, depth)
        }
        0xdf => {
            let n = cur.read_u32::<BigEndian>().map_err(|_| truncated())? as usize;
            decode_map(cur, n, depth)
        }
        // Negative fixint
        0xe0..=0xff => Ok(Value::Int((marker as i8) as i64)),
    }
}

/// Check a declared length against what is actually left in the buffer, so a
/// corrupted length prefix cannot trigger a huge allocation.
fn check_remaining(cur: &Cursor<&[u8]>, needed: usize) -> Result<()> {
    let remaining = cur.get_ref().len().saturating_sub(cur.position() as usize);
    if needed > remaining {
        return Err(malformed(format!(
            "declared length {} exceeds {} remaining bytes",
            needed, remaining
        )));
    }
    Ok(())
}

fn decode_bytes(cur: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>> {
    check_remaining(cur, len)?;
    let mut buf = vec![0u8; len];
    cur.read_exact(&mut buf).map_err(|_| truncated())?;
    Ok(buf)
}

fn decode_str(cur: &mut Cursor<&[u8]>, len: usize) -> Result<Value> {
    let bytes = decode_bytes(cur, len)?;
    let s = String::from_utf8(bytes).map_err(|_| malformed("invalid UTF-8 in string"))?;
    Ok(Value::Str(s))
}

fn decode_bin(cur: &mut Cursor<&[u8]>, len: usize) -> Result<Value> {
    Ok(Value::Bin(decode_bytes(cur, len)?))
}

fn decode_array(cur: &mut Cursor<&[u8]>, n: usize, depth: usize) -> Result<Value> {
    // Every element takes at least one byte, so the count is bounded too.
    check_remaining(cur, n)?;
    let mut items = Vec::with_capacity(n);
    for _ in 0..n {
        items.push(decode_value(cur, depth + 1)?);
    }
    Ok(Value::Array(items))
}

fn decode_map(cur: &mut Cursor<&[u8]>, n: usize, depth: usize) -> Result<Value> {
    check_remaining(cur, n.saturating_mul(2))?;
    let mut entries = Vec::with_capacity(n);
    for _ in 0..n {
        let key = decode_value(cur, depth + 1)?;
        let value = decode_value(cur, depth + 1)?;
        entries.push((key, value));
    }
    Ok(Value::Map(entries))
}

fn encode_value(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Nil => out.write_u8(0xc0)?,
        Value::Bool(false) => out.write_u8(0xc2)?,
        Value::Bool(true) => out.write_u8(0xc3)?,
        Value::Int(v) => encode_int(*v, out)?,
        Value::UInt(v) => encode_uint(*v, out)?,
        Value::Float(f) => {
            out.write_u8(0xcb)?;
            out.write_f64::<BigEndian>(*f)?;
        }
        Value::Str(s) => {
            let len = s.len();
            if len < 32 {
                out.write_u8(0xa0 | len as u8)?;
            } else if len <= u8::MAX as usize {
                out.write_u8(0xd9)?;
                out.write_u8(len as u8)?;
            } else if len <= u16::MAX as usize {
                out.write_u8(0xda)?;
                out.write_u16::<BigEndian>(len as u16)?;
            } else {
                out.write_u8(0xdb)?;
                out.write_u32::<BigEndian>(len as u32)?;
            }
            out.extend_from_slice(s.as_bytes());
        }
        Value::Bin(b) => {
            let len = b.len();
            if len <= u8::MAX as usize {
                out.write_u8(0xc4)?;
                out.write_u8(len as u8)?;
            } else if len <= u16::MAX as usize {
                out.write_u8(0xc5)?;
                out.write_u16::<BigEndian>(len as u16)?;
            } else {
                out.write_u8(0xc6)?;
                out.write_u32::<BigEndian>(len as u32)?;
            }
            out.extend_from_slice(b);
        }
        Value::Array(items) => {
            let n = items.len();
            if n < 16 {
                out.write_u8(0x90 | n as u8)?;
            } else if n <= u16::MAX as usize {
                out.write_u8(0xdc)?;
                out.write_u16::<BigEndian>(n as u16)?;
            } else {
                out.write_u8(0xdd)?;
                out.write_u32::<BigEndian>(n as u32)?;
            }
            for item in items {
                encode_value(item, out)?;
            }
        }
        Value::Map(entries) => {
            let n = entries.len();
            if n < 16 {
                out.write_u8(0x80 | n as u8)?;
            } else if n <= u16::MAX as usize {
                out.write_u8(0xde)?;
                out.write_u16::<BigEndian>(n as u16)?;
            } else {
                out.write_u8(0xdf)?;
                out.write_u32::<BigEndian>(n as u32)?;
            }
            for (k, v) in entries {
                encode_value(k, out)?;
                encode_value(v, out)?;
            }
        }
    }
    Ok(())
}

fn encode_int(v: i64, out: &mut Vec<u8>) -> Result<()> {
    if v >= 0 {
        return encode_uint(v as u64, out);
    }
    if v >= -32 {
        out.write_u8(v as i8 as u8)?;
    } else if v >= i8::MIN as i64 {
        out.write_u8(0xd0)?;
        out.write_i8(v as i8)?;
    } else if v >= i16::MIN as i64 {
        out.write_u8(0xd1)?;
        out.write_i16::<BigEndian>(v as i16)?;
    } else if v >= i32::MIN as i64 {
        out.write_u8(0xd2)?;
        out.write_i32::<BigEndian>(v as i32)?;
    } else {
        out.write_u8(0xd3)?;
        out.write_i64::<BigEndian>(v)?;
    }
    Ok(())
}

fn encode_uint(v: u64, out: &mut Vec<u8>) -> Result<()> {
    if v < 0x80 {
        out.write_u8(v as u8)?;
    } else if v <= u8::MAX as u64 {
        out.write_u8(0xcc)?;
        out.write_u8(v as u8)?;
    } else if v <= u16::MAX as u64 {
        out.write_u8(0xcd)?;
        out.write_u16::<BigEndian>(v as u16)?;
    } else if v <= u32::MAX as u64 {
        out.write_u8(0xce)?;
        out.write_u32::<BigEndian>(v as u32)?;
    } else {
        out.write_u8(0xcf)?;
        out.write_u64::<BigEndian>(v)?;
    }
    Ok(())
}
