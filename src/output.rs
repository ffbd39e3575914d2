/// JSON output formatting for the CLI.
///
/// Writes a `Value` directly to a `Write` sink with compact spacing.
/// Uses `itoa` for integers and `ryu` for floats; lazy decimals print
/// their original literal text and datetimes print their canonical form
/// as JSON strings.
use std::io::{self, Write};

use crate::value::Value;

/// Write a value to the sink, followed by a newline.
pub fn write_value<W: Write>(w: &mut W, value: &Value) -> io::Result<()> {
    write_value_inner(w, value)?;
    w.write_all(b"\n")
}

fn write_value_inner<W: Write>(w: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::Null => w.write_all(b"null"),
        Value::Bool(b) => w.write_all(if *b { b"true" } else { b"false" }),
        Value::Int(n) => {
            let mut buf = itoa::Buffer::new();
            w.write_all(buf.format(*n).as_bytes())
        }
        Value::Double(f) => write_double(w, *f),
        Value::Numeric(text) => w.write_all(text.as_bytes()),
        Value::String(s) => write_json_string(w, s),
        Value::Datetime(dt) => write_json_string(w, &dt.to_string()),
        Value::Array(arr) => {
            w.write_all(b"[")?;
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    w.write_all(b",")?;
                }
                write_value_inner(w, v)?;
            }
            w.write_all(b"]")
        }
        Value::Object(obj) => {
            w.write_all(b"{")?;
            for (i, (k, v)) in obj.iter().enumerate() {
                if i > 0 {
                    w.write_all(b",")?;
                }
                write_json_string(w, k)?;
                w.write_all(b":")?;
                write_value_inner(w, v)?;
            }
            w.write_all(b"}")
        }
    }
}

/// Write a JSON-escaped string (with surrounding quotes).
fn write_json_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    w.write_all(b"\"")?;
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape: Option<&[u8]> = match b {
            b'"' => Some(b"\\\""),
            b'\\' => Some(b"\\\\"),
            b'\n' => Some(b"\\n"),
            b'\r' => Some(b"\\r"),
            b'\t' => Some(b"\\t"),
            b'\x08' => Some(b"\\b"),
            b'\x0c' => Some(b"\\f"),
            0..=0x1f => None, // handled below
            _ => continue,
        };
        if let Some(esc) = escape {
            if start < i {
                w.write_all(&bytes[start..i])?;
            }
            w.write_all(esc)?;
            start = i + 1;
        } else if b <= 0x1f {
            if start < i {
                w.write_all(&bytes[start..i])?;
            }
            write!(w, "\\u{:04x}", b)?;
            start = i + 1;
        }
    }
    if start < bytes.len() {
        w.write_all(&bytes[start..])?;
    }
    w.write_all(b"\"")
}

fn write_double<W: Write>(w: &mut W, f: f64) -> io::Result<()> {
    // NaN and infinity have no JSON form; they are rejected upstream by
    // the numeric methods, so render defensively as null.
    if !f.is_finite() {
        return w.write_all(b"null");
    }
    w.write_all(crate::value::format_f64(f).as_bytes())
}
