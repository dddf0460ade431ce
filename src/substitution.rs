//! Regex substitution over serialized JSON
//!
//! The substitution runs over the serialized text of the data, not its
//! structure, so a pattern can match across values, keys, and JSON
//! syntax alike. The serialized form follows Python's `json.dumps`
//! defaults (`", "` and `": "` separators, non-ASCII escaped as
//! `\uXXXX`) because patterns are written against that surface and the
//! text itself becomes the output whenever the substituted result no
//! longer parses as JSON.

use std::io::{self, Write};

use regex::Regex;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Errors from compiling or applying a generated pattern
#[derive(Error, Debug)]
pub enum SubstitutionError {
    #[error("Invalid regex pattern generated by LLM: '{pattern}'. Details: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to serialize input data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of a substitution pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessedData {
    /// Substituted text that still parses as JSON
    Json(Value),
    /// Fallback when the substituted text is no longer valid JSON
    Text(String),
}

/// `serde_json` formatter that reproduces the default output of Python's
/// `json.dumps`: items separated by `", "`, keys by `": "`, and every
/// non-ASCII character escaped to `\uXXXX` (surrogate pairs above the
/// BMP, lowercase hex).
struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                let code = ch as u32;
                if code <= 0xFFFF {
                    write!(writer, "\\u{code:04x}")?;
                } else {
                    let reduced = code - 0x10000;
                    let high = 0xD800 + (reduced >> 10);
                    let low = 0xDC00 + (reduced & 0x3FF);
                    write!(writer, "\\u{high:04x}\\u{low:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize a JSON value to the text form substitutions operate on.
///
/// Object keys keep the order of the incoming document.
pub fn serialize_data(data: &Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PythonFormatter);
    data.serialize(&mut serializer)?;
    // The formatter emits ASCII only
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Compile `pattern`, substitute every match in the serialized form of
/// `data` with `replacement`, and re-parse the result.
///
/// The replacement string is handed to the engine verbatim, so `$1`
/// style group references expand per the engine's rules. A result that
/// no longer parses as JSON is returned as plain text, not an error.
pub fn apply(
    pattern: &str,
    replacement: &str,
    data: &Value,
) -> Result<ProcessedData, SubstitutionError> {
    let regex = Regex::new(pattern).map_err(|source| SubstitutionError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let input = serialize_data(data)?;
    let processed = regex.replace_all(&input, replacement);

    Ok(match serde_json::from_str(&processed) {
        Ok(value) => ProcessedData::Json(value),
        Err(_) => ProcessedData::Text(processed.into_owned()),
    })
}
