//
//  asc-cli
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! JSON and NDJSON encoding.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::AscError;

/// Writes `value` as JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
    pretty: bool,
) -> Result<(), AscError> {
    let result = if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)
    } else {
        serde_json::to_writer(&mut *writer, value)
    };
    result.map_err(|e| AscError::Internal(format!("failed to encode JSON: {e}")))?;
    writeln!(writer)?;
    Ok(())
}

/// Writes one compact JSON line and flushes, so a streamed page reaches the
/// reader before the next page is requested.
pub fn write_json_line<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<(), AscError> {
    write_json_to(writer, value, false)?;
    writer.flush()?;
    Ok(())
}

/// Splits a result into NDJSON lines.
///
/// A JSON:API collection yields one line per resource in `data`; anything
/// else is a single line.
pub fn ndjson_lines(value: &Value) -> Result<Vec<String>, AscError> {
    let encode = |v: &Value| serde_json::to_string(v).map_err(|e| AscError::Internal(e.to_string()));
    match value.get("data") {
        Some(Value::Array(items)) => items.iter().map(encode).collect(),
        _ => Ok(vec![encode(value)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_compact_and_pretty() {
        let mut out = Vec::new();
        write_json_to(&mut out, &json!({"a": [1]}), false).unwrap();
        assert_eq!(out, b"{\"a\":[1]}\n");

        let mut out = Vec::new();
        write_json_to(&mut out, &json!({"a": 1}), true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_ndjson_lines() {
        let collection = json!({"data": [{"id": "1"}, {"id": "2"}], "links": {}});
        assert_eq!(ndjson_lines(&collection).unwrap(), vec![r#"{"id":"1"}"#, r#"{"id":"2"}"#]);

        let single = json!({"data": {"id": "1"}});
        assert_eq!(ndjson_lines(&single).unwrap().len(), 1);

        let empty = json!({"data": []});
        assert!(ndjson_lines(&empty).unwrap().is_empty());
    }
}
