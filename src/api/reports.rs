//
//  asc-cli
//  api/reports.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Sales and finance report bodies.
//!
//! Report endpoints answer with `application/a-gzip`: a gzip-compressed,
//! tab-separated table whose first line holds the column names.

use std::io::Read;

use flate2::read::GzDecoder;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::AscError;
use crate::output::TableOutput;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A decoded tab-separated report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// One JSON object per row, keyed by column name.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                for (index, header) in self.headers.iter().enumerate() {
                    let cell = row.get(index).cloned().unwrap_or_default();
                    record.insert(header.clone(), Value::String(cell));
                }
                Value::Object(record)
            })
            .collect()
    }
}

/// Serializes as `{"data": [row objects]}`.
impl Serialize for ReportTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json!({ "data": self.to_records() }).serialize(serializer)
    }
}

impl TableOutput for ReportTable {
    fn headers(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows.clone()
    }
}

/// Decodes a report body. Bodies without the gzip magic are read as plain TSV.
pub fn decode_gzip_tsv(body: &[u8]) -> Result<ReportTable, AscError> {
    let text = if body.starts_with(&GZIP_MAGIC) {
        let mut text = String::new();
        GzDecoder::new(body)
            .read_to_string(&mut text)
            .map_err(|e| AscError::Decode(format!("invalid gzip report: {e}")))?;
        text
    } else {
        String::from_utf8(body.to_vec())
            .map_err(|_| AscError::Decode("report is neither gzip nor UTF-8 text".to_string()))?
    };

    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Ok(ReportTable::default());
    };

    let headers: Vec<String> = header_line.split('\t').map(|h| h.trim().to_string()).collect();
    let rows = lines
        .map(|line| line.split('\t').map(|cell| cell.trim_end_matches('\r').to_string()).collect())
        .collect();

    Ok(ReportTable { headers, rows })
}
