// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Best-effort schema discovery for local data files.
//!
//! Introspection is advisory: any read or parse failure yields `None` and the
//! dataset is tracked with an unknown schema instead of failing the compile.

use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};

use crate::ast::FileFormat;

use super::schema::{Column, DataType};

/// Supplies column layouts for load statements.
///
/// Implementations may hit the filesystem, a catalog, or a fixture table in
/// tests. Returning `None` means "could not tell", never an error.
pub trait SchemaIntrospector {
    fn columns(&self, path: &Utf8Path, format: FileFormat) -> Option<Vec<Column>>;
}

/// Reads column layouts from files on the local filesystem.
///
/// CSV costs one line and JSON one parse of the document. Excel and Parquet
/// need full format readers, which this compiler does not carry, so both
/// report `None`.
#[derive(Debug, Clone)]
pub struct FileIntrospector {
    root: Utf8PathBuf,
}

impl FileIntrospector {
    /// Introspector resolving relative paths against `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        FileIntrospector { root: root.into() }
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.root.join(path)
        }
    }

    fn csv_header(&self, path: &Utf8Path) -> Option<Vec<Column>> {
        let file = File::open(self.resolve(path).as_std_path()).ok()?;
        let mut header = String::new();
        BufReader::new(file).read_line(&mut header).ok()?;
        let header = header.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            return None;
        }
        Some(
            header
                .split(',')
                .map(|name| Column::untyped(name.trim().trim_matches('"')))
                .collect(),
        )
    }

    fn json_fields(&self, path: &Utf8Path) -> Option<Vec<Column>> {
        let text = std::fs::read_to_string(self.resolve(path).as_std_path()).ok()?;
        let document: serde_json::Value = serde_json::from_str(&text).ok()?;
        let record = match &document {
            serde_json::Value::Array(records) => records.first()?,
            object @ serde_json::Value::Object(_) => object,
            _ => return None,
        };
        let fields = record.as_object()?;
        Some(
            fields
                .iter()
                .map(|(name, value)| Column::new(name.as_str(), dtype_of(value)))
                .collect(),
        )
    }
}

fn dtype_of(value: &serde_json::Value) -> DataType {
    match value {
        serde_json::Value::String(_) => DataType::Str,
        serde_json::Value::Number(_) => DataType::Numeric,
        serde_json::Value::Bool(_) => DataType::Boolean,
        _ => DataType::Unknown,
    }
}

impl SchemaIntrospector for FileIntrospector {
    fn columns(&self, path: &Utf8Path, format: FileFormat) -> Option<Vec<Column>> {
        match format {
            FileFormat::Csv => self.csv_header(path),
            FileFormat::Json => self.json_fields(path),
            FileFormat::Excel | FileFormat::Parquet => None,
        }
    }
}
