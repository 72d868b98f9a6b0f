//! Delimited-file loader with encoding and delimiter auto-detection.
//!
//! Reads the whole source, decodes it, parses it with the `csv` crate and
//! infers a type per column. Empty cells become nulls.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};
use crate::models::{ColumnType, Field, Schema, Value};
use crate::table::{Row, Table};

/// How to read the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Path of the delimited file
    pub path: PathBuf,
    /// First row holds column names
    pub header: bool,
    /// Infer integer/float columns; otherwise every column is a string
    pub infer_schema: bool,
    /// Field delimiter (auto-detect if not specified)
    pub delimiter: Option<char>,
}

impl SourceOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: true,
            infer_schema: true,
            delimiter: None,
        }
    }
}

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        // Every Latin-1 byte is the code point of the same value
        "iso-8859-1" | "latin-1" | "latin1" => bytes.iter().map(|&b| b as char).collect(),
        "iso-8859-15" | "latin-9" | "latin9" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unrecognised: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load any delimited file without column checks.
pub fn load_file(options: &SourceOptions) -> LoadResult<LoadedSource> {
    let bytes = read_source(&options.path)?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let table = parse_table(&content, delimiter, options.header, options.infer_schema)?;

    Ok(LoadedSource {
        table,
        encoding,
        delimiter,
    })
}

fn read_source(path: &Path) -> LoadResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Fail with `SchemaMismatch` listing every absent column.
pub fn require_columns(schema: &Schema, required: &[&str]) -> LoadResult<()> {
    let missing = schema.missing(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::SchemaMismatch {
            missing: missing.into_iter().map(String::from).collect(),
        })
    }
}

/// Parse delimited text into a typed table.
pub fn parse_table(content: &str, delimiter: char, header: bool, infer_schema: bool) -> LoadResult<Table> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptySource);
    }
    let delimiter = u8::try_from(delimiter).map_err(|_| LoadError::Malformed {
        line: 1,
        message: format!("delimiter '{}' is not a single byte", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(content.as_bytes());

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::Malformed {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        // Skip blank lines
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        raw_rows.push(
            record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect(),
        );
    }

    let names: Vec<String> = if header {
        if raw_rows.is_empty() {
            return Err(LoadError::EmptySource);
        }
        raw_rows
            .remove(0)
            .into_iter()
            .enumerate()
            .map(|(i, name)| name.unwrap_or_else(|| format!("_c{}", i)))
            .collect()
    } else {
        let width = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
        (0..width).map(|i| format!("_c{}", i)).collect()
    };

    let fields: Vec<Field> = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let column_type = if infer_schema {
                infer_column_type(raw_rows.iter().map(|row| row.get(i).and_then(|c| c.as_deref())))
            } else {
                ColumnType::Str
            };
            Field::new(name, column_type)
        })
        .collect();

    let rows: Vec<Row> = raw_rows
        .into_iter()
        .map(|row| {
            fields
                .iter()
                .enumerate()
                .map(|(i, field)| match row.get(i).and_then(|c| c.as_deref()) {
                    Some(cell) => convert_cell(cell, field.column_type),
                    None => Value::Null,
                })
                .collect()
        })
        .collect();

    Ok(Table::new(Schema::new(fields), rows))
}

/// `Int` if every non-null cell is an integer, `Float` if every one is a
/// number, else `Str`. All-null columns are `Str`.
fn infer_column_type<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> ColumnType {
    let mut inferred: Option<ColumnType> = None;
    for cell in cells.flatten() {
        let cell_type = if cell.parse::<i64>().is_ok() {
            ColumnType::Int
        } else if cell.parse::<f64>().is_ok() {
            ColumnType::Float
        } else {
            return ColumnType::Str;
        };
        inferred = Some(match (inferred, cell_type) {
            (Some(ColumnType::Float), _) | (_, ColumnType::Float) => ColumnType::Float,
            _ => ColumnType::Int,
        });
    }
    inferred.unwrap_or(ColumnType::Str)
}

fn convert_cell(cell: &str, column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Int => cell.parse().map(Value::Int).unwrap_or(Value::Null),
        ColumnType::Float => cell.parse().map(Value::Float).unwrap_or(Value::Null),
        ColumnType::Bool => cell.parse().map(Value::Bool).unwrap_or(Value::Null),
        ColumnType::Str => Value::Str(cell.to_string()),
    }
}
