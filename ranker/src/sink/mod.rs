//! Parquet sink with all-or-nothing publish.
//!
//! The table is converted to a single Arrow `RecordBatch` and written with
//! `ArrowWriter` into a temporary file next to the destination. The file is
//! synced and then renamed over the destination, so readers see either the
//! previous output or the complete new one. The directory is synced after
//! the rename.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{SinkError, SinkResult};
use crate::models::{ColumnType, Schema};
use crate::table::Table;

/// Where to write the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkOptions {
    /// Destination parquet file
    pub path: PathBuf,
}

impl SinkOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Write `table` to `options.path` as one parquet file.
pub fn write_parquet(table: &Table, options: &SinkOptions) -> SinkResult<PathBuf> {
    let target = &options.path;
    let batch = to_record_batch(table).map_err(|e| write_error(target, e))?;

    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| write_error(target, e))?;

    // Dropped (and removed) on any early return below
    let staged = tempfile::Builder::new()
        .prefix(".player-ranker-")
        .suffix(".parquet.tmp")
        .tempfile_in(&dir)
        .map_err(|e| write_error(target, e))?;

    let file = staged.as_file().try_clone().map_err(|e| write_error(target, e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| write_error(target, e))?;
    writer.write(&batch).map_err(|e| write_error(target, e))?;
    writer.close().map_err(|e| write_error(target, e))?;
    staged.as_file().sync_all().map_err(|e| write_error(target, e))?;

    staged.persist(target).map_err(|e| write_error(target, e.error))?;
    sync_dir(&dir).map_err(|e| write_error(target, e))?;
    Ok(target.clone())
}

/// Flush the directory entry so the rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> SinkError {
    SinkError::write(path, e)
}

/// Arrow schema matching a table schema. Every field is nullable.
pub fn arrow_schema(schema: &Schema) -> ArrowSchema {
    let fields: Vec<ArrowField> = schema
        .fields
        .iter()
        .map(|f| ArrowField::new(&f.name, arrow_type(f.column_type), true))
        .collect();
    ArrowSchema::new(fields)
}

fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Bool => DataType::Boolean,
        ColumnType::Int => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Str => DataType::Utf8,
    }
}

/// Convert the whole table into one batch.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch, arrow::error::ArrowError> {
    let schema = table.schema();
    let arrays: Vec<ArrayRef> = schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let cells = table.rows().iter().map(|row| &row[i]);
            let array: ArrayRef = match field.column_type {
                ColumnType::Bool => Arc::new(cells.map(|v| v.as_bool()).collect::<BooleanArray>()),
                ColumnType::Int => Arc::new(cells.map(|v| v.as_i64()).collect::<Int64Array>()),
                ColumnType::Float => Arc::new(cells.map(|v| v.as_f64()).collect::<Float64Array>()),
                ColumnType::Str => Arc::new(
                    cells
                        .map(|v| (!v.is_null()).then(|| v.to_string()))
                        .collect::<StringArray>(),
                ),
            };
            array
        })
        .collect();

    RecordBatch::try_new(Arc::new(arrow_schema(schema)), arrays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Value};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn sample() -> Table {
        Table::new(
            Schema::new(vec![
                Field::new("short_name", ColumnType::Str),
                Field::new("overall", ColumnType::Int),
                Field::new("potential_vs_overall", ColumnType::Float),
            ]),
            vec![
                vec!["L. Messi".into(), Value::Int(93), Value::Float(1.0)],
                vec!["Pedri".into(), Value::Int(72), Value::Null],
            ],
        )
    }

    fn read_back(path: &Path) -> RecordBatch {
        let file = fs::File::open(path).unwrap();
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        reader.next().unwrap().unwrap()
    }

    #[test]
    fn test_writes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/players.parquet");

        let written = write_parquet(&sample(), &SinkOptions::new(&target)).unwrap();
        assert_eq!(written, target);

        let batch = read_back(&target);
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "short_name");
        assert_eq!(batch.schema().field(2).data_type(), &DataType::Float64);
        assert_eq!(batch.column(2).null_count(), 1);

        // Only the published file remains
        let entries: Vec<_> = fs::read_dir(dir.path().join("nested")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_sync_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("players.parquet"), b"data").unwrap();
        sync_dir(dir.path()).unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err() || cfg!(not(unix)));
    }

    #[test]
    fn test_empty_table_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("empty.parquet");
        let empty = Table::new(sample().schema().clone(), vec![]);

        write_parquet(&empty, &SinkOptions::new(&target)).unwrap();
        let file = fs::File::open(&target).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        assert_eq!(builder.schema().fields().len(), 3);
        assert_eq!(builder.metadata().file_metadata().num_rows(), 0);
    }

    #[test]
    fn test_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("players.parquet");
        fs::write(&target, b"old").unwrap();

        write_parquet(&sample(), &SinkOptions::new(&target)).unwrap();
        assert_eq!(read_back(&target).num_rows(), 2);
    }

    #[test]
    fn test_failed_write_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the destination makes the publish fail
        let target = dir.path().join("players.parquet");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"previous").unwrap();

        let err = write_parquet(&sample(), &SinkOptions::new(&target)).unwrap_err();
        assert!(matches!(err, SinkError::SinkWriteError { .. }));
        assert_eq!(fs::read(target.join("keep")).unwrap(), b"previous");

        // No staged file left behind
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
