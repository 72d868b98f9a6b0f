//! Immutable in-memory table.
//!
//! A [`Table`] is a [`Schema`] plus row-major cell storage. Operations never
//! mutate a table in place; they build a new one (see [`crate::engine`]).

use crate::error::{EngineError, EngineResult};
use crate::models::{Field, Schema, Value};

static NULL: Value = Value::Null;

/// One row, cells in schema order.
pub type Row = Vec<Value>;

/// A collection of rows sharing a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table. Rows shorter than the schema are padded with nulls,
    /// longer rows are truncated.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        let width = schema.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { schema, rows }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `name`, or `ColumnMissing`.
    pub fn column_index(&self, name: &str) -> EngineResult<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| EngineError::ColumnMissing(name.to_string()))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> EngineResult<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Cell at (`row`, `name`).
    pub fn value(&self, row: usize, name: &str) -> EngineResult<&Value> {
        let idx = self.column_index(name)?;
        Ok(self.rows.get(row).map(|r| &r[idx]).unwrap_or(&NULL))
    }

    /// New table with `field` appended and `values` as its cells.
    pub(crate) fn with_column(&self, field: Field, values: Vec<Value>) -> EngineResult<Table> {
        if self.schema.contains(&field.name) {
            return Err(EngineError::DuplicateColumn(field.name));
        }
        let mut schema = self.schema.clone();
        schema.fields.push(field);
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut row = row.clone();
                row.push(value);
                row
            })
            .collect();
        Ok(Table { schema, rows })
    }

    /// New table holding only the rows for which `keep` returns true.
    pub(crate) fn retain_rows(&self, mut keep: impl FnMut(&Row) -> bool) -> Table {
        Table {
            schema: self.schema.clone(),
            rows: self.rows.iter().filter(|row| keep(*row)).cloned().collect(),
        }
    }

    /// Render the first `limit` rows as a boxed text table, cells untruncated.
    pub fn preview(&self, limit: usize) -> String {
        let names = self.schema.names();
        let shown: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(limit)
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
        for row in &shown {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let border = {
            let mut line = String::from("+");
            for w in &widths {
                line.push_str(&"-".repeat(*w));
                line.push('+');
            }
            line
        };
        let format_line = |cells: &[String]| {
            let mut line = String::from("|");
            for (cell, w) in cells.iter().zip(&widths) {
                let pad = w - cell.chars().count();
                line.push_str(&" ".repeat(pad));
                line.push_str(cell);
                line.push('|');
            }
            line
        };

        let header: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let mut out = vec![border.clone(), format_line(&header[..]), border.clone()];
        out.extend(shown.iter().map(|row| format_line(row.as_slice())));
        out.push(border);
        if self.rows.len() > limit {
            out.push(format!("only showing top {} rows", limit));
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    fn sample() -> Table {
        Table::new(
            Schema::new(vec![
                Field::new("name", ColumnType::Str),
                Field::new("overall", ColumnType::Int),
            ]),
            vec![
                vec!["L. Messi".into(), Value::Int(93)],
                vec!["Pedri".into()],
            ],
        )
    }

    #[test]
    fn test_short_rows_padded_with_null() {
        let table = sample();
        assert_eq!(table.value(1, "overall").unwrap(), &Value::Null);
    }

    #[test]
    fn test_with_column_rejects_duplicates() {
        let table = sample();
        let err = table
            .with_column(Field::new("overall", ColumnType::Int), vec![])
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateColumn(_)));
    }

    #[test]
    fn test_preview_renders_nulls_and_limit() {
        let preview = sample().preview(1);
        assert!(preview.contains("|L. Messi|     93|"));
        assert!(!preview.contains("Pedri"));
        assert!(preview.ends_with("only showing top 1 rows"));

        let full = sample().preview(10);
        assert!(full.contains("|   Pedri|   null|"));
    }
}
