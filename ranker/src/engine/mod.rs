//! Tabular engine abstraction.
//!
//! The pipeline only talks to tables through [`TabularEngine`], so stage
//! logic does not depend on how tables are stored or executed.
//!
//! - `expr`: Column expressions with SQL null semantics
//! - `rank`: Rank-within-partition and tier bucketing
//!
//! ## Example
//!
//! ```rust,ignore
//! use player_ranker::engine::{col, lit, InMemoryEngine, TabularEngine};
//!
//! let engine = InMemoryEngine::new();
//! let adults = engine.filter(&table, &col("age").gt(lit(17i64)))?;
//! let ratio = engine.with_derived_column(&adults, "ratio", &col("overall").divide(col("potential")))?;
//! ```

pub mod expr;
pub mod rank;

pub use expr::{col, lit, Expr};
pub use rank::{competition_ranks, RankSpec, SortOrder, Tier, TierTable};

use std::path::PathBuf;

use crate::error::{EngineError, EngineResult, LoadResult, SinkResult};
use crate::models::{ColumnType, Field, Schema, Value};
use crate::parser::{self, SourceOptions};
use crate::sink::{self, SinkOptions};
use crate::table::Table;

/// Capabilities the pipeline needs from a table engine.
///
/// Every operation returns a new table and leaves its input untouched.
pub trait TabularEngine {
    /// Read the source into a table.
    fn load(&self, source: &SourceOptions) -> LoadResult<Table>;

    /// Keep the rows whose predicate is `true` (null counts as false).
    fn filter(&self, table: &Table, predicate: &Expr) -> EngineResult<Table>;

    /// Append a column computed from `expr`.
    fn with_derived_column(&self, table: &Table, name: &str, expr: &Expr) -> EngineResult<Table>;

    /// Append the tier label of each row's rank within its partition.
    fn rank_within_partition(&self, table: &Table, spec: &RankSpec) -> EngineResult<Table>;

    /// Select and order columns.
    fn project(&self, table: &Table, columns: &[&str]) -> EngineResult<Table>;

    /// Persist the table.
    fn write(&self, table: &Table, sink: &SinkOptions) -> SinkResult<PathBuf>;
}

/// Engine holding every row in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryEngine;

impl InMemoryEngine {
    pub fn new() -> Self {
        Self
    }
}

fn check_columns(schema: &Schema, names: &[&str]) -> EngineResult<()> {
    match names.iter().find(|name| !schema.contains(name)) {
        Some(name) => Err(EngineError::ColumnMissing(name.to_string())),
        None => Ok(()),
    }
}

impl TabularEngine for InMemoryEngine {
    fn load(&self, source: &SourceOptions) -> LoadResult<Table> {
        parser::load_file(source).map(|loaded| loaded.table)
    }

    fn filter(&self, table: &Table, predicate: &Expr) -> EngineResult<Table> {
        let schema = table.schema();
        check_columns(schema, &predicate.columns())?;
        Ok(table.retain_rows(|row| predicate.matches(schema, row)))
    }

    fn with_derived_column(&self, table: &Table, name: &str, expr: &Expr) -> EngineResult<Table> {
        let schema = table.schema();
        check_columns(schema, &expr.columns())?;
        let values: Vec<Value> = table.rows().iter().map(|row| expr.eval(schema, row)).collect();
        let field = Field::new(name, expr.output_type(schema));
        table.with_column(field, values)
    }

    fn rank_within_partition(&self, table: &Table, spec: &RankSpec) -> EngineResult<Table> {
        let partitions = table.column(&spec.partition_by)?;
        let order_values = table.column(&spec.order_by)?;
        let labels = rank::rank_labels(&partitions, &order_values, spec);
        table.with_column(
            Field::new(spec.output.as_str(), ColumnType::Str),
            labels.into_iter().map(Value::Str).collect(),
        )
    }

    fn project(&self, table: &Table, columns: &[&str]) -> EngineResult<Table> {
        let indices = columns
            .iter()
            .map(|name| table.column_index(name))
            .collect::<EngineResult<Vec<usize>>>()?;
        let fields = indices
            .iter()
            .map(|&i| table.schema().fields[i].clone())
            .collect();
        let rows = table
            .rows()
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table::new(Schema::new(fields), rows))
    }

    fn write(&self, table: &Table, sink: &SinkOptions) -> SinkResult<PathBuf> {
        sink::write_parquet(table, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Table {
        Table::new(
            Schema::new(vec![
                Field::new("short_name", ColumnType::Str),
                Field::new("team_position", ColumnType::Str),
                Field::new("height_cm", ColumnType::Int),
            ]),
            vec![
                vec!["Courtois".into(), "GK".into(), Value::Int(199)],
                vec!["Neuer".into(), "GK".into(), Value::Int(193)],
                vec!["Messi".into(), "RW".into(), Value::Int(170)],
                vec!["Unknown".into(), Value::Null, Value::Int(180)],
            ],
        )
    }

    #[test]
    fn test_filter_drops_null_predicates() {
        let engine = InMemoryEngine::new();
        let out = engine
            .filter(&players(), &col("team_position").equal_to(lit("GK")))
            .unwrap();
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn test_filter_unknown_column() {
        let engine = InMemoryEngine::new();
        let err = engine.filter(&players(), &col("nope").is_not_null()).unwrap_err();
        assert!(matches!(err, EngineError::ColumnMissing(ref c) if c == "nope"));
    }

    #[test]
    fn test_derived_column_type_and_input_untouched() {
        let engine = InMemoryEngine::new();
        let input = players();
        let out = engine
            .with_derived_column(&input, "half", &col("height_cm").divide(lit(2i64)))
            .unwrap();

        assert_eq!(out.schema().fields[3].column_type, ColumnType::Float);
        assert_eq!(out.value(2, "half").unwrap(), &Value::Float(85.0));
        assert_eq!(input.schema().len(), 3);
    }

    #[test]
    fn test_rank_within_partition_null_key_is_own_partition() {
        let engine = InMemoryEngine::new();
        let spec = RankSpec {
            partition_by: "team_position".into(),
            order_by: "height_cm".into(),
            order: SortOrder::Descending,
            output: "cat".into(),
            tiers: TierTable::new("C").with_tier(2, "A"),
        };
        let out = engine.rank_within_partition(&players(), &spec).unwrap();
        let labels: Vec<&str> = out.column("cat").unwrap().iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(labels, vec!["A", "C", "A", "A"]);
    }

    #[test]
    fn test_project_orders_and_checks_columns() {
        let engine = InMemoryEngine::new();
        let out = engine.project(&players(), &["height_cm", "short_name"]).unwrap();
        assert_eq!(out.schema().names(), vec!["height_cm", "short_name"]);
        assert_eq!(out.value(0, "short_name").unwrap(), &Value::from("Courtois"));

        let err = engine.project(&players(), &["short_name", "age"]).unwrap_err();
        assert!(matches!(err, EngineError::ColumnMissing(ref c) if c == "age"));
    }
}
